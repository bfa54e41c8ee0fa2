//! Structured logging.
//!
//! # Responsibilities
//! - Install a `tracing` subscriber with an env-filter
//! - Let `RUST_LOG` override the configured level
//!
//! # Design Decisions
//! - Installation is idempotent: a second call, or a subscriber installed
//!   by the host application, leaves the existing one in place

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber filtered at `level` (e.g. `"info"` or
/// `"http_transport=debug"`). Returns false if a subscriber already exists.
pub fn init_logging(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(level, "Logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_no_op() {
        init_logging("warn");
        assert!(!init_logging("debug"));
    }
}
