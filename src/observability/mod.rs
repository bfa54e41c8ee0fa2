//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! params / net / http:
//!     → tracing events (debug: registration, connects, param writes;
//!                       warn: failed connects; trace: rejected status lines)
//!     → metrics.rs     (connect counters and latency, lazy registrations)
//!
//! Consumers:
//!     → logging.rs installs a fmt subscriber for applications that want one
//!     → metrics go to whatever recorder the application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a metrics exporter; without a recorder the
//!   macros are no-ops
//! - Logging setup is opt-in and safe to call more than once

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
