//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, every error collected)
//!     → ClientConfig (validated, immutable)
//!     → to_params(parent)    → ParamStore (chained to `parent` when given)
//!     → install_transports() → TransportRegistry entries
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The free-form `[params]` table maps onto dotted parameter names, so any
//!   parameter can be set without a dedicated field

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ClientConfig, ConnectionConfig, LoggingConfig, ProtocolConfig, TransportConfig};
pub use validation::{validate_config, ValidationError};
