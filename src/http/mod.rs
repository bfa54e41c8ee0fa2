//! HTTP wire elements.
//!
//! # Data Flow
//! ```text
//! raw response bytes
//!     → status_line.rs (StatusLine::from_bytes / parse)
//!     → version.rs (HTTP-Version token)
//!     → status.rs (reason phrase lookup)
//! ```

pub mod status;
pub mod status_line;
pub mod version;

pub use status_line::{StatusLine, StatusLineError};
pub use version::{HttpVersion, InvalidVersion};
