//! Transport-configuration layer for an HTTP client.
//!
//! # Data Flow
//! ```text
//! resource string
//!     → uri (Uri: escaped form, decoded components, reference resolution)
//!     → net::registry (scheme → TransportDescriptor)
//!     → net::factory (SocketFactory, with timeouts from a ParamStore)
//!     → net::socket (plain or TLS Socket)
//!
//! response bytes
//!     → http::status_line (StatusLine: version, code, reason)
//!
//! config file
//!     → config (ClientConfig) → params (ParamStore) + registry entries
//! ```
//!
//! # Design Decisions
//! - Every subsystem reports failures through its own error enum; [`Error`]
//!   wraps them all
//! - Process-wide state (default parameters, the global registry) is
//!   internally synchronized and replaceable in tests

pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod observability;
pub mod params;
pub mod uri;

pub use config::{load_config, ClientConfig};
pub use error::{Error, Result};
pub use http::{HttpVersion, StatusLine};
pub use net::{
    PlainSocketFactory, SecureSocketFactory, Socket, SocketFactory, TlsSocketFactory,
    TransportDescriptor, TransportError, TransportRegistry,
};
pub use params::{ParamStore, ParamValue};
pub use uri::Uri;
