//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! Uri / scheme name
//!     → registry.rs  (scheme → TransportDescriptor, lazy http/https)
//!     → transport.rs (descriptor: factory + default port)
//!     → factory.rs   (SocketFactory / SecureSocketFactory seam)
//!         → plain.rs (TCP connect, timeout, socket options)
//!         → tls.rs   (TCP connect + rustls handshake, or TLS layered
//!                     over an existing stream)
//!     → socket.rs    (Socket handed to the caller)
//! ```
//!
//! # Design Decisions
//! - Factories are trait objects so callers can register their own schemes
//! - The secure capability is a query on the factory, not a type check
//! - Connect timeouts come from the caller's parameter store

pub mod error;
pub mod factory;
pub mod plain;
pub mod registry;
pub mod socket;
pub mod tls;
pub mod transport;

pub use error::TransportError;
pub use factory::{SecureSocketFactory, SocketFactory};
pub use plain::PlainSocketFactory;
pub use registry::TransportRegistry;
pub use socket::Socket;
pub use tls::TlsSocketFactory;
pub use transport::TransportDescriptor;
