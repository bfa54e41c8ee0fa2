//! Socket factory seam.
//!
//! # Responsibilities
//! - Define how a transport opens a connection to `host:port`
//! - Expose the secure capability (TLS layering over an existing stream)
//! - Give trait objects a structural identity for descriptor equality
//!
//! # Design Decisions
//! - `as_secure` is a capability query; callers never downcast to a
//!   concrete factory type
//! - Equality is per concrete type: two factories are equal when they are
//!   the same type and that type's own `PartialEq` says so

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::net::TcpStream;

use crate::net::error::TransportError;
use crate::net::socket::Socket;
use crate::params::ParamStore;

/// Creates connected sockets for one transport.
#[async_trait]
pub trait SocketFactory: Send + Sync + fmt::Debug {
    /// Connect to `host:port`, optionally binding `local` first.
    ///
    /// No connect timeout is applied.
    async fn create_socket(
        &self,
        host: &str,
        port: u16,
        local: Option<SocketAddr>,
    ) -> Result<Socket, TransportError>;

    /// Connect using the timeout and socket options found in `params`.
    ///
    /// A connect timeout of `0` blocks until the OS gives up; a positive value
    /// fails with [`TransportError::ConnectTimeout`] once it elapses.
    async fn create_socket_with_params(
        &self,
        host: &str,
        port: u16,
        local: Option<SocketAddr>,
        params: &ParamStore,
    ) -> Result<Socket, TransportError>;

    /// Connect to `host:port` with no local bind and no timeout.
    async fn connect(&self, host: &str, port: u16) -> Result<Socket, TransportError> {
        self.create_socket(host, port, None).await
    }

    /// The secure capability, if this factory has it.
    fn as_secure(&self) -> Option<&dyn SecureSocketFactory> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn dyn_eq(&self, other: &dyn SocketFactory) -> bool;

    fn dyn_hash(&self, state: &mut dyn Hasher);
}

/// A factory that can also start TLS over an already connected stream,
/// e.g. after a proxy CONNECT tunnel has been set up.
#[async_trait]
pub trait SecureSocketFactory: SocketFactory {
    /// Start a TLS session over `existing`, verifying the peer as `host`.
    ///
    /// With `auto_close` set, closing the returned socket also closes
    /// `existing`. Without it, [`Socket::close`] only ends the TLS session and
    /// gives the TCP stream back.
    async fn layer_socket(
        &self,
        existing: TcpStream,
        host: &str,
        port: u16,
        auto_close: bool,
    ) -> Result<Socket, TransportError>;
}

impl PartialEq for dyn SocketFactory {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

impl Eq for dyn SocketFactory {}

impl Hash for dyn SocketFactory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dyn_hash(state);
    }
}

/// Shared `dyn_eq` body for factories with a `PartialEq` impl.
pub(crate) fn same_factory<T>(this: &T, other: &dyn SocketFactory) -> bool
where
    T: PartialEq + 'static,
{
    other.as_any().downcast_ref::<T>().is_some_and(|o| o == this)
}

/// Reject arguments no connection attempt could succeed with.
pub(crate) fn check_target(host: &str, port: u16) -> Result<(), TransportError> {
    if host.is_empty() {
        return Err(TransportError::InvalidArgument(
            "host may not be empty".to_string(),
        ));
    }
    if port == 0 {
        return Err(TransportError::InvalidArgument(format!(
            "port 0 is not a valid destination for {}",
            host
        )));
    }
    Ok(())
}
