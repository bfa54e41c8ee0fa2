//! Plain TCP socket factory.
//!
//! # Responsibilities
//! - Resolve the host and connect to the first address that answers
//! - Bind a local address when one is requested
//! - Apply socket options and the connect timeout from a parameter store
//!
//! # Design Decisions
//! - Resolution and connection share one timeout; when it fires the pending
//!   attempt is dropped, which closes the half-open socket
//! - Name resolution failures are reported apart from connection failures

use std::any::{Any, TypeId};
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::net::{lookup_host, TcpSocket, TcpStream};

use crate::net::error::TransportError;
use crate::net::factory::{check_target, same_factory, SocketFactory};
use crate::net::socket::Socket;
use crate::observability::metrics;
use crate::params::{ConnectionParams, ParamStore};

/// Socket options applied while connecting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocketOptions {
    pub connect_timeout: Option<Duration>,
    /// `None` leaves the OS default.
    pub nodelay: Option<bool>,
    pub linger: Option<Duration>,
    pub send_buffer_size: Option<u32>,
    pub receive_buffer_size: Option<u32>,
}

impl SocketOptions {
    /// Read options from a parameter store chain.
    pub fn from_params(params: &ParamStore) -> Result<Self, TransportError> {
        let conn = ConnectionParams::new(params);
        Ok(Self {
            connect_timeout: conn.connect_timeout()?,
            nodelay: Some(conn.tcp_nodelay()?),
            linger: conn.linger()?,
            send_buffer_size: conn.send_buffer_size()?,
            receive_buffer_size: conn.receive_buffer_size()?,
        })
    }
}

/// Opens unencrypted TCP connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PlainSocketFactory;

impl PlainSocketFactory {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SocketFactory for PlainSocketFactory {
    async fn create_socket(
        &self,
        host: &str,
        port: u16,
        local: Option<SocketAddr>,
    ) -> Result<Socket, TransportError> {
        connect_tcp(host, port, local, &SocketOptions::default())
            .await
            .map(Socket::from)
    }

    async fn create_socket_with_params(
        &self,
        host: &str,
        port: u16,
        local: Option<SocketAddr>,
        params: &ParamStore,
    ) -> Result<Socket, TransportError> {
        check_target(host, port)?;
        let options = SocketOptions::from_params(params)?;
        connect_tcp(host, port, local, &options)
            .await
            .map(Socket::from)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn SocketFactory) -> bool {
        same_factory(self, other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<Self>().hash(&mut state);
    }
}

async fn connect_tcp(
    host: &str,
    port: u16,
    local: Option<SocketAddr>,
    options: &SocketOptions,
) -> Result<TcpStream, TransportError> {
    dial(
        "plain",
        host,
        port,
        options,
        open_stream(host, port, local, options),
    )
    .await
}

/// Drive `attempt` under the connect timeout, recording the outcome under
/// `transport`. Secure transports pass resolution, connect and handshake as
/// one attempt so the timeout bounds all of it.
pub(crate) async fn dial<T, F>(
    transport: &'static str,
    host: &str,
    port: u16,
    options: &SocketOptions,
    attempt: F,
) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    check_target(host, port)?;

    let start = Instant::now();
    tracing::debug!(
        transport,
        host,
        port,
        timeout = ?options.connect_timeout,
        "Connecting"
    );

    let result = within(options.connect_timeout, host, port, attempt).await;

    match &result {
        Ok(_) => {
            tracing::debug!(
                transport,
                host,
                port,
                elapsed = ?start.elapsed(),
                "Connected"
            );
            metrics::record_connect(transport, "success", start.elapsed());
        }
        Err(e) => {
            tracing::warn!(transport, host, port, error = %e, "Connect failed");
            metrics::record_connect(transport, e.kind(), start.elapsed());
        }
    }
    result
}

/// Run `attempt`, giving up with `ConnectTimeout` after `timeout`.
async fn within<T, F>(
    timeout: Option<Duration>,
    host: &str,
    port: u16,
    attempt: F,
) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    let Some(timeout) = timeout else {
        return attempt.await;
    };
    match tokio::time::timeout(timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::ConnectTimeout {
            host: host.to_string(),
            port,
            timeout,
        }),
    }
}

pub(crate) async fn open_stream(
    host: &str,
    port: u16,
    local: Option<SocketAddr>,
    options: &SocketOptions,
) -> Result<TcpStream, TransportError> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|source| TransportError::UnknownHost {
            host: host.to_string(),
            source,
        })?
        .collect();
    if addrs.is_empty() {
        return Err(TransportError::UnknownHost {
            host: host.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses found"),
        });
    }

    let mut last_error = None;
    for addr in addrs {
        if local.is_some_and(|l| l.is_ipv4() != addr.is_ipv4()) {
            continue;
        }
        match connect_addr(addr, local, options).await {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!(%addr, error = %e, "Connect attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(TransportError::ConnectFailed {
        host: host.to_string(),
        port,
        source: last_error.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                "no resolved address matches the local address family",
            )
        }),
    })
}

async fn connect_addr(
    addr: SocketAddr,
    local: Option<SocketAddr>,
    options: &SocketOptions,
) -> io::Result<TcpStream> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    if let Some(size) = options.send_buffer_size {
        socket.set_send_buffer_size(size)?;
    }
    if let Some(size) = options.receive_buffer_size {
        socket.set_recv_buffer_size(size)?;
    }
    if options.linger.is_some() {
        socket.set_linger(options.linger)?;
    }
    if let Some(local) = local {
        socket.bind(local)?;
    }

    let stream = socket.connect(addr).await?;
    if let Some(nodelay) = options.nodelay {
        stream.set_nodelay(nodelay)?;
    }
    Ok(stream)
}
