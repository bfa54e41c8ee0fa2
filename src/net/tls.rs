//! TLS socket factory.
//!
//! # Responsibilities
//! - Connect over TCP and run a rustls client handshake
//! - Start TLS over a stream the caller already holds (proxy tunnels)
//! - Load trust roots: the bundled webpki set or caller-supplied PEM
//!
//! # Design Decisions
//! - Factories built with `new()` share one client config; equality is
//!   identity of that config
//! - The connect timeout covers resolution, the TCP connect and the
//!   handshake; a peer that never answers the ClientHello times out
//! - Connect metrics under `tls` count a connection as successful only once
//!   the session is established

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::BufReader;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;

use crate::net::error::TransportError;
use crate::net::factory::{check_target, same_factory, SecureSocketFactory, SocketFactory};
use crate::net::plain::{dial, open_stream, SocketOptions};
use crate::net::socket::{LayeredStream, Socket};
use crate::params::ParamStore;

static DEFAULT_CONFIG: LazyLock<Arc<ClientConfig>> = LazyLock::new(|| {
    let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    Arc::new(client_config(roots))
});

fn client_config(roots: RootCertStore) -> ClientConfig {
    ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth()
}

/// Opens TLS connections verified against a set of trust roots.
#[derive(Clone)]
pub struct TlsSocketFactory {
    config: Arc<ClientConfig>,
}

impl TlsSocketFactory {
    /// Factory trusting the bundled webpki roots.
    pub fn new() -> Self {
        Self {
            config: Arc::clone(&DEFAULT_CONFIG),
        }
    }

    pub fn with_config(config: Arc<ClientConfig>) -> Self {
        Self { config }
    }

    /// Factory trusting only the certificates in `pem`.
    pub fn with_root_pem(pem: &[u8]) -> Result<Self, TransportError> {
        let mut roots = RootCertStore::empty();
        for cert in rustls_pemfile::certs(&mut BufReader::new(pem)) {
            let cert = cert.map_err(|e| {
                TransportError::InvalidArgument(format!("unreadable PEM certificate: {}", e))
            })?;
            roots.add(cert).map_err(|e| {
                TransportError::InvalidArgument(format!("rejected trust root: {}", e))
            })?;
        }
        if roots.is_empty() {
            return Err(TransportError::InvalidArgument(
                "no certificates found in PEM input".to_string(),
            ));
        }
        tracing::debug!(roots = roots.len(), "Loaded custom trust roots");
        Ok(Self::with_config(Arc::new(client_config(roots))))
    }

    /// Factory trusting only the certificates in the PEM file at `path`.
    pub fn from_root_pem_file(path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let pem = std::fs::read(path).map_err(|e| {
            TransportError::InvalidArgument(format!(
                "cannot read trust roots from {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::with_root_pem(&pem)
    }

    pub fn config(&self) -> &Arc<ClientConfig> {
        &self.config
    }

    async fn connect_secure(
        &self,
        host: &str,
        port: u16,
        local: Option<SocketAddr>,
        options: &SocketOptions,
    ) -> Result<Socket, TransportError> {
        let attempt = async {
            let tcp = open_stream(host, port, local, options).await?;
            self.handshake(tcp, host, true).await
        };
        dial("tls", host, port, options, attempt).await
    }

    async fn handshake(
        &self,
        tcp: TcpStream,
        host: &str,
        auto_close: bool,
    ) -> Result<Socket, TransportError> {
        let tls_error = |reason: String| TransportError::Tls {
            host: host.to_string(),
            reason,
        };
        let name = host.trim_start_matches('[').trim_end_matches(']');
        let server_name =
            ServerName::try_from(name.to_string()).map_err(|e| tls_error(e.to_string()))?;

        let connector = TlsConnector::from(Arc::clone(&self.config));
        let stream = connector
            .connect(server_name, LayeredStream::new(tcp, auto_close))
            .await
            .map_err(|e| {
                tracing::debug!(host, error = %e, "TLS handshake failed");
                tls_error(e.to_string())
            })?;

        tracing::debug!(
            host,
            auto_close,
            protocol = ?stream.get_ref().1.protocol_version(),
            "TLS session established"
        );
        Ok(Socket::secure(stream))
    }
}

impl Default for TlsSocketFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TlsSocketFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsSocketFactory")
            .field("config", &Arc::as_ptr(&self.config))
            .finish()
    }
}

impl PartialEq for TlsSocketFactory {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.config, &other.config)
    }
}

impl Eq for TlsSocketFactory {}

impl Hash for TlsSocketFactory {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.config) as usize).hash(state);
    }
}

#[async_trait]
impl SocketFactory for TlsSocketFactory {
    async fn create_socket(
        &self,
        host: &str,
        port: u16,
        local: Option<SocketAddr>,
    ) -> Result<Socket, TransportError> {
        self.connect_secure(host, port, local, &SocketOptions::default())
            .await
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
        self.connect_secure(host, port, local, &options).await
    }

    fn as_secure(&self) -> Option<&dyn SecureSocketFactory> {
        Some(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn SocketFactory) -> bool {
        same_factory(self, other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }
}

#[async_trait]
impl SecureSocketFactory for TlsSocketFactory {
    async fn layer_socket(
        &self,
        existing: TcpStream,
        host: &str,
        port: u16,
        auto_close: bool,
    ) -> Result<Socket, TransportError> {
        check_target(host, port)?;
        tracing::debug!(host, port, auto_close, "Layering TLS over existing stream");
        self.handshake(existing, host, auto_close)
            .await
            .inspect_err(|e| tracing::warn!(host, port, error = %e, "TLS layering failed"))
    }
}
