//! Transport error taxonomy.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::params::ParamError;

/// Errors raised while resolving transports or creating sockets.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Rejected before any I/O was attempted.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No transport is registered for the scheme.
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),

    /// Host name resolution failed.
    #[error("unknown host '{host}': {source}")]
    UnknownHost {
        host: String,
        #[source]
        source: io::Error,
    },

    /// The connection was not established within the configured timeout.
    #[error("connect to {host}:{port} timed out after {timeout:?}")]
    ConnectTimeout {
        host: String,
        port: u16,
        timeout: Duration,
    },

    /// Any other I/O failure while connecting.
    #[error("connect to {host}:{port} failed: {source}")]
    ConnectFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// TLS setup or handshake failure.
    #[error("TLS error for {host}: {reason}")]
    Tls { host: String, reason: String },

    /// A connection parameter could not be read.
    #[error(transparent)]
    Params(ParamError),
}

impl From<ParamError> for TransportError {
    fn from(err: ParamError) -> Self {
        match err {
            // e.g. a negative timeout: still caught before any I/O
            ParamError::InvalidArgument { .. } => TransportError::InvalidArgument(err.to_string()),
            other => TransportError::Params(other),
        }
    }
}

impl TransportError {
    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::InvalidArgument(_) => "invalid_argument",
            TransportError::UnsupportedScheme(_) => "unsupported_scheme",
            TransportError::UnknownHost { .. } => "unknown_host",
            TransportError::ConnectTimeout { .. } => "timeout",
            TransportError::ConnectFailed { .. } => "connect_failed",
            TransportError::Tls { .. } => "tls",
            TransportError::Params(_) => "params",
        }
    }
}
