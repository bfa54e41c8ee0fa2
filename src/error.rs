//! Crate-level error type.
//!
//! Each subsystem has its own error enum; this wraps them for callers that
//! use several subsystems and want a single `?`-able type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::http::{InvalidVersion, StatusLineError};
use crate::net::TransportError;
use crate::params::ParamError;
use crate::uri::UriError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Params(#[from] ParamError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Uri(#[from] UriError),

    #[error(transparent)]
    StatusLine(#[from] StatusLineError),

    #[error(transparent)]
    Version(#[from] InvalidVersion),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
