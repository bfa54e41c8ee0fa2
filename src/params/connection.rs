//! Typed view of connection-level parameters.

use std::time::Duration;

use crate::params::names;
use crate::params::store::ParamStore;
use crate::params::value::ParamError;

/// Reads socket and timeout settings from a [`ParamStore`] chain.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionParams<'a> {
    store: &'a ParamStore,
}

impl<'a> ConnectionParams<'a> {
    pub fn new(store: &'a ParamStore) -> Self {
        Self { store }
    }

    /// Connect timeout. `None` means block indefinitely.
    pub fn connect_timeout(&self) -> Result<Option<Duration>, ParamError> {
        self.optional_millis(names::CONNECTION_TIMEOUT)
    }

    /// Read timeout. `None` means block indefinitely.
    pub fn so_timeout(&self) -> Result<Option<Duration>, ParamError> {
        self.optional_millis(names::SO_TIMEOUT)
    }

    pub fn tcp_nodelay(&self) -> Result<bool, ParamError> {
        self.store.get_bool(names::TCP_NODELAY, true)
    }

    pub fn stale_checking(&self) -> Result<bool, ParamError> {
        self.store.get_bool(names::STALE_CONNECTION_CHECK, true)
    }

    /// Linger time, `None` when lingering is disabled.
    pub fn linger(&self) -> Result<Option<Duration>, ParamError> {
        let secs = self.store.get_int(names::SO_LINGER, -1)?;
        Ok(u64::try_from(secs).ok().map(Duration::from_secs))
    }

    pub fn send_buffer_size(&self) -> Result<Option<u32>, ParamError> {
        self.buffer_size(names::SO_SNDBUF)
    }

    pub fn receive_buffer_size(&self) -> Result<Option<u32>, ParamError> {
        self.buffer_size(names::SO_RCVBUF)
    }

    fn optional_millis(&self, name: &str) -> Result<Option<Duration>, ParamError> {
        let millis = self.store.get_long(name, 0)?;
        match millis {
            0 => Ok(None),
            m if m < 0 => Err(ParamError::InvalidArgument {
                name: name.to_string(),
                reason: format!("timeout may not be negative ({}ms)", m),
            }),
            m => Ok(Some(Duration::from_millis(m as u64))),
        }
    }

    fn buffer_size(&self, name: &str) -> Result<Option<u32>, ParamError> {
        let size = self.store.get_int(name, -1)?;
        Ok(u32::try_from(size).ok().filter(|s| *s > 0))
    }
}
