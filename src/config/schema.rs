//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::loader::ConfigError;
use crate::config::validation::ValidationError;
use crate::http::HttpVersion;
use crate::net::{
    PlainSocketFactory, SocketFactory, TlsSocketFactory, TransportDescriptor, TransportRegistry,
};
use crate::params::{names, ParamStore, ParamValue};

/// Root configuration for the HTTP transport layer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Socket and timeout settings.
    pub connection: ConnectionConfig,

    /// Protocol version, user agent and charsets.
    pub protocol: ProtocolConfig,

    pub logging: LoggingConfig,

    /// Extra schemes to register.
    pub transports: Vec<TransportConfig>,

    /// Free-form parameters; nested tables become dotted names.
    pub params: toml::Table,
}

/// Connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Connect timeout in milliseconds; 0 blocks indefinitely.
    pub connect_timeout_ms: i64,

    /// Read timeout in milliseconds; 0 blocks indefinitely.
    pub so_timeout_ms: i64,

    pub tcp_nodelay: bool,

    /// SO_LINGER in seconds; absent disables lingering.
    pub linger_secs: Option<i32>,

    pub send_buffer_size: Option<u32>,

    pub receive_buffer_size: Option<u32>,

    pub stale_checking: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 0,
            so_timeout_ms: 0,
            tcp_nodelay: true,
            linger_secs: None,
            send_buffer_size: None,
            receive_buffer_size: None,
            stale_checking: true,
        }
    }
}

/// Protocol settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// HTTP version, e.g. "HTTP/1.1".
    pub version: String,

    /// User-Agent; the stock agent is used when absent.
    pub user_agent: Option<String>,

    /// Charset for the request line and headers.
    pub element_charset: String,

    /// Default charset for entity bodies.
    pub content_charset: String,

    /// Charset for escaping URIs.
    pub uri_charset: String,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            version: "HTTP/1.1".to_string(),
            user_agent: None,
            element_charset: "US-ASCII".to_string(),
            content_charset: "ISO-8859-1".to_string(),
            uri_charset: "UTF-8".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Env-filter directive, e.g. "info" or "http_transport=debug".
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// A custom scheme.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    pub scheme: String,

    pub default_port: u16,

    /// Use TLS for this scheme.
    #[serde(default)]
    pub secure: bool,

    /// PEM file of trust roots for a secure scheme; webpki roots otherwise.
    pub ca_file: Option<String>,
}

impl ClientConfig {
    /// Build a parameter store holding this configuration.
    pub fn to_params(&self, parent: Option<Arc<ParamStore>>) -> Result<ParamStore, ConfigError> {
        let version = HttpVersion::parse(&self.protocol.version).map_err(|e| {
            ConfigError::Validation(vec![ValidationError::new(
                "protocol.version",
                e.to_string(),
            )])
        })?;

        let store = match parent {
            Some(parent) => ParamStore::with_parent(parent),
            None => ParamStore::new(),
        };

        let conn = &self.connection;
        store.set(names::CONNECTION_TIMEOUT, conn.connect_timeout_ms);
        store.set(names::SO_TIMEOUT, conn.so_timeout_ms);
        store.set(names::TCP_NODELAY, conn.tcp_nodelay);
        store.set(names::STALE_CONNECTION_CHECK, conn.stale_checking);
        if let Some(linger) = conn.linger_secs {
            store.set(names::SO_LINGER, linger);
        }
        for (name, size) in [
            (names::SO_SNDBUF, conn.send_buffer_size),
            (names::SO_RCVBUF, conn.receive_buffer_size),
        ] {
            if let Some(size) = size {
                let size = i32::try_from(size).map_err(|_| {
                    ConfigError::Validation(vec![ValidationError::new(
                        name,
                        "buffer size too large",
                    )])
                })?;
                store.set(name, size);
            }
        }

        let proto = &self.protocol;
        store.set(names::PROTOCOL_VERSION, version);
        if let Some(agent) = &proto.user_agent {
            store.set(names::USER_AGENT, agent.as_str());
        }
        store.set(names::HTTP_ELEMENT_CHARSET, proto.element_charset.as_str());
        store.set(names::HTTP_CONTENT_CHARSET, proto.content_charset.as_str());
        store.set(names::HTTP_URI_CHARSET, proto.uri_charset.as_str());

        let mut extra = Vec::new();
        flatten_params("", &self.params, &mut extra);
        for (name, value) in extra {
            store.set(name, value);
        }

        tracing::debug!(params = store.len(), "Built parameter store from config");
        Ok(store)
    }

    /// Register every configured transport with `registry`.
    pub fn install_transports(
        &self,
        registry: &TransportRegistry,
    ) -> Result<Vec<Arc<TransportDescriptor>>, ConfigError> {
        let mut installed = Vec::with_capacity(self.transports.len());
        for transport in &self.transports {
            let factory: Arc<dyn SocketFactory> = match (transport.secure, &transport.ca_file) {
                (true, Some(ca_file)) => Arc::new(TlsSocketFactory::from_root_pem_file(ca_file)?),
                (true, None) => Arc::new(TlsSocketFactory::new()),
                (false, _) => Arc::new(PlainSocketFactory),
            };
            let descriptor =
                TransportDescriptor::new(&transport.scheme, factory, transport.default_port)?;
            installed.push(registry.register(&transport.scheme, descriptor)?);
        }
        Ok(installed)
    }
}

/// Flatten `table` into `(dotted.name, value)` pairs. Tables nested inside
/// arrays have no parameter form and are skipped; validation reports them.
pub(crate) fn flatten_params(prefix: &str, table: &toml::Table, out: &mut Vec<(String, ParamValue)>) {
    for (key, value) in table {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::Table(inner) => flatten_params(&name, inner, out),
            other => {
                if let Some(value) = param_value(other) {
                    out.push((name, value));
                }
            }
        }
    }
}

pub(crate) fn param_value(value: &toml::Value) -> Option<ParamValue> {
    Some(match value {
        toml::Value::String(s) => ParamValue::from(s.as_str()),
        toml::Value::Integer(i) => ParamValue::Long(*i),
        toml::Value::Float(f) => ParamValue::Double(*f),
        toml::Value::Boolean(b) => ParamValue::Bool(*b),
        toml::Value::Datetime(d) => ParamValue::from(d.to_string()),
        toml::Value::Array(items) => ParamValue::from(
            items
                .iter()
                .map(param_value)
                .collect::<Option<Vec<_>>>()?,
        ),
        toml::Value::Table(_) => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::params::ConnectionParams;

    #[test]
    fn defaults_match_stock_parameters() {
        let store = ClientConfig::default().to_params(None).unwrap();
        assert_eq!(
            store.get_version(names::PROTOCOL_VERSION, HttpVersion::HTTP_1_0).unwrap(),
            HttpVersion::HTTP_1_1
        );
        assert!(store.get_bool(names::TCP_NODELAY, false).unwrap());
        assert_eq!(ConnectionParams::new(&store).connect_timeout().unwrap(), None);
        assert!(!store.is_set_locally(names::USER_AGENT));
    }

    #[test]
    fn connection_settings_become_params() {
        let mut config = ClientConfig::default();
        config.connection.connect_timeout_ms = 2500;
        config.connection.linger_secs = Some(3);
        config.connection.send_buffer_size = Some(16384);
        config.protocol.user_agent = Some("probe/1.0".to_string());

        let store = config.to_params(None).unwrap();
        let conn = ConnectionParams::new(&store);
        assert_eq!(conn.connect_timeout().unwrap(), Some(Duration::from_millis(2500)));
        assert_eq!(conn.linger().unwrap(), Some(Duration::from_secs(3)));
        assert_eq!(conn.send_buffer_size().unwrap(), Some(16384));
        assert_eq!(store.get_str(names::USER_AGENT, "").unwrap(), "probe/1.0");
    }

    #[test]
    fn params_table_is_flattened() {
        let config: ClientConfig = toml::from_str(
            r#"
            [params]
            "http.method.retry-count" = 3
            [params.http.auth]
            preemptive = true
            schemes = ["basic", "digest"]
            "#,
        )
        .unwrap();
        let store = config.to_params(None).unwrap();
        assert_eq!(store.get_int("http.method.retry-count", 0).unwrap(), 3);
        assert!(store.is_true("http.auth.preemptive").unwrap());
        let schemes = store.get("http.auth.schemes").unwrap();
        assert_eq!(schemes.as_list().map(<[_]>::len), Some(2));
    }

    #[test]
    fn store_chains_to_parent() {
        let parent = Arc::new(ParamStore::new());
        parent.set("parent.only", 1);
        let store = ClientConfig::default().to_params(Some(parent)).unwrap();
        assert_eq!(store.get_int("parent.only", 0).unwrap(), 1);
    }

    #[test]
    fn installs_custom_transports() {
        let config: ClientConfig = toml::from_str(
            r#"
            [[transports]]
            scheme = "myproto"
            default_port = 9000

            [[transports]]
            scheme = "secureproto"
            default_port = 9443
            secure = true
            "#,
        )
        .unwrap();
        let registry = TransportRegistry::new();
        let installed = config.install_transports(&registry).unwrap();
        assert_eq!(installed.len(), 2);
        assert!(!registry.resolve("myproto").unwrap().is_secure());
        let secure = registry.resolve("secureproto").unwrap();
        assert!(secure.is_secure());
        assert_eq!(secure.default_port(), 9443);
    }
}
