//! Transport descriptors.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::net::error::TransportError;
use crate::net::factory::SocketFactory;

/// Binds a scheme to the factory that opens its connections and the port
/// used when a URI names none.
#[derive(Debug, Clone)]
pub struct TransportDescriptor {
    scheme: String,
    factory: Arc<dyn SocketFactory>,
    default_port: u16,
    secure: bool,
}

impl TransportDescriptor {
    /// The scheme is stored lowercase. The secure flag follows from the
    /// factory's capabilities.
    pub fn new(
        scheme: &str,
        factory: Arc<dyn SocketFactory>,
        default_port: u16,
    ) -> Result<Self, TransportError> {
        if scheme.is_empty() {
            return Err(TransportError::InvalidArgument(
                "scheme may not be empty".to_string(),
            ));
        }
        if default_port == 0 {
            return Err(TransportError::InvalidArgument(format!(
                "default port for '{}' must be positive",
                scheme
            )));
        }
        let secure = factory.as_secure().is_some();
        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            factory,
            default_port,
            secure,
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn socket_factory(&self) -> &Arc<dyn SocketFactory> {
        &self.factory
    }

    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// `port` when given, otherwise the default port.
    pub fn resolve_port(&self, port: Option<u16>) -> u16 {
        match port {
            Some(p) if p > 0 => p,
            _ => self.default_port,
        }
    }
}

impl fmt::Display for TransportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.default_port)
    }
}

impl PartialEq for TransportDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.default_port == other.default_port
            && *self.factory == *other.factory
    }
}

impl Eq for TransportDescriptor {}

impl Hash for TransportDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.scheme.hash(state);
        self.default_port.hash(state);
        self.factory.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{PlainSocketFactory, TlsSocketFactory};
    use std::collections::HashSet;

    fn plain() -> Arc<dyn SocketFactory> {
        Arc::new(PlainSocketFactory)
    }

    #[test]
    fn validates_inputs() {
        assert!(matches!(
            TransportDescriptor::new("", plain(), 80),
            Err(TransportError::InvalidArgument(_))
        ));
        assert!(matches!(
            TransportDescriptor::new("http", plain(), 0),
            Err(TransportError::InvalidArgument(_))
        ));
    }

    #[test]
    fn derives_secure_flag_from_factory() {
        let http = TransportDescriptor::new("HTTP", plain(), 80).unwrap();
        assert_eq!(http.scheme(), "http");
        assert!(!http.is_secure());

        let https = TransportDescriptor::new("https", Arc::new(TlsSocketFactory::new()), 443).unwrap();
        assert!(https.is_secure());
        assert_eq!(https.to_string(), "https:443");
    }

    #[test]
    fn resolves_ports() {
        let http = TransportDescriptor::new("http", plain(), 80).unwrap();
        assert_eq!(http.resolve_port(None), 80);
        assert_eq!(http.resolve_port(Some(8080)), 8080);
        assert_eq!(http.resolve_port(Some(0)), 80);
    }

    #[test]
    fn equality_is_structural() {
        let a = TransportDescriptor::new("http", plain(), 80).unwrap();
        let b = TransportDescriptor::new("http", plain(), 80).unwrap();
        let c = TransportDescriptor::new("http", plain(), 8080).unwrap();
        let d = TransportDescriptor::new("http", Arc::new(TlsSocketFactory::new()), 80).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
