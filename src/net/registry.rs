//! Scheme → transport registry.
//!
//! # Responsibilities
//! - Map scheme names to transport descriptors
//! - Supply `http` and `https` on first lookup when nobody registered them
//! - Resolve the transport for an absolute URI
//!
//! # Design Decisions
//! - Scheme names are case-insensitive and stored lowercase
//! - Lazy defaults go through the map's entry API: the first insert wins and
//!   every caller sees the same `Arc`
//! - A registration made before the first lookup replaces the default

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::net::error::TransportError;
use crate::net::plain::PlainSocketFactory;
use crate::net::tls::TlsSocketFactory;
use crate::net::transport::TransportDescriptor;
use crate::observability::metrics;
use crate::uri::Uri;

/// Default port for `http`.
pub const HTTP_PORT: u16 = 80;

/// Default port for `https`.
pub const HTTPS_PORT: u16 = 443;

static GLOBAL: LazyLock<TransportRegistry> = LazyLock::new(TransportRegistry::new);

/// Concurrent scheme → descriptor map.
#[derive(Debug, Default)]
pub struct TransportRegistry {
    transports: DashMap<String, Arc<TransportDescriptor>>,
}

impl TransportRegistry {
    /// An empty registry; `http` and `https` appear on first lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> &'static TransportRegistry {
        &GLOBAL
    }

    /// Register `descriptor` under `scheme`, replacing any previous entry.
    pub fn register(
        &self,
        scheme: &str,
        descriptor: TransportDescriptor,
    ) -> Result<Arc<TransportDescriptor>, TransportError> {
        if scheme.is_empty() {
            return Err(TransportError::InvalidArgument(
                "scheme may not be empty".to_string(),
            ));
        }
        let descriptor = Arc::new(descriptor);
        let previous = self
            .transports
            .insert(scheme.to_ascii_lowercase(), Arc::clone(&descriptor));
        tracing::debug!(
            scheme,
            transport = %descriptor,
            secure = descriptor.is_secure(),
            replaced = previous.is_some(),
            "Transport registered"
        );
        Ok(descriptor)
    }

    /// Remove the entry for `scheme`, if any.
    pub fn unregister(&self, scheme: &str) -> Option<Arc<TransportDescriptor>> {
        let removed = self
            .transports
            .remove(&scheme.to_ascii_lowercase())
            .map(|(_, descriptor)| descriptor);
        if removed.is_some() {
            tracing::debug!(scheme, "Transport unregistered");
        }
        removed
    }

    /// The descriptor for `scheme`.
    pub fn resolve(&self, scheme: &str) -> Result<Arc<TransportDescriptor>, TransportError> {
        if scheme.is_empty() {
            return Err(TransportError::InvalidArgument(
                "scheme may not be empty".to_string(),
            ));
        }
        let key = scheme.to_ascii_lowercase();
        if let Some(descriptor) = self.transports.get(&key) {
            return Ok(Arc::clone(descriptor.value()));
        }

        let builtin = match key.as_str() {
            "http" => TransportDescriptor::new("http", Arc::new(PlainSocketFactory), HTTP_PORT)?,
            "https" => {
                TransportDescriptor::new("https", Arc::new(TlsSocketFactory::new()), HTTPS_PORT)?
            }
            _ => return Err(TransportError::UnsupportedScheme(scheme.to_string())),
        };

        let entry = self.transports.entry(key).or_insert_with(|| {
            tracing::debug!(scheme = builtin.scheme(), "Registering built-in transport");
            metrics::record_lazy_registration(builtin.scheme());
            Arc::new(builtin)
        });
        Ok(Arc::clone(entry.value()))
    }

    /// The descriptor for the scheme of an absolute `uri`.
    pub fn resolve_uri(&self, uri: &Uri) -> Result<Arc<TransportDescriptor>, TransportError> {
        let scheme = uri.scheme().ok_or_else(|| {
            TransportError::InvalidArgument(format!("'{}' has no scheme", uri))
        })?;
        self.resolve(scheme)
    }

    pub fn is_registered(&self, scheme: &str) -> bool {
        self.transports.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Registered scheme names, in no particular order.
    pub fn schemes(&self) -> Vec<String> {
        self.transports.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::SocketFactory;

    #[test]
    fn starts_empty_and_materializes_defaults() {
        let registry = TransportRegistry::new();
        assert!(registry.schemes().is_empty());

        let http = registry.resolve("http").unwrap();
        assert_eq!(http.default_port(), 80);
        assert!(!http.is_secure());

        let https = registry.resolve("HTTPS").unwrap();
        assert_eq!(https.default_port(), 443);
        assert!(https.is_secure());

        assert!(Arc::ptr_eq(&http, &registry.resolve("http").unwrap()));
        assert!(registry.is_registered("http"));
    }

    #[test]
    fn unknown_scheme_is_unsupported() {
        let registry = TransportRegistry::new();
        assert!(matches!(
            registry.resolve("gopher"),
            Err(TransportError::UnsupportedScheme(s)) if s == "gopher"
        ));
    }

    #[test]
    fn registration_before_first_lookup_preempts_default() {
        let registry = TransportRegistry::new();
        let custom = TransportDescriptor::new("http", Arc::new(PlainSocketFactory), 8080).unwrap();
        registry.register("http", custom).unwrap();
        assert_eq!(registry.resolve("http").unwrap().default_port(), 8080);
    }

    #[test]
    fn register_overwrites_and_unregister_removes() {
        let registry = TransportRegistry::new();
        let factory: Arc<dyn SocketFactory> = Arc::new(PlainSocketFactory);
        registry
            .register("myproto", TransportDescriptor::new("myproto", Arc::clone(&factory), 9000).unwrap())
            .unwrap();
        registry
            .register("MyProto", TransportDescriptor::new("myproto", factory, 9001).unwrap())
            .unwrap();
        assert_eq!(registry.resolve("myproto").unwrap().default_port(), 9001);

        assert!(registry.unregister("myproto").is_some());
        assert!(registry.unregister("myproto").is_none());
        assert!(matches!(
            registry.resolve("myproto"),
            Err(TransportError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn rejects_empty_scheme() {
        let registry = TransportRegistry::new();
        let descriptor = TransportDescriptor::new("x", Arc::new(PlainSocketFactory), 1).unwrap();
        assert!(matches!(
            registry.register("", descriptor),
            Err(TransportError::InvalidArgument(_))
        ));
        assert!(matches!(
            registry.resolve(""),
            Err(TransportError::InvalidArgument(_))
        ));
    }

    #[test]
    fn resolves_uri_schemes() {
        let registry = TransportRegistry::new();
        let uri = Uri::parse("https://example.com/").unwrap();
        assert_eq!(registry.resolve_uri(&uri).unwrap().scheme(), "https");

        let relative = Uri::parse("/index.html").unwrap();
        assert!(matches!(
            registry.resolve_uri(&relative),
            Err(TransportError::InvalidArgument(_))
        ));
    }

    #[test]
    fn concurrent_first_lookups_agree() {
        let registry = Arc::new(TransportRegistry::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.resolve("https").unwrap())
            })
            .collect();
        let resolved: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(resolved.iter().all(|d| Arc::ptr_eq(d, &resolved[0])));
    }
}
