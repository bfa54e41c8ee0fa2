//! Resolving transports and connecting through the descriptors.

use std::sync::Arc;

use http_transport::{
    ParamStore, PlainSocketFactory, TransportDescriptor, TransportError, TransportRegistry, Uri,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

mod common;

#[test]
fn global_registry_supplies_http_and_https() {
    let registry = TransportRegistry::global();
    let http = registry.resolve("http").unwrap();
    let https = registry.resolve("https").unwrap();
    assert_eq!(http.to_string(), "http:80");
    assert_eq!(https.to_string(), "https:443");
    assert!(https.socket_factory().as_secure().is_some());
    assert!(http.socket_factory().as_secure().is_none());
}

#[tokio::test]
async fn uri_routes_to_custom_transport() {
    let addr = common::start_echo_server().await;
    let registry = TransportRegistry::new();
    registry
        .register(
            "echo",
            TransportDescriptor::new("echo", Arc::new(PlainSocketFactory), addr.port()).unwrap(),
        )
        .unwrap();

    let uri = Uri::parse("echo://127.0.0.1/ignored").unwrap();
    let descriptor = registry.resolve_uri(&uri).unwrap();
    let host = uri.host().unwrap().unwrap();
    let port = descriptor.resolve_port(uri.port());
    assert_eq!(port, addr.port());

    let mut socket = descriptor
        .socket_factory()
        .create_socket_with_params(host, port, None, &ParamStore::with_defaults())
        .await
        .unwrap();
    socket.write_all(b"via registry").await.unwrap();
    let mut buf = [0u8; 12];
    socket.read_exact(&mut buf).await.unwrap();
    assert_eq!(&buf, b"via registry");
}

#[tokio::test]
async fn https_uri_connects_with_registered_trust_roots() {
    let addr = common::start_tls_echo_server().await;
    let registry = TransportRegistry::new();
    registry
        .register(
            "https",
            TransportDescriptor::new("https", Arc::new(common::trusting_factory()), 443).unwrap(),
        )
        .unwrap();

    let uri = Uri::parse(&format!("https://localhost:{}/", addr.port())).unwrap();
    let descriptor = registry.resolve_uri(&uri).unwrap();
    assert!(descriptor.is_secure());

    let socket = descriptor
        .socket_factory()
        .connect("localhost", descriptor.resolve_port(uri.port()))
        .await
        .unwrap();
    assert!(socket.is_secure());
}

#[test]
fn unknown_scheme_is_reported() {
    let registry = TransportRegistry::new();
    let uri = Uri::parse("gopher://example.com/").unwrap();
    assert!(matches!(
        registry.resolve_uri(&uri),
        Err(TransportError::UnsupportedScheme(s)) if s == "gopher"
    ));
}
