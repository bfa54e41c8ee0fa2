//! Loading a configuration file into parameters and transports.

use std::sync::Arc;
use std::time::Duration;

use http_transport::config::{load_config, ConfigError};
use http_transport::params::{default_params, names, ConnectionParams};
use http_transport::{HttpVersion, TransportRegistry};

mod common;

fn write_config(name: &str, content: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
        "http-transport-{}-{}.toml",
        name,
        std::process::id()
    ));
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn loads_file_into_params_and_registry() {
    let ca = common::fixture("ca.pem");
    let path = write_config(
        "full",
        &format!(
            r#"
            [connection]
            connect_timeout_ms = 1500
            tcp_nodelay = false

            [protocol]
            version = "HTTP/1.0"
            user_agent = "config-test/1.0"

            [logging]
            level = "http_transport=debug"

            [[transports]]
            scheme = "tunnel"
            default_port = 8443
            secure = true
            ca_file = "{}"

            [params.http.protocol]
            expect-continue = true
            "#,
            ca.display()
        ),
    );

    let config = load_config(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    let store = config.to_params(Some(default_params())).unwrap();
    let conn = ConnectionParams::new(&store);
    assert_eq!(conn.connect_timeout().unwrap(), Some(Duration::from_millis(1500)));
    assert!(!conn.tcp_nodelay().unwrap());
    assert_eq!(
        store.get_version(names::PROTOCOL_VERSION, HttpVersion::HTTP_1_1).unwrap(),
        HttpVersion::HTTP_1_0
    );
    assert!(store.is_true("http.protocol.expect-continue").unwrap());
    // falls through to the default root
    assert_eq!(store.get_str(names::HTTP_URI_CHARSET, "").unwrap(), "UTF-8");
    assert!(Arc::ptr_eq(store.parent().unwrap(), &default_params()));

    let registry = TransportRegistry::new();
    config.install_transports(&registry).unwrap();
    let tunnel = registry.resolve("tunnel").unwrap();
    assert!(tunnel.is_secure());
    assert_eq!(tunnel.default_port(), 8443);
}

#[test]
fn invalid_file_reports_every_problem() {
    let path = write_config(
        "invalid",
        r#"
        [connection]
        connect_timeout_ms = -1

        [[transports]]
        scheme = ""
        default_port = 0
        "#,
    );
    let result = load_config(&path);
    std::fs::remove_file(&path).unwrap();

    match result {
        Err(ConfigError::Validation(errors)) => {
            let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
            assert_eq!(
                fields,
                vec![
                    "connection.connect_timeout_ms",
                    "transports[0].scheme",
                    "transports[0].default_port",
                ]
            );
        }
        other => panic!("expected validation errors, got {:?}", other),
    }
}
