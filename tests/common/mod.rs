//! Shared utilities for integration testing.
#![allow(dead_code)]

use std::io::BufReader;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use http_transport::TlsSocketFactory;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;

/// Path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Client factory trusting the test CA.
pub fn trusting_factory() -> TlsSocketFactory {
    TlsSocketFactory::from_root_pem_file(fixture("ca.pem")).unwrap()
}

/// Server config presenting the `localhost` certificate.
pub fn server_config() -> Arc<ServerConfig> {
    let cert_pem = std::fs::read(fixture("localhost.pem")).unwrap();
    let key_pem = std::fs::read(fixture("localhost.key")).unwrap();

    let certs: Vec<CertificateDer<'static>> =
        rustls_pemfile::certs(&mut BufReader::new(cert_pem.as_slice()))
            .collect::<Result<_, _>>()
            .unwrap();
    let key: PrivateKeyDer<'static> =
        rustls_pemfile::private_key(&mut BufReader::new(key_pem.as_slice()))
            .unwrap()
            .unwrap();

    Arc::new(
        ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .unwrap(),
    )
}

/// Start a plain TCP echo server.
pub async fn start_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut reader, mut writer) = socket.split();
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
            });
        }
    });
    addr
}

/// Start a server that accepts connections and never writes to them.
pub async fn start_silent_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    addr
}

/// Start a TLS echo server on `127.0.0.1`.
pub async fn start_tls_echo_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let acceptor = TlsAcceptor::from(server_config());

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(tls) = acceptor.accept(socket).await else {
                    return;
                };
                let (mut reader, mut writer) = tokio::io::split(tls);
                let _ = tokio::io::copy(&mut reader, &mut writer).await;
            });
        }
    });
    addr
}

/// Server for one layered session.
///
/// Accepts a TCP connection, runs TLS over it, echoes the first five bytes,
/// waits for the client to end the session, then writes `raw-ok` on the bare
/// TCP stream. The task yields whatever raw bytes the client sends after that.
pub async fn start_layering_server() -> (SocketAddr, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let acceptor = TlsAcceptor::from(server_config());

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let mut tls = acceptor.accept(socket).await.unwrap();

        let mut hello = [0u8; 5];
        tls.read_exact(&mut hello).await.unwrap();
        tls.write_all(&hello).await.unwrap();
        tls.flush().await.unwrap();

        let mut rest = Vec::new();
        tls.read_to_end(&mut rest).await.unwrap();

        let (mut tcp, _) = tls.into_inner();
        let _ = tcp.write_all(b"raw-ok").await;

        let mut raw = Vec::new();
        let _ = tcp.read_to_end(&mut raw).await;
        raw
    });
    (addr, handle)
}
