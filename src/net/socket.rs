//! Sockets handed out by socket factories.
//!
//! # Responsibilities
//! - Present plain and TLS streams behind one `AsyncRead + AsyncWrite` type
//! - Track whether a TLS session owns the TCP stream beneath it
//! - Hand a still-open TCP stream back when a layered session ends
//!
//! # Design Decisions
//! - A TLS session always wraps a `LayeredStream`; its `auto_close` flag
//!   decides whether shutting the session down also shuts the TCP stream
//! - `close` consumes the socket so the stream cannot be used afterwards

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use pin_project::pin_project;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;

/// TCP stream beneath a TLS session.
#[pin_project]
#[derive(Debug)]
pub struct LayeredStream {
    #[pin]
    inner: TcpStream,
    auto_close: bool,
}

impl LayeredStream {
    pub(crate) fn new(inner: TcpStream, auto_close: bool) -> Self {
        Self { inner, auto_close }
    }

    pub fn get_ref(&self) -> &TcpStream {
        &self.inner
    }

    /// Whether shutting down the TLS session also shuts down the TCP stream.
    pub fn auto_close(&self) -> bool {
        self.auto_close
    }
}

impl AsyncRead for LayeredStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.project().inner.poll_read(cx, buf)
    }
}

impl AsyncWrite for LayeredStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.project().inner.poll_write(cx, buf)
    }

    fn poll_write_vectored(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[io::IoSlice<'_>],
    ) -> Poll<io::Result<usize>> {
        self.project().inner.poll_write_vectored(cx, bufs)
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.project();
        if *this.auto_close {
            this.inner.poll_shutdown(cx)
        } else {
            // the caller keeps using the TCP stream after the session ends
            this.inner.poll_flush(cx)
        }
    }
}

/// A connected socket, plain or secure.
#[pin_project(project = SocketProj)]
#[derive(Debug)]
pub enum Socket {
    Plain(#[pin] TcpStream),
    Secure(#[pin] Box<TlsStream<LayeredStream>>),
}

impl Socket {
    pub(crate) fn secure(stream: TlsStream<LayeredStream>) -> Self {
        Socket::Secure(Box::new(stream))
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Socket::Secure(_))
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.tcp().peer_addr()
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.tcp().local_addr()
    }

    /// The TCP stream at the bottom of the socket.
    pub fn tcp(&self) -> &TcpStream {
        match self {
            Socket::Plain(tcp) => tcp,
            Socket::Secure(tls) => tls.get_ref().0.get_ref(),
        }
    }

    /// Close the socket.
    ///
    /// A secure socket sends TLS close_notify first. When the session was
    /// layered with `auto_close = false` the underlying TCP stream is left
    /// open and returned; otherwise it is shut down and `None` is returned.
    pub async fn close(self) -> io::Result<Option<TcpStream>> {
        match self {
            Socket::Plain(mut tcp) => {
                shutdown_tcp(&mut tcp).await?;
                Ok(None)
            }
            Socket::Secure(mut tls) => {
                tls.shutdown().await?;
                let (layered, _) = (*tls).into_inner();
                if layered.auto_close {
                    Ok(None)
                } else {
                    tracing::trace!("TLS session closed, returning TCP stream to caller");
                    Ok(Some(layered.inner))
                }
            }
        }
    }
}

async fn shutdown_tcp(tcp: &mut TcpStream) -> io::Result<()> {
    match tcp.shutdown().await {
        Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
        _ => Ok(()),
    }
}

impl From<TcpStream> for Socket {
    fn from(tcp: TcpStream) -> Self {
        Socket::Plain(tcp)
    }
}

impl AsyncRead for Socket {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.project() {
            SocketProj::Plain(tcp) => tcp.poll_read(cx, buf),
            SocketProj::Secure(tls) => tls.poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Socket {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.project() {
            SocketProj::Plain(tcp) => tcp.poll_write(cx, buf),
            SocketProj::Secure(tls) => tls.poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.project() {
            SocketProj::Plain(tcp) => tcp.poll_flush(cx),
            SocketProj::Secure(tls) => tls.poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.project() {
            SocketProj::Plain(tcp) => tcp.poll_shutdown(cx),
            SocketProj::Secure(tls) => tls.poll_shutdown(cx),
        }
    }
}
