//! Well-known parameter names.

/// HTTP version used for outgoing requests ([`crate::http::HttpVersion`]).
pub const PROTOCOL_VERSION: &str = "http.protocol.version";

/// Value of the `User-Agent` header.
pub const USER_AGENT: &str = "http.useragent";

/// Charset for request/status lines and headers.
pub const HTTP_ELEMENT_CHARSET: &str = "http.protocol.element-charset";

/// Default charset for entity bodies.
pub const HTTP_CONTENT_CHARSET: &str = "http.protocol.content-charset";

/// Charset used to escape and unescape URIs.
pub const HTTP_URI_CHARSET: &str = "http.protocol.uri-charset";

/// Connect timeout in milliseconds; `0` blocks indefinitely.
pub const CONNECTION_TIMEOUT: &str = "http.connection.timeout";

/// Read timeout in milliseconds; `0` blocks indefinitely.
pub const SO_TIMEOUT: &str = "http.socket.timeout";

/// Disable Nagle's algorithm.
pub const TCP_NODELAY: &str = "http.tcp.nodelay";

/// Linger time in seconds; negative disables lingering.
pub const SO_LINGER: &str = "http.socket.linger";

/// Send buffer size hint in bytes; non-positive leaves the OS default.
pub const SO_SNDBUF: &str = "http.socket.sendbuffer";

/// Receive buffer size hint in bytes; non-positive leaves the OS default.
pub const SO_RCVBUF: &str = "http.socket.receivebuffer";

/// Check pooled connections for staleness before reuse.
pub const STALE_CONNECTION_CHECK: &str = "http.connection.stalecheck";
