//! URI model.
//!
//! # Data Flow
//! ```text
//! input text (escaped or not) + charset
//!     → parse.rs  (split on structural delimiters)
//!     → escape.rs (validate escaped pieces, or escape decoded pieces)
//!     → Uri       (normalized escaped form, lazily decoded components)
//!     → resolve.rs (join relative references against a base)
//! ```
//!
//! # Design Decisions
//! - The escaped form is authoritative; it is validated once at construction
//! - Each component remembers which form it holds, so text is never escaped
//!   or unescaped twice
//! - Decoded components are computed on first access and memoized
//! - Equality, hashing and ordering use the normalized escaped string
//!   (lowercase scheme, uppercase escape hex digits)

pub mod escape;
pub mod parse;
pub mod resolve;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use encoding_rs::Encoding;
use thiserror::Error;

use self::escape::Component;
use self::parse::Port;

/// Charset used when none is given.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Errors raised while building or decoding a URI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    /// The input does not match the URI grammar.
    #[error("malformed URI '{input}': {reason}")]
    Malformed { input: String, reason: String },

    /// The charset label is not known.
    #[error("unsupported charset '{0}'")]
    UnsupportedCharset(String),

    /// Decoded text contains characters the charset cannot represent.
    #[error("'{text}' cannot be encoded in {charset}")]
    Unencodable { text: String, charset: &'static str },

    /// The operation needs an absolute, hierarchical URI.
    #[error("'{0}' is not an absolute hierarchical URI")]
    NotHierarchical(String),
}

impl UriError {
    fn malformed(input: &str, reason: impl Into<String>) -> Self {
        UriError::Malformed {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// One component in escaped form, with its decoded form memoized.
#[derive(Debug, Clone)]
struct Part {
    raw: String,
    decoded: OnceLock<String>,
}

impl Part {
    fn escaped(raw: String) -> Self {
        Self {
            raw,
            decoded: OnceLock::new(),
        }
    }

    fn with_decoded(raw: String, decoded: String) -> Self {
        Self {
            raw,
            decoded: OnceLock::from(decoded),
        }
    }

    fn decoded(&self, charset: &'static Encoding) -> Result<&str, UriError> {
        if let Some(decoded) = self.decoded.get() {
            return Ok(decoded);
        }
        let decoded = escape::unescape(&self.raw, charset)?;
        Ok(self.decoded.get_or_init(|| decoded))
    }
}

/// A URI reference (RFC 3986) kept in escaped form.
#[derive(Clone)]
pub struct Uri {
    scheme: Option<String>,
    authority: Option<String>,
    userinfo: Option<Part>,
    host: Option<Part>,
    port: Port,
    path: Part,
    query: Option<Part>,
    fragment: Option<Part>,
    opaque: bool,
    charset: &'static Encoding,
    serialized: String,
}

impl Uri {
    /// Build a URI from `input`.
    ///
    /// When `escaped` is true the input must already be a valid escaped URI;
    /// otherwise it is treated as decoded text and each component is escaped
    /// with `charset`.
    pub fn new(input: &str, escaped: bool, charset: &str) -> Result<Self, UriError> {
        let charset = Encoding::for_label(charset.as_bytes())
            .ok_or_else(|| UriError::UnsupportedCharset(charset.to_string()))?;
        let input = input.trim();
        let pieces = parse::split(input).map_err(|reason| UriError::malformed(input, reason))?;

        let part = |text: &str, component: Component| -> Result<Part, UriError> {
            if escaped {
                escape::validate(text, component)
                    .map_err(|reason| UriError::malformed(input, reason))?;
                Ok(Part::escaped(escape::normalize(text)))
            } else {
                let raw = escape::escape(text, component, charset)?;
                Ok(Part::with_decoded(raw, text.to_string()))
            }
        };

        let (userinfo, host, port) = match pieces.authority {
            Some(authority) => {
                let a = parse::split_authority(authority)
                    .map_err(|reason| UriError::malformed(input, reason))?;
                let host = if a.host.starts_with('[') {
                    escape::validate_ip_literal(a.host)
                        .map_err(|reason| UriError::malformed(input, reason))?;
                    Part::with_decoded(escape::normalize(a.host), a.host.to_string())
                } else {
                    part(a.host, Component::Host)?
                };
                let userinfo = a
                    .userinfo
                    .map(|u| part(u, Component::UserInfo))
                    .transpose()?;
                (userinfo, Some(host), a.port)
            }
            None => (None, None, Port::Absent),
        };

        let path_component = if pieces.opaque {
            Component::Opaque
        } else {
            Component::Path
        };
        let path = part(pieces.path, path_component)?;
        let query = pieces.query.map(|q| part(q, Component::Query)).transpose()?;
        let fragment = pieces
            .fragment
            .map(|f| part(f, Component::Fragment))
            .transpose()?;

        Ok(Self::assemble(
            pieces.scheme.map(str::to_ascii_lowercase),
            userinfo,
            host,
            port,
            path,
            query,
            fragment,
            pieces.opaque,
            charset,
        ))
    }

    /// Parse an escaped URI using [`DEFAULT_CHARSET`].
    pub fn parse(escaped: &str) -> Result<Self, UriError> {
        Self::new(escaped, true, DEFAULT_CHARSET)
    }

    /// Build a URI from decoded text using [`DEFAULT_CHARSET`].
    pub fn from_unescaped(text: &str) -> Result<Self, UriError> {
        Self::new(text, false, DEFAULT_CHARSET)
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        scheme: Option<String>,
        userinfo: Option<Part>,
        host: Option<Part>,
        port: Port,
        path: Part,
        query: Option<Part>,
        fragment: Option<Part>,
        opaque: bool,
        charset: &'static Encoding,
    ) -> Self {
        let authority = host.as_ref().map(|host| {
            let mut authority = String::new();
            if let Some(userinfo) = &userinfo {
                authority.push_str(&userinfo.raw);
                authority.push('@');
            }
            authority.push_str(&host.raw);
            port.write_to(&mut authority);
            authority
        });

        let mut serialized = String::new();
        if let Some(scheme) = &scheme {
            serialized.push_str(scheme);
            serialized.push(':');
        }
        if let Some(authority) = &authority {
            serialized.push_str("//");
            serialized.push_str(authority);
        }
        serialized.push_str(&path.raw);
        if let Some(query) = &query {
            serialized.push('?');
            serialized.push_str(&query.raw);
        }
        if let Some(fragment) = &fragment {
            serialized.push('#');
            serialized.push_str(&fragment.raw);
        }

        Self {
            scheme,
            authority,
            userinfo,
            host,
            port,
            path,
            query,
            fragment,
            opaque,
            charset,
            serialized,
        }
    }

    /// Lowercase scheme, if the URI is absolute.
    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn is_absolute(&self) -> bool {
        self.scheme.is_some()
    }

    pub fn is_relative(&self) -> bool {
        self.scheme.is_none()
    }

    /// True for absolute URIs whose scheme-specific part does not start with `/`.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    pub fn has_authority(&self) -> bool {
        self.authority.is_some()
    }

    pub fn raw_authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    pub fn raw_userinfo(&self) -> Option<&str> {
        self.userinfo.as_ref().map(|p| p.raw.as_str())
    }

    pub fn userinfo(&self) -> Result<Option<&str>, UriError> {
        self.userinfo
            .as_ref()
            .map(|p| p.decoded(self.charset))
            .transpose()
    }

    pub fn raw_host(&self) -> Option<&str> {
        self.host.as_ref().map(|p| p.raw.as_str())
    }

    pub fn host(&self) -> Result<Option<&str>, UriError> {
        self.host.as_ref().map(|p| p.decoded(self.charset)).transpose()
    }

    /// Explicit port; `None` means the scheme's default applies.
    pub fn port(&self) -> Option<u16> {
        self.port.number()
    }

    /// Escaped path. For opaque URIs this is the whole opaque part.
    pub fn raw_path(&self) -> &str {
        &self.path.raw
    }

    pub fn path(&self) -> Result<&str, UriError> {
        self.path.decoded(self.charset)
    }

    pub fn raw_query(&self) -> Option<&str> {
        self.query.as_ref().map(|p| p.raw.as_str())
    }

    pub fn query(&self) -> Result<Option<&str>, UriError> {
        self.query.as_ref().map(|p| p.decoded(self.charset)).transpose()
    }

    pub fn raw_fragment(&self) -> Option<&str> {
        self.fragment.as_ref().map(|p| p.raw.as_str())
    }

    pub fn fragment(&self) -> Result<Option<&str>, UriError> {
        self.fragment
            .as_ref()
            .map(|p| p.decoded(self.charset))
            .transpose()
    }

    /// Escaped path and query as sent in a request line. An empty
    /// hierarchical path becomes `/`.
    pub fn raw_path_query(&self) -> String {
        let mut out = if self.path.raw.is_empty() && !self.opaque {
            "/".to_string()
        } else {
            self.path.raw.clone()
        };
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(&query.raw);
        }
        out
    }

    /// Name of the charset used for escaping.
    pub fn charset(&self) -> &'static str {
        self.charset.name()
    }

    /// The normalized escaped form.
    pub fn as_str(&self) -> &str {
        &self.serialized
    }

    /// The URI with every component decoded.
    pub fn to_unescaped_string(&self) -> Result<String, UriError> {
        let mut out = String::new();
        if let Some(scheme) = &self.scheme {
            out.push_str(scheme);
            out.push(':');
        }
        if let Some(host) = self.host()? {
            out.push_str("//");
            if let Some(userinfo) = self.userinfo()? {
                out.push_str(userinfo);
                out.push('@');
            }
            out.push_str(host);
            self.port.write_to(&mut out);
        }
        out.push_str(self.path()?);
        if let Some(query) = self.query()? {
            out.push('?');
            out.push_str(query);
        }
        if let Some(fragment) = self.fragment()? {
            out.push('#');
            out.push_str(fragment);
        }
        Ok(out)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized)
    }
}

impl fmt::Debug for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Uri").field(&self.serialized).finish()
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.serialized == other.serialized
    }
}

impl Eq for Uri {}

impl Hash for Uri {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialized.hash(state);
    }
}

impl PartialOrd for Uri {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Uri {
    fn cmp(&self, other: &Self) -> Ordering {
        self.serialized.cmp(&other.serialized)
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<url::Url> for Uri {
    type Error = UriError;

    fn try_from(url: url::Url) -> Result<Self, Self::Error> {
        Self::parse(url.as_str())
    }
}

impl TryFrom<&Uri> for url::Url {
    type Error = url::ParseError;

    fn try_from(uri: &Uri) -> Result<Self, Self::Error> {
        url::Url::parse(uri.as_str())
    }
}
