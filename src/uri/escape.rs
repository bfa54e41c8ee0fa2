//! Per-component percent-escaping.
//!
//! # Responsibilities
//! - Define which characters each URI component may carry unescaped
//! - Validate escaped input against those sets
//! - Escape decoded text and unescape raw text through a charset
//!
//! # Design Decisions
//! - Sets follow RFC 3986: user-info, host, path, query, fragment and
//!   opaque parts each get their own set
//! - Non-ASCII input in escaped form is rejected outright
//! - Hex digits of escapes are normalized to uppercase

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, CONTROLS};

use crate::uri::UriError;

/// Characters escaped in every component.
const COMMON: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

const QUERY_SET: &AsciiSet = COMMON;
const PATH_SET: &AsciiSet = &COMMON.add(b'?');
const USERINFO_SET: &AsciiSet = &PATH_SET.add(b'/').add(b'@');
const HOST_SET: &AsciiSet = &USERINFO_SET.add(b':');

/// The URI component a piece of text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    UserInfo,
    Host,
    Path,
    Query,
    Fragment,
    Opaque,
}

impl Component {
    fn name(self) -> &'static str {
        match self {
            Component::UserInfo => "user-info",
            Component::Host => "host",
            Component::Path => "path",
            Component::Query => "query",
            Component::Fragment => "fragment",
            Component::Opaque => "opaque part",
        }
    }

    /// Characters that must be escaped when encoding decoded text.
    fn encode_set(self) -> &'static AsciiSet {
        match self {
            Component::UserInfo => USERINFO_SET,
            Component::Host => HOST_SET,
            Component::Path => PATH_SET,
            Component::Query | Component::Fragment | Component::Opaque => QUERY_SET,
        }
    }

    /// Whether `b` may appear unescaped. Mirrors [`Component::encode_set`].
    fn allows(self, b: u8) -> bool {
        let unreserved_or_sub_delim = b.is_ascii_alphanumeric()
            || matches!(
                b,
                b'-' | b'.' | b'_' | b'~' | b'!' | b'$' | b'&' | b'\'' | b'(' | b')' | b'*'
                    | b'+' | b',' | b';' | b'='
            );
        unreserved_or_sub_delim
            || match self {
                Component::Query | Component::Fragment | Component::Opaque => {
                    matches!(b, b':' | b'@' | b'/' | b'?')
                }
                Component::Path => matches!(b, b':' | b'@' | b'/'),
                Component::UserInfo => b == b':',
                Component::Host => false,
            }
    }
}

/// Check that `raw` is a valid escaped value for `component`.
pub fn validate(raw: &str, component: Component) -> Result<(), String> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%' {
            let well_formed = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !well_formed {
                return Err(format!(
                    "'%' at offset {} in {} is not followed by two hex digits",
                    i,
                    component.name()
                ));
            }
            i += 3;
            continue;
        }
        if !b.is_ascii() {
            return Err(format!("non-ASCII character in escaped {}", component.name()));
        }
        if !component.allows(b) {
            return Err(format!(
                "character '{}' is not allowed in {}",
                char::from(b).escape_default(),
                component.name()
            ));
        }
        i += 1;
    }
    Ok(())
}

/// Validate an IPv6 (or future) literal, brackets included.
pub fn validate_ip_literal(raw: &str) -> Result<(), String> {
    let inner = raw
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| "IP literal must be enclosed in brackets".to_string())?;
    if inner.is_empty() {
        return Err("empty IP literal".to_string());
    }
    // zone identifiers arrive escaped, e.g. fe80::1%25eth0
    validate(inner, Component::UserInfo)
}

/// Uppercase the hex digits of every escape in an already validated string.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        out.push(c);
        if c == '%' {
            for _ in 0..2 {
                if let Some(hex) = chars.next() {
                    out.push(hex.to_ascii_uppercase());
                }
            }
        }
    }
    out
}

/// Escape decoded text for `component`, encoding it with `charset` first.
pub fn escape(
    decoded: &str,
    component: Component,
    charset: &'static Encoding,
) -> Result<String, UriError> {
    let bytes: Cow<'_, [u8]> = if charset == UTF_8 {
        Cow::Borrowed(decoded.as_bytes())
    } else {
        let (bytes, _, had_errors) = charset.encode(decoded);
        if had_errors {
            return Err(UriError::Unencodable {
                text: decoded.to_string(),
                charset: charset.name(),
            });
        }
        bytes
    };
    Ok(percent_encode(&bytes, component.encode_set()).to_string())
}

/// Unescape a validated raw value and decode the octets with `charset`.
pub fn unescape(raw: &str, charset: &'static Encoding) -> Result<String, UriError> {
    let octets: Cow<'_, [u8]> = percent_decode_str(raw).into();
    charset
        .decode_without_bom_handling_and_without_replacement(&octets)
        .map(Cow::into_owned)
        .ok_or_else(|| UriError::Malformed {
            input: raw.to_string(),
            reason: format!("escaped octets are not valid {}", charset.name()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    #[test]
    fn sets_match_allowed_characters() {
        let components = [
            Component::UserInfo,
            Component::Host,
            Component::Path,
            Component::Query,
            Component::Fragment,
            Component::Opaque,
        ];
        for component in components {
            for b in 0u8..0x80 {
                if b == b'%' {
                    continue;
                }
                let encoded = percent_encode(&[b], component.encode_set()).to_string();
                assert_eq!(
                    encoded.len() == 1,
                    component.allows(b),
                    "{:?} disagrees on {:?}",
                    component,
                    char::from(b)
                );
            }
        }
    }

    #[test]
    fn path_and_query_differ_on_question_mark() {
        assert_eq!(escape("a?b", Component::Path, UTF_8).unwrap(), "a%3Fb");
        assert_eq!(escape("a?b", Component::Query, UTF_8).unwrap(), "a?b");
        assert_eq!(escape("a@b", Component::UserInfo, UTF_8).unwrap(), "a%40b");
        assert_eq!(escape("a@b", Component::Path, UTF_8).unwrap(), "a@b");
    }

    #[test]
    fn escape_uses_charset() {
        assert_eq!(escape("é", Component::Path, UTF_8).unwrap(), "%C3%A9");
        assert_eq!(escape("é", Component::Path, WINDOWS_1252).unwrap(), "%E9");
        assert!(matches!(
            escape("日本", Component::Path, WINDOWS_1252),
            Err(UriError::Unencodable { .. })
        ));
    }

    #[test]
    fn unescape_uses_charset() {
        assert_eq!(unescape("%C3%A9", UTF_8).unwrap(), "é");
        assert_eq!(unescape("%E9", WINDOWS_1252).unwrap(), "é");
        assert!(unescape("%E9", UTF_8).is_err());
    }

    #[test]
    fn validate_rejects_bad_escapes() {
        assert!(validate("/a%2", Component::Path).is_err());
        assert!(validate("/a%zz", Component::Path).is_err());
        assert!(validate("/a b", Component::Path).is_err());
        assert!(validate("/a%20b", Component::Path).is_ok());
        assert!(validate("x?y", Component::Path).is_err());
        assert!(validate("x?y", Component::Query).is_ok());
    }

    #[test]
    fn normalize_uppercases_hex() {
        assert_eq!(normalize("/a%2fb%c3%a9"), "/a%2Fb%C3%A9");
        assert_eq!(normalize("/plain"), "/plain");
    }
}
