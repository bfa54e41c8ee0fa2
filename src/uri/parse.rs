//! Structural splitting of a URI reference.
//!
//! ```text
//! URI-reference = [ scheme ":" ] hier-part [ "?" query ] [ "#" fragment ]
//! hier-part     = "//" authority path-abempty | path
//! opaque-part   = scheme ":" <anything not starting with "/">
//! authority     = [ userinfo "@" ] host [ ":" port ]
//! ```
//!
//! Only delimiters are interpreted here; component contents are validated
//! or escaped by the caller.

/// Borrowed pieces of a URI reference.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Pieces<'a> {
    pub scheme: Option<&'a str>,
    pub authority: Option<&'a str>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
    pub opaque: bool,
}

/// Borrowed pieces of an authority.
#[derive(Debug, PartialEq, Eq)]
pub struct AuthorityPieces<'a> {
    pub userinfo: Option<&'a str>,
    pub host: &'a str,
    pub port: Port,
}

/// Port subcomponent as written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Port {
    #[default]
    Absent,
    /// A `:` with no digits after it.
    Empty,
    Number(u16),
}

impl Port {
    pub fn number(self) -> Option<u16> {
        match self {
            Port::Number(port) => Some(port),
            Port::Absent | Port::Empty => None,
        }
    }

    /// Append `:port` (or a bare `:`) to `out`.
    pub fn write_to(self, out: &mut String) {
        match self {
            Port::Absent => {}
            Port::Empty => out.push(':'),
            Port::Number(port) => {
                out.push(':');
                out.push_str(&port.to_string());
            }
        }
    }
}

pub(crate) fn is_valid_scheme(s: &str) -> bool {
    let mut bytes = s.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic())
        && bytes.all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'-' | b'.'))
}

/// Split a URI reference into its top-level pieces.
pub fn split(input: &str) -> Result<Pieces<'_>, &'static str> {
    let (before_fragment, fragment) = match input.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (input, None),
    };

    let (scheme, rest) = match before_fragment.find([':', '/', '?']) {
        Some(i) if before_fragment.as_bytes()[i] == b':' => {
            let candidate = &before_fragment[..i];
            if candidate.is_empty() {
                return Err("missing scheme before ':'");
            }
            if !is_valid_scheme(candidate) {
                return Err("invalid scheme name");
            }
            (Some(candidate), &before_fragment[i + 1..])
        }
        _ => (None, before_fragment),
    };

    if scheme.is_some() && !rest.starts_with('/') {
        if rest.is_empty() {
            return Err("empty scheme-specific part");
        }
        return Ok(Pieces {
            scheme,
            path: rest,
            fragment,
            opaque: true,
            ..Pieces::default()
        });
    }

    let (authority, after_authority) = match rest.strip_prefix("//") {
        Some(stripped) => {
            let end = stripped.find(['/', '?']).unwrap_or(stripped.len());
            (Some(&stripped[..end]), &stripped[end..])
        }
        None => (None, rest),
    };

    let (path, query) = match after_authority.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (after_authority, None),
    };

    Ok(Pieces {
        scheme,
        authority,
        path,
        query,
        fragment,
        opaque: false,
    })
}

/// Split an authority into user-info, host and port.
pub fn split_authority(authority: &str) -> Result<AuthorityPieces<'_>, &'static str> {
    let (userinfo, host_port) = match authority.rfind('@') {
        Some(i) => (Some(&authority[..i]), &authority[i + 1..]),
        None => (None, authority),
    };

    let (host, port) = if host_port.starts_with('[') {
        let end = host_port.find(']').ok_or("unterminated IPv6 literal")?;
        let tail = &host_port[end + 1..];
        let port = match tail.strip_prefix(':') {
            Some(port) => Some(port),
            None if tail.is_empty() => None,
            None => return Err("unexpected characters after IPv6 literal"),
        };
        (&host_port[..=end], port)
    } else {
        match host_port.rfind(':') {
            Some(i) => (&host_port[..i], Some(&host_port[i + 1..])),
            None => (host_port, None),
        }
    };

    let port = match port {
        None => Port::Absent,
        Some("") => Port::Empty,
        Some(digits) => {
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err("port is not numeric");
            }
            Port::Number(digits.parse::<u16>().map_err(|_| "port is out of range")?)
        }
    };

    Ok(AuthorityPieces {
        userinfo,
        host,
        port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_full_reference() {
        let p = split("http://user@host:8080/a/b?x=1#frag").unwrap();
        assert_eq!(p.scheme, Some("http"));
        assert_eq!(p.authority, Some("user@host:8080"));
        assert_eq!(p.path, "/a/b");
        assert_eq!(p.query, Some("x=1"));
        assert_eq!(p.fragment, Some("frag"));
        assert!(!p.opaque);
    }

    #[test]
    fn detects_opaque_and_relative() {
        let p = split("mailto:someone@example.com").unwrap();
        assert!(p.opaque);
        assert_eq!(p.path, "someone@example.com");

        let p = split("../a:b?q").unwrap();
        assert_eq!(p.scheme, None);
        assert_eq!(p.path, "../a:b");
        assert_eq!(p.query, Some("q"));
    }

    #[test]
    fn question_mark_ends_authority() {
        let p = split("http://host?x").unwrap();
        assert_eq!(p.authority, Some("host"));
        assert_eq!(p.path, "");
        assert_eq!(p.query, Some("x"));
    }

    #[test]
    fn rejects_bad_schemes() {
        assert!(split(":nothing").is_err());
        assert!(split("1http://host").is_err());
        assert!(split("http:").is_err());
    }

    #[test]
    fn splits_authority() {
        let a = split_authority("u:p@example.com:81").unwrap();
        assert_eq!(a.userinfo, Some("u:p"));
        assert_eq!(a.host, "example.com");
        assert_eq!(a.port, Port::Number(81));

        let a = split_authority("[::1]:8443").unwrap();
        assert_eq!(a.host, "[::1]");
        assert_eq!(a.port, Port::Number(8443));

        let a = split_authority("example.com:").unwrap();
        assert_eq!(a.port, Port::Empty);
        assert_eq!(a.port.number(), None);

        let a = split_authority("[::1]:").unwrap();
        assert_eq!(a.port, Port::Empty);

        assert_eq!(split_authority("example.com").unwrap().port, Port::Absent);
    }

    #[test]
    fn rejects_bad_ports() {
        assert!(split_authority("host:http").is_err());
        assert!(split_authority("host:70000").is_err());
        assert!(split_authority("[::1").is_err());
        assert!(split_authority("[::1]x").is_err());
    }
}
