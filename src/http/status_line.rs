//! Status-Line parsing.
//!
//! ```text
//! Status-Line = HTTP-Version SP Status-Code SP Reason-Phrase CRLF
//! ```
//!
//! # Design Decisions
//! - Running out of input anywhere is a malformed line, never a panic or a
//!   partially filled value
//! - Several spaces between version and code are tolerated; the reason phrase
//!   starts after exactly one space and is kept verbatim
//! - Trailing CR/LF are stripped before parsing

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::http::status;
use crate::http::version::HttpVersion;

/// Error returned for a response preamble that is not a valid Status-Line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusLineError {
    #[error("malformed status line '{line}': {reason}")]
    Malformed { line: String, reason: &'static str },
}

/// A parsed Status-Line. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusLine {
    line: String,
    version: HttpVersion,
    code: u16,
    reason: String,
}

impl StatusLine {
    /// Parse a Status-Line.
    pub fn parse(raw: &str) -> Result<Self, StatusLineError> {
        let line = raw.trim_end_matches(['\r', '\n']);
        let malformed = |reason: &'static str| {
            tracing::trace!(line = %line, reason, "Rejected status line");
            StatusLineError::Malformed {
                line: line.to_string(),
                reason,
            }
        };

        let rest = line.trim_start();
        if rest.len() < 4 {
            return Err(malformed("ran out of input before HTTP-Version"));
        }
        if !rest.starts_with("HTTP") {
            return Err(malformed("does not start with HTTP"));
        }

        let version_end = rest[4..]
            .find(' ')
            .map(|i| i + 4)
            .ok_or_else(|| malformed("unable to find the end of HTTP-Version"))?;
        let version = HttpVersion::parse(&rest[..version_end].to_ascii_uppercase())
            .map_err(|_| malformed("invalid HTTP-Version"))?;

        let after_version = rest[version_end..].trim_start_matches(' ');
        let code_end = after_version.find(' ').unwrap_or(after_version.len());
        let code_token = &after_version[..code_end];
        if code_token.len() != 3 || !code_token.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed("status code is not three digits"));
        }
        let code = code_token
            .parse()
            .map_err(|_| malformed("status code is not three digits"))?;

        let reason = after_version.get(code_end + 1..).unwrap_or("");

        Ok(Self {
            line: line.to_string(),
            version,
            code,
            reason: reason.to_string(),
        })
    }

    /// Parse a Status-Line from raw response bytes (ISO-8859-1).
    pub fn from_bytes(raw: &[u8]) -> Result<Self, StatusLineError> {
        let line: String = raw.iter().map(|&b| char::from(b)).collect();
        Self::parse(&line)
    }

    /// True if `raw`, after leading whitespace, begins with `HTTP`.
    ///
    /// Lets a reader skip garbage preceding the real Status-Line.
    pub fn starts_with_http(raw: &[u8]) -> bool {
        let start = raw
            .iter()
            .position(|b| !b.is_ascii_whitespace())
            .unwrap_or(raw.len());
        raw[start..].starts_with(b"HTTP")
    }

    pub fn version(&self) -> HttpVersion {
        self.version
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    /// The reason phrase as sent by the server; may be empty.
    pub fn reason_phrase(&self) -> &str {
        &self.reason
    }

    /// The standard phrase for this status code, if it is a known one.
    pub fn standard_reason(&self) -> Option<&'static str> {
        status::reason_for(self.code)
    }

    /// The line without its terminator.
    pub fn as_str(&self) -> &str {
        &self.line
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

impl FromStr for StatusLine {
    type Err = StatusLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_malformed(raw: &str) -> bool {
        matches!(StatusLine::parse(raw), Err(StatusLineError::Malformed { .. }))
    }

    #[test]
    fn parses_simple_line() {
        let line = StatusLine::parse("HTTP/1.1 200 OK").unwrap();
        assert_eq!(line.version(), HttpVersion::HTTP_1_1);
        assert_eq!(line.code(), 200);
        assert_eq!(line.reason_phrase(), "OK");
        assert_eq!(line.standard_reason(), Some("OK"));
    }

    #[test]
    fn skips_leading_whitespace() {
        let line = StatusLine::parse(" HTTP/1.0 404 Not Found").unwrap();
        assert_eq!(line.version(), HttpVersion::HTTP_1_0);
        assert_eq!(line.code(), 404);
        assert_eq!(line.reason_phrase(), "Not Found");
    }

    #[test]
    fn missing_reason_is_empty() {
        let line = StatusLine::parse("HTTP/1.1 200").unwrap();
        assert_eq!(line.code(), 200);
        assert_eq!(line.reason_phrase(), "");

        let line = StatusLine::parse("HTTP/1.1 204 ").unwrap();
        assert_eq!(line.reason_phrase(), "");
    }

    #[test]
    fn strips_line_terminators() {
        let line = StatusLine::parse("HTTP/1.1 301 Moved Permanently\r\n").unwrap();
        assert_eq!(line.reason_phrase(), "Moved Permanently");
        assert_eq!(line.as_str(), "HTTP/1.1 301 Moved Permanently");
    }

    #[test]
    fn tolerates_extra_spaces_before_code() {
        let line = StatusLine::parse("HTTP/1.1   500 Internal  Error").unwrap();
        assert_eq!(line.code(), 500);
        assert_eq!(line.reason_phrase(), "Internal  Error");
    }

    #[test]
    fn rejects_garbage() {
        assert!(is_malformed("GARBAGE"));
        assert!(is_malformed(""));
        assert!(is_malformed("   "));
        assert!(is_malformed("HTT"));
        assert!(is_malformed("http/1.1 200 OK"));
    }

    #[test]
    fn rejects_truncated_lines() {
        assert!(is_malformed("HTTP"));
        assert!(is_malformed("HTTP/1.1"));
        assert!(is_malformed("HTTP/1.1 "));
        assert!(is_malformed("HTTP/1.1 20"));
    }

    #[test]
    fn rejects_bad_codes_and_versions() {
        assert!(is_malformed("HTTP/1.1 2000 OK"));
        assert!(is_malformed("HTTP/1.1 2x0 OK"));
        assert!(is_malformed("HTTP/1.1 200OK"));
        assert!(is_malformed("HTTP/x.y 200 OK"));
    }

    #[test]
    fn parses_bytes() {
        let line = StatusLine::from_bytes(b"HTTP/1.0 503 Service Unavailable\r\n").unwrap();
        assert_eq!(line.code(), 503);
        assert!(StatusLine::starts_with_http(b"\r\nHTTP/1.1 200 OK"));
        assert!(!StatusLine::starts_with_http(b"<html>"));
        assert!(!StatusLine::starts_with_http(b""));
    }
}
