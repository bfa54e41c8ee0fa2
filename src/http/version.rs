//! HTTP protocol version.
//!
//! `HTTP-Version = "HTTP" "/" 1*DIGIT "." 1*DIGIT`
//!
//! Major and minor are separate integers: HTTP/2.4 < HTTP/2.13 < HTTP/12.3.
//! Leading zeros are ignored on input and never written.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error returned when a version token does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid HTTP version '{0}'")]
pub struct InvalidVersion(pub String);

/// An HTTP protocol version, ordered by major then minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HttpVersion {
    major: u32,
    minor: u32,
}

impl HttpVersion {
    pub const HTTP_0_9: HttpVersion = HttpVersion::new(0, 9);
    pub const HTTP_1_0: HttpVersion = HttpVersion::new(1, 0);
    pub const HTTP_1_1: HttpVersion = HttpVersion::new(1, 1);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    /// True if both versions share the same major number.
    pub fn is_comparable(&self, other: &HttpVersion) -> bool {
        self.major == other.major
    }

    /// Parse `HTTP/major.minor`. The `HTTP` prefix is matched exactly.
    pub fn parse(s: &str) -> Result<Self, InvalidVersion> {
        let invalid = || InvalidVersion(s.to_string());
        let numbers = s.strip_prefix("HTTP/").ok_or_else(invalid)?;
        let (major, minor) = numbers.split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: parse_number(major).ok_or_else(invalid)?,
            minor: parse_number(minor).ok_or_else(invalid)?,
        })
    }
}

fn parse_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // u32 parsing accepts leading zeros, so "01" is 1.
    digits.parse().ok()
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::HTTP_1_1
    }
}

impl fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/{}.{}", self.major, self.minor)
    }
}

impl FromStr for HttpVersion {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
