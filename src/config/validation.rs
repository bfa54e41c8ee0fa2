//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts >= 0, ports > 0, buffer sizes)
//! - Check names: protocol version, charsets, log filter, scheme names
//! - Detect duplicate transport schemes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;

use encoding_rs::Encoding;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ClientConfig;
use crate::http::HttpVersion;
use crate::uri::parse::is_valid_scheme;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let conn = &config.connection;
    for (field, millis) in [
        ("connection.connect_timeout_ms", conn.connect_timeout_ms),
        ("connection.so_timeout_ms", conn.so_timeout_ms),
    ] {
        if millis < 0 {
            errors.push(ValidationError::new(field, "timeout may not be negative"));
        }
    }
    if conn.linger_secs.is_some_and(|secs| secs < 0) {
        errors.push(ValidationError::new(
            "connection.linger_secs",
            "linger may not be negative; omit it to disable lingering",
        ));
    }
    for (field, size) in [
        ("connection.send_buffer_size", conn.send_buffer_size),
        ("connection.receive_buffer_size", conn.receive_buffer_size),
    ] {
        match size {
            Some(0) => errors.push(ValidationError::new(field, "buffer size must be positive")),
            Some(s) if i32::try_from(s).is_err() => {
                errors.push(ValidationError::new(field, "buffer size too large"))
            }
            _ => {}
        }
    }

    let proto = &config.protocol;
    if let Err(e) = HttpVersion::parse(&proto.version) {
        errors.push(ValidationError::new("protocol.version", e.to_string()));
    }
    for (field, label) in [
        ("protocol.element_charset", &proto.element_charset),
        ("protocol.content_charset", &proto.content_charset),
        ("protocol.uri_charset", &proto.uri_charset),
    ] {
        if Encoding::for_label(label.as_bytes()).is_none() {
            errors.push(ValidationError::new(
                field,
                format!("unknown charset '{}'", label),
            ));
        }
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.level) {
        errors.push(ValidationError::new("logging.level", e.to_string()));
    }

    let mut seen = HashSet::new();
    for (i, transport) in config.transports.iter().enumerate() {
        let field = |name: &str| format!("transports[{}].{}", i, name);
        if !is_valid_scheme(&transport.scheme) {
            errors.push(ValidationError::new(
                field("scheme"),
                format!("'{}' is not a valid scheme name", transport.scheme),
            ));
        } else if !seen.insert(transport.scheme.to_ascii_lowercase()) {
            errors.push(ValidationError::new(
                field("scheme"),
                format!("scheme '{}' is configured twice", transport.scheme),
            ));
        }
        if transport.default_port == 0 {
            errors.push(ValidationError::new(
                field("default_port"),
                "port must be positive",
            ));
        }
        if transport.ca_file.is_some() && !transport.secure {
            errors.push(ValidationError::new(
                field("ca_file"),
                "trust roots only apply to secure transports",
            ));
        }
    }

    check_params("params", &config.params, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        tracing::debug!(errors = errors.len(), "Configuration rejected");
        Err(errors)
    }
}

fn check_params(path: &str, table: &toml::Table, errors: &mut Vec<ValidationError>) {
    for (key, value) in table {
        let field = format!("{}.{}", path, key);
        match value {
            toml::Value::Table(inner) => check_params(&field, inner, errors),
            toml::Value::Array(items) if contains_table(items) => errors.push(ValidationError::new(
                field,
                "tables inside arrays cannot be expressed as parameters",
            )),
            _ => {}
        }
    }
}

fn contains_table(items: &[toml::Value]) -> bool {
    items.iter().any(|item| match item {
        toml::Value::Table(_) => true,
        toml::Value::Array(inner) => contains_table(inner),
        _ => false,
    })
}
