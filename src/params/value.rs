//! Parameter values and coercion rules.
//!
//! # Responsibilities
//! - Represent arbitrarily typed parameter values
//! - Convert stored values to the type a getter asks for
//!
//! # Design Decisions
//! - Cloning a value never deep-copies heap data (strings, lists and opaque
//!   values are reference counted)
//! - Only lossless numeric coercions are accepted; strings are never parsed

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::http::HttpVersion;

/// Errors raised by typed parameter access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// The stored value cannot be converted to the requested type.
    #[error("parameter '{name}' holds a {found} value, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The stored value has the right type but is out of its legal range.
    #[error("parameter '{name}' is invalid: {reason}")]
    InvalidArgument { name: String, reason: String },
}

/// A single parameter value.
#[derive(Clone)]
pub enum ParamValue {
    Int(i32),
    Long(i64),
    Double(f64),
    Bool(bool),
    Str(Arc<str>),
    List(Arc<[ParamValue]>),
    Version(HttpVersion),
    /// Any other shared value, e.g. a handler object owned by a collaborator.
    Other(Arc<dyn Any + Send + Sync>),
}

impl ParamValue {
    /// Wrap an arbitrary value.
    pub fn other<T: Any + Send + Sync>(value: T) -> Self {
        ParamValue::Other(Arc::new(value))
    }

    /// Name of the stored type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Int(_) => "int",
            ParamValue::Long(_) => "long",
            ParamValue::Double(_) => "double",
            ParamValue::Bool(_) => "bool",
            ParamValue::Str(_) => "string",
            ParamValue::List(_) => "list",
            ParamValue::Version(_) => "version",
            ParamValue::Other(_) => "opaque",
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match *self {
            ParamValue::Int(v) => Some(v),
            ParamValue::Long(v) => i32::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match *self {
            ParamValue::Int(v) => Some(i64::from(v)),
            ParamValue::Long(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match *self {
            ParamValue::Int(v) => Some(f64::from(v)),
            ParamValue::Long(v) => Some(v as f64),
            ParamValue::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            ParamValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_version(&self) -> Option<HttpVersion> {
        match *self {
            ParamValue::Version(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow an opaque value as its concrete type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            ParamValue::Other(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => f.debug_tuple("Int").field(v).finish(),
            ParamValue::Long(v) => f.debug_tuple("Long").field(v).finish(),
            ParamValue::Double(v) => f.debug_tuple("Double").field(v).finish(),
            ParamValue::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            ParamValue::Str(v) => f.debug_tuple("Str").field(v).finish(),
            ParamValue::List(v) => f.debug_tuple("List").field(v).finish(),
            ParamValue::Version(v) => f.debug_tuple("Version").field(v).finish(),
            ParamValue::Other(_) => f.write_str("Other(..)"),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Long(v) => write!(f, "{}", v),
            ParamValue::Double(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Str(v) => f.write_str(v),
            ParamValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ParamValue::Version(v) => write!(f, "{}", v),
            ParamValue::Other(_) => f.write_str("<opaque>"),
        }
    }
}

/// Opaque values compare by identity, everything else by value.
impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ParamValue::Int(a), ParamValue::Int(b)) => a == b,
            (ParamValue::Long(a), ParamValue::Long(b)) => a == b,
            (ParamValue::Double(a), ParamValue::Double(b)) => a == b,
            (ParamValue::Bool(a), ParamValue::Bool(b)) => a == b,
            (ParamValue::Str(a), ParamValue::Str(b)) => a == b,
            (ParamValue::List(a), ParamValue::List(b)) => a == b,
            (ParamValue::Version(a), ParamValue::Version(b)) => a == b,
            (ParamValue::Other(a), ParamValue::Other(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Long(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Double(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Str(Arc::from(v))
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Str(Arc::from(v))
    }
}

impl From<HttpVersion> for ParamValue {
    fn from(v: HttpVersion) -> Self {
        ParamValue::Version(v)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(v: Vec<ParamValue>) -> Self {
        ParamValue::List(Arc::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercions_are_lossless() {
        assert_eq!(ParamValue::Int(7).as_long(), Some(7));
        assert_eq!(ParamValue::Long(7).as_int(), Some(7));
        assert_eq!(ParamValue::Long(i64::MAX).as_int(), None);
        assert_eq!(ParamValue::Int(3).as_double(), Some(3.0));
        assert_eq!(ParamValue::Double(3.5).as_int(), None);
    }

    #[test]
    fn strings_are_not_parsed() {
        let v = ParamValue::from("42");
        assert_eq!(v.as_int(), None);
        assert_eq!(v.as_bool(), None);
        assert_eq!(v.as_str(), Some("42"));
    }

    #[test]
    fn opaque_values_share_identity() {
        let v = ParamValue::other(vec![1u8, 2, 3]);
        let copy = v.clone();
        assert_eq!(v, copy);
        assert_eq!(copy.downcast_ref::<Vec<u8>>(), Some(&vec![1u8, 2, 3]));
        assert_ne!(v, ParamValue::other(vec![1u8, 2, 3]));
    }

    #[test]
    fn display_lists() {
        let v = ParamValue::from(vec![ParamValue::from("a"), ParamValue::Int(1)]);
        assert_eq!(v.to_string(), "[a, 1]");
    }
}
