//! Parent-delegating parameter store.
//!
//! # Responsibilities
//! - Hold locally set parameters
//! - Delegate misses to the parent chain
//! - Provide typed getters with caller defaults
//!
//! # Design Decisions
//! - One mutex per store; the lock is released before consulting the parent
//! - `Clone` copies the local map and keeps the same parent

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::http::HttpVersion;
use crate::params::value::{ParamError, ParamValue};

/// A collection of parameters that defers to a parent for unset names.
pub struct ParamStore {
    parent: Option<Arc<ParamStore>>,
    params: Mutex<HashMap<String, ParamValue>>,
}

impl ParamStore {
    /// Create a root store with no parent.
    pub fn new() -> Self {
        Self {
            parent: None,
            params: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store that defers to `parent` for unset parameters.
    pub fn with_parent(parent: Arc<ParamStore>) -> Self {
        Self {
            parent: Some(parent),
            params: Mutex::new(HashMap::new()),
        }
    }

    /// Create a store whose parent is the process-wide default root.
    pub fn with_defaults() -> Self {
        Self::with_parent(crate::params::default_params())
    }

    /// The store this one defers to.
    pub fn parent(&self) -> Option<&Arc<ParamStore>> {
        self.parent.as_ref()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, ParamValue>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.params.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Look a parameter up locally, then along the parent chain.
    pub fn get(&self, name: &str) -> Option<ParamValue> {
        let local = self.lock().get(name).cloned();
        match local {
            Some(value) => Some(value),
            None => self.parent.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    /// Assign a parameter in this store.
    pub fn set(&self, name: impl Into<String>, value: impl Into<ParamValue>) {
        let name = name.into();
        let value = value.into();
        tracing::debug!(parameter = %name, value = %value, "Set parameter");
        self.lock().insert(name, value);
    }

    /// Assign the same value to several parameters.
    pub fn set_many(&self, names: &[&str], value: impl Into<ParamValue>) {
        let value = value.into();
        let mut params = self.lock();
        for name in names {
            tracing::debug!(parameter = %name, value = %value, "Set parameter");
            params.insert((*name).to_string(), value.clone());
        }
    }

    /// Remove a locally set parameter, returning its value.
    pub fn remove(&self, name: &str) -> Option<ParamValue> {
        self.lock().remove(name)
    }

    /// Remove every locally set parameter. The parent is untouched.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// True if the parameter is set in this store itself.
    pub fn is_set_locally(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// True if the parameter is set here or anywhere up the chain.
    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of locally set parameters.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn get_typed<T>(
        &self,
        name: &str,
        default: T,
        expected: &'static str,
        convert: impl FnOnce(&ParamValue) -> Option<T>,
    ) -> Result<T, ParamError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => convert(&value).ok_or_else(|| ParamError::TypeMismatch {
                name: name.to_string(),
                expected,
                found: value.type_name(),
            }),
        }
    }

    pub fn get_int(&self, name: &str, default: i32) -> Result<i32, ParamError> {
        self.get_typed(name, default, "int", ParamValue::as_int)
    }

    pub fn get_long(&self, name: &str, default: i64) -> Result<i64, ParamError> {
        self.get_typed(name, default, "long", ParamValue::as_long)
    }

    pub fn get_double(&self, name: &str, default: f64) -> Result<f64, ParamError> {
        self.get_typed(name, default, "double", ParamValue::as_double)
    }

    pub fn get_bool(&self, name: &str, default: bool) -> Result<bool, ParamError> {
        self.get_typed(name, default, "bool", ParamValue::as_bool)
    }

    pub fn get_str(&self, name: &str, default: &str) -> Result<String, ParamError> {
        self.get_typed(name, default.to_string(), "string", |v| {
            v.as_str().map(str::to_string)
        })
    }

    pub fn get_version(&self, name: &str, default: HttpVersion) -> Result<HttpVersion, ParamError> {
        self.get_typed(name, default, "version", ParamValue::as_version)
    }

    /// Read a millisecond count as a [`Duration`]. Negative values are rejected.
    pub fn get_duration_millis(&self, name: &str, default: Duration) -> Result<Duration, ParamError> {
        match self.get(name) {
            None => Ok(default),
            Some(value) => {
                let millis = value.as_long().ok_or_else(|| ParamError::TypeMismatch {
                    name: name.to_string(),
                    expected: "long",
                    found: value.type_name(),
                })?;
                u64::try_from(millis)
                    .map(Duration::from_millis)
                    .map_err(|_| ParamError::InvalidArgument {
                        name: name.to_string(),
                        reason: format!("negative duration {}ms", millis),
                    })
            }
        }
    }

    /// True only if the parameter is set to `true`.
    pub fn is_true(&self, name: &str) -> Result<bool, ParamError> {
        self.get_bool(name, false)
    }

    /// True unless the parameter is set to `true`.
    pub fn is_false(&self, name: &str) -> Result<bool, ParamError> {
        self.get_bool(name, false).map(|v| !v)
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ParamStore {
    fn clone(&self) -> Self {
        Self {
            parent: self.parent.clone(),
            params: Mutex::new(self.lock().clone()),
        }
    }
}

impl fmt::Debug for ParamStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamStore")
            .field("params", &*self.lock())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
