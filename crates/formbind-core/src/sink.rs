//! Output sinks and the default request-scoped stores.

use std::any::Any;

use crate::error::SinkError;
use crate::upload::UploadedFile;

/// Mutable name-to-values mapping that downstream handling reads parameters from.
pub trait ParameterSink {
    /// Set the values for `name`, replacing any previous values.
    fn set_parameter(&mut self, name: &str, values: Vec<String>) -> Result<(), SinkError>;
}

/// Request-scoped key/value store for rich objects.
pub trait AttributeSink {
    /// Store `value` under `key`, replacing any previous value.
    fn set_attribute(&mut self, key: String, value: Box<dyn Any + Send + Sync>)
    -> Result<(), SinkError>;
}

/// Request parameters, in first-insertion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    inner: Vec<(String, Vec<String>)>,
}

impl RequestParameters {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the first value for a name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Get all values for a name; empty if absent.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
            .unwrap_or_default()
    }

    /// Check if a name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.iter().any(|(n, _)| n == name)
    }

    /// Iterate over all (name, values) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Returns the number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl ParameterSink for RequestParameters {
    fn set_parameter(&mut self, name: &str, values: Vec<String>) -> Result<(), SinkError> {
        match self.inner.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.inner.push((name.to_string(), values)),
        }
        Ok(())
    }
}

/// Request attributes keyed by string.
#[derive(Default)]
pub struct RequestAttributes {
    inner: Vec<(String, Box<dyn Any + Send + Sync>)>,
}

impl std::fmt::Debug for RequestAttributes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAttributes")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RequestAttributes {
    /// Create an empty attribute store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a typed value, replacing any previous value under `key`.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.put(key.into(), Box::new(value));
    }

    /// Get a typed value. `None` if absent or of a different type.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.inner
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, boxed)| boxed.downcast_ref::<T>())
    }

    /// Remove a value, returning it if it was of type `T`.
    pub fn remove<T: Any + Send + Sync>(&mut self, key: &str) -> Option<T> {
        let index = self.inner.iter().position(|(k, _)| k == key)?;
        let (_, boxed) = self.inner.remove(index);
        boxed.downcast::<T>().ok().map(|b| *b)
    }

    /// Check if a key is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.inner.iter().any(|(k, _)| k == key)
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inner.iter().map(|(k, _)| k.as_str())
    }

    /// All stored upload descriptors, in insertion order.
    #[must_use]
    pub fn uploaded_files(&self) -> Vec<&UploadedFile> {
        self.inner
            .iter()
            .filter_map(|(_, boxed)| boxed.downcast_ref::<UploadedFile>())
            .collect()
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn put(&mut self, key: String, value: Box<dyn Any + Send + Sync>) {
        match self.inner.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.inner.push((key, value)),
        }
    }
}

impl AttributeSink for RequestAttributes {
    fn set_attribute(
        &mut self,
        key: String,
        value: Box<dyn Any + Send + Sync>,
    ) -> Result<(), SinkError> {
        self.put(key, value);
        Ok(())
    }
}
