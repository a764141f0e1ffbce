//! Preference store port: persistent key-value storage for user preferences.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from preference storage.
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The backing store could not be read or written.
    #[error("Preference storage error: {0}")]
    Storage(String),

    /// A stored value could not be decoded.
    #[error("Preference serialization error: {0}")]
    Serialization(String),
}

/// String key-value storage for user preferences.
///
/// Values are opaque strings; callers own their encoding (JSON in practice).
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Read a value, `None` if unset.
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: String) -> Result<(), PreferenceError>;
}

/// Process-local preference store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct InMemoryPreferences {
    values: RwLock<HashMap<String, String>>,
}

impl InMemoryPreferences {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let values = self
            .values
            .read()
            .map_err(|e| PreferenceError::Storage(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PreferenceError> {
        let mut values = self
            .values
            .write()
            .map_err(|e| PreferenceError::Storage(e.to_string()))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}
