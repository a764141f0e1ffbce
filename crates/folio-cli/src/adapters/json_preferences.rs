//! Preference store persisted as a JSON object on disk.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use folio_core::{PreferenceError, PreferenceStore};

/// String map stored as pretty-printed JSON.
///
/// A missing file reads as an empty store. Writes go through a temporary
/// file and a rename.
#[derive(Debug)]
pub struct JsonFilePreferences {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFilePreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `<config_dir>/folio/preferences.json`, if the platform has a config
    /// directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("folio").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(storage(&self.path, &e)),
        };
        serde_json::from_str(&raw).map_err(|e| {
            PreferenceError::Serialization(format!("{}: {e}", self.path.display()))
        })
    }

    async fn store(&self, values: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| storage(parent, &e))?;
        }

        let raw = serde_json::to_string_pretty(values)
            .map_err(|e| PreferenceError::Serialization(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| storage(&tmp, &e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| storage(&self.path, &e))
    }
}

#[async_trait]
impl PreferenceStore for JsonFilePreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), PreferenceError> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.load().await?;
        values.insert(key.to_string(), value);
        self.store(&values).await?;
        debug!(key, path = %self.path.display(), "Preference saved");
        Ok(())
    }
}

fn storage(path: &Path, err: &std::io::Error) -> PreferenceError {
    PreferenceError::Storage(format!("{}: {err}", path.display()))
}
