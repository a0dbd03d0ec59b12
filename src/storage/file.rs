// File-backed credential storage
// Persists the key-value map as a JSON object

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::CredentialStorage;
use crate::error::StorageError;

/// Application directory name under the platform data dir
const APP_NAME: &str = "webook";

/// Credential file name
const CREDENTIALS_FILE: &str = "credentials.json";

/// JSON file storage with a write-through in-memory copy
///
/// A storage without a resolvable path is unavailable.
pub struct FileStorage {
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open storage at `path`, loading existing entries if the file exists
    ///
    /// A file that is not valid JSON is treated as empty; the next write
    /// replaces it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match load_entries(&path) {
            Ok(entries) => entries,
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Credential file is corrupt, starting with an empty session"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        tracing::debug!(
            path = %path.display(),
            keys = entries.len(),
            "Opened credential storage"
        );
        Ok(Self {
            path: Some(path),
            entries: Mutex::new(entries),
        })
    }

    /// Open storage in the platform data directory
    ///
    /// Falls back to an unavailable storage when the platform has no data
    /// directory.
    pub fn open_default() -> Result<Self, StorageError> {
        match default_path() {
            Some(path) => Self::open(path),
            None => {
                tracing::warn!("No data directory found, credential storage disabled");
                Ok(Self {
                    path: None,
                    entries: Mutex::new(BTreeMap::new()),
                })
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn with_entries<T>(
        &self,
        f: impl FnOnce(&Path, &mut BTreeMap<String, String>) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let path = self.path.as_deref().ok_or(StorageError::Unavailable)?;
        // A poisoned lock still holds a consistent map; keep using it
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(path, &mut entries)
    }
}

/// Default credential file location
pub fn default_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_NAME).join(CREDENTIALS_FILE))
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let contents = std::fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    Ok(serde_json::from_str(&contents)?)
}

fn save_entries(path: &Path, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(entries)?;
    std::fs::write(path, contents)?;
    Ok(())
}

impl CredentialStorage for FileStorage {
    fn is_available(&self) -> bool {
        self.path.is_some()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.with_entries(|_, entries| Ok(entries.get(key).cloned()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.with_entries(|path, entries| {
            entries.insert(key.to_string(), value.to_string());
            save_entries(path, entries)
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.with_entries(|path, entries| {
            if entries.remove(key).is_some() {
                save_entries(path, entries)?;
            }
            Ok(())
        })
    }
}
