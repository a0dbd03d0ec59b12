// In-memory credential storage

use dashmap::DashMap;
use std::sync::Arc;

use super::CredentialStorage;
use crate::error::StorageError;

/// Thread-safe in-memory storage
///
/// Concurrent writers to the same key resolve last-write-wins.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CredentialStorage for MemoryStorage {
    fn is_available(&self) -> bool {
        true
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        assert!(storage.is_available());
        assert!(storage.is_empty());

        storage.set("token", "abc").unwrap();
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("abc"));

        storage.set("token", "xyz").unwrap();
        assert_eq!(storage.get("token").unwrap().as_deref(), Some("xyz"));
        assert_eq!(storage.len(), 1);

        storage.remove("token").unwrap();
        assert_eq!(storage.get("token").unwrap(), None);
    }

    #[test]
    fn test_clones_share_entries() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        other.set("refresh_token", "rt").unwrap();
        assert_eq!(storage.get("refresh_token").unwrap().as_deref(), Some("rt"));
    }
}
