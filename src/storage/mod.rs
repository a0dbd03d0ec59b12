// Credential storage module
// Persistent key-value storage for the access/refresh token pair

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::sync::Arc;

use crate::error::StorageError;

/// Storage key for the access token
pub const TOKEN_KEY: &str = "token";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Client-side persistent key-value storage
///
/// Values are plain strings. Callers must check `is_available` before
/// reading or writing; a storage that is not available answers every
/// operation with `StorageError::Unavailable`.
pub trait CredentialStorage: Send + Sync {
    /// Whether this environment has persistent storage at all
    fn is_available(&self) -> bool;

    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Storage for environments without persistence (e.g. a server-side pass)
#[derive(Debug, Default, Clone, Copy)]
pub struct Unavailable;

impl CredentialStorage for Unavailable {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

/// Access/refresh token pair as read from storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPair {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl CredentialPair {
    pub fn is_present(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Typed view of the credential pair over any storage backend
#[derive(Clone)]
pub struct Credentials {
    storage: Arc<dyn CredentialStorage>,
}

impl Credentials {
    pub fn new(storage: Arc<dyn CredentialStorage>) -> Self {
        Self { storage }
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_available()
    }

    /// Stored access token; empty strings count as absent
    pub fn access_token(&self) -> Result<Option<String>, StorageError> {
        self.read(TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Result<Option<String>, StorageError> {
        self.read(REFRESH_TOKEN_KEY)
    }

    pub fn pair(&self) -> Result<CredentialPair, StorageError> {
        Ok(CredentialPair {
            access_token: self.access_token()?,
            refresh_token: self.refresh_token()?,
        })
    }

    pub fn store_access_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, token)
    }

    pub fn store_refresh_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(REFRESH_TOKEN_KEY, token)
    }

    /// Remove both tokens
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(REFRESH_TOKEN_KEY)?;
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.storage.get(key)?.filter(|v| !v.is_empty()))
    }
}

/// Short, log-safe prefix of a token
pub(crate) fn token_preview(token: &str) -> &str {
    let mut end = 8.min(token.len());
    while !token.is_char_boundary(end) {
        end -= 1;
    }
    &token[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_roundtrip() {
        let creds = Credentials::new(Arc::new(MemoryStorage::new()));
        assert_eq!(creds.pair().unwrap(), CredentialPair::default());

        creds.store_access_token("abc").unwrap();
        creds.store_refresh_token("rt-1").unwrap();

        let pair = creds.pair().unwrap();
        assert!(pair.is_present());
        assert_eq!(pair.access_token.as_deref(), Some("abc"));
        assert_eq!(pair.refresh_token.as_deref(), Some("rt-1"));

        creds.clear().unwrap();
        assert!(!creds.pair().unwrap().is_present());
    }

    #[test]
    fn test_empty_token_reads_as_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "").unwrap();

        let creds = Credentials::new(storage);
        assert_eq!(creds.access_token().unwrap(), None);
    }

    #[test]
    fn test_unavailable_storage() {
        let creds = Credentials::new(Arc::new(Unavailable));
        assert!(!creds.is_available());
        assert!(matches!(
            creds.access_token(),
            Err(StorageError::Unavailable)
        ));
        assert!(matches!(
            creds.store_access_token("abc"),
            Err(StorageError::Unavailable)
        ));
    }

    #[test]
    fn test_token_preview() {
        assert_eq!(token_preview("abcdefghijkl"), "abcdefgh");
        assert_eq!(token_preview("abc"), "abc");
        assert_eq!(token_preview(""), "");
    }
}
