//! Durable storage for the access/refresh token pair.

use serde::{Deserialize, Serialize};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crate::error::ClientResult;

/// Tokens persisted between runs, under the fixed `accessToken` / `refreshToken` keys.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredTokens {
    #[serde(rename = "accessToken")]
    pub access: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh: Option<String>,
}

impl fmt::Debug for StoredTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredTokens")
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

/// Backing store for [`StoredTokens`]. Both tokens are always cleared together.
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Read the persisted tokens, if any.
    ///
    /// # Errors
    /// Returns an error if the store exists but cannot be read or parsed.
    fn load(&self) -> ClientResult<Option<StoredTokens>>;

    /// Replace the persisted tokens.
    ///
    /// # Errors
    /// Returns an error if the tokens cannot be written.
    fn save(&self, tokens: &StoredTokens) -> ClientResult<()>;

    /// Remove both tokens.
    ///
    /// # Errors
    /// Returns an error if the store cannot be removed.
    fn clear(&self) -> ClientResult<()>;
}

/// JSON file store, written with owner-only permissions.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> ClientResult<Option<StoredTokens>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, tokens: &StoredTokens) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec(tokens)?)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// In-memory store for tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Option<StoredTokens>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tokens(tokens: StoredTokens) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> ClientResult<Option<StoredTokens>> {
        Ok(self
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, tokens: &StoredTokens) -> ClientResult<()> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = Some(tokens.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.tokens.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tokens() -> StoredTokens {
        StoredTokens {
            access: "access-1".to_string(),
            refresh: Some("refresh-1".to_string()),
        }
    }

    #[test]
    fn test_file_store_persists_under_fixed_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("nested").join("tokens.json"));

        assert_eq!(store.load().unwrap(), None);
        store.save(&tokens()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"accessToken\":\"access-1\""));
        assert!(raw.contains("\"refreshToken\":\"refresh-1\""));
        assert_eq!(store.load().unwrap(), Some(tokens()));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        store.save(&tokens()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        store.save(&tokens()).unwrap();

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "not json").unwrap();

        let store = FileTokenStore::new(path);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryTokenStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(&tokens()).unwrap();
        assert_eq!(store.load().unwrap(), Some(tokens()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", tokens());
        assert!(!rendered.contains("access-1"));
        assert!(!rendered.contains("refresh-1"));
    }
}
