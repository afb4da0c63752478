use std::{collections::BTreeMap, path::PathBuf, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;

use super::error::Result;

pub const FAVORITES_KEY: &str = "goonj-favorites";
pub const TOKEN_KEY: &str = "goonj-token";
pub const USER_KEY: &str = "goonj-user";

/// String key-value store persisted as a single JSON object on disk.
///
/// Every write flushes the whole map; the data set is a handful of keys.
#[derive(Clone)]
pub struct LocalStore {
    path: Option<PathBuf>,
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl LocalStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes)?,
            Ok(_) => BTreeMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), keys = entries.len(), "local store opened");

        Ok(Self {
            path: Some(path),
            entries: Arc::new(Mutex::new(entries)),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Writes `key`. The in-memory map only changes once the file write
    /// succeeds.
    pub async fn set(&self, key: &str, value: impl Into<String>) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.into());
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }

    /// Decodes a JSON-encoded value. An unreadable value counts as absent.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable stored value");
                None
            }
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, raw).await
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let store = LocalStore::open(&path).await.unwrap();
        store.set(TOKEN_KEY, "abc.def.ghi").await.unwrap();
        store
            .set_json(FAVORITES_KEY, &vec!["s1".to_string(), "s2".to_string()])
            .await
            .unwrap();

        let reopened = LocalStore::open(&path).await.unwrap();
        assert_eq!(reopened.get(TOKEN_KEY).await.as_deref(), Some("abc.def.ghi"));
        let favorites: Vec<String> = reopened.get_json(FAVORITES_KEY).await.unwrap();
        assert_eq!(favorites, vec!["s1", "s2"]);

        reopened.remove(TOKEN_KEY).await.unwrap();
        let again = LocalStore::open(&path).await.unwrap();
        assert!(again.get(TOKEN_KEY).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_value_reads_as_absent() {
        let store = LocalStore::in_memory();
        store.set(USER_KEY, "{not json").await.unwrap();
        let user: Option<crate::models::user::User> = store.get_json(USER_KEY).await;
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested");
        let store = LocalStore::open(nested.join("state.json")).await.unwrap();
        store.set(TOKEN_KEY, "old-token").await.unwrap();

        // A plain file where the parent directory should be makes every flush fail.
        std::fs::remove_dir_all(&nested).unwrap();
        std::fs::write(&nested, b"").unwrap();

        assert!(store.set(TOKEN_KEY, "new-token").await.is_err());
        assert_eq!(store.get(TOKEN_KEY).await.as_deref(), Some("old-token"));

        assert!(store.remove(TOKEN_KEY).await.is_err());
        assert_eq!(store.get(TOKEN_KEY).await.as_deref(), Some("old-token"));
    }
}
