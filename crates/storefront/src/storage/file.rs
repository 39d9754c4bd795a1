//! File-backed storage: one `<key>.json` file per key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{LocalStorage, StorageError, validate_key};

/// Key/value store persisted under a directory.
///
/// Writes go to a temporary file that is renamed into place, so a crash
/// mid-write never leaves a truncated value behind.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The backing directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl LocalStorage for FileStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(key, bytes = value.len(), "Stored item");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_storage() -> FileStorage {
        FileStorage::new(std::env::temp_dir().join(format!("kedai-storage-{}", uuid::Uuid::new_v4())))
    }

    #[tokio::test]
    async fn test_roundtrip_through_disk() {
        let storage = temp_storage();
        assert!(storage.get_item("cart").await.unwrap().is_none());

        storage.set_item("cart", r#"[{"_id":"p1"}]"#).await.unwrap();
        assert!(storage.dir().join("cart.json").exists());

        // A fresh handle on the same directory sees the value
        let reopened = FileStorage::new(storage.dir());
        assert_eq!(
            reopened.get_item("cart").await.unwrap().as_deref(),
            Some(r#"[{"_id":"p1"}]"#)
        );

        storage.remove_item("cart").await.unwrap();
        storage.remove_item("cart").await.unwrap();
        assert!(reopened.get_item("cart").await.unwrap().is_none());

        tokio::fs::remove_dir_all(storage.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let storage = temp_storage();
        let err = storage.set_item("../escape", "x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
        assert!(!storage.dir().exists());
    }
}
