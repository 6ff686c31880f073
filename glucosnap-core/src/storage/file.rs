use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{KeyValueStore, StorageError};

/// File extension for stored collections.
const VALUE_EXTENSION: &str = "json";

/// Stores each key as `<data_dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Returns the full path for a key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", key, VALUE_EXTENSION))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!(".{}.{}.tmp", key, VALUE_EXTENSION))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path(key);
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    /// Writes to a temp file first so a crash never leaves a half-written
    /// collection behind.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|source| StorageError::Io {
                path: self.data_dir.clone(),
                source,
            })?;

        let temp = self.temp_path(key);
        fs::write(&temp, value)
            .await
            .map_err(|source| StorageError::Io {
                path: temp.clone(),
                source,
            })?;

        let path = self.path(key);
        fs::rename(&temp, &path)
            .await
            .map_err(|source| StorageError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::new(temp_dir.path());
        (store, temp_dir)
    }

    #[test]
    fn test_path() {
        let (store, _temp) = test_store();
        assert!(store.path("gluco_snap_a1c").ends_with("gluco_snap_a1c.json"));
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let (store, _temp) = test_store();
        assert!(store.get("gluco_snap_meals").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("data");
        let store = FileStore::new(&nested);

        store.set("key", "[]").await.unwrap();

        assert!(nested.join("key.json").exists());
        assert!(!nested.join(".key.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_overwrite_existing_value() {
        let (store, _temp) = test_store();

        store.set("key", "[1]").await.unwrap();
        store.set("key", "[1,2]").await.unwrap();

        assert_eq!(store.get("key").await.unwrap().as_deref(), Some("[1,2]"));
    }

    #[tokio::test]
    async fn test_unreadable_path_is_error() {
        let (store, _temp) = test_store();
        // A directory where the file should be cannot be read as a string.
        std::fs::create_dir_all(store.path("key")).unwrap();

        let err = store.get("key").await.unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }
}
