//! File-backed key-value store
//!
//! Stores each key as its own file in an XDG-compliant data directory
//! (`~/.local/share/newsweather/` on Linux).

use async_trait::async_trait;
use directories::ProjectDirs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::{KeyValueStore, StoreError};

/// Persists string values to one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    /// Directory where value files are stored
    dir: PathBuf,
}

impl FileStore {
    /// Creates a FileStore in the XDG data directory
    ///
    /// Returns `None` if the data directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "newsweather")?;
        Some(Self {
            dir: project_dirs.data_dir().to_path_buf(),
        })
    }

    /// Creates a FileStore rooted at a custom directory
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the store writes into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the path to the file holding `key`
    ///
    /// Anything outside `[A-Za-z0-9_-]` is replaced so a key can never escape
    /// the store directory.
    fn item_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.item_path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;

        // Write to a sibling file first so a crash never leaves half a value behind
        let path = self.item_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (FileStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = FileStore::with_dir(temp_dir.path());
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_set_item_creates_file_in_store_directory() {
        let (store, temp_dir) = create_test_store();

        store
            .set_item("test_key", r#"{"name":"test"}"#)
            .await
            .expect("Write should succeed");

        let expected_path = temp_dir.path().join("test_key.json");
        assert!(expected_path.exists(), "Value file should exist");

        let content = std::fs::read_to_string(&expected_path).expect("Should read file");
        assert_eq!(content, r#"{"name":"test"}"#);
    }

    #[tokio::test]
    async fn test_get_item_returns_none_for_missing_key() {
        let (store, _temp_dir) = create_test_store();

        let result = store.get_item("nonexistent_key").await.unwrap();

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[tokio::test]
    async fn test_set_item_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("data").join("dir");
        let store = FileStore::with_dir(nested_path.clone());

        store.set_item("nested_key", "1").await.expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key.json").exists());
        assert!(!nested_path.join("nested_key.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_overwrite_existing_value() {
        let (store, _temp_dir) = create_test_store();

        store.set_item("overwrite_key", "first").await.unwrap();
        store.set_item("overwrite_key", "second").await.unwrap();

        let result = store.get_item("overwrite_key").await.unwrap();
        assert_eq!(result.as_deref(), Some("second"), "Store should contain latest value");
    }

    #[tokio::test]
    async fn test_values_survive_a_new_store_instance() {
        let (store, temp_dir) = create_test_store();
        store.set_item("durable", "kept").await.unwrap();

        let reopened = FileStore::with_dir(temp_dir.path());
        assert_eq!(reopened.get_item("durable").await.unwrap().as_deref(), Some("kept"));
    }

    #[test]
    fn test_item_path_sanitizes_key() {
        let store = FileStore::with_dir("/tmp/store");
        let path = store.item_path("../escape/key");
        assert_eq!(path, PathBuf::from("/tmp/store/___escape_key.json"));
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(store) = FileStore::new() {
            let path_str = store.dir().to_string_lossy();
            assert!(path_str.contains("newsweather"), "Path should contain project name");
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
