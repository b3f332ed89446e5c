//! Persistent key-value storage
//!
//! The application keeps everything it remembers between runs (the last good
//! news and weather snapshots, the favorites set, and the theme and unit
//! preferences) as JSON strings under a handful of fixed keys. Stored values
//! never expire: a snapshot stays displayable until a newer one replaces it.

mod file;
mod memory;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key for the last successful news article list
pub const NEWS_SNAPSHOT_KEY: &str = "cached_news_v2";

/// Key for the last successful weather reading
pub const WEATHER_SNAPSHOT_KEY: &str = "cached_weather_v1";

/// Key for the favorites set
pub const FAVORITES_KEY: &str = "news_favorites_v1";

/// Key for the light/dark theme preference
pub const THEME_KEY: &str = "theme_preference";

/// Key for the temperature unit preference
pub const UNITS_KEY: &str = "unit_preference";

/// Errors that can occur when reading or writing the store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying file I/O failed
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded or decoded as JSON
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The store refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable mapping from string keys to string values
///
/// Implementations must survive process restarts. Concurrent writers are not
/// supported; the last write to a key wins.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if nothing is stored
    async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value
    async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Reads and decodes a JSON value from the store
///
/// Read failures and undecodable content are logged and reported as `None`,
/// the same as a key that was never written.
pub async fn read_json<T, S>(store: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore + ?Sized,
{
    let raw = match store.get_item(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no stored value");
            return None;
        }
        Err(err) => {
            warn!(key, error = %err, "failed to read stored value");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "ignoring undecodable stored value");
            None
        }
    }
}

/// Encodes a value as JSON and writes it to the store, overwriting the key
pub async fn write_json<T, S>(store: &S, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    /// Store whose every operation fails
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }

        async fn set_item(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("disk gone".to_string()))
        }
    }

    #[tokio::test]
    async fn test_write_then_read_json() {
        let store = MemoryStore::new();
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        write_json(&store, "key", &data).await.expect("Write should succeed");
        let read: Option<TestData> = read_json(&store, "key").await;

        assert_eq!(read, Some(data));
    }

    #[tokio::test]
    async fn test_read_json_missing_key_is_none() {
        let store = MemoryStore::new();
        let read: Option<TestData> = read_json(&store, "missing").await;
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn test_read_json_garbage_is_none() {
        let store = MemoryStore::new();
        store.set_item("key", "{ not json").await.unwrap();

        let read: Option<TestData> = read_json(&store, "key").await;
        assert!(read.is_none(), "Corrupt values are treated as absent");
    }

    #[tokio::test]
    async fn test_read_json_store_failure_is_none() {
        let read: Option<TestData> = read_json(&BrokenStore, "key").await;
        assert!(read.is_none());
    }

    #[tokio::test]
    async fn test_write_json_store_failure_is_reported() {
        let result = write_json(&BrokenStore, "key", &1u8).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[test]
    fn test_store_keys_are_distinct() {
        let keys = [
            NEWS_SNAPSHOT_KEY,
            WEATHER_SNAPSHOT_KEY,
            FAVORITES_KEY,
            THEME_KEY,
            UNITS_KEY,
        ];
        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
