pub mod keys;
pub mod sqlite;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app::Result;

pub use sqlite::SqliteStore;

/// Persistent, string-keyed store shared by every component.
///
/// Values are opaque strings (JSON for structured records). There are no
/// transactions spanning logical operations: two `set` calls made for one
/// user action may land independently.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
    async fn multi_remove(&self, keys: &[&str]) -> Result<()>;
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Read and decode a JSON value, treating every failure as a miss.
pub async fn read_json<S, T>(store: &S, key: &str) -> Option<T>
where
    S: KeyValueStore + ?Sized,
    T: DeserializeOwned,
{
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring undecodable value under {}: {}", key, e);
            None
        }
    }
}

/// Encode and write a JSON value. Failures are logged and reported as
/// `false`, never raised.
pub async fn write_json<S, T>(store: &S, key: &str, value: &T) -> bool
where
    S: KeyValueStore + ?Sized,
    T: Serialize + ?Sized,
{
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Failed to encode {}: {}", key, e);
            return false;
        }
    };

    write_raw(store, key, &raw).await
}

/// Best-effort plain string write.
pub async fn write_raw<S>(store: &S, key: &str, raw: &str) -> bool
where
    S: KeyValueStore + ?Sized,
{
    match store.set(key, raw).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Failed to persist {}: {}", key, e);
            false
        }
    }
}
