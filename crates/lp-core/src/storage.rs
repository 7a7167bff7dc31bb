//! # Storage helpers
//!
//! Key names, typed JSON access on top of [`KeyValueStore`], and the
//! in-process [`MemoryStore`].
//!
//! Reads never fail from the caller's point of view: an absent key, a
//! backend error or a payload that does not parse all come back as `None`,
//! with a warning in the log for the last two.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::traits::KeyValueStore;

/// Namespaced keys shared with the web front end.
pub mod keys {
    pub const LAST_DISPLAY_NAME: &str = "loopPlus:lastDisplayName";
    pub const USER_PROFILE: &str = "loopPlus:userProfile";
    pub const LAST_RIDE: &str = "loopPlus:lastRide";
    pub const DISMISSED_SUGGESTIONS: &str = "loopPlus:dismissedSuggestions";
    pub const JOINED_SUGGESTIONS: &str = "loopPlus:joinedSuggestions";
    pub const CHAT_THREADS: &str = "loopPlus:chatThreads";
}

/// Reads a raw string value, logging and swallowing backend errors.
pub async fn read_raw(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value,
        Err(error) => {
            warn!(key, %error, "storage read failed, treating as empty");
            None
        }
    }
}

/// Reads and decodes a JSON value. See the module docs for failure handling.
pub async fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = read_raw(store, key).await?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(key, %error, "stored payload is malformed, ignoring it");
            None
        }
    }
}

/// Encodes and writes a JSON value, overwriting whatever was there.
pub async fn try_write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let encoded = serde_json::to_string(value)?;
    store.set(key, &encoded).await?;
    Ok(())
}

/// Like [`try_write_json`], but failures are only logged. Returns whether
/// the write went through.
pub async fn write_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> bool
where
    T: Serialize + ?Sized,
{
    match try_write_json(store, key, value).await {
        Ok(()) => true,
        Err(error) => {
            warn!(key, %error, "failed to persist");
            false
        }
    }
}

/// Volatile store backed by a concurrent map. Good for tests and for
/// sessions that should leave nothing behind.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
