//! # Core Traits (Ports)
//!
//! Any storage plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable string-to-string storage, the moral equivalent of a browser's
/// local storage. Values are whole JSON documents; writes overwrite.
///
/// Every call is expected to be atomic on its own. Nothing here coordinates
/// two processes sharing a backend: the last writer wins.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key was never written or has been removed.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// Source of "now", injectable so expiry can be tested without waiting.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
