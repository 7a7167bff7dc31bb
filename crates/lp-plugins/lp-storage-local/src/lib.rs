//! # lp-storage-local
//! loop-plus/crates/lp-plugins/lp-storage-local/src/lib.rs
//! Local filesystem implementation of `KeyValueStore`.
//! One JSON file per key; writes go through a temp file and a rename so a
//! crash never leaves half a payload behind.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use lp_core::traits::KeyValueStore;
use tokio::fs;
use tracing::debug;

pub struct LocalFileStore {
    /// Root directory for all entries (e.g., "./data/storage")
    root_path: PathBuf,
}

impl LocalFileStore {
    /// Creates the root directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root_path = root.into();
        fs::create_dir_all(&root_path)
            .await
            .with_context(|| format!("creating {}", root_path.display()))?;
        debug!(root = %root_path.display(), "file store ready");
        Ok(Self { root_path })
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }

    /// Maps a key to its file: "loopPlus:chatThreads" -> "loopPlus%3AchatThreads.json".
    /// Anything outside `[A-Za-z0-9._-]` is percent-escaped, so distinct keys
    /// never share a file.
    fn entry_path(&self, key: &str) -> PathBuf {
        let mut name = String::with_capacity(key.len() + 5);
        for byte in key.bytes() {
            match byte {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => name.push(byte as char),
                b'.' if !name.is_empty() => name.push('.'),
                _ => name.push_str(&format!("%{byte:02X}")),
            }
        }
        name.push_str(".json");
        self.root_path.join(name)
    }
}

#[async_trait]
impl KeyValueStore for LocalFileStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.entry_path(key);
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let target = self.entry_path(key);
        let mut staging = target.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        fs::write(&staging, value)
            .await
            .with_context(|| format!("writing {}", staging.display()))?;
        fs::rename(&staging, &target)
            .await
            .with_context(|| format!("replacing {}", target.display()))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        let path = self.entry_path(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::open(dir.path()).await.unwrap();

        assert_eq!(store.get("loopPlus:lastRide").await.unwrap(), None);
        store.set("loopPlus:lastRide", "{\"seats\":2}").await.unwrap();
        store.set("loopPlus:lastRide", "{\"seats\":3}").await.unwrap();
        assert_eq!(
            store.get("loopPlus:lastRide").await.unwrap().as_deref(),
            Some("{\"seats\":3}")
        );

        store.remove("loopPlus:lastRide").await.unwrap();
        store.remove("loopPlus:lastRide").await.unwrap();
        assert_eq!(store.get("loopPlus:lastRide").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_do_not_collide_or_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::open(dir.path()).await.unwrap();

        store.set("a:b", "colon").await.unwrap();
        store.set("a_b", "underscore").await.unwrap();
        store.set("../evil", "dots").await.unwrap();

        assert_eq!(store.get("a:b").await.unwrap().as_deref(), Some("colon"));
        assert_eq!(store.get("a_b").await.unwrap().as_deref(), Some("underscore"));
        assert!(store.entry_path("../evil").starts_with(dir.path()));
        assert_eq!(
            store.entry_path("loopPlus:chatThreads").file_name().unwrap(),
            "loopPlus%3AchatThreads.json"
        );
    }

    #[tokio::test]
    async fn test_open_creates_nested_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("data").join("storage");
        let store = LocalFileStore::open(&nested).await.unwrap();
        assert!(store.root().is_dir());
    }
}
