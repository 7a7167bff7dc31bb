//! Rides the matcher must never suggest again: the ones the user skipped
//! and the ones they already joined. Both sets only ever grow.

use std::collections::HashSet;
use std::sync::Arc;

use crate::storage::{self, keys};
use crate::traits::KeyValueStore;

/// Insertion-ordered set of ride ids. Persisted as a JSON array in the
/// order ids were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet {
    order: Vec<String>,
    lookup: HashSet<String>,
}

impl IdSet {
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if !self.lookup.insert(id.clone()) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup.contains(id)
    }

    pub fn as_set(&self) -> &HashSet<String> {
        &self.lookup
    }

    pub fn as_slice(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<String> for IdSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = IdSet::default();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

pub struct Exclusions {
    store: Arc<dyn KeyValueStore>,
    dismissed: IdSet,
    joined: IdSet,
}

impl Exclusions {
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let dismissed = read_set(store.as_ref(), keys::DISMISSED_SUGGESTIONS).await;
        let joined = read_set(store.as_ref(), keys::JOINED_SUGGESTIONS).await;
        Self {
            store,
            dismissed,
            joined,
        }
    }

    pub fn dismissed(&self) -> &IdSet {
        &self.dismissed
    }

    pub fn joined(&self) -> &IdSet {
        &self.joined
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.dismissed.contains(id) || self.joined.contains(id)
    }

    /// Records a skipped suggestion. Returns false if it was already there.
    pub async fn dismiss(&mut self, id: &str) -> bool {
        if !self.dismissed.insert(id) {
            return false;
        }
        storage::write_json(self.store.as_ref(), keys::DISMISSED_SUGGESTIONS, self.dismissed.as_slice())
            .await;
        true
    }

    pub async fn join(&mut self, id: &str) -> bool {
        if !self.joined.insert(id) {
            return false;
        }
        storage::write_json(self.store.as_ref(), keys::JOINED_SUGGESTIONS, self.joined.as_slice())
            .await;
        true
    }
}

async fn read_set(store: &dyn KeyValueStore, key: &str) -> IdSet {
    storage::read_json::<Vec<String>>(store, key)
        .await
        .unwrap_or_default()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[tokio::test]
    async fn test_sets_persist_independently() {
        let store = Arc::new(MemoryStore::new());
        let mut exclusions = Exclusions::load(store.clone()).await;

        assert!(exclusions.dismiss("ride-02").await);
        assert!(!exclusions.dismiss("ride-02").await);
        assert!(exclusions.join("ride-04").await);
        assert!(exclusions.join("ride-01").await);

        let reloaded = Exclusions::load(store.clone()).await;
        assert_eq!(reloaded.dismissed().as_slice(), ["ride-02".to_string()]);
        assert_eq!(
            reloaded.joined().as_slice(),
            ["ride-04".to_string(), "ride-01".to_string()]
        );
        assert!(reloaded.is_excluded("ride-01"));
        assert!(!reloaded.is_excluded("ride-03"));

        let raw = store.get(keys::JOINED_SUGGESTIONS).await.unwrap().unwrap();
        assert_eq!(raw, r#"["ride-04","ride-01"]"#);
    }

    #[tokio::test]
    async fn test_garbage_reads_as_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set(keys::DISMISSED_SUGGESTIONS, "{\"a\":1}").await.unwrap();

        let exclusions = Exclusions::load(store).await;
        assert!(exclusions.dismissed().is_empty());
    }
}
