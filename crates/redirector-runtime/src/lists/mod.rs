//! Namespaced list repository
//!
//! Holds the current set of namespaced lists. Readers take a snapshot with
//! a single atomic load; a refresh replaces the whole set at once.

use arc_swap::ArcSwap;
use redirector_core::NamespacedLists;
use std::sync::Arc;

/// Shared, atomically replaceable namespaced lists
#[derive(Debug)]
pub struct NamespacedListRepository {
    current: ArcSwap<NamespacedLists>,
}

impl NamespacedListRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(NamespacedLists::default()),
        }
    }

    pub fn with_lists(lists: NamespacedLists) -> Self {
        Self {
            current: ArcSwap::from_pointee(lists),
        }
    }

    /// Current lists
    pub fn snapshot(&self) -> Arc<NamespacedLists> {
        self.current.load_full()
    }

    /// Replace every list at once
    pub fn replace(&self, lists: impl Into<Arc<NamespacedLists>>) {
        let lists = lists.into();
        tracing::debug!(
            "Replacing namespaced lists: version {} -> {}, {} lists",
            self.version(),
            lists.version,
            lists.len()
        );
        self.current.store(lists);
    }

    pub fn version(&self) -> i64 {
        self.current.load().version
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// True when the repository is empty or older than `version`
    pub fn is_stale(&self, version: i64) -> bool {
        let current = self.current.load();
        current.is_empty() || current.version < version
    }
}

impl Default for NamespacedListRepository {
    fn default() -> Self {
        Self::new()
    }
}
