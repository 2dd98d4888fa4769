// # Memory State Store
//
// In-memory implementation of StateStore.
//
// ## Purpose
//
// Provides a state store that doesn't persist across runs. Useful for
// embedding the updater in a longer-lived process and for tests.
//
// ## Crash Behavior
//
// - All state is lost when the process exits
// - Every fresh process starts from the sentinel and reconciles the zone

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::traits::state_store::{IpRecord, StateStore};

/// In-memory state store implementation
///
/// Clones share the same record.
///
/// # Example
///
/// ```rust
/// use livedns_core::state::MemoryStateStore;
/// use livedns_core::traits::StateStore;
///
/// #[tokio::main]
/// async fn main() {
///     let store = MemoryStateStore::new();
///     assert!(store.load().await.is_sentinel());
///
///     store.save("203.0.113.7").await;
///     assert_eq!(store.load().await.ip, "203.0.113.7");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<Option<IpRecord>>>,
}

impl MemoryStateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `ip`
    pub fn with_ip(ip: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(IpRecord::new(ip)))),
        }
    }

    /// The stored record, without the sentinel fallback
    pub async fn record(&self) -> Option<IpRecord> {
        self.inner.read().await.clone()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> IpRecord {
        self.record().await.unwrap_or_else(IpRecord::sentinel)
    }

    async fn save(&self, ip: &str) -> bool {
        *self.inner.write().await = Some(IpRecord::new(ip));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_loads_sentinel() {
        let store = MemoryStateStore::new();
        assert!(store.load().await.is_sentinel());
        assert!(store.record().await.is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = MemoryStateStore::with_ip("1.1.1.1");
        let clone = store.clone();

        assert!(clone.save("2.2.2.2").await);
        assert_eq!(store.load().await.ip, "2.2.2.2");
    }
}
