//! Per-item write serialisation
//!
//! Inward, outward and stock updates for one item read rows and write them
//! back. Holding the item's lock for the whole read-modify-write keeps two
//! requests in this process from consuming the same lot balance twice.

use std::sync::Arc;

use dashmap::DashMap;
use shared::types::item_key;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lock table keyed by normalized item name
#[derive(Clone, Default)]
pub struct ItemLocks {
    inner: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl ItemLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `item`; released when the guard drops
    pub async fn lock(&self, item: &str) -> OwnedMutexGuard<()> {
        let mutex = self.inner.entry(item_key(item)).or_default().clone();
        mutex.lock_owned().await
    }

    /// Number of items that have been locked at least once
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
