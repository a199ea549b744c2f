//! In-memory cache storage: hash map per partition plus an insertion-order
//! index, so FIFO eviction does not depend on any backing-store quirk.

use std::collections::{HashMap, VecDeque};

use futures::future::BoxFuture;
use tokio::sync::Mutex;

use super::{CacheEntry, CacheStorage};
use crate::error::StorageError;

#[derive(Default)]
struct PartitionState {
    entries: HashMap<String, CacheEntry>,
    /// Keys in first-inserted-first order. Re-inserting an existing key
    /// replaces the entry without moving it.
    order: VecDeque<String>,
}

pub struct MemoryStore {
    partitions: Mutex<HashMap<String, PartitionState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            partitions: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStorage for MemoryStore {
    fn get<'a>(
        &'a self,
        partition: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<CacheEntry>, StorageError>> {
        Box::pin(async move {
            let partitions = self.partitions.lock().await;
            Ok(partitions
                .get(partition)
                .and_then(|state| state.entries.get(key).cloned()))
        })
    }

    fn put<'a>(
        &'a self,
        partition: &'a str,
        key: &'a str,
        entry: CacheEntry,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let mut partitions = self.partitions.lock().await;
            let state = partitions.entry(partition.to_string()).or_default();
            if state.entries.insert(key.to_string(), entry).is_none() {
                state.order.push_back(key.to_string());
            }
            Ok(())
        })
    }

    fn keys<'a>(&'a self, partition: &'a str) -> BoxFuture<'a, Result<Vec<String>, StorageError>> {
        Box::pin(async move {
            let partitions = self.partitions.lock().await;
            Ok(partitions
                .get(partition)
                .map(|state| state.order.iter().cloned().collect())
                .unwrap_or_default())
        })
    }

    fn delete<'a>(
        &'a self,
        partition: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let mut partitions = self.partitions.lock().await;
            if let Some(state) = partitions.get_mut(partition) {
                if state.entries.remove(key).is_some() {
                    state.order.retain(|k| k != key);
                }
            }
            Ok(())
        })
    }
}
