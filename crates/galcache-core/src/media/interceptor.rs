//! The interception pipeline: match, lookup, fetch, store, evict.

use std::sync::Arc;

use tracing::debug;

use super::fetch::{HttpFetcher, MediaFetcher, MediaRequest, MediaResponse};
use crate::config::{MediaCacheConfig, PartitionConfig};
use crate::error::{FetchError, StorageError};
use crate::storage::{CacheEntry, CacheStorage, MemoryStore};

/// Bounded response cache in front of the media transport.
///
/// Only a genuine network failure surfaces to the caller; every storage
/// fault is logged and the pipeline continues as if no cache existed. The
/// partition bound is eventually enforced: eviction runs in a detached task
/// after each insertion so callers never wait on it, and concurrent
/// in-flight requests may transiently push a partition over its cap until
/// the next pass catches up.
#[derive(Clone)]
pub struct MediaCache {
    config: Arc<MediaCacheConfig>,
    storage: Arc<dyn CacheStorage>,
    fetcher: Arc<dyn MediaFetcher>,
}

impl MediaCache {
    pub fn new(
        config: MediaCacheConfig,
        fetcher: Arc<dyn MediaFetcher>,
        storage: Arc<dyn CacheStorage>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            storage,
            fetcher,
        }
    }

    /// Convenience constructor wiring the reqwest transport and in-memory
    /// storage - what the application shell installs at startup.
    pub fn with_http(config: MediaCacheConfig) -> Result<Self, FetchError> {
        Ok(Self::new(
            config,
            Arc::new(HttpFetcher::new()?),
            Arc::new(MemoryStore::new()),
        ))
    }

    /// Resolve a request through the cache.
    ///
    /// Non-eligible requests pass straight through to the network with no
    /// cache side effect. Eligible requests are served from their partition
    /// on a hit; on a miss the network response is returned and, if its
    /// status is in the success range, stored, with the partition bound
    /// enforced in the background.
    pub async fn fetch(&self, request: &MediaRequest) -> Result<MediaResponse, FetchError> {
        let Some(partition) = self.config.classify(request) else {
            return self.fetcher.fetch(request).await;
        };

        let key = request.cache_key();
        match self.storage.get(&partition.name, &key).await {
            Ok(Some(entry)) => match entry.into_response() {
                Ok(response) => {
                    debug!(partition = %partition.name, key = %key, "media cache hit");
                    return Ok(response);
                }
                Err(e) => {
                    debug!(partition = %partition.name, key = %key, error = %e, "dropping corrupt cache entry");
                    if let Err(e) = self.storage.delete(&partition.name, &key).await {
                        debug!(partition = %partition.name, error = %e, "failed to delete corrupt entry");
                    }
                }
            },
            Ok(None) => {}
            Err(e) => {
                debug!(partition = %partition.name, error = %e, "cache lookup failed, using network");
            }
        }

        let response = self.fetcher.fetch(request).await?;

        // Error statuses are returned to the caller but never persisted.
        if !response.is_success() {
            return Ok(response);
        }

        let entry = CacheEntry::from_response(&response);
        match self.storage.put(&partition.name, &key, entry).await {
            Ok(()) => {
                // The caller never waits on eviction bookkeeping; the bound
                // catches up in the background.
                let storage = Arc::clone(&self.storage);
                let partition = partition.clone();
                tokio::spawn(async move {
                    if let Err(e) = Self::evict(storage.as_ref(), &partition).await {
                        debug!(partition = %partition.name, error = %e, "eviction failed");
                    }
                });
            }
            Err(e) => {
                debug!(partition = %partition.name, error = %e, "cache write failed");
            }
        }

        Ok(response)
    }

    /// Enforce the partition's entry cap: read the full key list in
    /// insertion order and delete the computed front prefix. A concurrent
    /// insert between the read and the deletes can leave the partition one
    /// entry over until the next pass.
    async fn evict(
        storage: &dyn CacheStorage,
        partition: &PartitionConfig,
    ) -> Result<(), StorageError> {
        let keys = storage.keys(&partition.name).await?;
        if keys.len() <= partition.max_entries {
            return Ok(());
        }

        let excess = keys.len() - partition.max_entries;
        debug!(partition = %partition.name, evicting = excess, "partition over bound");
        for key in &keys[..excess] {
            storage.delete(&partition.name, key).await?;
        }
        Ok(())
    }
}
