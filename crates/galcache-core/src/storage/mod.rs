//! Partitioned response storage with explicit insertion order.
//!
//! The browser version of this cache leaned on the storage engine's key
//! enumeration order as a proxy for insertion order. Here the order is an
//! explicit part of the [`CacheStorage`] contract: `keys` must return keys
//! first-inserted-first, so eviction can delete a computed front prefix.
//!
//! Every operation is its own short transaction. Implementations are
//! fallible; the interceptor swallows every error and behaves as if no
//! cache existed for that operation.

pub mod memory;

pub use memory::MemoryStore;

use futures::future::BoxFuture;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::media::MediaResponse;

/// A captured response: status, headers, and body bytes, keyed by the full
/// request identity of the request that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CacheEntry {
    /// Capture a response for storage. Header values that are not valid
    /// UTF-8 are dropped; media responses do not carry any we replay.
    pub fn from_response(response: &MediaResponse) -> Self {
        let headers = response
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Self {
            status: response.status.as_u16(),
            headers,
            body: response.body.clone(),
        }
    }

    /// Replay a stored entry as a response. An out-of-range stored status
    /// marks the entry corrupt rather than being papered over.
    pub fn into_response(self) -> Result<MediaResponse, StorageError> {
        let status = StatusCode::from_u16(self.status)
            .map_err(|_| StorageError::Corrupt(format!("invalid status {}", self.status)))?;
        Ok(MediaResponse::from_parts(status, self.headers, self.body))
    }
}

/// Asynchronous, partitioned key-value storage for cached responses.
pub trait CacheStorage: Send + Sync {
    fn get<'a>(
        &'a self,
        partition: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<Option<CacheEntry>, StorageError>>;

    fn put<'a>(
        &'a self,
        partition: &'a str,
        key: &'a str,
        entry: CacheEntry,
    ) -> BoxFuture<'a, Result<(), StorageError>>;

    /// All keys currently in the partition, in insertion order.
    fn keys<'a>(&'a self, partition: &'a str) -> BoxFuture<'a, Result<Vec<String>, StorageError>>;

    fn delete<'a>(
        &'a self,
        partition: &'a str,
        key: &'a str,
    ) -> BoxFuture<'a, Result<(), StorageError>>;
}
