//! galcache - offline media cache for event galleries.
//!
//! Two independent services back the guest gallery of an event-planning
//! application:
//!
//! - [`MediaCache`]: an HTTP middleware that intercepts GET requests for
//!   event media, serves cached responses, and enforces a per-partition
//!   entry cap with oldest-first eviction.
//! - [`GalleryMetadataStore`]: a per-event store for the last-known gallery
//!   listing, so the gallery page can paint instantly and tolerate being
//!   offline.
//!
//! Neither component depends on the other; the application wires both in
//! at startup and treats them strictly as optimizations. Every cache-layer
//! fault degrades to "no cache" behavior rather than surfacing to the user.

pub mod config;
pub mod error;
pub mod gallery;
pub mod media;
pub mod models;
pub mod storage;

pub use config::{MediaCacheConfig, PartitionConfig};
pub use error::{FetchError, StorageError};
pub use gallery::GalleryMetadataStore;
pub use media::{HttpFetcher, MediaCache, MediaFetcher, MediaRequest, MediaResponse};
pub use models::{GalleryItem, GalleryRecord, MediaKind};
pub use storage::{CacheEntry, CacheStorage, MemoryStore};
