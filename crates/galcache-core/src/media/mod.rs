//! Media response interception and bounded caching.
//!
//! [`MediaCache`] wraps the HTTP transport the gallery uses for media
//! requests. Eligible GET requests (see [`crate::config::MediaCacheConfig`])
//! are served from a partitioned cache when possible; misses go to the
//! network and successful responses are stored, after which the partition's
//! entry cap is enforced oldest-first.
//!
//! The application constructs one `MediaCache` at startup and hands clones
//! to every consumer - cloning is cheap and activation is immediate.

pub mod fetch;
pub mod interceptor;

pub use fetch::{HttpFetcher, MediaFetcher, MediaRequest, MediaResponse};
pub use interceptor::MediaCache;
