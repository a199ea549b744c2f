//! Per-event gallery metadata cache.
//!
//! This module provides the `GalleryMetadataStore` for keeping one listing
//! snapshot per event on disk, so the gallery page can paint instantly while
//! the authoritative fetch reconciles, and keep working offline.
//!
//! The store is an optimization, never a source of truth: every operation
//! degrades to its "not found" / `false` outcome instead of erroring.

pub mod store;

pub use store::GalleryMetadataStore;
