//! Gallery listing metadata as the application records it. The store
//! persists these wholesale and never interprets the fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
}

/// One entry of a gallery listing: where the media lives and how to order it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub url: String,
    pub kind: MediaKind,
    #[serde(default)]
    pub order: Option<i64>,
}

/// Snapshot of an event's gallery listing, overwritten wholesale on every
/// successful fetch. Field names stay camelCase to match the records the
/// application already persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryRecord {
    pub event_id: String,
    pub items: Vec<GalleryItem>,
    pub updated_at: DateTime<Utc>,
}
