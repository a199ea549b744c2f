use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;

use crate::models::{GalleryItem, GalleryRecord};

/// Application name used for the cache directory path
const APP_NAME: &str = "galcache";

/// Subdirectory holding one JSON record per event
const GALLERY_DIR: &str = "galleries";

/// Durable per-event key-value store for gallery listing snapshots.
///
/// One JSON file per event. Each operation is its own short-lived read or
/// write; saves for different events never interfere, and concurrent saves
/// for the same event are last-write-wins.
pub struct GalleryMetadataStore {
    /// `None` when no writable cache directory exists in this environment;
    /// every operation then resolves to its failure outcome.
    cache_dir: Option<PathBuf>,
}

impl GalleryMetadataStore {
    /// Create a store under the platform cache directory. If no usable
    /// directory exists the store comes up disabled rather than failing.
    pub fn new() -> Self {
        match Self::default_dir() {
            Ok(dir) => Self::with_dir(dir),
            Err(e) => {
                debug!(error = %e, "Gallery cache unavailable, running without metadata cache");
                Self::disabled()
            }
        }
    }

    /// Create a store rooted at an explicit directory.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            debug!(path = %dir.display(), error = %e, "Failed to create gallery cache directory");
            return Self::disabled();
        }
        Self {
            cache_dir: Some(dir),
        }
    }

    /// A store that ignores all operations, for environments without any
    /// writable cache storage.
    pub fn disabled() -> Self {
        Self { cache_dir: None }
    }

    fn default_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(GALLERY_DIR))
    }

    fn record_path(&self, event_id: &str) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;
        Some(dir.join(format!("gallery_{}.json", sanitize_id(event_id))))
    }

    /// Load the cached listing for an event. `None` means no record, a
    /// storage fault, or an unavailable store - callers cannot tell the
    /// difference and must not need to.
    pub async fn get(&self, event_id: &str) -> Option<GalleryRecord> {
        match self.load(event_id).await {
            Ok(record) => record,
            Err(e) => {
                debug!(event_id, error = %e, "Failed to load gallery record");
                None
            }
        }
    }

    /// Overwrite the cached listing for an event with a fresh timestamp.
    /// Returns `false` on any storage fault.
    pub async fn save(&self, event_id: &str, items: Vec<GalleryItem>) -> bool {
        match self.store(event_id, items).await {
            Ok(saved) => saved,
            Err(e) => {
                debug!(event_id, error = %e, "Failed to save gallery record");
                false
            }
        }
    }

    /// Delete the cached listing for an event. Deleting an absent record is
    /// a successful no-op; `false` only on a storage fault.
    pub async fn clear(&self, event_id: &str) -> bool {
        match self.remove(event_id).await {
            Ok(cleared) => cleared,
            Err(e) => {
                debug!(event_id, error = %e, "Failed to clear gallery record");
                false
            }
        }
    }

    async fn load(&self, event_id: &str) -> Result<Option<GalleryRecord>> {
        let Some(path) = self.record_path(event_id) else {
            return Ok(None);
        };

        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => {
                let record = serde_json::from_str(&contents).with_context(|| {
                    format!("Failed to parse gallery record for event {}", event_id)
                })?;
                Ok(Some(record))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to read gallery record for event {}", event_id)
            }),
        }
    }

    async fn store(&self, event_id: &str, items: Vec<GalleryItem>) -> Result<bool> {
        let Some(path) = self.record_path(event_id) else {
            return Ok(false);
        };

        let record = GalleryRecord {
            event_id: event_id.to_string(),
            items,
            updated_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&record)?;

        // Write-then-rename keeps concurrent saves for the same event
        // last-write-wins instead of interleaving into a torn file.
        let tmp = path.with_extension(format!(
            "json.{}-{}.tmp",
            std::process::id(),
            TMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&tmp, contents)
            .await
            .with_context(|| format!("Failed to write gallery record for event {}", event_id))?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e).with_context(|| {
                format!("Failed to commit gallery record for event {}", event_id)
            });
        }
        Ok(true)
    }

    async fn remove(&self, event_id: &str) -> Result<bool> {
        let Some(path) = self.record_path(event_id) else {
            return Ok(false);
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to delete gallery record for event {}", event_id)
            }),
        }
    }
}

impl Default for GalleryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Distinguishes temp files when several saves race in one process.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Map an event id to a filesystem-safe file name fragment. Unsafe bytes
/// (and `_`, the escape character itself) are hex-escaped, so distinct ids
/// never share a file.
fn sanitize_id(event_id: &str) -> String {
    let mut out = String::with_capacity(event_id.len());
    for byte in event_id.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' => out.push(byte as char),
            _ => out.push_str(&format!("_{:02x}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaKind;

    fn temp_store(name: &str) -> GalleryMetadataStore {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("Clock before epoch")
            .subsec_nanos();
        let dir = std::env::temp_dir().join(format!(
            "galcache-test-{}-{}-{}",
            name,
            std::process::id(),
            nanos
        ));
        GalleryMetadataStore::with_dir(dir)
    }

    fn items(prefix: &str) -> Vec<GalleryItem> {
        vec![
            GalleryItem {
                id: format!("{}-1", prefix),
                url: format!("https://cdn.example.com/{}-1.jpg", prefix),
                kind: MediaKind::Photo,
                order: Some(1),
            },
            GalleryItem {
                id: format!("{}-2", prefix),
                url: format!("https://cdn.example.com/{}-2.mp4", prefix),
                kind: MediaKind::Video,
                order: Some(2),
            },
        ]
    }

    #[tokio::test]
    async fn test_save_then_get_round_trips() {
        let store = temp_store("round-trip");
        let saved = items("a");

        assert!(store.save("evt-1", saved.clone()).await);
        let record = store.get("evt-1").await.expect("Expected a record");
        assert_eq!(record.event_id, "evt-1");
        assert_eq!(record.items, saved);
    }

    #[tokio::test]
    async fn test_save_overwrites_wholesale() {
        let store = temp_store("overwrite");
        assert!(store.save("evt-1", items("old")).await);
        assert!(store.save("evt-1", items("new")).await);

        let record = store.get("evt-1").await.expect("Expected a record");
        assert_eq!(record.items, items("new"));
    }

    #[tokio::test]
    async fn test_clear_removes_record() {
        let store = temp_store("clear");
        assert!(store.save("evt-1", items("a")).await);
        assert!(store.clear("evt-1").await);
        assert!(store.get("evt-1").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_absent_record_is_noop() {
        let store = temp_store("clear-absent");
        assert!(store.clear("never-saved").await);
    }

    #[tokio::test]
    async fn test_events_are_isolated() {
        let store = temp_store("isolation");
        assert!(store.save("evt-a", items("a")).await);
        assert!(store.save("evt-b", items("b")).await);

        let a = store.get("evt-a").await.expect("Expected record for evt-a");
        let b = store.get("evt-b").await.expect("Expected record for evt-b");
        assert_eq!(a.items, items("a"));
        assert_eq!(b.items, items("b"));
    }

    #[tokio::test]
    async fn test_disabled_store_degrades_silently() {
        let store = GalleryMetadataStore::disabled();
        assert!(store.get("evt-1").await.is_none());
        assert!(!store.save("evt-1", items("a")).await);
        assert!(!store.clear("evt-1").await);
    }

    #[tokio::test]
    async fn test_ids_differing_only_in_symbols_do_not_collide() {
        let store = temp_store("collision");
        assert!(store.save("evt.1", items("a")).await);
        assert!(store.save("evt:1", items("b")).await);

        let a = store.get("evt.1").await.expect("Expected record for evt.1");
        let b = store.get("evt:1").await.expect("Expected record for evt:1");
        assert_eq!(a.event_id, "evt.1");
        assert_eq!(a.items, items("a"));
        assert_eq!(b.event_id, "evt:1");
        assert_eq!(b.items, items("b"));
    }

    #[test]
    fn test_sanitize_id_is_injective_for_escaped_bytes() {
        assert_ne!(sanitize_id("evt.1"), sanitize_id("evt:1"));
        assert_ne!(sanitize_id("a_b"), sanitize_id("a.b"));
        assert_eq!(sanitize_id("evt-1"), "evt-1");
    }

    #[tokio::test]
    async fn test_concurrent_saves_same_event_leave_valid_record() {
        let store = temp_store("concurrent");
        let (first, second) = futures::join!(
            store.save("evt-1", items("a")),
            store.save("evt-1", items("b"))
        );
        assert!(first);
        assert!(second);

        // Last write wins; either way the record must parse cleanly.
        let record = store.get("evt-1").await.expect("Expected a record");
        assert_eq!(record.event_id, "evt-1");
        assert!(record.items == items("a") || record.items == items("b"));
    }

    #[tokio::test]
    async fn test_event_id_with_path_characters() {
        let store = temp_store("sanitize");
        assert!(store.save("evt/../1:x", items("a")).await);
        let record = store
            .get("evt/../1:x")
            .await
            .expect("Expected a record for sanitized id");
        assert_eq!(record.event_id, "evt/../1:x");
    }
}
