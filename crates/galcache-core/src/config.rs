//! Cache partition map and media URL matching.
//!
//! The two partitions and their bounds are fixed application configuration.
//! They are injectable here (rather than ambient globals) so the bounds stay
//! testable, but nothing tunes them at runtime.

use reqwest::Method;

use crate::media::MediaRequest;

/// Maximum entries in the thumbnail partition.
/// Thumbnails are small, so a deep cache keeps grid scrolling offline-fast.
pub const THUMBS_MAX_ENTRIES: usize = 5000;

/// Maximum entries in the full web-rendition partition.
/// Web renditions are large; 800 covers several galleries without letting
/// the cache grow unbounded.
pub const WEB_MAX_ENTRIES: usize = 800;

/// Public object-storage path segment that marks a request as event media.
pub const MEDIA_PATH_SEGMENT: &str = "/storage/v1/object/public/event-media/";

/// Filename suffix of the thumbnail rendition. Everything else under the
/// media segment is the full web rendition.
pub const THUMB_SUFFIX: &str = "_thumb.jpg";

/// One named cache region with a hard entry cap.
#[derive(Debug, Clone)]
pub struct PartitionConfig {
    pub name: String,
    pub max_entries: usize,
}

impl PartitionConfig {
    pub fn new(name: impl Into<String>, max_entries: usize) -> Self {
        Self {
            name: name.into(),
            max_entries,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaCacheConfig {
    pub media_path_segment: String,
    pub thumb_suffix: String,
    pub thumbs: PartitionConfig,
    pub web: PartitionConfig,
}

impl Default for MediaCacheConfig {
    fn default() -> Self {
        Self {
            media_path_segment: MEDIA_PATH_SEGMENT.to_string(),
            thumb_suffix: THUMB_SUFFIX.to_string(),
            thumbs: PartitionConfig::new("thumbs", THUMBS_MAX_ENTRIES),
            web: PartitionConfig::new("web", WEB_MAX_ENTRIES),
        }
    }
}

impl MediaCacheConfig {
    /// Select the partition an intercepted request belongs to, or `None` if
    /// the request is not eligible for caching and must pass straight
    /// through to the network.
    ///
    /// Only GET requests under the public media segment are eligible; the
    /// thumbnail suffix routes to `thumbs`, every other match to `web`.
    pub fn classify(&self, request: &MediaRequest) -> Option<&PartitionConfig> {
        if request.method != Method::GET {
            return None;
        }
        let path = request.url.path();
        if !path.contains(self.media_path_segment.as_str()) {
            return None;
        }
        if path.ends_with(self.thumb_suffix.as_str()) {
            Some(&self.thumbs)
        } else {
            Some(&self.web)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Url;

    fn get(url: &str) -> MediaRequest {
        MediaRequest::get(Url::parse(url).expect("Failed to parse test URL"))
    }

    #[test]
    fn test_classify_web_rendition() {
        let config = MediaCacheConfig::default();
        let request = get("https://cdn.example.com/storage/v1/object/public/event-media/evt1/a.jpg");
        let partition = config.classify(&request).expect("Expected a partition");
        assert_eq!(partition.name, "web");
        assert_eq!(partition.max_entries, WEB_MAX_ENTRIES);
    }

    #[test]
    fn test_classify_thumbnail() {
        let config = MediaCacheConfig::default();
        let request =
            get("https://cdn.example.com/storage/v1/object/public/event-media/evt1/a_thumb.jpg");
        let partition = config.classify(&request).expect("Expected a partition");
        assert_eq!(partition.name, "thumbs");
        assert_eq!(partition.max_entries, THUMBS_MAX_ENTRIES);
    }

    #[test]
    fn test_classify_rejects_non_media_path() {
        let config = MediaCacheConfig::default();
        let request = get("https://cdn.example.com/api/events/evt1");
        assert!(config.classify(&request).is_none());
    }

    #[test]
    fn test_classify_rejects_non_get() {
        let config = MediaCacheConfig::default();
        let url = Url::parse("https://cdn.example.com/storage/v1/object/public/event-media/a.jpg")
            .expect("Failed to parse test URL");
        let request = MediaRequest::new(Method::POST, url);
        assert!(config.classify(&request).is_none());
    }
}
