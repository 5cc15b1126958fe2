//! Gallery item/page models and upstream entry normalization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::blob_url::BlobUrlBuilder;

/// File extensions accepted as images when the upstream entry has no usable content type.
pub const IMAGE_FILE_EXTENSIONS: [&str; 7] = ["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One displayable image. The key is the storage path and is the item's identity.
pub struct GalleryItem {
    /// Storage path of the blob; unique and stable within a session.
    #[serde(rename = "name")]
    pub key: String,
    /// Time-limited URL for the full image.
    #[serde(rename = "url")]
    pub display_url: String,
    /// Time-limited URL for the derived thumbnail, when a naming rule applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    /// Blob size in bytes.
    #[serde(rename = "size", default, skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<u64>,
    /// Declared content type.
    #[serde(rename = "contentType", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Last-modified time reported by storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    /// Container that holds the blob, used when minting fresh URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl GalleryItem {
    /// Returns the last path segment of the key, for captions and alt text.
    pub fn display_name(&self) -> &str {
        self.key
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(&self.key)
    }

    /// Returns the URL a grid tile should try first.
    pub fn preferred_tile_url(&self) -> &str {
        self.thumb_url.as_deref().unwrap_or(&self.display_url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// One page of normalized listing results.
pub struct GalleryPage {
    /// Items in upstream order.
    pub items: Vec<GalleryItem>,
    /// Opaque continuation cursor; `None` means the listing is exhausted.
    pub continuation_cursor: Option<String>,
}

impl GalleryPage {
    /// Builds a page, normalizing an empty cursor to end-of-listing.
    pub fn new(items: Vec<GalleryItem>, continuation_cursor: Option<String>) -> Self {
        Self {
            items,
            continuation_cursor: continuation_cursor.filter(|cursor| !cursor.trim().is_empty()),
        }
    }

    /// Returns `true` when another page can be requested.
    pub fn has_more(&self) -> bool {
        self.continuation_cursor.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Raw blob entry as reported by the storage listing API.
pub struct UpstreamEntry {
    /// Blob name (full storage path).
    pub name: String,
    /// Content length in bytes.
    pub content_length: Option<u64>,
    /// Declared content type.
    pub content_type: Option<String>,
    /// Last-modified value in the upstream header form (RFC 1123).
    pub last_modified: Option<String>,
}

/// Returns `true` when the entry should be shown: an `image/*` content type or a known image
/// file extension.
pub fn is_image_entry(name: &str, content_type: Option<&str>) -> bool {
    if content_type.is_some_and(|value| value.trim().starts_with("image/")) {
        return true;
    }
    name.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_FILE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

fn parse_last_modified(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|value| value.with_timezone(&Utc))
}

impl UpstreamEntry {
    /// Converts the entry into a [`GalleryItem`], or `None` when it is not an image.
    pub fn into_item(self, urls: &BlobUrlBuilder) -> Option<GalleryItem> {
        let content_type = self
            .content_type
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
        if !is_image_entry(&self.name, content_type.as_deref()) {
            return None;
        }
        Some(GalleryItem {
            display_url: urls.blob_url(&self.name),
            thumb_url: urls.thumb_url(&self.name),
            byte_size: self.content_length,
            media_type: content_type,
            last_modified: self.last_modified.as_deref().and_then(parse_last_modified),
            container: Some(urls.container().to_string()),
            key: self.name,
        })
    }
}

/// Normalizes one upstream listing segment into a [`GalleryPage`], dropping non-image entries.
pub fn normalize_entries(
    entries: Vec<UpstreamEntry>,
    next_marker: Option<String>,
    urls: &BlobUrlBuilder,
) -> GalleryPage {
    let items = entries
        .into_iter()
        .filter_map(|entry| entry.into_item(urls))
        .collect();
    GalleryPage::new(items, next_marker)
}
