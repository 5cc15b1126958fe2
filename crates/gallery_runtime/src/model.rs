//! Session state owned by the gallery runtime context.

use std::collections::HashMap;
use std::rc::Rc;

use gallery_host::{GalleryError, GalleryItem, RetryPolicy};

use crate::{
    collection::Collection,
    credential::CredentialState,
    load_more::{LoadMoreTrigger, TriggerGate},
    navigation::NavigationState,
    viewer::ViewerTransform,
    virtualizer::{column_count_for_width, ViewportMetrics, VirtualRow, Virtualizer},
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One issued page fetch. Completions are matched against the in-flight ticket.
pub struct FetchTicket {
    /// Collection generation at issue time.
    pub generation: u64,
    /// Cursor passed to the listing service.
    pub cursor: Option<String>,
    /// 1-based attempt number.
    pub attempt: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Listing failure that exhausted its retries.
pub struct LoadFailure {
    /// Final error.
    pub error: GalleryError,
    /// `true` when no page had landed yet; rendered as a full-page error.
    pub during_initial_load: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Re-minted URLs for one item.
pub struct ItemUrls {
    /// Full image URL.
    pub display_url: String,
    /// Thumbnail URL.
    pub thumb_url: Option<String>,
}

impl From<&GalleryItem> for ItemUrls {
    fn from(item: &GalleryItem) -> Self {
        Self {
            display_url: item.display_url.clone(),
            thumb_url: item.thumb_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Complete gallery session state. Mutated only by [`crate::reducer::reduce_gallery`].
pub struct GalleryState {
    /// Accumulated items.
    pub collection: Collection,
    /// Lightbox selection.
    pub navigation: NavigationState,
    /// Storage credential status.
    pub credential: CredentialState,
    /// Sentinel edge detector.
    pub trigger: LoadMoreTrigger,
    /// Fetch in flight or waiting on a retry delay.
    pub in_flight: Option<FetchTicket>,
    /// Last listing failure that exhausted retries.
    pub load_failure: Option<LoadFailure>,
    /// Fresh URLs by item key, preferred over the item's own URLs. Shared between state clones.
    pub url_overlay: Rc<HashMap<String, ItemUrls>>,
    /// Last reported scroll container metrics.
    pub viewport: ViewportMetrics,
    /// Row layout for the current column count.
    pub virtualizer: Virtualizer,
    /// Grid cell holding keyboard focus.
    pub grid_focus: Option<usize>,
    /// Lightbox zoom/pan.
    pub viewer: ViewerTransform,
    /// Retry policy for transient listing failures.
    pub retry: RetryPolicy,
}

impl GalleryState {
    /// Fresh session state using `retry` for transient failures.
    pub fn with_retry_policy(retry: RetryPolicy) -> Self {
        Self {
            retry,
            ..Self::default()
        }
    }

    /// Suppression inputs for the load-more trigger.
    pub fn trigger_gate(&self) -> TriggerGate {
        TriggerGate {
            in_flight: self.in_flight.is_some(),
            has_more: self.collection.has_more(),
            initial_loaded: self.collection.initial_loaded(),
            credential_active: self.credential.is_active(),
        }
    }

    /// URLs to render for `item`, preferring re-minted ones.
    pub fn urls_for(&self, item: &GalleryItem) -> ItemUrls {
        self.url_overlay
            .get(&item.key)
            .cloned()
            .unwrap_or_else(|| ItemUrls::from(item))
    }

    /// Item shown in the lightbox.
    pub fn open_item(&self) -> Option<&GalleryItem> {
        self.navigation
            .open_index()
            .and_then(|index| self.collection.get(index))
    }

    /// Rows to render for the current viewport.
    pub fn visible_rows(&self) -> Vec<VirtualRow> {
        self.virtualizer.rows(self.viewport, self.collection.len())
    }

    /// Whether `metrics` would change the column count or the rows touching the viewport.
    ///
    /// Scroll events that stay inside the same rows are not worth a dispatch.
    pub fn viewport_needs_update(&self, metrics: ViewportMetrics) -> bool {
        if column_count_for_width(metrics.viewport_width) != self.virtualizer.column_count {
            return true;
        }
        // Compare unclamped windows so a later page still sees the latest viewport height.
        self.virtualizer.window(metrics, usize::MAX)
            != self.virtualizer.window(self.viewport, usize::MAX)
    }

    /// Whether the initial page is still loading.
    pub fn is_initial_loading(&self) -> bool {
        !self.collection.initial_loaded() && self.in_flight.is_some()
    }
}

#[cfg(test)]
mod tests {
    use gallery_host::GalleryPage;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn overlay_urls_take_precedence() {
        let item = GalleryItem {
            key: "a.png".to_string(),
            display_url: "https://x/a.png?sig=old".to_string(),
            thumb_url: Some("https://x/a-thumb.png?sig=old".to_string()),
            byte_size: None,
            media_type: None,
            last_modified: None,
            container: None,
        };
        let mut state = GalleryState::default();
        state
            .collection
            .append(GalleryPage::new(vec![item.clone()], None));
        assert_eq!(state.urls_for(&item).display_url, "https://x/a.png?sig=old");

        Rc::make_mut(&mut state.url_overlay).insert(
            "a.png".to_string(),
            ItemUrls {
                display_url: "https://x/a.png?sig=new".to_string(),
                thumb_url: None,
            },
        );
        assert_eq!(state.urls_for(&item).display_url, "https://x/a.png?sig=new");
        assert_eq!(state.collection.items()[0], item);
    }

    #[test]
    fn scrolling_within_a_row_needs_no_update() {
        let mut state = GalleryState::default();
        state.viewport = ViewportMetrics {
            scroll_top: 0.0,
            viewport_height: 600.0,
            viewport_width: 1300.0,
        };
        state.virtualizer = Virtualizer::for_width(1300.0);

        let nudged = ViewportMetrics {
            scroll_top: 40.0,
            ..state.viewport
        };
        assert!(!state.viewport_needs_update(nudged));

        let next_row = ViewportMetrics {
            scroll_top: 300.0,
            ..state.viewport
        };
        assert!(state.viewport_needs_update(next_row));

        let narrower = ViewportMetrics {
            viewport_width: 700.0,
            ..state.viewport
        };
        assert!(state.viewport_needs_update(narrower));
    }
}
