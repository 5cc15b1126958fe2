//! Reducer actions, side-effect intents, and transition logic for the gallery runtime.

mod lightbox;

use std::rc::Rc;

use gallery_host::{GalleryError, GalleryItem, GalleryPage};
use thiserror::Error;

use crate::{
    model::{FetchTicket, GalleryState, ItemUrls, LoadFailure},
    virtualizer::{column_count_for_width, move_grid_focus, GridKey, ViewportMetrics},
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_gallery`] to mutate [`GalleryState`].
pub enum GalleryAction {
    /// The gallery view mounted; loads the first page when nothing is loaded yet.
    SessionStarted,
    /// The load-more sentinel reported its visibility.
    SentinelVisibility {
        /// Whether the sentinel intersects the (margin-extended) scroll root.
        visible: bool,
    },
    /// A page fetch completed.
    PageLoaded {
        /// Ticket the fetch was issued with.
        ticket: FetchTicket,
        /// Normalized page.
        page: GalleryPage,
    },
    /// A page fetch failed.
    PageFailed {
        /// Ticket the fetch was issued with.
        ticket: FetchTicket,
        /// Failure reported by the listing service.
        error: GalleryError,
    },
    /// A scheduled retry delay elapsed.
    RetryDue {
        /// Ticket to re-issue.
        ticket: FetchTicket,
    },
    /// User asked to retry the failed fetch.
    RetryLoad,
    /// User asked for a full reload from the first page.
    Reload,
    /// User asked to refresh the expired credential.
    RefreshCredential,
    /// The credential refresh collaborator succeeded.
    CredentialRefreshed,
    /// The credential refresh collaborator failed.
    CredentialRefreshFailed {
        /// Refresh failure.
        error: GalleryError,
    },
    /// Re-minted URLs arrived for realized items.
    UrlsRefreshed {
        /// Collection generation the request was issued in.
        generation: u64,
        /// Items carrying fresh URLs.
        items: Vec<GalleryItem>,
    },
    /// The grid scroll container was scrolled or resized.
    ViewportChanged {
        /// New measurements.
        metrics: ViewportMetrics,
    },
    /// Arrow key pressed inside the grid.
    GridKey {
        /// Direction.
        key: GridKey,
    },
    /// A grid cell received focus.
    GridFocused {
        /// Collection index of the cell.
        index: usize,
    },
    /// Open the lightbox on an item.
    OpenItem {
        /// Collection index.
        index: usize,
    },
    /// Show the next item, wrapping.
    NextItem,
    /// Show the previous item, wrapping.
    PrevItem,
    /// Close the lightbox.
    CloseLightbox,
    /// Mouse wheel over the lightbox image.
    ViewerWheel {
        /// Wheel `deltaY`.
        delta_y: f64,
    },
    /// Click on the lightbox image.
    ViewerToggleZoom,
    /// Pointer pressed on the lightbox image.
    ViewerDragStart {
        /// Pointer x.
        x: f64,
        /// Pointer y.
        y: f64,
    },
    /// Pointer moved over the lightbox image.
    ViewerDragMove {
        /// Pointer x.
        x: f64,
        /// Pointer y.
        y: f64,
    },
    /// Pointer released or left the lightbox image.
    ViewerDragEnd,
    /// Open the original of the lightbox item in a new tab.
    OpenOriginal,
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_gallery`] and executed by the runtime host.
pub enum GalleryEffect {
    /// Fetch one page through the listing service.
    FetchPage(FetchTicket),
    /// Dispatch [`GalleryAction::RetryDue`] after a delay.
    ScheduleRetry {
        /// Ticket to re-issue.
        ticket: FetchTicket,
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Call the credential refresh collaborator.
    RefreshCredential,
    /// Re-mint URLs for realized items.
    RefreshItemUrls {
        /// Collection generation at request time.
        generation: u64,
        /// Items to re-mint.
        items: Vec<GalleryItem>,
    },
    /// Mint a fresh URL for an item and open it in a new tab.
    OpenOriginal {
        /// Container of the blob, when known.
        container: Option<String>,
        /// Blob key.
        key: String,
        /// URL to open when minting is not possible.
        fallback_url: String,
    },
    /// Lock or unlock page scrolling behind the lightbox.
    SetBodyScrollLocked(bool),
    /// Move keyboard focus to a grid cell, scrolling it into view.
    FocusGridCell {
        /// Collection index.
        index: usize,
        /// Top offset of the cell's row.
        row_start_px: f64,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for actions that do not apply to the current state.
pub enum ReducerError {
    /// Navigation or lookup failure.
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    /// A completion arrived for a fetch that is no longer current; it was discarded.
    #[error("discarded stale completion from generation {generation}")]
    StaleCompletion {
        /// Generation the completion was issued in.
        generation: u64,
    },
    /// A lightbox action arrived while nothing was open.
    #[error("no item is open")]
    NothingOpen,
    /// Credential refresh requested while the credential is not expired.
    #[error("credential is not expired")]
    CredentialNotExpired,
    /// A refresh result arrived with no refresh in flight.
    #[error("no credential refresh is in flight")]
    NoRefreshInFlight,
    /// Credential refresh requested while a page fetch is still outstanding.
    #[error("a page fetch is in flight")]
    FetchInFlight,
}

fn issue_fetch(state: &mut GalleryState, cursor: Option<String>) -> GalleryEffect {
    let ticket = FetchTicket {
        generation: state.collection.generation(),
        cursor,
        attempt: 1,
    };
    state.in_flight = Some(ticket.clone());
    state.load_failure = None;
    GalleryEffect::FetchPage(ticket)
}

fn ensure_current(state: &GalleryState, ticket: &FetchTicket) -> Result<(), ReducerError> {
    if state.in_flight.as_ref() == Some(ticket) {
        Ok(())
    } else {
        Err(ReducerError::StaleCompletion {
            generation: ticket.generation,
        })
    }
}

fn focus_effect(state: &GalleryState, index: usize) -> GalleryEffect {
    let virtualizer = state.virtualizer;
    GalleryEffect::FocusGridCell {
        index,
        row_start_px: virtualizer.row_start(virtualizer.row_of(index)),
    }
}

/// Applies a [`GalleryAction`] to the session state and collects resulting side effects.
///
/// This function is the only place the collection, navigation, and credential state change.
///
/// # Errors
///
/// Returns [`ReducerError`] when the action does not apply: stale completions, out-of-range
/// navigation, lightbox actions with nothing open, or credential transitions outside the
/// expiry cycle. The state is left unchanged in every error case.
pub fn reduce_gallery(
    state: &mut GalleryState,
    action: GalleryAction,
) -> Result<Vec<GalleryEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        GalleryAction::SessionStarted => {
            if !state.collection.initial_loaded()
                && state.in_flight.is_none()
                && state.credential.is_active()
            {
                effects.push(issue_fetch(state, None));
            }
        }
        GalleryAction::SentinelVisibility { visible } => {
            let gate = state.trigger_gate();
            if state.trigger.observe(visible, gate) {
                let cursor = state.collection.next_cursor().map(str::to_string);
                effects.push(issue_fetch(state, cursor));
            }
        }
        GalleryAction::PageLoaded { ticket, page } => {
            ensure_current(state, &ticket)?;
            if state
                .collection
                .append_if_current(ticket.generation, page)
                .is_none()
            {
                return Err(ReducerError::StaleCompletion {
                    generation: ticket.generation,
                });
            }
            state.in_flight = None;
            state.load_failure = None;
            if state.credential.is_expired() {
                state.credential.restore();
            }
            state.trigger.rearm();
            state.navigation.revalidate(&state.collection);
        }
        GalleryAction::PageFailed { ticket, error } => {
            ensure_current(state, &ticket)?;
            if error.is_auth_expired() {
                state.in_flight = None;
                state.credential.expire(ticket.cursor, error);
            } else if let Some(delay) = state.retry.next_delay(ticket.attempt, &error) {
                let next = FetchTicket {
                    attempt: ticket.attempt + 1,
                    ..ticket
                };
                state.in_flight = Some(next.clone());
                effects.push(GalleryEffect::ScheduleRetry {
                    ticket: next,
                    delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                });
            } else {
                state.in_flight = None;
                state.load_failure = Some(LoadFailure {
                    error,
                    during_initial_load: !state.collection.initial_loaded(),
                });
            }
        }
        GalleryAction::RetryDue { ticket } => {
            ensure_current(state, &ticket)?;
            effects.push(GalleryEffect::FetchPage(ticket));
        }
        GalleryAction::RetryLoad => {
            if state.in_flight.is_some() || state.credential.is_refreshing() {
                return Ok(effects);
            }
            let cursor = if state.credential.is_expired() {
                Some(state.credential.pending_cursor().map(str::to_string))
            } else if !state.collection.initial_loaded() {
                Some(None)
            } else {
                state
                    .collection
                    .next_cursor()
                    .map(|cursor| Some(cursor.to_string()))
            };
            if let Some(cursor) = cursor {
                effects.push(issue_fetch(state, cursor));
            }
        }
        GalleryAction::Reload => {
            let was_open = state.navigation.is_open();
            state.collection.reset();
            state.navigation.revalidate(&state.collection);
            state.url_overlay = Default::default();
            state.in_flight = None;
            state.load_failure = None;
            state.trigger.rearm();
            state.grid_focus = None;
            state.viewer = Default::default();
            state.credential.restart_pending_from_first_page();
            if was_open {
                effects.push(GalleryEffect::SetBodyScrollLocked(false));
            }
            if state.credential.is_active() {
                effects.push(issue_fetch(state, None));
            }
        }
        GalleryAction::RefreshCredential => {
            if state.in_flight.is_some() {
                return Err(ReducerError::FetchInFlight);
            }
            if !state.credential.begin_refresh() {
                return Err(ReducerError::CredentialNotExpired);
            }
            effects.push(GalleryEffect::RefreshCredential);
        }
        GalleryAction::CredentialRefreshed => {
            let Some(cursor) = state.credential.refresh_succeeded() else {
                return Err(ReducerError::NoRefreshInFlight);
            };
            if state.in_flight.is_none() {
                effects.push(issue_fetch(state, cursor));
            }
            if !state.collection.is_empty() {
                effects.push(GalleryEffect::RefreshItemUrls {
                    generation: state.collection.generation(),
                    items: state.collection.items().to_vec(),
                });
            }
        }
        GalleryAction::CredentialRefreshFailed { error } => {
            if !state.credential.refresh_failed(error) {
                return Err(ReducerError::NoRefreshInFlight);
            }
        }
        GalleryAction::UrlsRefreshed { generation, items } => {
            if generation != state.collection.generation() {
                return Err(ReducerError::StaleCompletion { generation });
            }
            let known: Vec<GalleryItem> = items
                .into_iter()
                .filter(|item| state.collection.index_of(&item.key).is_some())
                .collect();
            if !known.is_empty() {
                let overlay = Rc::make_mut(&mut state.url_overlay);
                for item in known {
                    let urls = ItemUrls::from(&item);
                    overlay.insert(item.key, urls);
                }
            }
        }
        GalleryAction::ViewportChanged { metrics } => {
            state.viewport = metrics;
            state.virtualizer.column_count = column_count_for_width(metrics.viewport_width);
        }
        GalleryAction::GridKey { key } => {
            let len = state.collection.len();
            if let Some(next) =
                move_grid_focus(state.grid_focus, key, state.virtualizer.column_count, len)
            {
                state.grid_focus = Some(next);
                effects.push(focus_effect(state, next));
            }
        }
        GalleryAction::GridFocused { index } => {
            if index >= state.collection.len() {
                return Err(GalleryError::Index {
                    index,
                    len: state.collection.len(),
                }
                .into());
            }
            state.grid_focus = Some(index);
        }
        action @ (GalleryAction::OpenItem { .. }
        | GalleryAction::NextItem
        | GalleryAction::PrevItem
        | GalleryAction::CloseLightbox
        | GalleryAction::ViewerWheel { .. }
        | GalleryAction::ViewerToggleZoom
        | GalleryAction::ViewerDragStart { .. }
        | GalleryAction::ViewerDragMove { .. }
        | GalleryAction::ViewerDragEnd
        | GalleryAction::OpenOriginal) => {
            lightbox::reduce_lightbox(state, action, &mut effects)?;
        }
    }
    Ok(effects)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use futures::executor::block_on;
    use gallery_host::{
        BlobUrlBuilder, CredentialRefreshService, GalleryListingService, GalleryUrlService,
        MemoryCredentialRefresh, MemoryGalleryListing, MemoryGalleryUrlService, RetryPolicy,
    };
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::credential::CredentialState;

    fn item(key: &str) -> GalleryItem {
        GalleryItem {
            key: key.to_string(),
            display_url: format!("https://acct.blob.core.windows.net/images/{key}?sig=old"),
            thumb_url: None,
            byte_size: Some(1024),
            media_type: Some("image/png".to_string()),
            last_modified: None,
            container: Some("images".to_string()),
        }
    }

    fn items(count: usize) -> Vec<GalleryItem> {
        (0..count).map(|i| item(&format!("img-{i:03}.png"))).collect()
    }

    fn fetch_ticket(effects: &[GalleryEffect]) -> FetchTicket {
        effects
            .iter()
            .find_map(|effect| match effect {
                GalleryEffect::FetchPage(ticket) => Some(ticket.clone()),
                _ => None,
            })
            .expect("fetch effect")
    }

    fn count_fetches(effects: &[GalleryEffect]) -> usize {
        effects
            .iter()
            .filter(|effect| matches!(effect, GalleryEffect::FetchPage(_)))
            .count()
    }

    /// Executes effects against in-memory services the way the browser host does, with retry
    /// delays elapsing immediately.
    struct Harness {
        state: GalleryState,
        listing: MemoryGalleryListing,
        credential: MemoryCredentialRefresh,
        urls: MemoryGalleryUrlService,
        executed: Vec<GalleryEffect>,
    }

    impl Harness {
        fn new(all_items: Vec<GalleryItem>, page_size: usize) -> Self {
            Self {
                state: GalleryState::with_retry_policy(RetryPolicy::default()),
                listing: MemoryGalleryListing::new(all_items, page_size),
                credential: MemoryCredentialRefresh::default(),
                urls: MemoryGalleryUrlService::new(BlobUrlBuilder::new(
                    "https://acct.blob.core.windows.net",
                    "images",
                    "sig=old",
                )),
                executed: Vec::new(),
            }
        }

        fn dispatch(&mut self, action: GalleryAction) -> Result<(), ReducerError> {
            let mut queue: VecDeque<GalleryEffect> = reduce_gallery(&mut self.state, action)?.into();
            while let Some(effect) = queue.pop_front() {
                self.executed.push(effect.clone());
                let follow_up = match effect {
                    GalleryEffect::FetchPage(ticket) => {
                        match block_on(self.listing.fetch_page(ticket.cursor.as_deref())) {
                            Ok(page) => Some(GalleryAction::PageLoaded { ticket, page }),
                            Err(error) => Some(GalleryAction::PageFailed { ticket, error }),
                        }
                    }
                    GalleryEffect::ScheduleRetry { ticket, .. } => {
                        Some(GalleryAction::RetryDue { ticket })
                    }
                    GalleryEffect::RefreshCredential => match block_on(self.credential.refresh()) {
                        Ok(_) => Some(GalleryAction::CredentialRefreshed),
                        Err(error) => Some(GalleryAction::CredentialRefreshFailed { error }),
                    },
                    GalleryEffect::RefreshItemUrls { generation, items } => {
                        block_on(self.urls.refresh_urls(&items))
                            .ok()
                            .map(|items| GalleryAction::UrlsRefreshed { generation, items })
                    }
                    _ => None,
                };
                if let Some(action) = follow_up {
                    queue.extend(reduce_gallery(&mut self.state, action)?);
                }
            }
            Ok(())
        }

        fn keys(&self) -> Vec<String> {
            self.state
                .collection
                .items()
                .iter()
                .map(|item| item.key.clone())
                .collect()
        }
    }

    #[test]
    fn scrolling_to_the_sentinel_loads_the_next_cursor_exactly_once() {
        let mut state = GalleryState::default();
        let effects = reduce_gallery(&mut state, GalleryAction::SessionStarted).expect("start");
        let first = fetch_ticket(&effects);
        assert_eq!(first.cursor, None);

        reduce_gallery(
            &mut state,
            GalleryAction::PageLoaded {
                ticket: first,
                page: GalleryPage::new(items(3), Some("abc".to_string())),
            },
        )
        .expect("page");

        let effects = reduce_gallery(&mut state, GalleryAction::SentinelVisibility { visible: true })
            .expect("visible");
        assert_eq!(count_fetches(&effects), 1);
        assert_eq!(fetch_ticket(&effects).cursor.as_deref(), Some("abc"));

        for _ in 0..3 {
            let effects =
                reduce_gallery(&mut state, GalleryAction::SentinelVisibility { visible: true })
                    .expect("still visible");
            assert_eq!(count_fetches(&effects), 0);
        }
    }

    #[test]
    fn sentinel_before_first_page_does_not_fetch() {
        let mut state = GalleryState::default();
        let effects = reduce_gallery(&mut state, GalleryAction::SentinelVisibility { visible: true })
            .expect("visible");
        assert!(effects.is_empty());
    }

    #[test]
    fn pagination_terminates_with_every_item_once() {
        let mut harness = Harness::new(items(10), 4);
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        for _ in 0..10 {
            harness
                .dispatch(GalleryAction::SentinelVisibility { visible: true })
                .expect("visible");
            harness
                .dispatch(GalleryAction::SentinelVisibility { visible: false })
                .expect("hidden");
        }
        assert_eq!(harness.state.collection.len(), 10);
        assert!(!harness.state.collection.has_more());
        assert_eq!(
            harness.listing.requested_cursors(),
            vec![None, Some("4".to_string()), Some("8".to_string())]
        );
        let mut keys = harness.keys();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 10);
    }

    #[test]
    fn rearm_after_page_lets_a_visible_sentinel_fetch_again() {
        let mut harness = Harness::new(items(9), 3);
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        harness
            .dispatch(GalleryAction::SentinelVisibility { visible: true })
            .expect("visible");
        assert_eq!(harness.state.collection.len(), 6);
        // Page landed and re-armed; the view re-observes and reports the same visibility.
        harness
            .dispatch(GalleryAction::SentinelVisibility { visible: true })
            .expect("re-observed");
        assert_eq!(harness.state.collection.len(), 9);
    }

    #[test]
    fn stale_completion_after_reload_is_discarded() {
        let mut state = GalleryState::default();
        let effects = reduce_gallery(&mut state, GalleryAction::SessionStarted).expect("start");
        let stale = fetch_ticket(&effects);

        let effects = reduce_gallery(&mut state, GalleryAction::Reload).expect("reload");
        let fresh = fetch_ticket(&effects);
        assert_ne!(stale.generation, fresh.generation);

        let before = state.clone();
        assert_eq!(
            reduce_gallery(
                &mut state,
                GalleryAction::PageLoaded {
                    ticket: stale.clone(),
                    page: GalleryPage::new(items(2), None),
                },
            ),
            Err(ReducerError::StaleCompletion {
                generation: stale.generation
            })
        );
        assert_eq!(state, before);

        reduce_gallery(
            &mut state,
            GalleryAction::PageLoaded {
                ticket: fresh,
                page: GalleryPage::new(items(1), None),
            },
        )
        .expect("fresh page");
        assert_eq!(state.collection.len(), 1);
    }

    #[test]
    fn transient_failures_retry_up_to_three_attempts() {
        let mut harness = Harness::new(items(2), 10);
        for _ in 0..3 {
            harness
                .listing
                .push_failure(GalleryError::from_status(500, "busy"));
        }
        harness.dispatch(GalleryAction::SessionStarted).expect("start");

        assert_eq!(harness.listing.requested_cursors().len(), 3);
        let delays: Vec<_> = harness
            .executed
            .iter()
            .filter_map(|effect| match effect {
                GalleryEffect::ScheduleRetry { delay_ms, .. } => Some(*delay_ms),
                _ => None,
            })
            .collect();
        assert_eq!(delays, vec![500, 1000]);
        let failure = harness.state.load_failure.clone().expect("load failure");
        assert!(failure.during_initial_load);
        assert!(harness.state.in_flight.is_none());

        harness.dispatch(GalleryAction::RetryLoad).expect("retry");
        assert_eq!(harness.state.collection.len(), 2);
        assert_eq!(harness.state.load_failure, None);
    }

    #[test]
    fn transient_failure_recovers_within_attempts() {
        let mut harness = Harness::new(items(2), 10);
        harness
            .listing
            .push_failure(GalleryError::transport("connection reset"));
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        assert_eq!(harness.state.collection.len(), 2);
        assert_eq!(harness.state.load_failure, None);
    }

    #[test]
    fn expired_credential_suppresses_loads_until_refresh_then_retries_same_cursor() {
        let mut harness = Harness::new(items(6), 2);
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        harness
            .listing
            .push_failure(GalleryError::from_status(403, "AuthenticationFailed"));
        harness
            .dispatch(GalleryAction::SentinelVisibility { visible: true })
            .expect("visible");

        assert!(harness.state.credential.is_expired());
        assert_eq!(harness.state.credential.pending_cursor(), Some("2"));
        assert_eq!(harness.state.load_failure, None);
        let requests_before = harness.listing.requested_cursors().len();
        assert_eq!(requests_before, 2);

        harness
            .dispatch(GalleryAction::SentinelVisibility { visible: false })
            .expect("hidden");
        harness
            .dispatch(GalleryAction::SentinelVisibility { visible: true })
            .expect("visible again");
        assert_eq!(harness.listing.requested_cursors().len(), requests_before);

        harness.urls.rotate_token("sig=new");
        harness
            .dispatch(GalleryAction::RefreshCredential)
            .expect("refresh");

        assert!(harness.state.credential.is_active());
        assert_eq!(harness.credential.calls(), 1);
        assert_eq!(
            harness.listing.requested_cursors().last(),
            Some(&Some("2".to_string()))
        );
        assert_eq!(harness.state.collection.len(), 4);
        let first = harness.state.collection.get(0).cloned().expect("first item");
        assert_eq!(
            harness.state.urls_for(&first).display_url,
            "https://acct.blob.core.windows.net/images/img-000.png?sig=new"
        );
        assert_eq!(first.display_url, item("img-000.png").display_url);
    }

    #[test]
    fn auth_failures_are_never_retried() {
        let mut harness = Harness::new(items(2), 10);
        harness
            .listing
            .push_failure(GalleryError::from_status(403, "expired"));
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        assert_eq!(harness.listing.requested_cursors().len(), 1);
        assert!(harness
            .executed
            .iter()
            .all(|effect| !matches!(effect, GalleryEffect::ScheduleRetry { .. })));
    }

    #[test]
    fn failed_refresh_returns_to_expired_with_distinct_error() {
        let mut harness = Harness::new(items(2), 10);
        harness
            .listing
            .push_failure(GalleryError::from_status(403, "expired"));
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        harness.credential.push_outcome(Err(GalleryError::Refresh {
            message: "token endpoint returned no token".to_string(),
        }));
        harness
            .dispatch(GalleryAction::RefreshCredential)
            .expect("refresh");

        match &harness.state.credential {
            CredentialState::Expired {
                listing_error,
                refresh_error,
                ..
            } => {
                assert!(listing_error.is_auth_expired());
                assert!(matches!(refresh_error, Some(GalleryError::Refresh { .. })));
            }
            other => panic!("unexpected credential state {other:?}"),
        }
        assert!(harness.state.collection.is_empty());
    }

    #[test]
    fn user_retry_is_allowed_while_expired() {
        let mut harness = Harness::new(items(2), 10);
        harness
            .listing
            .push_failure(GalleryError::from_status(403, "expired"));
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        assert!(harness.state.credential.is_expired());

        harness.dispatch(GalleryAction::RetryLoad).expect("retry");
        assert!(harness.state.credential.is_active());
        assert_eq!(harness.state.collection.len(), 2);
    }

    #[test]
    fn refresh_outside_expiry_is_rejected() {
        let mut state = GalleryState::default();
        assert_eq!(
            reduce_gallery(&mut state, GalleryAction::RefreshCredential),
            Err(ReducerError::CredentialNotExpired)
        );
        assert_eq!(
            reduce_gallery(&mut state, GalleryAction::CredentialRefreshed),
            Err(ReducerError::NoRefreshInFlight)
        );
    }

    #[test]
    fn refresh_waits_for_an_outstanding_user_retry() {
        let mut state = GalleryState::default();
        let effects = reduce_gallery(&mut state, GalleryAction::SessionStarted).expect("start");
        let first = fetch_ticket(&effects);
        reduce_gallery(
            &mut state,
            GalleryAction::PageLoaded {
                ticket: first,
                page: GalleryPage::new(items(2), Some("abc".to_string())),
            },
        )
        .expect("page");
        let effects = reduce_gallery(&mut state, GalleryAction::SentinelVisibility { visible: true })
            .expect("visible");
        reduce_gallery(
            &mut state,
            GalleryAction::PageFailed {
                ticket: fetch_ticket(&effects),
                error: GalleryError::from_status(403, "expired"),
            },
        )
        .expect("expired");

        let effects = reduce_gallery(&mut state, GalleryAction::RetryLoad).expect("retry");
        let retry = fetch_ticket(&effects);
        assert_eq!(
            reduce_gallery(&mut state, GalleryAction::RefreshCredential),
            Err(ReducerError::FetchInFlight)
        );
        assert!(state.credential.is_expired());

        reduce_gallery(
            &mut state,
            GalleryAction::PageFailed {
                ticket: retry,
                error: GalleryError::from_status(403, "still expired"),
            },
        )
        .expect("retry rejected");
        assert_eq!(
            reduce_gallery(&mut state, GalleryAction::RefreshCredential).expect("refresh"),
            vec![GalleryEffect::RefreshCredential]
        );
        let effects =
            reduce_gallery(&mut state, GalleryAction::CredentialRefreshed).expect("refreshed");
        assert!(state.credential.is_active());
        assert_eq!(fetch_ticket(&effects).cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn pointer_and_focus_actions_leave_loaded_items_shared() {
        let mut harness = Harness::new(items(50), 50);
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        reduce_gallery(&mut harness.state, GalleryAction::OpenItem { index: 3 }).expect("open");
        reduce_gallery(&mut harness.state, GalleryAction::ViewerToggleZoom).expect("zoom");
        reduce_gallery(
            &mut harness.state,
            GalleryAction::ViewerDragStart { x: 0.0, y: 0.0 },
        )
        .expect("drag start");

        let before = harness.state.clone();
        let mut after = before.clone();
        for action in [
            GalleryAction::ViewerDragMove { x: 12.0, y: 4.0 },
            GalleryAction::SentinelVisibility { visible: true },
            GalleryAction::GridFocused { index: 7 },
        ] {
            reduce_gallery(&mut after, action).expect("action");
        }
        assert!(after.collection.shares_storage_with(&before.collection));
        assert!(Rc::ptr_eq(&after.url_overlay, &before.url_overlay));
        assert_ne!(after, before);
    }

    #[test]
    fn viewport_width_drives_columns_and_grid_keys() {
        let mut harness = Harness::new(items(10), 20);
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        harness
            .dispatch(GalleryAction::ViewportChanged {
                metrics: ViewportMetrics {
                    scroll_top: 0.0,
                    viewport_height: 800.0,
                    viewport_width: 900.0,
                },
            })
            .expect("viewport");
        assert_eq!(harness.state.virtualizer.column_count, 4);

        let effects = reduce_gallery(
            &mut harness.state,
            GalleryAction::GridKey {
                key: GridKey::Right,
            },
        )
        .expect("first key");
        assert_eq!(harness.state.grid_focus, Some(0));
        assert_eq!(
            effects,
            vec![GalleryEffect::FocusGridCell {
                index: 0,
                row_start_px: 0.0
            }]
        );

        reduce_gallery(&mut harness.state, GalleryAction::GridKey { key: GridKey::Down })
            .expect("down");
        let effects =
            reduce_gallery(&mut harness.state, GalleryAction::GridKey { key: GridKey::Down })
                .expect("down");
        assert_eq!(harness.state.grid_focus, Some(8));
        assert_eq!(
            effects,
            vec![GalleryEffect::FocusGridCell {
                index: 8,
                row_start_px: 560.0
            }]
        );
        reduce_gallery(&mut harness.state, GalleryAction::GridKey { key: GridKey::Down })
            .expect("down clamps");
        assert_eq!(harness.state.grid_focus, Some(9));
    }

    #[test]
    fn reload_resets_collection_and_closes_lightbox() {
        let mut harness = Harness::new(items(3), 10);
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        let effects =
            reduce_gallery(&mut harness.state, GalleryAction::OpenItem { index: 1 }).expect("open");
        assert_eq!(effects, vec![GalleryEffect::SetBodyScrollLocked(true)]);

        let effects = reduce_gallery(&mut harness.state, GalleryAction::Reload).expect("reload");
        assert_eq!(effects[0], GalleryEffect::SetBodyScrollLocked(false));
        assert_eq!(count_fetches(&effects), 1);
        assert!(harness.state.collection.is_empty());
        assert!(!harness.state.navigation.is_open());
        assert!(harness.state.url_overlay.is_empty());
    }

    #[test]
    fn url_refresh_for_old_generation_is_dropped() {
        let mut harness = Harness::new(items(2), 10);
        harness.dispatch(GalleryAction::SessionStarted).expect("start");
        let old_generation = harness.state.collection.generation();
        reduce_gallery(&mut harness.state, GalleryAction::Reload).expect("reload");
        assert_eq!(
            reduce_gallery(
                &mut harness.state,
                GalleryAction::UrlsRefreshed {
                    generation: old_generation,
                    items: items(2),
                },
            ),
            Err(ReducerError::StaleCompletion {
                generation: old_generation
            })
        );
        assert!(harness.state.url_overlay.is_empty());
    }
}
