//! Host-side runtime helpers for executing reducer effects against the injected services.
//!
//! Effects that touch the network go through the [`GalleryHostServices`] bundle; effects that touch
//! the page (scroll lock, focus, new tabs) live in the browser UI helpers.

mod browser_ui;
mod credential_effects;
mod listing_effects;

use std::rc::Rc;

pub(crate) use browser_ui::{grid_cell_dom_id, GRID_SCROLL_DOM_ID};

use gallery_host::{
    CredentialRefreshService, GalleryHostServices, GalleryListingService, GalleryUrlService,
};

use crate::{reducer::GalleryEffect, runtime_context::GalleryRuntimeContext};

#[derive(Clone)]
/// Service bundle for gallery runtime side effects.
pub struct GalleryHostContext {
    listing: Rc<dyn GalleryListingService>,
    credential: Rc<dyn CredentialRefreshService>,
    urls: Rc<dyn GalleryUrlService>,
}

impl Default for GalleryHostContext {
    fn default() -> Self {
        Self::new(GalleryHostServices::noop())
    }
}

impl GalleryHostContext {
    /// Wraps an injected service bundle.
    pub fn new(services: GalleryHostServices) -> Self {
        Self {
            listing: services.listing,
            credential: services.credential,
            urls: services.urls,
        }
    }

    /// Returns the configured listing service.
    pub fn listing_service(&self) -> Rc<dyn GalleryListingService> {
        self.listing.clone()
    }

    /// Returns the configured credential refresh collaborator.
    pub fn credential_service(&self) -> Rc<dyn CredentialRefreshService> {
        self.credential.clone()
    }

    /// Returns the configured access-URL service.
    pub fn url_service(&self) -> Rc<dyn GalleryUrlService> {
        self.urls.clone()
    }

    /// Executes a single [`GalleryEffect`] emitted by the reducer.
    pub fn run_runtime_effect(&self, runtime: GalleryRuntimeContext, effect: GalleryEffect) {
        match effect {
            GalleryEffect::FetchPage(ticket) => {
                listing_effects::fetch_page(self.clone(), runtime, ticket)
            }
            GalleryEffect::ScheduleRetry { ticket, delay_ms } => {
                listing_effects::schedule_retry(runtime, ticket, delay_ms)
            }
            GalleryEffect::RefreshCredential => {
                credential_effects::refresh_credential(self.clone(), runtime)
            }
            GalleryEffect::RefreshItemUrls { generation, items } => {
                credential_effects::refresh_item_urls(self.clone(), runtime, generation, items)
            }
            GalleryEffect::OpenOriginal {
                container,
                key,
                fallback_url,
            } => browser_ui::open_original(self.clone(), container, key, fallback_url),
            GalleryEffect::SetBodyScrollLocked(locked) => {
                browser_ui::set_body_scroll_locked(locked)
            }
            GalleryEffect::FocusGridCell {
                index,
                row_start_px,
            } => browser_ui::focus_grid_cell(index, row_start_px),
        }
    }
}
