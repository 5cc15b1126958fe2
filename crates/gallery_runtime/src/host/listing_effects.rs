use std::time::Duration;

use leptos::{logging, set_timeout, spawn_local};

use crate::{
    host::GalleryHostContext, model::FetchTicket, reducer::GalleryAction,
    runtime_context::GalleryRuntimeContext,
};

pub(super) fn fetch_page(
    host: GalleryHostContext,
    runtime: GalleryRuntimeContext,
    ticket: FetchTicket,
) {
    spawn_local(async move {
        let listing = host.listing_service();
        match listing.fetch_page(ticket.cursor.as_deref()).await {
            Ok(page) => runtime.dispatch_action(GalleryAction::PageLoaded { ticket, page }),
            Err(error) => {
                logging::warn!(
                    "gallery page fetch failed (attempt {}): {error}",
                    ticket.attempt
                );
                runtime.dispatch_action(GalleryAction::PageFailed { ticket, error });
            }
        }
    });
}

pub(super) fn schedule_retry(runtime: GalleryRuntimeContext, ticket: FetchTicket, delay_ms: u64) {
    set_timeout(
        move || runtime.dispatch_action(GalleryAction::RetryDue { ticket }),
        Duration::from_millis(delay_ms),
    );
}
