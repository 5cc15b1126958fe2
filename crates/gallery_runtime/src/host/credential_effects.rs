use gallery_host::GalleryItem;
use leptos::{logging, spawn_local};

use crate::{
    host::GalleryHostContext, reducer::GalleryAction, runtime_context::GalleryRuntimeContext,
};

pub(super) fn refresh_credential(host: GalleryHostContext, runtime: GalleryRuntimeContext) {
    spawn_local(async move {
        let credential = host.credential_service();
        match credential.refresh().await {
            Ok(refreshed_at) => {
                logging::log!("gallery credential refreshed at {refreshed_at}");
                runtime.dispatch_action(GalleryAction::CredentialRefreshed);
            }
            Err(error) => {
                logging::warn!("gallery credential refresh failed: {error}");
                runtime.dispatch_action(GalleryAction::CredentialRefreshFailed { error });
            }
        }
    });
}

pub(super) fn refresh_item_urls(
    host: GalleryHostContext,
    runtime: GalleryRuntimeContext,
    generation: u64,
    items: Vec<GalleryItem>,
) {
    spawn_local(async move {
        let urls = host.url_service();
        match urls.refresh_urls(&items).await {
            Ok(items) => runtime.dispatch_action(GalleryAction::UrlsRefreshed { generation, items }),
            Err(err) => logging::warn!("gallery url refresh failed: {err}"),
        }
    });
}
