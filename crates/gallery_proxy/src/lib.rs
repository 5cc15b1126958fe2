//! Listing proxy for the gallery: talks to the storage account with the shared-access token,
//! normalizes listing segments into gallery pages, mints fresh access URLs, and swaps the token
//! when the credential refresh collaborator hands out a new one.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod credential;
pub mod http;
pub mod listing;
pub mod storage;

use std::sync::Arc;

use gallery_host::{BlobUrlBuilder, GalleryConfig};

pub use credential::{CredentialStore, HttpTokenRefresher, MemoryTokenRefresher, TokenRefresher};
pub use http::{build_router, ApiError, AppState};
pub use listing::ListingClient;
pub use storage::{
    AzureBlobBackend, BlobListing, BlobListingBackend, ListBlobsRequest, MemoryBlobBackend,
};

/// Bind address used when `GALLERY_PROXY_BIND` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3001";
/// Environment key overriding the bind address.
pub const BIND_ADDR_KEY: &str = "GALLERY_PROXY_BIND";
/// Environment key switching logs to JSON lines.
pub const LOG_JSON_KEY: &str = "GALLERY_LOG_JSON";

/// Wires `config` to the given storage backend and token refresher.
pub fn app_state_with(
    config: &GalleryConfig,
    backend: Arc<dyn BlobListingBackend>,
    refresher: Arc<dyn TokenRefresher>,
) -> AppState {
    let urls = BlobUrlBuilder::new(&config.account_url, &config.container, &config.sas_token);
    let credentials = CredentialStore::new(urls, refresher);
    AppState::new(ListingClient::new(
        backend,
        credentials,
        config.blob_prefix.clone(),
        config.page_size,
    ))
}

/// Wires `config` to the storage account and the configured refresh endpoint.
pub fn app_state_from_config(config: &GalleryConfig) -> AppState {
    app_state_with(
        config,
        Arc::new(AzureBlobBackend::new(&config.account_url)),
        Arc::new(HttpTokenRefresher::new(&config.credential_refresh_url)),
    )
}
