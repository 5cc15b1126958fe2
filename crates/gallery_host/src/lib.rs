//! Typed gallery contracts and shared models used by the browser runtime, browser adapters, and
//! the listing proxy.
//!
//! This crate is the API-first boundary for the gallery. It exposes the item/page models, the
//! proxy wire format, the error taxonomy, configuration loading, and the async service traits
//! (listing, credential refresh, access URLs) while concrete browser adapters live in
//! `gallery_host_web` and the storage-facing implementation lives in `gallery_proxy`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod access_url;
pub mod blob_url;
pub mod config;
pub mod credential;
pub mod error;
pub mod host;
pub mod item;
pub mod listing;
pub mod retry;
pub mod wire;

pub use access_url::{GalleryUrlService, MemoryGalleryUrlService, NoopGalleryUrlService, UrlFuture};
pub use blob_url::{derive_thumb_blob_name, normalize_sas_token, BlobUrlBuilder};
pub use config::{
    GalleryConfig, ACCOUNT_URL_KEY, BLOB_PREFIX_KEY, CONTAINER_KEY, CREDENTIAL_REFRESH_URL_KEY,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PAGE_SIZE_KEY, SAS_TOKEN_KEY,
};
pub use credential::{
    CredentialFuture, CredentialRefreshService, MemoryCredentialRefresh, NoopCredentialRefresh,
};
pub use error::{ConfigError, GalleryError};
pub use host::GalleryHostServices;
pub use item::{
    is_image_entry, normalize_entries, GalleryItem, GalleryPage, UpstreamEntry,
    IMAGE_FILE_EXTENSIONS,
};
pub use listing::{GalleryListingService, ListingFuture, MemoryGalleryListing, NoopGalleryListing};
pub use retry::RetryPolicy;
pub use wire::{
    decode_error_message, CredentialRefreshResponse, ErrorBody, GalleryImagesQuery,
    GalleryImagesResponse, HealthResponse, RefreshUrlsRequest, SasUrlRequest, SasUrlResponse,
    TokenRefreshPayload,
};
