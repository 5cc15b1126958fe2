//! Browser (`wasm32`) implementations of [`gallery_host`] service contracts.
//!
//! Every adapter talks to the gallery proxy over `fetch`; the browser never calls the storage
//! account directly and never holds the storage credential. The `bridge` module carries the JS
//! interop and a non-wasm shim so the adapters stay testable on the host target.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Adapter factories used by the site entry to build the runtime service bundle.
pub mod adapters;
mod bridge;
pub mod proxy;

pub use adapters::{build_gallery_services, gallery_services_from_build_env};
pub use bridge::open_in_new_tab;
pub use proxy::{ProxyCredentialRefresh, ProxyEndpoint, ProxyGalleryListing, ProxyUrlService};
