//! Host service bundle injected into the gallery runtime.

use std::rc::Rc;

use crate::{
    access_url::{GalleryUrlService, NoopGalleryUrlService},
    credential::{CredentialRefreshService, NoopCredentialRefresh},
    listing::{GalleryListingService, NoopGalleryListing},
    retry::RetryPolicy,
};

/// Runtime-selected gallery service bundle.
///
/// Adapter selection (browser proxy adapters, in-memory fixtures) happens before this bundle
/// crosses into `gallery_runtime`, which keeps the runtime free of transport details.
#[derive(Clone)]
pub struct GalleryHostServices {
    /// Paginated listing service.
    pub listing: Rc<dyn GalleryListingService>,
    /// Credential refresh collaborator.
    pub credential: Rc<dyn CredentialRefreshService>,
    /// Access-URL minting service.
    pub urls: Rc<dyn GalleryUrlService>,
    /// Retry policy for transient listing failures.
    pub retry: RetryPolicy,
}

impl GalleryHostServices {
    /// Bundle of no-op adapters for unsupported targets.
    pub fn noop() -> Self {
        Self {
            listing: Rc::new(NoopGalleryListing),
            credential: Rc::new(NoopCredentialRefresh),
            urls: Rc::new(NoopGalleryUrlService),
            retry: RetryPolicy::default(),
        }
    }
}

impl std::fmt::Debug for GalleryHostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryHostServices")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
