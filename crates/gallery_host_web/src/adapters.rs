use std::rc::Rc;

use gallery_host::{GalleryHostServices, RetryPolicy};

use crate::{ProxyCredentialRefresh, ProxyEndpoint, ProxyGalleryListing, ProxyUrlService};

/// Builds the runtime service bundle backed by the proxy at `endpoint`.
pub fn build_gallery_services(endpoint: ProxyEndpoint) -> GalleryHostServices {
    GalleryHostServices {
        listing: Rc::new(ProxyGalleryListing::new(endpoint.clone())),
        credential: Rc::new(ProxyCredentialRefresh::new(endpoint.clone())),
        urls: Rc::new(ProxyUrlService::new(endpoint)),
        retry: RetryPolicy::default(),
    }
}

/// Builds the runtime service bundle for the proxy named by `GALLERY_API_BASE_URL` at compile
/// time (same origin when unset).
pub fn gallery_services_from_build_env() -> GalleryHostServices {
    build_gallery_services(ProxyEndpoint::from_build_env())
}
