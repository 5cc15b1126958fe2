//! Access-URL minting service contracts and adapters.

use std::{cell::RefCell, future::Future, pin::Pin, rc::Rc};

use crate::{blob_url::BlobUrlBuilder, error::GalleryError, item::GalleryItem};

/// Object-safe boxed future used by [`GalleryUrlService`].
pub type UrlFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service that mints fresh time-limited URLs.
pub trait GalleryUrlService {
    /// Mints a URL for one blob.
    fn mint_url<'a>(
        &'a self,
        container: &'a str,
        blob_name: &'a str,
    ) -> UrlFuture<'a, Result<String, GalleryError>>;

    /// Returns copies of `items` with re-minted `display_url`/`thumb_url`.
    fn refresh_urls<'a>(
        &'a self,
        items: &'a [GalleryItem],
    ) -> UrlFuture<'a, Result<Vec<GalleryItem>, GalleryError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// URL adapter that keeps existing URLs and cannot mint new ones.
pub struct NoopGalleryUrlService;

impl GalleryUrlService for NoopGalleryUrlService {
    fn mint_url<'a>(
        &'a self,
        container: &'a str,
        blob_name: &'a str,
    ) -> UrlFuture<'a, Result<String, GalleryError>> {
        Box::pin(async move {
            Err(GalleryError::Upstream {
                status: 501,
                message: format!("cannot mint a URL for {container}/{blob_name} on this host"),
            })
        })
    }

    fn refresh_urls<'a>(
        &'a self,
        items: &'a [GalleryItem],
    ) -> UrlFuture<'a, Result<Vec<GalleryItem>, GalleryError>> {
        Box::pin(async move { Ok(items.to_vec()) })
    }
}

#[derive(Debug, Clone)]
/// In-memory URL adapter signing with a replaceable token.
pub struct MemoryGalleryUrlService {
    urls: Rc<RefCell<BlobUrlBuilder>>,
}

impl MemoryGalleryUrlService {
    /// Creates an adapter minting URLs with `urls`.
    pub fn new(urls: BlobUrlBuilder) -> Self {
        Self {
            urls: Rc::new(RefCell::new(urls)),
        }
    }

    /// Replaces the signing token for subsequent calls.
    pub fn rotate_token(&self, sas_token: &str) {
        let next = self.urls.borrow().with_sas_token(sas_token);
        *self.urls.borrow_mut() = next;
    }
}

impl GalleryUrlService for MemoryGalleryUrlService {
    fn mint_url<'a>(
        &'a self,
        container: &'a str,
        blob_name: &'a str,
    ) -> UrlFuture<'a, Result<String, GalleryError>> {
        Box::pin(async move {
            Ok(self
                .urls
                .borrow()
                .for_container(container)
                .blob_url(blob_name))
        })
    }

    fn refresh_urls<'a>(
        &'a self,
        items: &'a [GalleryItem],
    ) -> UrlFuture<'a, Result<Vec<GalleryItem>, GalleryError>> {
        Box::pin(async move {
            let base = self.urls.borrow().clone();
            Ok(items
                .iter()
                .map(|item| {
                    let urls = match item.container.as_deref() {
                        Some(container) => base.for_container(container),
                        None => base.clone(),
                    };
                    GalleryItem {
                        display_url: urls.blob_url(&item.key),
                        thumb_url: urls.thumb_url(&item.key),
                        ..item.clone()
                    }
                })
                .collect())
        })
    }
}
