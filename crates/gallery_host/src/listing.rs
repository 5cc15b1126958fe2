//! Paginated listing service contracts and adapters.

use std::{cell::RefCell, collections::VecDeque, future::Future, pin::Pin, rc::Rc};

use crate::{
    error::GalleryError,
    item::{GalleryItem, GalleryPage},
};

/// Object-safe boxed future used by [`GalleryListingService`].
pub type ListingFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host service that fetches one page of gallery items.
///
/// Implementations perform no internal retry; transient failures are surfaced unchanged so the
/// runtime can apply its own retry policy and route auth failures to credential handling.
pub trait GalleryListingService {
    /// Fetches the page that starts at `cursor` (`None` for the first page).
    fn fetch_page<'a>(
        &'a self,
        cursor: Option<&'a str>,
    ) -> ListingFuture<'a, Result<GalleryPage, GalleryError>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// Listing adapter that always reports an empty, exhausted collection.
pub struct NoopGalleryListing;

impl GalleryListingService for NoopGalleryListing {
    fn fetch_page<'a>(
        &'a self,
        _cursor: Option<&'a str>,
    ) -> ListingFuture<'a, Result<GalleryPage, GalleryError>> {
        Box::pin(async { Ok(GalleryPage::default()) })
    }
}

#[derive(Debug, Default)]
struct MemoryListingInner {
    items: Vec<GalleryItem>,
    page_size: usize,
    failures: VecDeque<GalleryError>,
    requested: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default)]
/// In-memory listing adapter paging over a fixed item list with offset cursors.
///
/// Queued failures are returned (one per call) before any page is served, and every requested
/// cursor is recorded for assertions.
pub struct MemoryGalleryListing {
    inner: Rc<RefCell<MemoryListingInner>>,
}

impl MemoryGalleryListing {
    /// Creates an adapter serving `items` in pages of `page_size`.
    pub fn new(items: Vec<GalleryItem>, page_size: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryListingInner {
                items,
                page_size: page_size.max(1),
                ..MemoryListingInner::default()
            })),
        }
    }

    /// Queues a failure for the next call.
    pub fn push_failure(&self, err: GalleryError) {
        self.inner.borrow_mut().failures.push_back(err);
    }

    /// Cursors passed to [`GalleryListingService::fetch_page`], in call order.
    pub fn requested_cursors(&self) -> Vec<Option<String>> {
        self.inner.borrow().requested.clone()
    }
}

impl GalleryListingService for MemoryGalleryListing {
    fn fetch_page<'a>(
        &'a self,
        cursor: Option<&'a str>,
    ) -> ListingFuture<'a, Result<GalleryPage, GalleryError>> {
        Box::pin(async move {
            let mut inner = self.inner.borrow_mut();
            inner.requested.push(cursor.map(str::to_string));
            if let Some(err) = inner.failures.pop_front() {
                return Err(err);
            }
            let offset = match cursor {
                Some(raw) => raw.parse::<usize>().map_err(|_| GalleryError::Upstream {
                    status: 400,
                    message: format!("unknown continuation token `{raw}`"),
                })?,
                None => 0,
            };
            let end = offset.saturating_add(inner.page_size).min(inner.items.len());
            let items = inner
                .items
                .get(offset..end)
                .map(<[GalleryItem]>::to_vec)
                .unwrap_or_default();
            let next = (end < inner.items.len()).then(|| end.to_string());
            Ok(GalleryPage::new(items, next))
        })
    }
}
