//! Listing Client: one upstream segment per call, normalized into a gallery page.

use std::sync::Arc;

use gallery_host::{normalize_entries, GalleryError, GalleryItem, GalleryPage};
use tracing::{debug, instrument};

use crate::{
    credential::CredentialStore,
    storage::{BlobListingBackend, ListBlobsRequest},
};

#[derive(Clone)]
/// Paginated listing over a storage backend, signed with the current credential.
pub struct ListingClient {
    backend: Arc<dyn BlobListingBackend>,
    credentials: CredentialStore,
    prefix: String,
    page_size: u32,
}

impl std::fmt::Debug for ListingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingClient")
            .field("backend", &self.backend.backend_tag())
            .field("prefix", &self.prefix)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl ListingClient {
    /// Creates a client listing `prefix` in pages of `page_size`.
    pub fn new(
        backend: Arc<dyn BlobListingBackend>,
        credentials: CredentialStore,
        prefix: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            backend,
            credentials,
            prefix: prefix.into(),
            page_size,
        }
    }

    /// Credential store shared with the HTTP layer.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Fetches the page at `cursor` (first page when `None`). No internal retry.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::AuthExpired`] when storage rejects the credential and
    /// [`GalleryError::Upstream`]/[`GalleryError::Transport`] for other failures.
    #[instrument(name = "listing_fetch_page", skip(self), fields(backend = self.backend.backend_tag()))]
    pub async fn fetch_page(&self, cursor: Option<&str>) -> Result<GalleryPage, GalleryError> {
        let urls = self.credentials.snapshot().await;
        let request = ListBlobsRequest {
            container: urls.container().to_string(),
            prefix: self.prefix.clone(),
            marker: cursor
                .map(str::trim)
                .filter(|cursor| !cursor.is_empty())
                .map(str::to_string),
            max_results: self.page_size,
        };
        let listing = self.backend.list_blobs(&request, urls.sas_token()).await?;
        let scanned = listing.entries.len();
        let page = normalize_entries(listing.entries, listing.next_marker, &urls);
        debug!(
            scanned,
            kept = page.items.len(),
            has_more = page.has_more(),
            "listing page normalized"
        );
        Ok(page)
    }

    /// Mints a fresh access URL for `blob_name` in `container`.
    pub async fn mint_url(&self, container: &str, blob_name: &str) -> String {
        self.credentials
            .snapshot()
            .await
            .for_container(container)
            .blob_url(blob_name)
    }

    /// Re-mints display and thumbnail URLs, keeping every other field.
    ///
    /// Items without a container use the configured one.
    pub async fn refresh_urls(&self, items: Vec<GalleryItem>) -> Vec<GalleryItem> {
        let urls = self.credentials.snapshot().await;
        items
            .into_iter()
            .map(|item| {
                let scoped = match item.container.as_deref() {
                    Some(container) if !container.trim().is_empty() => urls.for_container(container),
                    _ => urls.clone(),
                };
                GalleryItem {
                    display_url: scoped.blob_url(&item.key),
                    thumb_url: scoped.thumb_url(&item.key),
                    ..item
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use gallery_host::{BlobUrlBuilder, UpstreamEntry};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{credential::MemoryTokenRefresher, storage::MemoryBlobBackend};

    fn entry(name: &str) -> UpstreamEntry {
        UpstreamEntry {
            name: name.to_string(),
            content_length: Some(10),
            content_type: None,
            last_modified: Some("Wed, 09 Sep 2009 09:20:02 GMT".to_string()),
        }
    }

    fn client(backend: Arc<MemoryBlobBackend>, prefix: &str, page_size: u32) -> ListingClient {
        let credentials = CredentialStore::new(
            BlobUrlBuilder::new("https://acct.blob.core.windows.net", "images", "sig=a"),
            Arc::new(MemoryTokenRefresher::default()),
        );
        ListingClient::new(backend, credentials, prefix, page_size)
    }

    #[tokio::test]
    async fn pagination_visits_every_image_once_and_terminates() {
        let backend = Arc::new(MemoryBlobBackend::new(vec![
            entry("gallery/a.jpg"),
            entry("gallery/readme.md"),
            entry("gallery/b.PNG"),
            entry("gallery/c.webp"),
            entry("other/d.jpg"),
        ]));
        let client = client(backend.clone(), "gallery/", 2);

        let mut keys = Vec::new();
        let mut cursor: Option<String> = None;
        let mut calls = 0;
        loop {
            let page = client.fetch_page(cursor.as_deref()).await.expect("page");
            calls += 1;
            keys.extend(page.items.into_iter().map(|item| item.key));
            match page.continuation_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        assert_eq!(calls, 2);
        assert_eq!(keys, vec!["gallery/a.jpg", "gallery/b.PNG", "gallery/c.webp"]);
        assert_eq!(
            backend
                .requests()
                .into_iter()
                .map(|request| request.marker)
                .collect::<Vec<_>>(),
            vec![None, Some("2".to_string())]
        );
    }

    #[tokio::test]
    async fn auth_failures_surface_unchanged() {
        let backend = Arc::new(MemoryBlobBackend::new(vec![entry("a.jpg")]));
        backend.accept_only("sig=b");
        let err = client(backend, "", 10)
            .fetch_page(None)
            .await
            .expect_err("rejected");
        assert!(err.is_auth_expired());
    }

    #[tokio::test]
    async fn refreshed_urls_keep_metadata_and_use_item_container() {
        let backend = Arc::new(MemoryBlobBackend::new(Vec::new()));
        let client = client(backend, "", 10);
        let item = GalleryItem {
            key: "images/x.jpg".to_string(),
            display_url: "stale".to_string(),
            thumb_url: None,
            byte_size: Some(5),
            media_type: Some("image/jpeg".to_string()),
            last_modified: None,
            container: Some("archive".to_string()),
        };
        let refreshed = client.refresh_urls(vec![item]).await;
        assert_eq!(
            refreshed[0].display_url,
            "https://acct.blob.core.windows.net/archive/images/x.jpg?sig=a"
        );
        assert_eq!(
            refreshed[0].thumb_url.as_deref(),
            Some("https://acct.blob.core.windows.net/archive/thumbs/x.jpg?sig=a")
        );
        assert_eq!(refreshed[0].byte_size, Some(5));
    }
}
