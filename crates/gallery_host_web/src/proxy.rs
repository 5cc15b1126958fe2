//! Gallery proxy adapters for the listing, credential, and URL service contracts.

use chrono::{DateTime, Utc};
use gallery_host::{
    decode_error_message, CredentialFuture, CredentialRefreshResponse, CredentialRefreshService,
    GalleryError, GalleryImagesResponse, GalleryItem, GalleryListingService, GalleryPage,
    GalleryUrlService, ListingFuture, RefreshUrlsRequest, SasUrlRequest, SasUrlResponse, UrlFuture,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::bridge::{self, BridgeResponse};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// Base address of the gallery proxy; empty means same origin.
pub struct ProxyEndpoint {
    base_url: String,
}

impl ProxyEndpoint {
    /// Creates an endpoint rooted at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Endpoint taken from the compile-time `GALLERY_API_BASE_URL` variable.
    pub fn from_build_env() -> Self {
        Self::new(option_env!("GALLERY_API_BASE_URL").unwrap_or_default())
    }

    /// `GET /gallery/images` URL for `cursor`.
    pub fn images_url(&self, cursor: Option<&str>) -> String {
        match cursor {
            Some(cursor) => format!(
                "{}/gallery/images?continuationToken={}",
                self.base_url,
                urlencoding::encode(cursor)
            ),
            None => format!("{}/gallery/images", self.base_url),
        }
    }

    /// `POST /gallery/sas-url` URL.
    pub fn sas_url(&self) -> String {
        format!("{}/gallery/sas-url", self.base_url)
    }

    /// `POST /gallery/refresh-urls` URL.
    pub fn refresh_urls_url(&self) -> String {
        format!("{}/gallery/refresh-urls", self.base_url)
    }

    /// `POST /gallery/credential/refresh` URL.
    pub fn credential_refresh_url(&self) -> String {
        format!("{}/gallery/credential/refresh", self.base_url)
    }
}

/// Interprets a bridge response: 2xx bodies are decoded, failures are mapped by status.
pub(crate) fn interpret_response<T: DeserializeOwned>(
    response: BridgeResponse,
) -> Result<T, GalleryError> {
    if !(200..300).contains(&response.status) {
        return Err(GalleryError::from_status(
            response.status,
            decode_error_message(response.status, &response.body),
        ));
    }
    serde_json::from_str(&response.body).map_err(|err| GalleryError::Transport {
        message: format!("invalid proxy response: {err}"),
    })
}

async fn send_json<T: DeserializeOwned>(
    method: &str,
    url: &str,
    body: Option<String>,
) -> Result<T, GalleryError> {
    let response = bridge::fetch_text(method, url, body)
        .await
        .map_err(GalleryError::transport)?;
    interpret_response(response)
}

async fn post_json<B: Serialize, T: DeserializeOwned>(
    url: &str,
    body: &B,
) -> Result<T, GalleryError> {
    let raw = serde_json::to_string(body).map_err(GalleryError::transport)?;
    send_json("POST", url, Some(raw)).await
}

#[derive(Debug, Clone, Default)]
/// Listing adapter backed by `GET /gallery/images`.
pub struct ProxyGalleryListing {
    endpoint: ProxyEndpoint,
}

impl ProxyGalleryListing {
    /// Creates a listing adapter for `endpoint`.
    pub fn new(endpoint: ProxyEndpoint) -> Self {
        Self { endpoint }
    }
}

impl GalleryListingService for ProxyGalleryListing {
    fn fetch_page<'a>(
        &'a self,
        cursor: Option<&'a str>,
    ) -> ListingFuture<'a, Result<GalleryPage, GalleryError>> {
        Box::pin(async move {
            let response: GalleryImagesResponse =
                send_json("GET", &self.endpoint.images_url(cursor), None).await?;
            Ok(GalleryPage::from(response))
        })
    }
}

#[derive(Debug, Clone, Default)]
/// Credential refresh adapter backed by `POST /gallery/credential/refresh`.
pub struct ProxyCredentialRefresh {
    endpoint: ProxyEndpoint,
}

impl ProxyCredentialRefresh {
    /// Creates a refresh adapter for `endpoint`.
    pub fn new(endpoint: ProxyEndpoint) -> Self {
        Self { endpoint }
    }
}

impl CredentialRefreshService for ProxyCredentialRefresh {
    fn refresh<'a>(&'a self) -> CredentialFuture<'a, Result<DateTime<Utc>, GalleryError>> {
        Box::pin(async move {
            let response: CredentialRefreshResponse =
                send_json("POST", &self.endpoint.credential_refresh_url(), None)
                    .await
                    .map_err(|err| match err {
                        GalleryError::Refresh { .. } => err,
                        other => GalleryError::Refresh {
                            message: other.to_string(),
                        },
                    })?;
            Ok(response.refreshed_at)
        })
    }
}

#[derive(Debug, Clone, Default)]
/// URL adapter backed by `POST /gallery/sas-url` and `POST /gallery/refresh-urls`.
pub struct ProxyUrlService {
    endpoint: ProxyEndpoint,
}

impl ProxyUrlService {
    /// Creates a URL adapter for `endpoint`.
    pub fn new(endpoint: ProxyEndpoint) -> Self {
        Self { endpoint }
    }
}

impl GalleryUrlService for ProxyUrlService {
    fn mint_url<'a>(
        &'a self,
        container: &'a str,
        blob_name: &'a str,
    ) -> UrlFuture<'a, Result<String, GalleryError>> {
        Box::pin(async move {
            let request = SasUrlRequest {
                container_name: Some(container.to_string()),
                blob_name: Some(blob_name.to_string()),
            };
            let response: SasUrlResponse = post_json(&self.endpoint.sas_url(), &request).await?;
            Ok(response.url)
        })
    }

    fn refresh_urls<'a>(
        &'a self,
        items: &'a [GalleryItem],
    ) -> UrlFuture<'a, Result<Vec<GalleryItem>, GalleryError>> {
        Box::pin(async move {
            let request = RefreshUrlsRequest {
                images: items.to_vec(),
            };
            post_json(&self.endpoint.refresh_urls_url(), &request).await
        })
    }
}
