//! Storage-account listing backends.
//!
//! [`AzureBlobBackend`] calls the "list blobs" REST operation and parses its XML enumeration
//! result. [`MemoryBlobBackend`] serves a fixed entry set with the same marker and credential
//! semantics for tests and local runs.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use gallery_host::{GalleryError, UpstreamEntry};
use serde::Deserialize;
use tracing::{instrument, warn};
use url::{form_urlencoded, Url};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One "list blobs" call.
pub struct ListBlobsRequest {
    /// Container to enumerate.
    pub container: String,
    /// Blob-name prefix; empty lists everything.
    pub prefix: String,
    /// Continuation marker from the previous segment.
    pub marker: Option<String>,
    /// Page size.
    pub max_results: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
/// One listing segment.
pub struct BlobListing {
    /// Entries in storage order.
    pub entries: Vec<UpstreamEntry>,
    /// Marker for the next segment; absent or empty at the end.
    pub next_marker: Option<String>,
}

#[async_trait]
/// Upstream paginated listing operation.
pub trait BlobListingBackend: Send + Sync + 'static {
    /// Short backend name used in logs.
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    /// Lists one segment, authenticating with `sas_token`.
    async fn list_blobs(
        &self,
        request: &ListBlobsRequest,
        sas_token: &str,
    ) -> Result<BlobListing, GalleryError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnumerationResultsXml {
    #[serde(default)]
    blobs: BlobsXml,
    #[serde(default)]
    next_marker: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BlobsXml {
    #[serde(rename = "Blob", default)]
    blob: Vec<BlobXml>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlobXml {
    name: String,
    #[serde(default)]
    properties: BlobPropertiesXml,
}

#[derive(Debug, Default, Deserialize)]
struct BlobPropertiesXml {
    #[serde(rename = "Last-Modified", default)]
    last_modified: Option<String>,
    #[serde(rename = "Content-Length", default)]
    content_length: Option<String>,
    #[serde(rename = "Content-Type", default)]
    content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StorageErrorXml {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses an `EnumerationResults` document into a [`BlobListing`].
///
/// # Errors
///
/// Returns [`GalleryError::Transport`] when the document is not a valid enumeration result.
pub fn parse_enumeration_results(xml: &str) -> Result<BlobListing, GalleryError> {
    let xml = xml.trim_start_matches('\u{feff}');
    let parsed: EnumerationResultsXml = quick_xml::de::from_str(xml)
        .map_err(|err| GalleryError::transport(format!("invalid listing document: {err}")))?;
    let entries = parsed
        .blobs
        .blob
        .into_iter()
        .map(|blob| UpstreamEntry {
            name: blob.name,
            content_length: blob
                .properties
                .content_length
                .and_then(|value| value.trim().parse().ok()),
            content_type: non_blank(blob.properties.content_type),
            last_modified: non_blank(blob.properties.last_modified),
        })
        .collect();
    Ok(BlobListing {
        entries,
        next_marker: non_blank(parsed.next_marker),
    })
}

/// Extracts a readable message from a storage error document, falling back to the raw body.
pub fn storage_error_message(status: u16, body: &str) -> String {
    let body = body.trim_start_matches('\u{feff}').trim();
    if let Ok(parsed) = quick_xml::de::from_str::<StorageErrorXml>(body) {
        match (non_blank(parsed.code), non_blank(parsed.message)) {
            (Some(code), Some(message)) => return format!("{code}: {message}"),
            (Some(code), None) => return code,
            (None, Some(message)) => return message,
            (None, None) => {}
        }
    }
    if body.is_empty() {
        format!("storage request failed with status {status}")
    } else {
        body.chars().take(256).collect()
    }
}

/// Builds the "list blobs" URL, appending the raw shared-access token untouched.
///
/// # Errors
///
/// Returns [`GalleryError::Transport`] when the account URL cannot be parsed.
pub fn list_blobs_url(
    account_url: &str,
    request: &ListBlobsRequest,
    sas_token: &str,
) -> Result<String, GalleryError> {
    let base = Url::parse(&format!(
        "{}/{}",
        account_url.trim_end_matches('/'),
        request.container
    ))
    .map_err(|err| GalleryError::transport(format!("invalid account url: {err}")))?;

    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("restype", "container")
        .append_pair("comp", "list")
        .append_pair("maxresults", &request.max_results.to_string());
    if !request.prefix.is_empty() {
        query.append_pair("prefix", &request.prefix);
    }
    if let Some(marker) = request.marker.as_deref().filter(|marker| !marker.is_empty()) {
        query.append_pair("marker", marker);
    }
    let query = query.finish();

    let sas = sas_token.trim().trim_start_matches('?');
    Ok(if sas.is_empty() {
        format!("{base}?{query}")
    } else {
        format!("{base}?{sas}&{query}")
    })
}

#[derive(Debug, Clone)]
/// Azure-Blob-style REST backend.
pub struct AzureBlobBackend {
    account_url: String,
    client: reqwest::Client,
}

impl AzureBlobBackend {
    /// Creates a backend for the storage account at `account_url`.
    pub fn new(account_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            account_url: account_url.into(),
            client,
        }
    }
}

#[async_trait]
impl BlobListingBackend for AzureBlobBackend {
    fn backend_tag(&self) -> &'static str {
        "azure-blob"
    }

    #[instrument(
        name = "storage_list_blobs",
        skip(self, sas_token),
        fields(container = %request.container, marker = ?request.marker)
    )]
    async fn list_blobs(
        &self,
        request: &ListBlobsRequest,
        sas_token: &str,
    ) -> Result<BlobListing, GalleryError> {
        let url = list_blobs_url(&self.account_url, request, sas_token)?;
        let response = self
            .client
            .get(url)
            .header("x-ms-version", "2021-08-06")
            .send()
            .await
            .map_err(GalleryError::transport)?;
        let status = response.status();
        let body = response.text().await.map_err(GalleryError::transport)?;
        if !status.is_success() {
            let message = storage_error_message(status.as_u16(), &body);
            warn!(status = status.as_u16(), %message, "storage listing rejected");
            return Err(GalleryError::from_status(status.as_u16(), message));
        }
        parse_enumeration_results(&body)
    }
}

#[derive(Debug, Default)]
struct MemoryBackendState {
    accepted_token: Option<String>,
    failures: VecDeque<GalleryError>,
    requests: Vec<ListBlobsRequest>,
}

#[derive(Debug, Default)]
/// In-memory backend using decimal offsets as markers.
pub struct MemoryBlobBackend {
    entries: Vec<UpstreamEntry>,
    state: Mutex<MemoryBackendState>,
}

impl MemoryBlobBackend {
    /// Creates a backend over `entries`, accepting any token.
    pub fn new(entries: Vec<UpstreamEntry>) -> Self {
        Self {
            entries,
            state: Mutex::new(MemoryBackendState::default()),
        }
    }

    /// Only accepts `token` (compared after normalization); other tokens get a 403.
    pub fn accept_only(&self, token: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.accepted_token = Some(gallery_host::normalize_sas_token(token));
        }
    }

    /// Queues a failure returned by the next call before any listing happens.
    pub fn push_failure(&self, err: GalleryError) {
        if let Ok(mut state) = self.state.lock() {
            state.failures.push_back(err);
        }
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ListBlobsRequest> {
        self.state
            .lock()
            .map(|state| state.requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl BlobListingBackend for MemoryBlobBackend {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn list_blobs(
        &self,
        request: &ListBlobsRequest,
        sas_token: &str,
    ) -> Result<BlobListing, GalleryError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| GalleryError::transport("memory backend lock poisoned"))?;
        state.requests.push(request.clone());
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        if let Some(accepted) = state.accepted_token.as_deref() {
            if gallery_host::normalize_sas_token(sas_token) != accepted {
                return Err(GalleryError::from_status(
                    403,
                    "AuthenticationFailed: Signature not valid in the specified time frame",
                ));
            }
        }

        let start = match request.marker.as_deref() {
            Some(marker) => marker.parse::<usize>().map_err(|_| GalleryError::Upstream {
                status: 400,
                message: format!("invalid marker `{marker}`"),
            })?,
            None => 0,
        };
        let matching: Vec<&UpstreamEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.name.starts_with(&request.prefix))
            .collect();
        let page_size = (request.max_results as usize).max(1);
        let end = (start + page_size).min(matching.len());
        let entries = matching
            .get(start..end)
            .unwrap_or_default()
            .iter()
            .map(|entry| (*entry).clone())
            .collect();
        let next_marker = (end < matching.len()).then(|| end.to_string());
        Ok(BlobListing {
            entries,
            next_marker,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const LISTING_XML: &str = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\
<EnumerationResults ServiceEndpoint=\"https://acct.blob.core.windows.net/\" ContainerName=\"images\">\
<Prefix>gallery/</Prefix><MaxResults>2</MaxResults>\
<Blobs>\
<Blob><Name>gallery/a.jpg</Name><Properties>\
<Last-Modified>Wed, 09 Sep 2009 09:20:02 GMT</Last-Modified>\
<Content-Length>2048</Content-Length><Content-Type>image/jpeg</Content-Type>\
</Properties></Blob>\
<Blob><Name>gallery/notes.txt</Name><Properties>\
<Content-Length>12</Content-Length><Content-Type>text/plain</Content-Type>\
</Properties></Blob>\
</Blobs>\
<NextMarker>2!72!MDAwMDE</NextMarker>\
</EnumerationResults>";

    #[test]
    fn enumeration_results_parse_entries_and_marker() {
        let listing = parse_enumeration_results(LISTING_XML).expect("parse listing");
        assert_eq!(listing.entries.len(), 2);
        assert_eq!(
            listing.entries[0],
            UpstreamEntry {
                name: "gallery/a.jpg".to_string(),
                content_length: Some(2048),
                content_type: Some("image/jpeg".to_string()),
                last_modified: Some("Wed, 09 Sep 2009 09:20:02 GMT".to_string()),
            }
        );
        assert_eq!(listing.next_marker.as_deref(), Some("2!72!MDAwMDE"));
    }

    #[test]
    fn empty_next_marker_ends_the_listing() {
        let xml = "<EnumerationResults><Blobs /><NextMarker /></EnumerationResults>";
        let listing = parse_enumeration_results(xml).expect("parse listing");
        assert!(listing.entries.is_empty());
        assert_eq!(listing.next_marker, None);
    }

    #[test]
    fn storage_errors_render_code_and_message() {
        let body = "<?xml version=\"1.0\" encoding=\"utf-8\"?><Error><Code>AuthenticationFailed</Code>\
<Message>Signature not valid in the specified time frame</Message></Error>";
        assert_eq!(
            storage_error_message(403, body),
            "AuthenticationFailed: Signature not valid in the specified time frame"
        );
        assert_eq!(
            storage_error_message(500, ""),
            "storage request failed with status 500"
        );
    }

    #[test]
    fn list_url_keeps_the_signature_encoding() {
        let request = ListBlobsRequest {
            container: "images".to_string(),
            prefix: "gallery/".to_string(),
            marker: Some("2!72!MDAwMDE".to_string()),
            max_results: 300,
        };
        let url = list_blobs_url(
            "https://acct.blob.core.windows.net/",
            &request,
            "?sv=2022-11-02&sig=ab%2Bcd",
        )
        .expect("url");
        assert_eq!(
            url,
            "https://acct.blob.core.windows.net/images?sv=2022-11-02&sig=ab%2Bcd\
&restype=container&comp=list&maxresults=300&prefix=gallery%2F&marker=2%2172%21MDAwMDE"
        );
    }

    #[tokio::test]
    async fn memory_backend_pages_and_checks_tokens() {
        let backend = MemoryBlobBackend::new(
            ["a.png", "b.png", "c.png"]
                .into_iter()
                .map(|name| UpstreamEntry {
                    name: name.to_string(),
                    ..UpstreamEntry::default()
                })
                .collect(),
        );
        backend.accept_only("sig=new");
        let request = ListBlobsRequest {
            container: "images".to_string(),
            prefix: String::new(),
            marker: None,
            max_results: 2,
        };
        let rejected = backend
            .list_blobs(&request, "?sig=old")
            .await
            .expect_err("old token rejected");
        assert!(rejected.is_auth_expired());

        let first = backend
            .list_blobs(&request, "?sig=new")
            .await
            .expect("first page");
        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.next_marker.as_deref(), Some("2"));
        assert_eq!(backend.requests().len(), 2);
    }
}
