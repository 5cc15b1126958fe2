//! JSON wire types for the gallery proxy HTTP surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::{GalleryItem, GalleryPage};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Query string for `GET /gallery/images`.
pub struct GalleryImagesQuery {
    /// Cursor returned by the previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Response body of `GET /gallery/images`.
pub struct GalleryImagesResponse {
    /// Image items of this page.
    pub images: Vec<GalleryItem>,
    /// Cursor for the next page; absent at the end of the listing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
    /// Whether another page exists.
    #[serde(default)]
    pub has_more: bool,
}

impl From<GalleryPage> for GalleryImagesResponse {
    fn from(page: GalleryPage) -> Self {
        let has_more = page.has_more();
        Self {
            images: page.items,
            continuation_token: page.continuation_cursor,
            has_more,
        }
    }
}

impl From<GalleryImagesResponse> for GalleryPage {
    fn from(response: GalleryImagesResponse) -> Self {
        let cursor = if response.has_more {
            response.continuation_token
        } else {
            None
        };
        GalleryPage::new(response.images, cursor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Request body of `POST /gallery/sas-url`.
pub struct SasUrlRequest {
    /// Container holding the blob.
    #[serde(default)]
    pub container_name: Option<String>,
    /// Blob name within the container.
    #[serde(default)]
    pub blob_name: Option<String>,
}

impl SasUrlRequest {
    /// Returns `(container, blob)` when both fields are present and non-blank.
    pub fn fields(&self) -> Option<(&str, &str)> {
        let container = self.container_name.as_deref().map(str::trim)?;
        let blob = self.blob_name.as_deref().map(str::trim)?;
        (!container.is_empty() && !blob.is_empty()).then_some((container, blob))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Response body of `POST /gallery/sas-url`.
pub struct SasUrlResponse {
    /// Freshly minted access URL.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
/// Request body of `POST /gallery/refresh-urls`.
pub struct RefreshUrlsRequest {
    /// Items whose URLs should be re-minted.
    pub images: Vec<GalleryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Response body of `POST /gallery/credential/refresh`.
pub struct CredentialRefreshResponse {
    /// Time the proxy swapped in the new credential.
    pub refreshed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Error body returned by every failing proxy endpoint.
pub struct ErrorBody {
    /// Human-readable failure message.
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Payload returned by the credential refresh endpoint.
pub struct TokenRefreshPayload {
    /// Preferred token field.
    #[serde(default)]
    pub sas_token: Option<String>,
    /// Fallback token field.
    #[serde(default)]
    pub token: Option<String>,
}

impl TokenRefreshPayload {
    /// Returns the first non-blank token, preferring `sasToken`.
    pub fn into_token(self) -> Option<String> {
        self.sas_token
            .filter(|value| !value.trim().is_empty())
            .or(self.token.filter(|value| !value.trim().is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Response body of `GET /healthz`.
pub struct HealthResponse {
    /// Always `"ok"` while the process serves requests.
    pub status: String,
}

/// Extracts the `error` message from a failing response body, falling back to the raw text.
pub fn decode_error_message(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        format!("request failed with status {status}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn images_response_round_trips_end_of_listing() {
        let response: GalleryImagesResponse =
            serde_json::from_str(r#"{"images":[],"continuationToken":"","hasMore":false}"#)
                .expect("decode response");
        let page = GalleryPage::from(response);
        assert_eq!(page.continuation_cursor, None);

        let encoded = serde_json::to_value(GalleryImagesResponse::from(GalleryPage::new(
            Vec::new(),
            Some("abc".to_string()),
        )))
        .expect("encode");
        assert_eq!(
            encoded,
            serde_json::json!({"images": [], "continuationToken": "abc", "hasMore": true})
        );
    }

    #[test]
    fn sas_url_request_requires_both_fields() {
        let missing: SasUrlRequest =
            serde_json::from_str(r#"{"containerName":"images"}"#).expect("decode");
        assert_eq!(missing.fields(), None);

        let blank: SasUrlRequest =
            serde_json::from_str(r#"{"containerName":"images","blobName":"  "}"#).expect("decode");
        assert_eq!(blank.fields(), None);

        let full: SasUrlRequest =
            serde_json::from_str(r#"{"containerName":"images","blobName":"a.png"}"#)
                .expect("decode");
        assert_eq!(full.fields(), Some(("images", "a.png")));
    }

    #[test]
    fn token_payload_prefers_sas_token_then_token() {
        let both: TokenRefreshPayload =
            serde_json::from_str(r#"{"sasToken":"?a=1","token":"b=2"}"#).expect("decode");
        assert_eq!(both.into_token().as_deref(), Some("?a=1"));

        let fallback: TokenRefreshPayload =
            serde_json::from_str(r#"{"token":"b=2"}"#).expect("decode");
        assert_eq!(fallback.into_token().as_deref(), Some("b=2"));

        let none: TokenRefreshPayload = serde_json::from_str("{}").expect("decode");
        assert_eq!(none.into_token(), None);
    }

    #[test]
    fn error_message_falls_back_to_body_text() {
        assert_eq!(decode_error_message(400, r#"{"error":"bad"}"#), "bad");
        assert_eq!(decode_error_message(502, "gateway down"), "gateway down");
        assert_eq!(
            decode_error_message(500, ""),
            "request failed with status 500"
        );
    }
}
