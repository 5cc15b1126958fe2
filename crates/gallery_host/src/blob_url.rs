//! Access-URL and thumbnail-name derivation for blobs.

/// Normalizes a shared-access token so it can be appended directly to a blob URL.
///
/// Empty input stays empty; otherwise the result always starts with exactly one `?`.
pub fn normalize_sas_token(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('?');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("?{trimmed}")
    }
}

/// Derives the thumbnail blob name for `blob_name`.
///
/// Names under `images/` map to the same path under `thumbs/`; other names with an extension get
/// a `-thumb` suffix before the last `.`. Names matching neither rule have no thumbnail.
pub fn derive_thumb_blob_name(blob_name: &str) -> Option<String> {
    if let Some(rest) = blob_name.strip_prefix("images/") {
        return Some(format!("thumbs/{rest}"));
    }
    let (stem, ext) = blob_name.rsplit_once('.')?;
    Some(format!("{stem}-thumb.{ext}"))
}

#[derive(Clone, PartialEq, Eq)]
/// Builds time-limited blob URLs for one container.
pub struct BlobUrlBuilder {
    account_url: String,
    container: String,
    sas_token: String,
}

impl std::fmt::Debug for BlobUrlBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobUrlBuilder")
            .field("account_url", &self.account_url)
            .field("container", &self.container)
            .finish_non_exhaustive()
    }
}

impl BlobUrlBuilder {
    /// Creates a builder for `container` under `account_url` signed with `sas_token`.
    pub fn new(account_url: &str, container: &str, sas_token: &str) -> Self {
        Self {
            account_url: account_url.trim().trim_end_matches('/').to_string(),
            container: container.trim().trim_matches('/').to_string(),
            sas_token: normalize_sas_token(sas_token),
        }
    }

    /// Storage account endpoint without a trailing slash.
    pub fn account_url(&self) -> &str {
        &self.account_url
    }

    /// Container name.
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Normalized shared-access token (`?`-prefixed, or empty).
    pub fn sas_token(&self) -> &str {
        &self.sas_token
    }

    /// Returns a builder signing with a different token.
    pub fn with_sas_token(&self, sas_token: &str) -> Self {
        Self {
            sas_token: normalize_sas_token(sas_token),
            ..self.clone()
        }
    }

    /// Returns a builder for another container of the same account and token.
    pub fn for_container(&self, container: &str) -> Self {
        Self {
            container: container.trim().trim_matches('/').to_string(),
            ..self.clone()
        }
    }

    /// Full access URL for `blob_name`.
    pub fn blob_url(&self, blob_name: &str) -> String {
        format!(
            "{}/{}/{}{}",
            self.account_url,
            self.container,
            blob_name.trim_start_matches('/'),
            self.sas_token
        )
    }

    /// Thumbnail access URL for `blob_name`, when a naming rule applies.
    pub fn thumb_url(&self, blob_name: &str) -> Option<String> {
        derive_thumb_blob_name(blob_name).map(|thumb| self.blob_url(&thumb))
    }
}
