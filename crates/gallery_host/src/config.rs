//! Storage/proxy configuration loading and validation.

use crate::error::ConfigError;

/// Storage account endpoint, e.g. `https://account.blob.core.windows.net`.
pub const ACCOUNT_URL_KEY: &str = "GALLERY_ACCOUNT_URL";
/// Container holding the gallery blobs.
pub const CONTAINER_KEY: &str = "GALLERY_CONTAINER";
/// Shared-access token appended to minted URLs and listing calls.
pub const SAS_TOKEN_KEY: &str = "GALLERY_SAS_TOKEN";
/// Endpoint returning a fresh shared-access token.
pub const CREDENTIAL_REFRESH_URL_KEY: &str = "GALLERY_CREDENTIAL_REFRESH_URL";
/// Optional blob-name prefix restricting the listing.
pub const BLOB_PREFIX_KEY: &str = "GALLERY_BLOB_PREFIX";
/// Optional listing page size.
pub const PAGE_SIZE_KEY: &str = "GALLERY_PAGE_SIZE";

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 300;
/// Largest page size the storage listing API accepts.
pub const MAX_PAGE_SIZE: u32 = 5000;

#[derive(Clone, PartialEq, Eq)]
/// Validated gallery configuration.
pub struct GalleryConfig {
    /// Storage account endpoint without a trailing slash.
    pub account_url: String,
    /// Container name.
    pub container: String,
    /// Initial shared-access token, normalized to start with `?`.
    pub sas_token: String,
    /// Credential refresh endpoint.
    pub credential_refresh_url: String,
    /// Blob-name prefix; empty lists the whole container.
    pub blob_prefix: String,
    /// Listing page size.
    pub page_size: u32,
}

impl std::fmt::Debug for GalleryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryConfig")
            .field("account_url", &self.account_url)
            .field("container", &self.container)
            .field("sas_token", &"<redacted>")
            .field("credential_refresh_url", &self.credential_refresh_url)
            .field("blob_prefix", &self.blob_prefix)
            .field("page_size", &self.page_size)
            .finish()
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<String, ConfigError> {
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Missing { key })
}

impl GalleryConfig {
    /// Builds a configuration from a key lookup, typically `std::env::var(..).ok()`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required key is missing or a value fails validation.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let account_url = required(&lookup, ACCOUNT_URL_KEY)?;
        if !(account_url.starts_with("https://") || account_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                key: ACCOUNT_URL_KEY,
                reason: "expected an http(s) URL".to_string(),
            });
        }
        let container = required(&lookup, CONTAINER_KEY)?;
        if container.contains('/') {
            return Err(ConfigError::Invalid {
                key: CONTAINER_KEY,
                reason: "container name must not contain `/`".to_string(),
            });
        }
        let sas_token = crate::blob_url::normalize_sas_token(&required(&lookup, SAS_TOKEN_KEY)?);
        let credential_refresh_url = required(&lookup, CREDENTIAL_REFRESH_URL_KEY)?;

        let page_size = match lookup(PAGE_SIZE_KEY).map(|raw| raw.trim().to_string()) {
            Some(raw) if !raw.is_empty() => {
                let parsed = raw.parse::<u32>().map_err(|err| ConfigError::Invalid {
                    key: PAGE_SIZE_KEY,
                    reason: err.to_string(),
                })?;
                if !(1..=MAX_PAGE_SIZE).contains(&parsed) {
                    return Err(ConfigError::Invalid {
                        key: PAGE_SIZE_KEY,
                        reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
                    });
                }
                parsed
            }
            _ => DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            account_url: account_url.trim_end_matches('/').to_string(),
            container,
            sas_token,
            credential_refresh_url,
            blob_prefix: lookup(BLOB_PREFIX_KEY)
                .map(|value| value.trim().to_string())
                .unwrap_or_default(),
            page_size,
        })
    }
}
