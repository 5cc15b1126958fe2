//! Storage credential held by the proxy and its refresh collaborator.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gallery_host::{normalize_sas_token, BlobUrlBuilder, GalleryError, TokenRefreshPayload};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

#[async_trait]
/// Source of fresh shared-access tokens.
pub trait TokenRefresher: Send + Sync + 'static {
    /// Fetches a new token in raw form (with or without the leading `?`).
    async fn fetch_token(&self) -> Result<String, GalleryError>;
}

#[derive(Debug, Clone)]
/// Calls the configured refresh endpoint and reads `sasToken` or `token` from its JSON body.
pub struct HttpTokenRefresher {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTokenRefresher {
    /// Creates a refresher issuing `GET` requests to `endpoint`.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

fn refresh_error(message: impl Into<String>) -> GalleryError {
    GalleryError::Refresh {
        message: message.into(),
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    #[instrument(name = "credential_fetch_token", skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_token(&self) -> Result<String, GalleryError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|err| refresh_error(format!("refresh endpoint unreachable: {err}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(refresh_error(format!(
                "refresh endpoint returned status {}",
                status.as_u16()
            )));
        }
        let payload: TokenRefreshPayload = response
            .json()
            .await
            .map_err(|err| refresh_error(format!("invalid refresh response: {err}")))?;
        payload
            .into_token()
            .ok_or_else(|| refresh_error("no token in refresh response"))
    }
}

#[derive(Debug, Default)]
/// Refresher returning queued outcomes, for tests and local runs.
pub struct MemoryTokenRefresher {
    outcomes: Mutex<VecDeque<Result<String, GalleryError>>>,
}

impl MemoryTokenRefresher {
    /// Queues the next outcome.
    pub fn push_outcome(&self, outcome: Result<String, GalleryError>) {
        if let Ok(mut outcomes) = self.outcomes.lock() {
            outcomes.push_back(outcome);
        }
    }
}

#[async_trait]
impl TokenRefresher for MemoryTokenRefresher {
    async fn fetch_token(&self) -> Result<String, GalleryError> {
        self.outcomes
            .lock()
            .map_err(|_| refresh_error("memory refresher lock poisoned"))?
            .pop_front()
            .unwrap_or_else(|| Err(refresh_error("no token queued")))
    }
}

#[derive(Clone)]
/// Current signing state, shared by all request handlers and swapped by refreshes.
pub struct CredentialStore {
    urls: Arc<RwLock<BlobUrlBuilder>>,
    refresher: Arc<dyn TokenRefresher>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Creates a store signing with `urls` and refreshing through `refresher`.
    pub fn new(urls: BlobUrlBuilder, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            urls: Arc::new(RwLock::new(urls)),
            refresher,
        }
    }

    /// Copy of the current URL builder (account, default container, token).
    pub async fn snapshot(&self) -> BlobUrlBuilder {
        self.urls.read().await.clone()
    }

    /// Fetches a fresh token and swaps it in for every later request.
    ///
    /// # Errors
    ///
    /// Returns [`GalleryError::Refresh`] when the collaborator fails or returns a blank token; the
    /// current token stays in place.
    pub async fn refresh(&self) -> Result<DateTime<Utc>, GalleryError> {
        let raw = self.refresher.fetch_token().await.map_err(|err| match err {
            GalleryError::Refresh { .. } => err,
            other => refresh_error(other.to_string()),
        })?;
        let token = normalize_sas_token(&raw);
        if token.is_empty() {
            warn!("credential refresh returned a blank token");
            return Err(refresh_error("refresh returned a blank token"));
        }
        let mut urls = self.urls.write().await;
        *urls = urls.with_sas_token(&token);
        let refreshed_at = Utc::now();
        info!(%refreshed_at, "storage credential swapped");
        Ok(refreshed_at)
    }
}
