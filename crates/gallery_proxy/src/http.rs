//! HTTP surface of the listing proxy: routes, error mapping, and CORS.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderValue, Method, Request, StatusCode},
    middleware::{from_fn, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use gallery_host::{
    CredentialRefreshResponse, ErrorBody, GalleryError, GalleryImagesQuery, GalleryImagesResponse,
    GalleryItem, HealthResponse, RefreshUrlsRequest, SasUrlRequest, SasUrlResponse,
};
use thiserror::Error;
use tracing::{info, warn};

use crate::listing::ListingClient;

#[derive(Clone, Debug)]
/// Shared handler state.
pub struct AppState {
    listing: Arc<ListingClient>,
}

impl AppState {
    /// Wraps a listing client; its credential store backs every endpoint.
    pub fn new(listing: ListingClient) -> Self {
        Self {
            listing: Arc::new(listing),
        }
    }

    /// Listing client used by the handlers.
    pub fn listing(&self) -> &ListingClient {
        &self.listing
    }
}

#[derive(Debug, Error)]
/// Failure returned by a proxy endpoint as `{ "error": message }`.
pub enum ApiError {
    /// Listing, minting, or refresh failure.
    #[error(transparent)]
    Gallery(#[from] GalleryError),
    /// Malformed or incomplete request.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Gallery(err) => {
                StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

async fn images_handler(
    State(state): State<AppState>,
    Query(query): Query<GalleryImagesQuery>,
) -> Result<Json<GalleryImagesResponse>, ApiError> {
    let page = state
        .listing
        .fetch_page(query.continuation_token.as_deref())
        .await
        .inspect_err(|err| warn!(error = %err, "gallery listing failed"))?;
    Ok(Json(GalleryImagesResponse::from(page)))
}

async fn sas_url_handler(
    State(state): State<AppState>,
    payload: Result<Json<SasUrlRequest>, JsonRejection>,
) -> Result<Json<SasUrlResponse>, ApiError> {
    let Json(request) = payload.map_err(|err| ApiError::BadRequest(err.body_text()))?;
    let Some((container, blob)) = request.fields() else {
        return Err(ApiError::BadRequest(
            "containerName and blobName are required".to_string(),
        ));
    };
    let url = state.listing.mint_url(container, blob).await;
    Ok(Json(SasUrlResponse { url }))
}

async fn refresh_urls_handler(
    State(state): State<AppState>,
    payload: Result<Json<RefreshUrlsRequest>, JsonRejection>,
) -> Result<Json<Vec<GalleryItem>>, ApiError> {
    let Json(request) = payload.map_err(|err| ApiError::BadRequest(err.body_text()))?;
    let count = request.images.len();
    let items = state.listing.refresh_urls(request.images).await;
    info!(count, "item urls re-minted");
    Ok(Json(items))
}

async fn credential_refresh_handler(
    State(state): State<AppState>,
) -> Result<Json<CredentialRefreshResponse>, ApiError> {
    let refreshed_at = state
        .listing
        .credentials()
        .refresh()
        .await
        .inspect_err(|err| warn!(error = %err, "storage credential refresh failed"))?;
    Ok(Json(CredentialRefreshResponse { refreshed_at }))
}

async fn healthz_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn insert_cors_headers(resp: &mut Response) {
    let headers = resp.headers_mut();
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type"),
    );
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        insert_cors_headers(&mut resp);
        return resp;
    }
    let mut resp = next.run(req).await;
    insert_cors_headers(&mut resp);
    resp
}

/// Builds the proxy router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz_handler))
        .route("/gallery/images", get(images_handler))
        .route("/gallery/sas-url", post(sas_url_handler))
        .route("/gallery/refresh-urls", post(refresh_urls_handler))
        .route(
            "/gallery/credential/refresh",
            post(credential_refresh_handler),
        )
        .layer(from_fn(cors_middleware))
        .with_state(state)
}
