mod medicines;
mod pharmacies;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use medrush_core::Catalog;
use medrush_locator::{LocatorError, PharmacyLocator};
use serde::Serialize;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

/// Shared handler state.
///
/// The locator is single-writer: registration and inventory updates take the
/// write lock, queries take the read lock.
#[derive(Clone)]
pub struct AppState {
    pub locator: Arc<RwLock<PharmacyLocator>>,
    pub catalog: Arc<Catalog>,
    /// Bumped by a registry subscriber on every registration so clients can
    /// tell when to re-fetch the pharmacy list.
    pub registry_revision: Arc<AtomicU64>,
}

impl AppState {
    /// Build the registry from `catalog` and wire the revision subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError`] if the seed pharmacies are inconsistent.
    pub fn from_catalog(catalog: Catalog) -> Result<Self, LocatorError> {
        let mut locator = PharmacyLocator::from_catalog(&catalog)?;
        let registry_revision = Arc::new(AtomicU64::new(0));

        let revision = Arc::clone(&registry_revision);
        locator.subscribe(move || {
            let now = revision.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::debug!(registry_revision = now, "pharmacy registry changed");
            Ok(())
        });

        Ok(Self {
            locator: Arc::new(RwLock::new(locator)),
            catalog: Arc::new(catalog),
            registry_revision,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    pharmacies: usize,
    registry_revision: u64,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_locator_error(request_id: &str, error: &LocatorError) -> ApiError {
    match error {
        LocatorError::Validation(reason) => {
            ApiError::new(request_id, "validation_error", reason.clone())
        }
        LocatorError::NotFound { .. } => ApiError::new(request_id, "not_found", error.to_string()),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/medicines", get(medicines::list_medicines))
        .route(
            "/api/v1/pharmacies",
            get(pharmacies::list_pharmacies).post(pharmacies::register_pharmacy),
        )
        .route(
            "/api/v1/pharmacies/nearest",
            post(pharmacies::nearest_pharmacy),
        )
        .route(
            "/api/v1/pharmacies/{pharmacy_id}/inventory/{item_id}",
            put(pharmacies::update_inventory),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let pharmacies = state.locator.read().await.len();
    Json(ApiResponse::new(
        HealthData {
            status: "ok",
            pharmacies,
            registry_revision: state.registry_revision.load(Ordering::SeqCst),
        },
        req_id.0,
    ))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
