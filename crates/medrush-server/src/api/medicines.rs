use axum::{extract::State, Extension, Json};
use medrush_core::Medicine;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState};

pub(super) async fn list_medicines(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<Medicine>>> {
    Json(ApiResponse::new(state.catalog.medicines.clone(), req_id.0))
}
