//! Pharmacy handlers: ranked listing, onboarding, cart-driven selection, and
//! inventory updates.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use medrush_core::{
    pharmacy::validate_coordinates, requirement_from_cart, CartLine, ItemId, Pharmacy,
    PharmacyDraft, PharmacyId,
};
use medrush_locator::{parse_quantity, GeoPoint, NearbyPharmacy};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_locator_error, ApiError, ApiResponse, AppState};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct OriginQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct NearestRequest {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub cart: Vec<CartLine>,
}

/// `quantity` is kept untyped so that non-integer input is reported as a
/// validation error instead of a generic body rejection.
#[derive(Debug, Deserialize)]
pub(super) struct UpdateInventoryRequest {
    pub quantity: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct PharmacyItem {
    #[serde(flatten)]
    pub pharmacy: Pharmacy,
    /// Display form, e.g. `"2.4 km"`.
    pub distance: String,
    pub distance_km: f64,
    /// Display form, e.g. `"12 min"`.
    pub delivery_time: String,
    pub delivery_time_minutes: u32,
}

impl From<NearbyPharmacy> for PharmacyItem {
    fn from(nearby: NearbyPharmacy) -> Self {
        Self {
            distance: nearby.distance_label(),
            delivery_time: nearby.delivery_time_label(),
            distance_km: nearby.distance_km,
            delivery_time_minutes: nearby.delivery_time_minutes,
            pharmacy: nearby.pharmacy,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct InventoryUpdated {
    pub pharmacy_id: PharmacyId,
    pub item_id: ItemId,
    pub quantity: u32,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn origin_or_validation_error(req_id: &str, lat: f64, lng: f64) -> Result<GeoPoint, ApiError> {
    validate_coordinates(lat, lng)
        .map_err(|e| ApiError::new(req_id, "validation_error", e.to_string()))?;
    Ok(GeoPoint::new(lat, lng))
}

fn quantity_from_json(req_id: &str, value: &serde_json::Value) -> Result<i64, ApiError> {
    let invalid = || {
        ApiError::new(
            req_id,
            "validation_error",
            format!("quantity must be a non-negative integer, got {value}"),
        )
    };
    match value {
        serde_json::Value::Number(n) => n.as_i64().ok_or_else(invalid),
        serde_json::Value::String(s) => {
            parse_quantity(s).map_err(|e| map_locator_error(req_id, &e))
        }
        _ => Err(invalid()),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/pharmacies?lat=&lng=: every pharmacy, nearest first.
pub(super) async fn list_pharmacies(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<OriginQuery>,
) -> Result<Json<ApiResponse<Vec<PharmacyItem>>>, ApiError> {
    let (Some(lat), Some(lng)) = (query.lat, query.lng) else {
        return Err(ApiError::new(
            &req_id.0,
            "validation_error",
            "both lat and lng query parameters are required",
        ));
    };
    let origin = origin_or_validation_error(&req_id.0, lat, lng)?;

    let ranked = state.locator.read().await.with_distances(origin);
    let data = ranked.into_iter().map(PharmacyItem::from).collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// POST /api/v1/pharmacies: onboard a pharmacy from a draft.
pub(super) async fn register_pharmacy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(draft): Json<PharmacyDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Pharmacy>>), ApiError> {
    let pharmacy = state
        .locator
        .write()
        .await
        .register(draft)
        .map_err(|e| map_locator_error(&req_id.0, &e))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new(pharmacy, req_id.0))))
}

/// POST /api/v1/pharmacies/nearest: nearest open pharmacy stocking the cart.
///
/// `data` is `null` when no pharmacy qualifies.
pub(super) async fn nearest_pharmacy(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<NearestRequest>,
) -> Result<Json<ApiResponse<Option<PharmacyItem>>>, ApiError> {
    let origin = origin_or_validation_error(&req_id.0, body.latitude, body.longitude)?;

    let required = requirement_from_cart(&body.cart);
    if let Some(unknown) = required
        .iter()
        .find(|item| state.catalog.medicine(**item).is_none())
    {
        return Err(ApiError::new(
            &req_id.0,
            "validation_error",
            format!("cart references unknown item {unknown}"),
        ));
    }

    let found = state
        .locator
        .read()
        .await
        .find_nearest_with_stock(origin, &required);
    if found.is_none() {
        tracing::info!(
            request_id = %req_id.0,
            items = required.len(),
            "no pharmacy currently has all cart items in stock"
        );
    }

    Ok(Json(ApiResponse::new(found.map(PharmacyItem::from), req_id.0)))
}

/// PUT /api/v1/pharmacies/{pharmacy_id}/inventory/{item_id}: replace one stock count.
pub(super) async fn update_inventory(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path((pharmacy_id, item_id)): Path<(String, String)>,
    Json(body): Json<UpdateInventoryRequest>,
) -> Result<Json<ApiResponse<InventoryUpdated>>, ApiError> {
    let rid = &req_id.0;
    let item_id: ItemId = item_id
        .parse()
        .map_err(|e: medrush_core::CoreError| ApiError::new(rid, "validation_error", e.to_string()))?;
    if state.catalog.medicine(item_id).is_none() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("unknown item {item_id}"),
        ));
    }
    let quantity = quantity_from_json(rid, &body.quantity)?;
    let pharmacy_id = PharmacyId::new(pharmacy_id);

    let mut locator = state.locator.write().await;
    locator
        .update_inventory(&pharmacy_id, item_id, quantity)
        .map_err(|e| map_locator_error(rid, &e))?;
    let quantity = locator
        .get(&pharmacy_id)
        .map_or(0, |p| p.inventory.quantity(item_id));
    drop(locator);

    Ok(Json(ApiResponse::new(
        InventoryUpdated {
            pharmacy_id,
            item_id,
            quantity,
        },
        req_id.0,
    )))
}
