use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use slipkeep_core::{InventoryItem, InventoryUpdate, NewInventoryItem};

use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::AppState;

const NOT_FOUND: &str = "Item not found";

/// GET /api/inventory
pub async fn list(State(state): State<AppState>) -> Json<Vec<InventoryItem>> {
    Json(state.inventory.list())
}

/// GET /api/inventory/{id}
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InventoryItem>, ApiError> {
    let item = state
        .inventory
        .get(parse_id(&id, NOT_FOUND)?)
        .map_err(|e| ApiError::from_store(e, NOT_FOUND))?;
    Ok(Json(item))
}

/// POST /api/inventory
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewInventoryItem>,
) -> Result<(StatusCode, Json<InventoryItem>), ApiError> {
    let item = state
        .inventory
        .create(payload)
        .map_err(|e| ApiError::from_store(e, NOT_FOUND))?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT /api/inventory/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<InventoryUpdate>,
) -> Result<Json<InventoryItem>, ApiError> {
    let item = state
        .inventory
        .update(parse_id(&id, NOT_FOUND)?, payload)
        .map_err(|e| ApiError::from_store(e, NOT_FOUND))?;
    Ok(Json(item))
}

/// DELETE /api/inventory/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .inventory
        .delete(parse_id(&id, NOT_FOUND)?)
        .map_err(|e| ApiError::from_store(e, NOT_FOUND))?;
    Ok(StatusCode::NO_CONTENT)
}
