use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use slipkeep_core::{Expense, ExpenseStats, ExpenseUpdate, NewExpense};

use crate::error::ApiError;
use crate::handlers::parse_id;
use crate::AppState;

const NOT_FOUND: &str = "Expense not found";

/// GET /api/expenses
pub async fn list(State(state): State<AppState>) -> Json<Vec<Expense>> {
    Json(state.expenses.list())
}

/// GET /api/expenses/{id}
pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Expense>, ApiError> {
    let expense = state
        .expenses
        .get(parse_id(&id, NOT_FOUND)?)
        .map_err(|e| ApiError::from_store(e, NOT_FOUND))?;
    Ok(Json(expense))
}

/// POST /api/expenses
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let expense = state
        .expenses
        .create(payload)
        .map_err(|e| ApiError::from_store(e, NOT_FOUND))?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// PUT /api/expenses/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<Expense>, ApiError> {
    let expense = state
        .expenses
        .update(parse_id(&id, NOT_FOUND)?, payload)
        .map_err(|e| ApiError::from_store(e, NOT_FOUND))?;
    Ok(Json(expense))
}

/// DELETE /api/expenses/{id}
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .expenses
        .delete(parse_id(&id, NOT_FOUND)?)
        .map_err(|e| ApiError::from_store(e, NOT_FOUND))?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/expenses/stats/summary
pub async fn stats(State(state): State<AppState>) -> Json<ExpenseStats> {
    Json(state.expenses.stats())
}
