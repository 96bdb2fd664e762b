//! HTTP JSON API over the in-memory expense and inventory stores.

pub mod error;
pub mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use slipkeep_store::{ExpenseStore, InventoryStore};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Upload ceiling for slip files (multer's 10MB limit carried over).
pub const MAX_SLIP_BYTES: usize = 10 * 1024 * 1024;

/// Request-body ceiling: the slip cap plus headroom for multipart framing
/// and the other form fields, so an over-limit file reaches the handler's
/// size check and gets the `{error}` JSON response instead of a bare 413.
const MAX_BODY_BYTES: usize = MAX_SLIP_BYTES + 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub expenses: Arc<ExpenseStore>,
    pub inventory: Arc<InventoryStore>,
    pub uploads_dir: PathBuf,
}

impl AppState {
    pub fn new(uploads_dir: PathBuf) -> Self {
        Self {
            expenses: Arc::new(ExpenseStore::new()),
            inventory: Arc::new(InventoryStore::new()),
            uploads_dir,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/expenses",
            get(handlers::expenses::list).post(handlers::expenses::create),
        )
        .route("/api/expenses/stats/summary", get(handlers::expenses::stats))
        .route(
            "/api/expenses/{id}",
            get(handlers::expenses::get_one)
                .put(handlers::expenses::update)
                .delete(handlers::expenses::remove),
        )
        .route("/api/slips/upload", post(handlers::slips::upload))
        .route("/api/slips/create-expense", post(handlers::slips::create_expense))
        .route(
            "/api/inventory",
            get(handlers::inventory::list).post(handlers::inventory::create),
        )
        .route(
            "/api/inventory/{id}",
            get(handlers::inventory::get_one)
                .put(handlers::inventory::update)
                .delete(handlers::inventory::remove),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
