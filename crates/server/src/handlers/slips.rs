use std::path::Path as FsPath;
use std::str::FromStr;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use slipkeep_core::{Expense, InventoryItem, NewExpense, NewInventoryItem};
use uuid::Uuid;

use crate::error::ApiError;
use crate::{AppState, MAX_SLIP_BYTES};

const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "pdf"];
const ALLOWED_MIME_TYPES: &[&str] =
    &["image/jpeg", "image/png", "image/gif", "application/pdf"];

/// Metadata for a stored slip file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSlip {
    pub filename: String,
    pub original_name: String,
    pub path: String,
    pub size: usize,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseResponse {
    pub expense: Expense,
    pub inventory_items: Vec<InventoryItem>,
}

struct SlipUpload {
    original_name: String,
    extension: String,
    data: Vec<u8>,
}

/// POST /api/slips/upload — store a slip file and return its metadata.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredSlip>), ApiError> {
    let mut slip = None;

    while let Some(field) = next_field(&mut multipart).await? {
        if field.name() == Some("slip") {
            slip = Some(read_slip_field(field).await?);
        }
    }

    let slip = slip.ok_or_else(|| ApiError::BadUpload("No slip file provided".into()))?;
    let stored = store_slip(&state, &slip).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// POST /api/slips/create-expense — store a slip and create the expense (and
/// any reviewed inventory items) it documents, in one submission.
pub async fn create_expense(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateExpenseResponse>), ApiError> {
    let mut slip = None;
    let mut description = None;
    let mut amount = None;
    let mut category = None;
    let mut date = None;
    let mut items_json: Option<String> = None;

    while let Some(field) = next_field(&mut multipart).await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "slip" => slip = Some(read_slip_field(field).await?),
            "description" => description = Some(read_text(field).await?),
            "amount" => amount = Some(read_text(field).await?),
            "category" => category = Some(read_text(field).await?),
            "date" => date = Some(read_text(field).await?),
            "items" => items_json = Some(read_text(field).await?),
            _ => {}
        }
    }

    let slip = slip.ok_or_else(|| ApiError::BadUpload("No slip file provided".into()))?;
    let stored = store_slip(&state, &slip).await?;

    let expense = state
        .expenses
        .create(NewExpense {
            description,
            amount: amount.and_then(|s| Decimal::from_str(s.trim()).ok()),
            category,
            date,
        })
        .map_err(|e| ApiError::from_store(e, "Expense not found"))?;

    // Malformed items JSON is logged and ignored; the expense stands.
    let inventory_items = match items_json.filter(|s| !s.is_empty()) {
        Some(raw) => match serde_json::from_str::<Vec<NewInventoryItem>>(&raw) {
            Ok(items) => state.inventory.create_for_expense(expense.id, items),
            Err(err) => {
                tracing::warn!(expense_id = expense.id, %err, "ignoring malformed items payload");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    tracing::info!(
        expense_id = expense.id,
        slip = %stored.filename,
        items = inventory_items.len(),
        "expense created from slip"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateExpenseResponse { expense, inventory_items }),
    ))
}

// ── Multipart helpers ─────────────────────────────────────────────────────────

async fn next_field<'a>(
    multipart: &'a mut Multipart,
) -> Result<Option<Field<'a>>, ApiError> {
    multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))
}

async fn read_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))
}

async fn read_slip_field(field: Field<'_>) -> Result<SlipUpload, ApiError> {
    let original_name = field.file_name().unwrap_or("slip").to_string();
    let content_type = field.content_type().map(str::to_string);

    let extension = FsPath::new(&original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let type_ok = ALLOWED_EXTENSIONS.contains(&extension.as_str())
        && content_type
            .as_deref()
            .map_or(true, |ct| ALLOWED_MIME_TYPES.contains(&ct));
    if !type_ok {
        return Err(ApiError::BadUpload(
            "Only image files and PDFs are allowed".into(),
        ));
    }

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?;
    if data.len() > MAX_SLIP_BYTES {
        return Err(ApiError::BadUpload("File too large".into()));
    }

    Ok(SlipUpload { original_name, extension, data: data.to_vec() })
}

async fn store_slip(state: &AppState, slip: &SlipUpload) -> Result<StoredSlip, ApiError> {
    let filename = format!("slip-{}.{}", Uuid::new_v4(), slip.extension);
    let path = state.uploads_dir.join(&filename);

    tokio::fs::create_dir_all(&state.uploads_dir)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    tokio::fs::write(&path, &slip.data)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(StoredSlip {
        filename,
        original_name: slip.original_name.clone(),
        path: path.display().to_string(),
        size: slip.data.len(),
        uploaded_at: Utc::now(),
    })
}
