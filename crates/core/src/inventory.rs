use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce;

/// An inventory line item, optionally back-referencing the expense whose
/// slip it came from. Items outlive their originating expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: u64,
    pub name: String,
    pub quantity: u32,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<u64>,
    pub created_at: DateTime<Utc>,
}

/// Creation payload; only `name` is required. Quantity defaults to 1,
/// category to "other".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInventoryItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::quantity_opt")]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub expense_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "coerce::quantity_opt")]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
}
