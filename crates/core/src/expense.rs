use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::coerce;

/// A recorded expense. `date` is kept as the client-supplied string (date or
/// timestamp); `created_at` is when the record entered the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: u64,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: String,
    pub created_at: DateTime<Utc>,
}

/// Creation payload. All fields optional at the wire level so that missing
/// ones surface as a validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewExpense {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::decimal_opt")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Partial update. Empty strings are treated as "keep the old value",
/// matching the form-driven client that submits every field each time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseUpdate {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "coerce::decimal_opt")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Aggregate figures for the stats endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseStats {
    pub total: Decimal,
    pub count: usize,
    pub by_category: BTreeMap<String, Decimal>,
}
