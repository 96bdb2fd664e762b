use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Default category assigned to items inferred from slip text.
pub const DEFAULT_ITEM_CATEGORY: &str = "food";

/// A tentative line item inferred from receipt text. Ownership passes to the
/// caller for review; nothing links back to the source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub name: String,
    pub quantity: u32,
    pub category: String,
}

impl CandidateItem {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: 1,
            category: DEFAULT_ITEM_CATEGORY.to_string(),
        }
    }
}

/// Structured fields pulled from raw OCR text. Every field is best-effort;
/// absence means "the heuristics found nothing", never an error.
///
/// `amount` is kept as the captured decimal string (no currency symbol) so
/// the caller's edit form shows exactly what was read. `date` serializes as
/// ISO-8601 (`YYYY-MM-DD`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedReceipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub items: Vec<CandidateItem>,
}

impl ExtractedReceipt {
    /// True when no heuristic produced anything — the caller falls back to a
    /// fully manual form.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.date.is_none()
            && self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_item_defaults() {
        let item = CandidateItem::named("Latte");
        assert_eq!(item.quantity, 1);
        assert_eq!(item.category, "food");
    }

    #[test]
    fn empty_receipt_reports_empty() {
        assert!(ExtractedReceipt::default().is_empty());
    }

    #[test]
    fn date_serializes_iso() {
        let r = ExtractedReceipt {
            date: NaiveDate::from_ymd_opt(2024, 3, 15),
            ..Default::default()
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["date"], serde_json::json!("2024-03-15"));
    }

    #[test]
    fn absent_fields_are_omitted_from_json() {
        let json = serde_json::to_value(ExtractedReceipt::default()).unwrap();
        assert!(json.get("amount").is_none());
        assert!(json.get("description").is_none());
        assert_eq!(json["items"], serde_json::json!([]));
    }
}
