//! Lenient deserializers for form-ish JSON payloads.
//!
//! Clients send amounts and quantities as either numbers or strings
//! (HTML form inputs, multipart text fields). These helpers accept both,
//! mirroring `parseFloat` / `parseInt(x) || 1` semantics.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(Decimal),
    Text(String),
}

/// Deserialize an optional decimal from a JSON number or numeric string.
/// Missing, null, or unparseable values come back as `None`.
pub fn decimal_opt<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| match r {
        RawNumber::Number(d) => Some(d),
        RawNumber::Text(s) => Decimal::from_str(s.trim()).ok(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Deserialize an optional quantity from a number or string.
/// Anything unparseable or below 1 collapses to 1.
pub fn quantity_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawQuantity>::deserialize(deserializer)?;
    Ok(raw.map(|r| {
        let n = match r {
            RawQuantity::Int(n) => n,
            RawQuantity::Float(f) => f as i64,
            RawQuantity::Text(s) => s.trim().parse::<i64>().unwrap_or(1),
        };
        if n < 1 {
            1
        } else {
            n.min(u32::MAX as i64) as u32
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct AmountWrap {
        #[serde(default, deserialize_with = "decimal_opt")]
        amount: Option<Decimal>,
    }

    #[derive(Deserialize)]
    struct QtyWrap {
        #[serde(default, deserialize_with = "quantity_opt")]
        quantity: Option<u32>,
    }

    fn amount(json: &str) -> Option<Decimal> {
        serde_json::from_str::<AmountWrap>(json).unwrap().amount
    }

    fn qty(json: &str) -> Option<u32> {
        serde_json::from_str::<QtyWrap>(json).unwrap().quantity
    }

    #[test]
    fn decimal_from_number() {
        assert_eq!(amount(r#"{"amount": 42.5}"#), Some(Decimal::new(425, 1)));
    }

    #[test]
    fn decimal_from_string() {
        assert_eq!(amount(r#"{"amount": "42.50"}"#), Some(Decimal::new(4250, 2)));
    }

    #[test]
    fn decimal_missing_or_null_is_none() {
        assert_eq!(amount(r#"{}"#), None);
        assert_eq!(amount(r#"{"amount": null}"#), None);
    }

    #[test]
    fn decimal_garbage_string_is_none() {
        assert_eq!(amount(r#"{"amount": "lots"}"#), None);
    }

    #[test]
    fn quantity_from_number_and_string() {
        assert_eq!(qty(r#"{"quantity": 3}"#), Some(3));
        assert_eq!(qty(r#"{"quantity": "7"}"#), Some(7));
    }

    #[test]
    fn quantity_floors_at_one() {
        assert_eq!(qty(r#"{"quantity": 0}"#), Some(1));
        assert_eq!(qty(r#"{"quantity": -4}"#), Some(1));
        assert_eq!(qty(r#"{"quantity": "nope"}"#), Some(1));
    }

    #[test]
    fn quantity_missing_is_none() {
        assert_eq!(qty(r#"{}"#), None);
    }
}
