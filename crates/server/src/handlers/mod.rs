pub mod expenses;
pub mod inventory;
pub mod slips;

use crate::error::ApiError;

/// Ids arrive as raw path segments; anything that is not a number behaves
/// like an id that matches no record.
fn parse_id(raw: &str, not_found: &str) -> Result<u64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound(not_found.to_string()))
}
