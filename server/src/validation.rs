//! Input checks applied before any store access

use crate::error::ApiError;
use crate::model::object_id::OBJECT_ID_HEX_LEN;
use crate::model::ObjectId;

pub fn is_valid_id(raw: &str) -> bool {
    raw.len() == OBJECT_ID_HEX_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit())
}

pub fn is_non_empty(text: &str) -> bool {
    !text.trim().is_empty()
}

/// Parse `raw` as an identifier, naming `what` in the failure message
pub fn require_id(raw: &str, what: &str) -> Result<ObjectId, ApiError> {
    if !is_valid_id(raw) {
        return Err(ApiError::validation(format!("Invalid {} id", what)));
    }
    raw.parse().map_err(|_| ApiError::validation(format!("Invalid {} id", what)))
}

/// Trimmed `text`, or a validation failure when it is absent or blank
pub fn require_text(text: Option<&str>, field: &str) -> Result<String, ApiError> {
    match text {
        Some(text) if is_non_empty(text) => Ok(text.trim().to_string()),
        _ => Err(ApiError::validation(format!("{} is required", field))),
    }
}
