//! Internal helpers for validation and model conversion.
//!
//! Not part of the public API; they keep validation messages consistent
//! across the ops modules.

use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Positive-amount guard shared by record writes.
pub(crate) fn ensure_positive_amount(amount_minor: i64, label: &str) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::Validation(format!(
            "{label} amount must be > 0"
        )));
    }
    Ok(())
}

/// Till numbers are positive integers; zero or negative never scopes rows.
pub(crate) fn ensure_valid_till(till_number: i32) -> ResultEngine<()> {
    if till_number <= 0 {
        return Err(EngineError::Validation(format!(
            "invalid till number: {till_number}"
        )));
    }
    Ok(())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
