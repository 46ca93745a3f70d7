//! Helpers shared by query-building backends.

use serde_json::Value as JsonValue;
use vitrine_error::{RecordError, RecordErrorKind};

/// Check that a table or column name is a plain lowercase identifier.
///
/// # Errors
///
/// Returns `InvalidQuery` for anything outside `[a-z_][a-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<(), RecordError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(RecordError::new(RecordErrorKind::InvalidQuery(format!(
            "'{}' is not a valid identifier",
            name
        ))))
    }
}

/// Text form of a scalar used in equality filters.
///
/// Ids arrive both as JSON strings and numbers; both compare by their text.
///
/// # Errors
///
/// Returns `InvalidQuery` for arrays and objects.
pub fn filter_literal(value: &JsonValue) -> Result<String, RecordError> {
    match value {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Bool(b) => Ok(b.to_string()),
        JsonValue::Null => Ok("null".to_string()),
        other => Err(RecordError::new(RecordErrorKind::InvalidQuery(format!(
            "cannot filter on {}",
            other
        )))),
    }
}
