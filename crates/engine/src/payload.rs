//! Submitted request body helpers.

use serde_json::Value;

/// Field name -> submitted value, as decoded from the request body.
pub type SubmittedFields = serde_json::Map<String, Value>;

/// Text form of a submitted value, or `None` if the value is nil.
///
/// Nil is JSON `null` or the empty string. Numbers and booleans are stored
/// in their JSON text form, as are arrays and objects.
pub fn submitted_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
