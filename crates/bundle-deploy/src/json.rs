//! Helpers over `serde_json::Value` for reading deploy service errors.

use serde_json::Value;

/// Finds the first field named `name` anywhere under `value`.
///
/// Depth-first in document order: an object's own key is matched before
/// descending into that key's value, then the search moves to the next key.
pub fn find_field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == name {
                    return Some(child);
                }
                if let Some(found) = find_field(child, name) {
                    return Some(found);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(|item| find_field(item, name)),
        _ => None,
    }
}

/// Renders a JSON value as display text.
///
/// Strings are unquoted, other scalars use their literal form, containers
/// render empty.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}
