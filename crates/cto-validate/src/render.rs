//! Rendering of offending values into error messages.
//!
//! Values are shown as compact JSON. A value JSON cannot represent (a NaN
//! inside an array, say) falls back to its `Display` form. Resources and
//! relationships render as their fully-qualified identifier.

use crate::instance::Value;

/// Render `value` for an error message, truncated to `max_len` characters.
/// A `max_len` of zero disables truncation.
pub fn render_value(value: &Value, max_len: usize) -> String {
    let text = match value {
        Value::Resource(r) => r.fully_qualified_identifier(),
        Value::Relationship(r) => r.fully_qualified_identifier(),
        other => other
            .to_json()
            .and_then(|json| serde_json::to_string(&json).ok())
            .unwrap_or_else(|| other.to_string()),
    };
    truncate(text, max_len)
}

fn truncate(text: String, max_len: usize) -> String {
    if max_len == 0 || text.chars().count() <= max_len {
        return text;
    }
    let mut cut: String = text.chars().take(max_len).collect();
    cut.push_str("...");
    cut
}
