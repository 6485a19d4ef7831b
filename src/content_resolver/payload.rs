use serde_json::Value;

/// Extracts the display text of a fetched message payload.
///
/// Looks at `body` (when it is a string), `body.text`, `body.message`, `text` and `message`, in
/// that order; the first string found wins. Any other shape has no extractable text and callers
/// are expected to fall back to showing the content pointer.
#[must_use]
pub fn extract_text(payload: &Value) -> Option<&str> {
    let body = payload.get("body");

    body.and_then(Value::as_str)
        .or_else(|| body.and_then(|b| b.get("text")).and_then(Value::as_str))
        .or_else(|| body.and_then(|b| b.get("message")).and_then(Value::as_str))
        .or_else(|| payload.get("text").and_then(Value::as_str))
        .or_else(|| payload.get("message").and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn first_present_shape_wins() {
        assert_eq!(extract_text(&json!({ "body": "a", "text": "b" })), Some("a"));
        assert_eq!(extract_text(&json!({ "body": { "text": "a", "message": "b" } })), Some("a"));
        assert_eq!(extract_text(&json!({ "body": { "message": "a" }, "text": "b" })), Some("a"));
        assert_eq!(extract_text(&json!({ "text": "a", "message": "b" })), Some("a"));
        assert_eq!(extract_text(&json!({ "message": "a" })), Some("a"));
    }

    #[test]
    fn non_string_candidates_are_skipped() {
        assert_eq!(extract_text(&json!({ "body": { "text": 5 }, "message": "m" })), Some("m"));
    }

    #[test]
    fn unknown_shapes_have_no_text() {
        assert_eq!(extract_text(&json!({ "content": "x" })), None);
        assert_eq!(extract_text(&json!("plain string")), None);
        assert_eq!(extract_text(&json!([1, 2, 3])), None);
    }
}
