//! JSON extractor.
//!
//! Extracts the first balanced JSON object from free-form agent output and
//! reads typed fields defensively — agent output is untrusted free text, not
//! a guaranteed JSON document, so this never panics on malformed input.

use serde_json::Value;

/// Scan `text` for the first balanced `{...}` span and parse it as JSON.
/// Returns `None` if no balanced object is found or it doesn't parse.
pub fn extract_first_json_object(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let start = bytes.iter().position(|&b| b == b'{')?;

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut end = None;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + offset + 1);
                    break;
                }
            }
            _ => {}
        }
    }

    let end = end?;
    serde_json::from_str(&text[start..end]).ok()
}

/// Read a numeric field by trying each alias in order, returning the first
/// one present. Accepts a JSON number or a numeric string.
pub fn read_f64_alias(value: &Value, aliases: &[&str]) -> Option<f64> {
    let obj = value.as_object()?;
    for alias in aliases {
        if let Some(field) = obj.get(*alias) {
            if let Some(n) = field.as_f64() {
                return Some(n);
            }
            if let Some(s) = field.as_str() {
                if let Ok(n) = s.parse::<f64>() {
                    return Some(n);
                }
            }
        }
    }
    None
}

/// Read a string field by trying each alias in order.
pub fn read_string_alias(value: &Value, aliases: &[&str]) -> Option<String> {
    let obj = value.as_object()?;
    for alias in aliases {
        if let Some(field) = obj.get(*alias) {
            if let Some(s) = field.as_str() {
                return Some(s.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_object_embedded_in_prose() {
        let text = r#"Sure, here you go: {"score": 87, "note": "solid"} — let me know if you need more."#;
        let value = extract_first_json_object(text).expect("should find object");
        assert_eq!(value, json!({"score": 87, "note": "solid"}));
    }

    #[test]
    fn handles_nested_braces() {
        let text = r#"result {"outer": {"inner": 1}, "score": 42}"#;
        let value = extract_first_json_object(text).expect("should find object");
        assert_eq!(value["score"], json!(42));
        assert_eq!(value["outer"]["inner"], json!(1));
    }

    #[test]
    fn ignores_braces_inside_strings() {
        let text = r#"{"message": "use { and } carefully", "score": 10}"#;
        let value = extract_first_json_object(text).expect("should find object");
        assert_eq!(value["score"], json!(10));
    }

    #[test]
    fn returns_none_when_unbalanced() {
        let text = "no json here { still not json";
        assert!(extract_first_json_object(text).is_none());
    }

    #[test]
    fn score_alias_priority_order() {
        let value = json!({"rating": 55, "score": 90});
        assert_eq!(read_f64_alias(&value, &["score", "rating"]), Some(90.0));
        assert_eq!(read_f64_alias(&value, &["rating", "score"]), Some(55.0));
    }

    #[test]
    fn numeric_string_score_is_parsed() {
        let value = json!({"score": "72.5"});
        assert_eq!(read_f64_alias(&value, &["score"]), Some(72.5));
    }
}
