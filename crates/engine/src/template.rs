//! Template resolver.
//!
//! Substitutes `{name}` tokens in prompts and payloads from a context map.
//! Pure function: no shared mutable state.

use std::collections::HashMap;

use serde_json::Value;

/// Replace every `{key}` occurrence in `template` with `context[key]`
/// rendered as a string. A missing key substitutes the empty string.
pub fn resolve(template: &str, context: &HashMap<String, Value>) -> String {
    let mut out = String::with_capacity(template.len());
    let bytes = template.as_bytes();

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'{' {
            if let Some(end) = template[i + 1..].find('}') {
                let key = &template[i + 1..i + 1 + end];
                // Only treat this as a token if the key looks like an
                // identifier; otherwise pass the brace through literally so
                // JSON-ish payload templates with stray braces don't get
                // silently eaten.
                if is_token(key) {
                    out.push_str(&value_as_string(context.get(key)));
                    i = i + 1 + end + 1;
                    continue;
                }
            }
        }
        let ch = template[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

fn is_token(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn value_as_string(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Render every string leaf of a JSON payload through [`resolve`], used for
/// plan-step `args` templating.
pub fn resolve_value(value: &Value, context: &HashMap<String, Value>) -> Value {
    match value {
        Value::String(s) => Value::String(resolve(s, context)),
        Value::Array(items) => {
            Value::Array(items.iter().map(|v| resolve_value(v, context)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_value(v, context)))
                .collect(),
        ),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn substitutes_known_keys() {
        let context = ctx(&[("name", json!("Ada"))]);
        assert_eq!(resolve("hello {name}!", &context), "hello Ada!");
    }

    #[test]
    fn missing_key_substitutes_empty() {
        let context = ctx(&[]);
        assert_eq!(resolve("hello {name}!", &context), "hello !");
    }

    #[test]
    fn non_string_values_render_as_json() {
        let context = ctx(&[("count", json!(3))]);
        assert_eq!(resolve("n={count}", &context), "n=3");
    }

    #[test]
    fn stray_braces_pass_through() {
        let context = ctx(&[]);
        assert_eq!(resolve("{not a token}", &context), "{not a token}");
    }

    #[test]
    fn resolves_nested_json_payloads() {
        let context = ctx(&[("city", json!("Boston"))]);
        let payload = json!({"where": "{city}", "list": ["{city}", "static"]});
        let resolved = resolve_value(&payload, &context);
        assert_eq!(resolved["where"], json!("Boston"));
        assert_eq!(resolved["list"][0], json!("Boston"));
        assert_eq!(resolved["list"][1], json!("static"));
    }
}
