use serde_json::Value;

/// Convert a raw attribute string into a usable value.
///
/// Decision order: blank → `true`; the literal `"false"`/`"true"` →
/// booleans; numeric-looking strings → numbers; JSON-parseable strings →
/// the parsed value; anything else stays a string. JSON failures fall back
/// to the raw string and are never surfaced.
pub fn coerce(value: &str) -> Value {
    if value.is_empty() {
        return Value::Bool(true);
    }
    if value == "false" {
        return Value::Bool(false);
    }
    if value == "true" {
        return Value::Bool(true);
    }
    if !value.trim().is_empty() {
        if let Ok(n) = value.trim().parse::<i64>() {
            return Value::from(n);
        }
        if let Ok(f) = value.trim().parse::<f64>()
            && f.is_finite()
        {
            return Value::from(f);
        }
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(value) {
        return parsed;
    }
    Value::String(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_round_trip() {
        assert_eq!(coerce(""), json!(true));
        assert_eq!(coerce("false"), json!(false));
        assert_eq!(coerce("true"), json!(true));
        assert_eq!(coerce("42"), json!(42));
        assert_eq!(coerce("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(coerce("hello"), json!("hello"));
    }

    #[test]
    fn coerce_handles_floats_and_negatives() {
        assert_eq!(coerce("4.5"), json!(4.5));
        assert_eq!(coerce("-7"), json!(-7));
    }

    #[test]
    fn malformed_json_falls_back_to_the_raw_string() {
        assert_eq!(coerce("{not json"), json!("{not json"));
        assert_eq!(coerce("[1,"), json!("[1,"));
    }

    #[test]
    fn whitespace_only_is_not_numeric() {
        assert_eq!(coerce("   "), json!("   "));
    }
}
