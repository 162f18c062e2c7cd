use serde_json::Value;

/// Parse an optional JSON option bag from a flag. Absent means `default`.
pub fn parse_json_bag(raw: Option<&str>, field: &str, default: Value) -> anyhow::Result<Value> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: Value = serde_json::from_str(raw)
        .map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))?;
    if !(value.is_object() || value.is_array()) {
        anyhow::bail!("invalid {field} '{raw}': expected a JSON object or array");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::parse_json_bag;

    #[test]
    fn absent_flag_uses_default() {
        let value = parse_json_bag(None, "config", json!({})).expect("default should apply");
        assert_eq!(value, json!({}));
    }

    #[test]
    fn parses_object() {
        let value = parse_json_bag(Some(r#"{"choices":["a","b"]}"#), "config", json!({}))
            .expect("object should parse");
        assert_eq!(value["choices"][1], "b");
    }

    #[test]
    fn errors_on_scalar_or_garbage() {
        let err = parse_json_bag(Some("42"), "validation", json!({})).expect_err("should fail");
        assert!(err.to_string().contains("invalid validation '42'"));
        assert!(parse_json_bag(Some("{oops"), "config", json!({})).is_err());
    }
}
