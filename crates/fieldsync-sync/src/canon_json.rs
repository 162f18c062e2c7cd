//! Deterministic JSON encoding: object keys sorted at every depth, no
//! whitespace. Used only as checksum input, never written to disk.

use serde_json::Value;

fn write_canonical(value: &Value, out: &mut String) -> Result<(), serde_json::Error> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => out.push_str(&serde_json::to_string(s)?),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (idx, key) in keys.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(&map[*key], out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Encode `value` canonically.
///
/// # Errors
///
/// Returns `serde_json::Error` if a string cannot be encoded.
pub fn to_canonical_string(value: &Value) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}
