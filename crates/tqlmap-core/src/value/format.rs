use crate::value::Value;
use chrono::SecondsFormat;

/// Render a value as a TypeQL literal.
#[must_use]
pub fn format(value: &Value) -> String {
    match value {
        Value::Text(s) => format!("\"{}\"", escape_string(s)),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Bool(v) => v.to_string(),
        Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        Value::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        Value::DateTimeTz(dt) => dt.to_rfc3339_opts(SecondsFormat::Secs, true),
    }
}

/// Escape a string body for use inside a double-quoted literal.
#[must_use]
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }

    out
}
