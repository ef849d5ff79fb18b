use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Cell
///
/// One value of a raw result row. Drivers may hand values over bare
/// (`"Alice"`) or wrapped with type metadata (`{"value": "Alice", "type": {..}}`);
/// both shapes deserialize into this tagged type and are unwrapped structurally.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Self>),
    Row(BTreeMap<String, Self>),
}

impl Cell {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Numeric view of a cell. Accepts numbers, plain numeric text, and the
    /// `Value(integer: N)` / `Value(long: N)` / `Value(double: N)` renderings
    /// some drivers produce for reduce results.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(s) => parse_numeric_text(s),
            Self::Row(map) => map.get("value").and_then(Self::as_f64),
            _ => None,
        }
    }

    /// Integer view of a cell; doubles are accepted only when integral.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.fract() == 0.0 && v.is_finite() => Some(*v as i64),
            Self::Text(s) => {
                let inner = strip_value_wrapper(s);
                inner.parse::<i64>().ok().or_else(|| {
                    inner
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0 && f.is_finite())
                        .map(|f| f as i64)
                })
            }
            Self::Row(map) => map.get("value").and_then(Self::as_i64),
            _ => None,
        }
    }

    /// Plain-text rendering used for group keys.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Float(v) => v.to_string(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items
                .iter()
                .map(Self::render)
                .collect::<Vec<_>>()
                .join(","),
            Self::Row(map) => map
                .get("value")
                .map_or_else(|| format!("{map:?}"), Self::render),
        }
    }
}

fn strip_value_wrapper(s: &str) -> &str {
    let s = s.trim();
    let Some(inner) = s.strip_prefix("Value(").and_then(|r| r.strip_suffix(')')) else {
        return s;
    };

    match inner.split_once(':') {
        Some((_, number)) => number.trim(),
        None => inner.trim(),
    }
}

fn parse_numeric_text(s: &str) -> Option<f64> {
    strip_value_wrapper(s).parse::<f64>().ok()
}

// ---------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------

impl From<serde_json::Value> for Cell {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float))
                .unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Row(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
