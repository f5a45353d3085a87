//! Human-readable rendering of values for diagnostics.
//!
//! Output is JSON with a two-space indent, except that function references
//! are rendered as labeled strings showing their name and source text, so a
//! mismatched `call` effect can be told apart from its neighbours.

use crate::Value;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// Largest integer an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Only reachable inside lists; record fields skip it below.
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else if n.is_finite() {
                    serializer.serialize_f64(*n)
                } else {
                    serializer.serialize_unit()
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Record(fields) => {
                let defined = fields.iter().filter(|(_, v)| !v.is_undefined());
                let mut map = serializer.serialize_map(None)?;
                for (k, v) in defined {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Function { name, source } => {
                serializer.serialize_str(&function_label(name.as_deref(), source))
            }
        }
    }
}

fn function_label(name: Option<&str>, source: &str) -> String {
    match name {
        Some(name) if !name.is_empty() => format!("[Function: {name}]: {source}"),
        _ => format!("[Function]: {source}"),
    }
}

/// Pretty-print a value for an error message.
///
/// A bare `Undefined` has no JSON form and renders as `undefined`.
pub fn render(value: &Value) -> String {
    if value.is_undefined() {
        return "undefined".to_string();
    }
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unrenderable: {e}>"))
}

/// Single-line variant of [`render`], used in log fields.
pub fn render_compact(value: &Value) -> String {
    if value.is_undefined() {
        return "undefined".to_string();
    }
    serde_json::to_string(value).unwrap_or_else(|e| format!("<unrenderable: {e}>"))
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&render_compact(self))
    }
}
