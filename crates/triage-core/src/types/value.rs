//! Typed metadata values.
//!
//! A catalogued product carries a bag of named metadata values, each one an
//! integer, a float, or a string. Rule evaluation works in the float domain,
//! so integers widen on demand; strings never coerce.

use serde::{Deserialize, Serialize};

/// A single typed metadata value.
///
/// Deserializes untagged, so a JSON sidecar like `{"depth": 3, "ratio": 0.5,
/// "site": "crater"}` maps each value onto the matching variant (integers
/// before floats).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// Storage type tags, matching the `type` column of the metadata table.
const TAG_INTEGER: i64 = 0;
const TAG_FLOAT: i64 = 1;
const TAG_TEXT: i64 = 2;

impl MetadataValue {
    /// True for `Integer` and `Float` values.
    pub fn is_numeric(&self) -> bool {
        matches!(self, MetadataValue::Integer(_) | MetadataValue::Float(_))
    }

    /// Numeric value in the float domain; integers widen to `f64`.
    ///
    /// Callers must check [`is_numeric`](Self::is_numeric) first. A `Text`
    /// value yields NaN, the evaluator's benign sentinel, rather than
    /// panicking.
    pub fn as_numeric(&self) -> f64 {
        match self {
            MetadataValue::Integer(i) => *i as f64,
            MetadataValue::Float(x) => *x,
            MetadataValue::Text(_) => f64::NAN,
        }
    }

    /// String slice for `Text` values, empty string otherwise.
    pub fn as_text(&self) -> &str {
        match self {
            MetadataValue::Text(s) => s,
            _ => "",
        }
    }

    /// Storage type tag (0 = integer, 1 = float, 2 = text).
    pub fn type_tag(&self) -> i64 {
        match self {
            MetadataValue::Integer(_) => TAG_INTEGER,
            MetadataValue::Float(_) => TAG_FLOAT,
            MetadataValue::Text(_) => TAG_TEXT,
        }
    }

    /// Reconstruct a value from its storage columns. Returns `None` for an
    /// unknown tag.
    pub fn from_columns(tag: i64, int_value: i64, float_value: f64, text_value: String) -> Option<Self> {
        match tag {
            TAG_INTEGER => Some(MetadataValue::Integer(int_value)),
            TAG_FLOAT => Some(MetadataValue::Float(float_value)),
            TAG_TEXT => Some(MetadataValue::Text(text_value)),
            _ => None,
        }
    }

    /// Storage column projection: `(int, float, text)` with the inactive
    /// columns at their defaults.
    pub fn to_columns(&self) -> (i64, f64, String) {
        match self {
            MetadataValue::Integer(i) => (*i, 0.0, String::new()),
            MetadataValue::Float(x) => (0, *x, String::new()),
            MetadataValue::Text(s) => (0, 0.0, s.clone()),
        }
    }
}

impl Default for MetadataValue {
    fn default() -> Self {
        MetadataValue::Integer(0)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Integer(v)
    }
}

impl From<f64> for MetadataValue {
    fn from(v: f64) -> Self {
        MetadataValue::Float(v)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::Text(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::Text(v)
    }
}
