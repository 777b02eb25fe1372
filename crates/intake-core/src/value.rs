//! # Dynamic Value Model
//!
//! [`Value`] is the single representation request data takes while it
//! moves through the pipeline: decoded bodies and query strings come in
//! as values, every filter maps a value to a value, every validator
//! inspects a value, and cleaned output is a tree of values again.
//!
//! The model is a superset of JSON: it adds [`Value::DateTime`] so the
//! date filters can hand a real timestamp to the date validators
//! instead of a re-parsed string.
//!
//! ## Emptiness
//!
//! Two distinct notions, both defined here so the whole pipeline agrees:
//!
//! - [`Value::is_empty`] — the engine's allow-empty test. Absent input,
//!   the empty string and the empty array count as empty.
//! - [`Value::is_blank`] — the wider set the not-empty validator uses:
//!   additionally `false` and `0.0`.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

/// Render format for [`Value::DateTime`] when converting to JSON.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A dynamically typed value flowing through the validation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent or explicitly null.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// A parsed timestamp, produced by the date filters.
    DateTime(NaiveDateTime),
    /// Ordered sequence.
    Array(Vec<Value>),
    /// Key/value mapping with stable iteration order.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// The engine's allow-empty test: absent input, `""` and `[]`.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    /// The not-empty validator's test: [`Value::is_empty`] plus `false`
    /// and `0.0`.
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Bool(b) => !b,
            Value::Float(f) => *f == 0.0,
            other => other.is_empty(),
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Borrow the string contents, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the object contents, if this is an object.
    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key on an object value. Any other shape yields `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Render this value the way it would appear inside a message
    /// (`%value%` interpolation). Strings render bare, without quotes.
    pub fn display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Value::Array(_) | Value::Object(_) => self.type_name().to_string(),
        }
    }

    /// Convert a `serde_json::Value` tree into the pipeline model.
    ///
    /// Integral numbers become [`Value::Int`]; everything else that
    /// JSON can express maps one-to-one.
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert back to a `serde_json::Value` for response rendering.
    ///
    /// [`Value::DateTime`] renders as a `%Y-%m-%d %H:%M:%S` string;
    /// non-finite floats degrade to null (JSON cannot carry them).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::DateTime(dt) => {
                serde_json::Value::String(dt.format(DATETIME_FORMAT).to_string())
            }
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
