//! Runtime values of the expression language.
//!
//! Values are JSON data plus an explicit `undefined`, which is what reading a missing
//! property produces. Truthiness and text conversion follow JavaScript, because the
//! text produced here is spliced into markup that the client-side runtime would
//! otherwise have rendered itself.

use serde_json::{Number, Value as Json};

/// Largest integer that round-trips through an `f64` exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Result of evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A missing property or an explicit `undefined`
    Undefined,
    /// Any JSON value (null, booleans, numbers, strings, arrays, objects)
    Json(Json),
}

impl Value {
    /// The JSON `null` value.
    pub const NULL: Value = Value::Json(Json::Null);

    /// A string value.
    pub fn string(s: impl Into<String>) -> Self {
        Value::Json(Json::String(s.into()))
    }

    /// A boolean value.
    pub const fn bool(b: bool) -> Self {
        Value::Json(Json::Bool(b))
    }

    /// A numeric value. Integral results are stored as integers so they print
    /// without a fractional part; `None` for NaN and infinities, which JSON cannot
    /// carry.
    pub fn number(n: f64) -> Option<Self> {
        if !n.is_finite() {
            return None;
        }
        if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
            return Some(Value::Json(Json::Number(Number::from(n as i64))));
        }
        Number::from_f64(n).map(|num| Value::Json(Json::Number(num)))
    }

    /// Borrow the JSON payload, `None` for `undefined`.
    pub const fn as_json(&self) -> Option<&Json> {
        match self {
            Value::Undefined => None,
            Value::Json(json) => Some(json),
        }
    }

    /// Convert into JSON for storage inside arrays and objects; `undefined` becomes `null`.
    pub fn into_json(self) -> Json {
        match self {
            Value::Undefined => Json::Null,
            Value::Json(json) => json,
        }
    }

    /// Whether the value is `null` or `undefined`.
    pub const fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Json(Json::Null))
    }

    /// JavaScript truthiness.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined => false,
            Value::Json(json) => match json {
                Json::Null => false,
                Json::Bool(b) => *b,
                Json::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
                Json::String(s) => !s.is_empty(),
                Json::Array(_) | Json::Object(_) => true,
            },
        }
    }

    /// Numeric conversion (`ToNumber`); NaN when there is no numeric reading.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Json(json) => match json {
                Json::Null => 0.0,
                Json::Bool(b) => f64::from(u8::from(*b)),
                Json::Number(n) => n.as_f64().unwrap_or(f64::NAN),
                Json::String(s) => {
                    let trimmed = s.trim();
                    if trimmed.is_empty() {
                        0.0
                    } else {
                        trimmed.parse().unwrap_or(f64::NAN)
                    }
                }
                Json::Array(items) => match items.as_slice() {
                    [] => 0.0,
                    [single] => Value::Json(single.clone()).to_number(),
                    _ => f64::NAN,
                },
                Json::Object(_) => f64::NAN,
            },
        }
    }

    /// Text form (`String(value)`), as spliced into markup.
    pub fn to_text(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Json(json) => json_to_text(json),
        }
    }

    /// Whether `+` on this operand concatenates rather than adds.
    pub(crate) const fn is_stringish(&self) -> bool {
        matches!(self, Value::Json(Json::String(_) | Json::Array(_) | Json::Object(_)))
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        Value::Json(json)
    }
}

fn json_to_text(json: &Json) -> String {
    match json {
        Json::Null => "null".to_string(),
        Json::Bool(b) => b.to_string(),
        Json::Number(n) => number_to_text(n),
        Json::String(s) => s.clone(),
        Json::Array(items) => items
            .iter()
            .map(|item| match item {
                Json::Null => String::new(),
                other => json_to_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Json::Object(_) => "[object Object]".to_string(),
    }
}

/// Integral floats print without a trailing `.0`, like JavaScript.
pub(crate) fn number_to_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => format!("{}", f as i64),
        Some(f) => format!("{f}"),
        None => n.to_string(),
    }
}

/// JSON type name used in diagnostics.
pub(crate) const fn type_name(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
