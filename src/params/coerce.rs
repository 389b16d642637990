//! Total coercion from raw request values to declared parameter types.
//!
//! Captures, form and query variables arrive as JSON strings; JSON bodies
//! contribute any JSON value. `None` means the value cannot represent the
//! requested type, and binding falls back to the parameter default.
//!
//! | Type     | Accepts                                                                 |
//! |----------|-------------------------------------------------------------------------|
//! | `Int`    | integral numbers in `i64`, floats with zero fraction in range, trimmed integer strings, booleans (1/0) |
//! | `Float`  | numbers, trimmed strings parsing to a finite float, booleans (1.0/0.0) |
//! | `Bool`   | booleans, numbers (0 is false), `1/true/yes/on`, `0/false/no/off/""` (trimmed, case-insensitive) |
//! | `String` | strings, numbers (JSON text), booleans (`"true"`/`"false"`)            |
//! | `Array`  | arrays, scalars wrapped in a one-element array                         |
//! | `Object` | objects                                                                 |
//! | `Json`   | anything                                                                |
//!
//! `null` only passes through `Json`.

use serde_json::{Number, Value};

use super::spec::ParamType;

/// Coerce `value` to `ty`.
#[must_use]
pub fn coerce(value: &Value, ty: ParamType) -> Option<Value> {
    match ty {
        ParamType::Int => to_int(value).map(Value::from),
        ParamType::Float => to_float(value).and_then(Number::from_f64).map(Value::Number),
        ParamType::Bool => to_bool(value).map(Value::Bool),
        ParamType::String => to_string(value).map(Value::String),
        ParamType::Array => match value {
            Value::Array(_) => Some(value.clone()),
            Value::Null | Value::Object(_) => None,
            scalar => Some(Value::Array(vec![scalar.clone()])),
        },
        ParamType::Object => value.is_object().then(|| value.clone()),
        ParamType::Json => Some(value.clone()),
    }
}

fn to_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            // i64::MAX as f64 rounds up to 2^63, which is out of range
            let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
            (f.fract() == 0.0 && in_range).then_some(f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn to_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" | "" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
