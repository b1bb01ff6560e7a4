//! Lenient numeric coercion for amounts stored with no schema guarantees
//!
//! Anything that is not clearly a number counts as zero: blanks, nulls,
//! currency strings like "$45", free text. Never fails, never returns NaN.

use serde_json::Value;

/// Convert one value to a finite number, 0.0 when it does not parse
pub fn to_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };

    if n.is_finite() { n } else { 0.0 }
}

/// Coerce a whole column; output has the same length as the input
pub fn to_numbers<'a>(values: impl IntoIterator<Item = &'a Value>) -> Vec<f64> {
    values.into_iter().map(to_number).collect()
}
