//! Shared types used across the codebase

use serde::{Deserialize, Serialize};

/// A number as loosely-typed clients and the model send it: `3`, `"3"`, `"10-12"`.
///
/// The JSON form is kept as sent so values pass through unchanged; `value()`
/// gives the numeric reading (NaN when the text is not a number).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(serde_json::Number),
    Text(String),
    Flag(bool),
}

impl Numeric {
    pub fn value(&self) -> f64 {
        match self {
            Numeric::Number(n) => n.as_f64().unwrap_or(f64::NAN),
            Numeric::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Numeric::Flag(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Leading integer of the value: `4`, `"4 días"` and `4.7` all read as 4
    pub fn leading_integer(&self) -> Option<i64> {
        match self {
            Numeric::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
            Numeric::Text(s) => {
                let trimmed = s.trim_start();
                let (sign, digits) = match trimmed.strip_prefix('-') {
                    Some(rest) => (-1, rest),
                    None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
                };
                let end = digits
                    .char_indices()
                    .find(|(_, c)| !c.is_ascii_digit())
                    .map(|(i, _)| i)
                    .unwrap_or(digits.len());
                digits[..end].parse::<i64>().ok().map(|n| sign * n)
            }
            Numeric::Flag(_) => None,
        }
    }
}

/// Numeric reading of an optional field, falling back when it is absent, zero or not a number
pub fn number_or(value: Option<&Numeric>, default: f64) -> f64 {
    match value.map(Numeric::value) {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => default,
    }
}

/// Numeric reading for decimal columns; `None` when absent or not a number
pub fn number(value: Option<&Numeric>) -> Option<f64> {
    value.map(Numeric::value).filter(|v| v.is_finite())
}

/// Whole-number reading for integer columns; `None` when absent or not a number
pub fn integer(value: Option<&Numeric>) -> Option<i64> {
    number(value).map(|v| v.round() as i64)
}

/// Whether a loosely-typed JSON field counts as supplied: not null, false, 0 or ""
pub fn is_truthy(value: Option<&serde_json::Value>) -> bool {
    use serde_json::Value;
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Whether a required field was supplied with a usable value
pub fn is_present(value: Option<&Numeric>) -> bool {
    match value {
        None => false,
        Some(Numeric::Text(s)) => !s.is_empty(),
        Some(Numeric::Flag(b)) => *b,
        Some(Numeric::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
    }
}
