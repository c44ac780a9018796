//! Evaluated values and their display form.

use std::cmp::Ordering;
use std::fmt;

/// Formula failure sentinels. Evaluation never fails outright; it yields one
/// of these instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The substituted expression contains characters outside the arithmetic set.
    Value,
    /// The arithmetic expression could not be computed.
    Compute,
}

impl ErrorKind {
    pub fn sentinel(&self) -> &'static str {
        match self {
            ErrorKind::Value => "#VALUE!",
            ErrorKind::Compute => "#ERROR!",
        }
    }
}

/// The result of evaluating a cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Text(String),
    Error(ErrorKind),
}

impl Value {
    pub fn empty() -> Value {
        Value::Text(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Text(s) if s.is_empty())
    }

    /// Coerce to a number for substitution into arithmetic.
    /// Text is parsed after trimming; anything unparsable, and errors, become 0.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) if n.is_finite() => *n,
            Value::Number(_) | Value::Error(_) => 0.0,
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or(0.0),
        }
    }

    /// Ordering used for sorting: numbers (numerically) before text (by code
    /// point), errors last.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Number(_) => 0,
                Value::Text(_) => 1,
                Value::Error(_) => 2,
            }
        }
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            (Value::Error(a), Value::Error(b)) => a.sentinel().cmp(b.sentinel()),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Text(s) => f.write_str(s),
            Value::Error(kind) => f.write_str(kind.sentinel()),
        }
    }
}

/// Format a number for display: integers without a fraction, everything else
/// in its shortest round-tripping form.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n == 0.0 {
        // Avoid "-0".
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Format a value for display.
pub fn format_value(value: &Value) -> String {
    value.to_string()
}
