//! Lenient numeric block fields.
//!
//! Block parameters come from editors that hand over whatever the user typed,
//! so a numeric field may arrive as a number, as text, or not at all. Nothing
//! here rejects input: a missing field takes the kind's default, text that is
//! not a number becomes NaN, and NaN becomes 0 before any clamping.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// Numeric reading of the value. Blank text reads as 0, other
    /// unparsable text as NaN.
    pub fn to_f64(&self) -> f64 {
        match self {
            Scalar::Number(n) => *n,
            Scalar::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    0.0
                } else {
                    s.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
        }
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Scalar::Number(n)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(n as f64)
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Text(s.to_string())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Text field that may have been written as a number, e.g. `hex: 112233`
/// or `msg: 42` in a hand-edited program.
pub(crate) fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Scalar::deserialize(d).map(|s| s.to_string())
}

pub(crate) fn lenient_opt_text<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<String>, D::Error> {
    Option::<Scalar>::deserialize(d).map(|o| o.map(|s| s.to_string()))
}

/// Coerce an optional field: missing takes `default`, NaN maps to 0.
pub fn coerce(field: Option<&Scalar>, default: f64) -> f64 {
    let n = field.map(Scalar::to_f64).unwrap_or(default);
    if n.is_nan() {
        0.0
    } else {
        n
    }
}

/// Coerce, round half away from zero, and clamp into `[min, max]`.
pub fn coerce_int(field: Option<&Scalar>, default: f64, min: i64, max: i64) -> i64 {
    let n = coerce(field, default).round();
    if n <= min as f64 {
        min
    } else if n >= max as f64 {
        max
    } else {
        n as i64
    }
}

/// Duration in whole milliseconds for a seconds field; negatives become 0.
pub fn seconds_to_ms(field: Option<&Scalar>, default: f64) -> u64 {
    let secs = coerce(field, default).max(0.0);
    let ms = (secs * 1000.0).round();
    if ms.is_finite() {
        ms as u64
    } else {
        0
    }
}

/// Render a float the way the robot expects it in a query: no trailing `.0`.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
