// Extra per-note score fields (p-fields beyond the five fixed ones).
//
// Csound score lines carry instrument-specific parameters after the pitch:
// attack and release times, modulator ratios, reverb sends, a trailing
// comment. Each voice declares which of these it emits and their defaults;
// a note may override any of them.
//
// Resolution order for a declared field, applied once when a note is added:
//
//   override and default -> default + override (numbers add, text appends)
//   override only        -> override
//   default only         -> default
//   neither              -> 0

use crate::error::{Result, ScoreError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single extra field value: numeric or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    pub fn zero() -> Self {
        FieldValue::Number(0.0)
    }

    /// Combine a voice default with a per-note override.
    ///
    /// Mixing text with a number is rejected.
    pub fn combine(&self, other: &FieldValue) -> Result<FieldValue> {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => Ok(FieldValue::Number(a + b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Ok(FieldValue::Text(format!("{a}{b}"))),
            _ => Err(ScoreError::InvalidArgument(format!(
                "cannot combine field values {self:?} and {other:?}"
            ))),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Number(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Number(v) => write!(f, "{v}"),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Apply the resolution order above to one field.
pub fn resolve_field(
    override_value: Option<&FieldValue>,
    default_value: Option<&FieldValue>,
) -> Result<FieldValue> {
    match (override_value, default_value) {
        (Some(o), Some(d)) => d.combine(o),
        (Some(o), None) => Ok(o.clone()),
        (None, Some(d)) => Ok(d.clone()),
        (None, None) => Ok(FieldValue::zero()),
    }
}
