//! Field value types

use std::fmt;

/// Represents the value stored in a row field
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    /// Empty field (no value)
    #[default]
    Empty,

    /// Boolean value (checkbox columns)
    Boolean(bool),

    /// Numeric value (all numbers stored as f64)
    Number(f64),

    /// Text value
    Text(String),

    /// Photo attachment references (photo columns)
    Photos(Vec<String>),
}

impl FieldValue {
    /// Create a new text value
    pub fn text<S: Into<String>>(s: S) -> Self {
        FieldValue::Text(s.into())
    }

    /// Check if the field is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Try to get the value as a number.
    ///
    /// Text parses permissively: surrounding whitespace is ignored and a
    /// comma decimal separator is accepted ("12,5" -> 12.5), matching the
    /// keyboard habits of the quote screens this data comes from.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Boolean(true) => Some(1.0),
            FieldValue::Boolean(false) => Some(0.0),
            FieldValue::Text(s) => parse_number(s),
            _ => None,
        }
    }

    /// Get the value as a number, coercing anything unparseable to `0.0`.
    ///
    /// This is the coercion rule every derived computation uses: a blank or
    /// junk cell contributes zero rather than failing the row.
    pub fn coerce_number(&self) -> f64 {
        self.as_number().filter(|n| n.is_finite()).unwrap_or(0.0)
    }

    /// Try to get the value as a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            FieldValue::Number(n) => Some(*n != 0.0),
            FieldValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "oui" | "1" => Some(true),
                "false" | "non" | "0" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Get the value as display text
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Boolean(true) => "true".to_string(),
            FieldValue::Boolean(false) => "false".to_string(),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            FieldValue::Text(s) => s.clone(),
            FieldValue::Photos(p) => p.join(", "),
        }
    }
}

/// Parse a number the way the quote screens accept them: trimmed, with
/// either `.` or `,` as the decimal separator. Empty text is not a number.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Only swap the comma when it plays the decimal-separator role,
    // otherwise "1,2,3" would sneak through as 1.23.
    if trimmed.matches(',').count() == 1 && !trimmed.contains('.') {
        trimmed.replace(',', ".").parse().ok()
    } else {
        trimmed.parse().ok()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Boolean(b)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}
