use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Cell format used for [`Value::Date`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single spreadsheet cell.
///
/// Equality and hashing go through [`Value::to_cell`]: two values are equal
/// when they would be written to the backing file identically. This keeps
/// `Value::from("42")` and the `Integer(42)` read back from disk on the same
/// key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Empty,
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl Value {
    /// Types a raw cell read from a file.
    ///
    /// A typed variant is chosen only when its canonical rendering reproduces
    /// `cell` exactly, so leading zeros, signs and trailing decimal zeros stay
    /// text and every cell round-trips byte for byte.
    pub fn infer(cell: &str) -> Self {
        if cell.is_empty() {
            return Value::Empty;
        }
        if let Ok(n) = cell.parse::<i64>() {
            if n.to_string() == cell {
                return Value::Integer(n);
            }
        }
        if let Ok(f) = cell.parse::<f64>() {
            if f.is_finite() && f.to_string() == cell {
                return Value::Float(f);
            }
        }
        if let Ok(d) = NaiveDate::parse_from_str(cell, DATE_FORMAT) {
            if d.format(DATE_FORMAT).to_string() == cell {
                return Value::Date(d);
            }
        }
        Value::Text(cell.to_string())
    }

    /// Canonical cell text.
    pub fn to_cell(&self) -> Cow<'_, str> {
        match self {
            Value::Empty => Cow::Borrowed(""),
            Value::Text(s) => Cow::Borrowed(s.as_str()),
            Value::Integer(n) => Cow::Owned(n.to_string()),
            Value::Float(f) => Cow::Owned(f.to_string()),
            Value::Date(d) => Cow::Owned(d.format(DATE_FORMAT).to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_cell().is_empty()
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.to_cell() == other.to_cell()
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_cell().hash(state);
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_keeps_leading_zeros_as_text() {
        assert_eq!(Value::infer("007").as_str(), Some("007"));
        assert_eq!(Value::infer("+7999").as_str(), Some("+7999"));
        assert_eq!(Value::infer("1.50").as_str(), Some("1.50"));
    }

    #[test]
    fn infer_types_canonical_cells() {
        assert_eq!(Value::infer("89990001111").as_i64(), Some(89_990_001_111));
        assert_eq!(Value::infer("1.5").as_f64(), Some(1.5));
        assert!(Value::infer("2024-02-29").as_date().is_some());
        assert!(matches!(Value::infer(""), Value::Empty));
    }

    #[test]
    fn text_and_typed_values_compare_by_cell() {
        assert_eq!(Value::from("42"), Value::Integer(42));
        assert_ne!(Value::from("042"), Value::Integer(42));
    }
}
