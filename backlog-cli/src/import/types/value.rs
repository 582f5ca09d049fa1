//! Scalar value representation for spreadsheet cells and catalog fields

use serde::{Deserialize, Serialize};

/// A scalar value as read from a spreadsheet cell or held by a catalog field
///
/// Serialized untagged so that JSON payloads (conflict files, resolutions,
/// import plans) read like plain scalars: `null`, `true`, `7`, `8.5`, `"PC"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Empty cell / unset field
    #[default]
    Null,
    /// Boolean cell
    Bool(bool),
    /// Whole number
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text
    String(String),
}

impl Value {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null or empty text
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as float (integers widen)
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Build a value from a float, collapsing integral floats to `Int`
    ///
    /// Spreadsheets store every number as a double; a cell showing `7`
    /// should behave like the integer 7 everywhere downstream.
    pub fn from_number(f: f64) -> Self {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
            Value::Int(f as i64)
        } else {
            Value::Float(f)
        }
    }

    /// Stringified form used as the key of value substitution tables
    ///
    /// Follows the conventional scripting-language rendering: booleans are
    /// `True`/`False`, integral floats keep a trailing `.0`, null is `None`.
    pub fn key_string(&self) -> String {
        match self {
            Value::Null => "None".to_string(),
            Value::Bool(true) => "True".to_string(),
            Value::Bool(false) => "False".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format_float(*f),
            Value::String(s) => s.clone(),
        }
    }

    /// Scalar equality used when comparing catalog values against candidates
    ///
    /// Numbers compare by numeric value so that `8` and `8.0` agree.
    pub fn same_scalar(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                (*a as f64) == *b
            }
            _ => self == other,
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "(null)"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::String(s) => write!(f, "{}", s),
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

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_string_matches_scripting_rendering() {
        assert_eq!(Value::Int(7).key_string(), "7");
        assert_eq!(Value::Float(7.0).key_string(), "7.0");
        assert_eq!(Value::Float(8.5).key_string(), "8.5");
        assert_eq!(Value::Bool(true).key_string(), "True");
        assert_eq!(Value::Null.key_string(), "None");
        assert_eq!(Value::from("x").key_string(), "x");
    }

    #[test]
    fn test_from_number_collapses_integral_floats() {
        assert_eq!(Value::from_number(2019.0), Value::Int(2019));
        assert_eq!(Value::from_number(8.5), Value::Float(8.5));
    }

    #[test]
    fn test_same_scalar_compares_numbers_numerically() {
        assert!(Value::Int(8).same_scalar(&Value::Float(8.0)));
        assert!(!Value::Float(8.0).same_scalar(&Value::Float(9.0)));
        assert!(!Value::from("8").same_scalar(&Value::Int(8)));
    }

    #[test]
    fn test_untagged_json_shape() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 9, 9.5, "PC"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Int(9),
                Value::Float(9.5),
                Value::from("PC"),
            ]
        );
    }
}
