//! Materialized record values
//!
//! The character engine only produces spans; these types hold the owned
//! values a [`crate::CsvReader`] materializes from them once a record is
//! complete.

use std::fmt;

use crate::error::{FlatError, Result};

/// A single logical field value after sanitization
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldValue {
    /// Field matched the dialect's null sequence
    Null,
    /// Text value (possibly empty)
    Text(String),
    /// Array field: the elements between the array prefix and suffix
    Array(Vec<FieldValue>),
}

impl FieldValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Convert the value to a display string. Null renders empty,
    /// arrays render comma-joined.
    pub fn as_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Array(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.as_string()).collect();
                parts.join(",")
            }
        }
    }

    /// Borrow the text value, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to convert to integer; null converts to `None`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to float; null converts to `None`
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Try to convert to boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Text(s) => match s.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Some(true),
                "false" | "no" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Borrow the array elements, if this is an array field
    pub fn as_array(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
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

impl From<Option<String>> for FieldValue {
    fn from(s: Option<String>) -> Self {
        match s {
            Some(s) => FieldValue::Text(s),
            None => FieldValue::Null,
        }
    }
}

/// A complete parsed record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Fields in column order
    pub fields: Vec<FieldValue>,
}

impl Record {
    /// Create a record from its fields
    pub fn new(fields: Vec<FieldValue>) -> Self {
        Record { fields }
    }

    /// Get number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get the field at column index
    pub fn get(&self, col: usize) -> Option<&FieldValue> {
        self.fields.get(col)
    }

    /// Get the field at column index, or an error naming the range
    pub fn field(&self, col: usize) -> Result<&FieldValue> {
        self.fields.get(col).ok_or(FlatError::ColumnOutOfRange {
            index: col,
            count: self.fields.len(),
        })
    }

    /// Text of the field at column index; `None` for a null field
    pub fn get_str(&self, col: usize) -> Result<Option<&str>> {
        match self.field(col)? {
            FieldValue::Null => Ok(None),
            FieldValue::Text(s) => Ok(Some(s)),
            FieldValue::Array(_) => Err(FlatError::Conversion(format!(
                "column {} is an array field",
                col
            ))),
        }
    }

    /// Integer value of the field at column index; `None` for null
    pub fn get_i64(&self, col: usize) -> Result<Option<i64>> {
        let field = self.field(col)?;
        if field.is_null() {
            return Ok(None);
        }
        field.as_i64().map(Some).ok_or_else(|| {
            FlatError::Conversion(format!("column {} is not an integer: '{}'", col, field))
        })
    }

    /// Float value of the field at column index; `None` for null
    pub fn get_f64(&self, col: usize) -> Result<Option<f64>> {
        let field = self.field(col)?;
        if field.is_null() {
            return Ok(None);
        }
        field.as_f64().map(Some).ok_or_else(|| {
            FlatError::Conversion(format!("column {} is not a number: '{}'", col, field))
        })
    }

    /// Boolean value of the field at column index; `None` for null
    pub fn get_bool(&self, col: usize) -> Result<Option<bool>> {
        let field = self.field(col)?;
        if field.is_null() {
            return Ok(None);
        }
        field.as_bool().map(Some).ok_or_else(|| {
            FlatError::Conversion(format!("column {} is not a boolean: '{}'", col, field))
        })
    }

    /// Convert the record to a vector of display strings
    pub fn to_strings(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.as_string()).collect()
    }
}

impl From<Vec<FieldValue>> for Record {
    fn from(fields: Vec<FieldValue>) -> Self {
        Record { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_conversions() {
        let val = FieldValue::Text("42".to_string());
        assert_eq!(val.as_i64(), Some(42));
        assert_eq!(val.as_f64(), Some(42.0));

        let val = FieldValue::Text("yes".to_string());
        assert_eq!(val.as_bool(), Some(true));

        assert!(FieldValue::Null.is_null());
        assert_eq!(FieldValue::Null.as_i64(), None);
    }

    #[test]
    fn test_array_display() {
        let val = FieldValue::Array(vec![
            FieldValue::Text("a".to_string()),
            FieldValue::Text("b".to_string()),
        ]);
        assert_eq!(val.as_string(), "a,b");
        assert_eq!(val.as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_record_accessors() {
        let record = Record::new(vec![
            FieldValue::Text("x".to_string()),
            FieldValue::Null,
            FieldValue::Text("7".to_string()),
        ]);
        assert_eq!(record.len(), 3);
        assert_eq!(record.get_str(0).unwrap(), Some("x"));
        assert_eq!(record.get_str(1).unwrap(), None);
        assert_eq!(record.get_i64(2).unwrap(), Some(7));
        assert!(matches!(
            record.field(3),
            Err(FlatError::ColumnOutOfRange { index: 3, count: 3 })
        ));
    }

    #[test]
    fn test_record_conversion_errors() {
        let record = Record::new(vec![FieldValue::Text("abc".to_string())]);
        assert!(matches!(
            record.get_i64(0),
            Err(FlatError::Conversion(_))
        ));
    }
}
