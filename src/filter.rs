//! Query filters passed to the generic query call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type of the field a filter compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// 32-bit integer column.
    Int,
    /// String column.
    String,
}

/// An equality predicate: `field == value`, where `value` is the
/// string-encoded form of a `field_type` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryFilter {
    /// Field (column) name.
    pub field: String,
    /// Type of the field.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// String-encoded comparison value.
    pub value: String,
}

impl QueryFilter {
    /// Build an equality filter.
    pub fn equals(field: impl Into<String>, field_type: FieldType, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            field_type,
            value: value.into(),
        }
    }

    /// Equality filter on an integer field.
    pub fn int(field: impl Into<String>, value: i32) -> Self {
        Self::equals(field, FieldType::Int, value.to_string())
    }

    /// Equality filter on a string field.
    pub fn string(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::equals(field, FieldType::String, value)
    }
}

impl fmt::Display for QueryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field_type {
            FieldType::Int => write!(f, "{} = {}", self.field, self.value),
            FieldType::String => write!(f, "{} = '{}'", self.field, self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_wire_format() {
        let filter = QueryFilter::int("RowId", 42);
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"field": "RowId", "type": "int", "value": "42"})
        );
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(QueryFilter::int("RowId", 7).to_string(), "RowId = 7");
        assert_eq!(
            QueryFilter::string("KeyStr", "10001").to_string(),
            "KeyStr = '10001'"
        );
    }
}
