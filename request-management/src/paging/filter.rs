//! Filter conditions carried by a [`Pager`](super::Pager)
//!
//! Operators are an open set of string tokens. This layer never checks that a field or
//! operator is legal; the data service decides what it understands.
//!
//! # Example
//!
//! ```rust
//! use request_management::paging::{operators, FilterCondition, FilterValue};
//!
//! let status = FilterCondition::equal("Status", "Active");
//! assert_eq!(status.operator, operators::EQUAL);
//!
//! let depth = FilterCondition::greater_than("Depth", 1200_i64);
//! assert_eq!(depth.value, FilterValue::Integer(1200));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Well-known operator tokens
pub mod operators {
    pub const EQUAL: &str = "equal";
    pub const NOT_EQUAL: &str = "notEqual";
    pub const CONTAINS: &str = "contains";
    pub const STARTS_WITH: &str = "startsWith";
    pub const GREATER_THAN: &str = "greaterThan";
    pub const GREATER_THAN_OR_EQUAL: &str = "greaterThanOrEqual";
    pub const LESS_THAN: &str = "lessThan";
    pub const LESS_THAN_OR_EQUAL: &str = "lessThanOrEqual";
    pub const IN: &str = "in";
}

/// An untyped filter operand
///
/// Serialized without a tag, so JSON `"abc"`, `42`, `true` and `null` map straight onto
/// the matching variant. RFC 3339 strings deserialize as [`FilterValue::DateTime`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// No value
    #[default]
    Null,
    /// Boolean value
    Boolean(bool),
    /// 64-bit integer value
    Integer(i64),
    /// 64-bit floating point value
    Float(f64),
    /// Point in time
    DateTime(DateTime<Utc>),
    /// String value
    String(String),
    /// List of values (for `in`)
    List(Vec<FilterValue>),
}

impl FilterValue {
    /// Check whether this is [`FilterValue::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Convert to a JSON value for backends that filter serialized rows
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Boolean(b) => serde_json::Value::Bool(*b),
            Self::Integer(n) => serde_json::Value::from(*n),
            Self::Float(n) => serde_json::Value::from(*n),
            Self::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) => {
                serde_json::Value::Array(items.iter().map(FilterValue::to_json).collect())
            }
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for FilterValue {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl<T: Into<FilterValue>> From<Vec<T>> for FilterValue {
    fn from(list: Vec<T>) -> Self {
        Self::List(list.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// A single filter on a field with an operator and value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterCondition {
    /// The target field name (e.g., "Status")
    pub field: String,
    /// The comparison operator token (e.g., "equal", "contains")
    pub operator: String,
    /// The value to compare against
    pub value: FilterValue,
}

impl FilterCondition {
    /// Create a filter with an arbitrary operator token
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    pub fn equal(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, operators::EQUAL, value)
    }

    pub fn not_equal(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, operators::NOT_EQUAL, value)
    }

    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, operators::CONTAINS, FilterValue::String(value.into()))
    }

    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, operators::STARTS_WITH, FilterValue::String(value.into()))
    }

    pub fn greater_than(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, operators::GREATER_THAN, value)
    }

    pub fn greater_than_or_equal(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, operators::GREATER_THAN_OR_EQUAL, value)
    }

    pub fn less_than(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, operators::LESS_THAN, value)
    }

    pub fn less_than_or_equal(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, operators::LESS_THAN_OR_EQUAL, value)
    }

    /// Create an `in` filter over a list of values
    pub fn in_list<T: Into<FilterValue>>(field: impl Into<String>, values: Vec<T>) -> Self {
        Self::new(field, operators::IN, FilterValue::from(values))
    }
}
