//! Schema-less row snapshots
//!
//! The capture trigger stores each row image as `to_jsonb(OLD)` / `to_jsonb(NEW)`.
//! Target tables are heterogeneous and configured at runtime, so a snapshot is
//! kept as an ordered mapping from column name to a tagged [`ColumnValue`]
//! rather than a fixed struct.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::RowAuditError;

/// Name of the single-column key every audited table must expose.
pub const KEY_COLUMN: &str = "id";

/// A single column value inside a [`RowSnapshot`].
///
/// Integers that fit in `i64` are kept as [`ColumnValue::Integer`]; every other
/// JSON number is kept verbatim as [`ColumnValue::Number`] so no precision is
/// lost when it is written back. Arrays and composite values stay as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum ColumnValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(Number),
    Text(String),
    Json(Value),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Value> for ColumnValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(v) => Self::Bool(v),
            Value::Number(n) => match n.as_i64() {
                Some(v) => Self::Integer(v),
                None => Self::Number(n),
            },
            Value::String(v) => Self::Text(v),
            other @ (Value::Array(_) | Value::Object(_)) => Self::Json(other),
        }
    }
}

impl From<ColumnValue> for Value {
    fn from(value: ColumnValue) -> Self {
        match value {
            ColumnValue::Null => Value::Null,
            ColumnValue::Bool(v) => Value::Bool(v),
            ColumnValue::Integer(v) => Value::Number(v.into()),
            ColumnValue::Number(n) => Value::Number(n),
            ColumnValue::Text(v) => Value::String(v),
            ColumnValue::Json(v) => v,
        }
    }
}

/// Full column set of one row at a point in time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct RowSnapshot {
    columns: BTreeMap<String, ColumnValue>,
}

impl RowSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<ColumnValue>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&ColumnValue> {
        self.columns.get(column)
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Value of the [`KEY_COLUMN`], if captured and not null.
    pub fn key(&self) -> Option<&ColumnValue> {
        self.get(KEY_COLUMN).filter(|v| !v.is_null())
    }

    /// Like [`RowSnapshot::key`] but fails when the key is absent.
    pub fn require_key(&self) -> crate::Result<&ColumnValue> {
        self.key().ok_or(RowAuditError::MissingKey(KEY_COLUMN))
    }

    /// Column names in ascending order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn to_json(&self) -> Value {
        Value::from(self.clone())
    }
}

impl TryFrom<Value> for RowSnapshot {
    type Error = RowAuditError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let object = match value {
            Value::Object(object) => object,
            Value::Null => return Err(RowAuditError::InvalidSnapshot("null")),
            Value::Bool(_) => return Err(RowAuditError::InvalidSnapshot("a boolean")),
            Value::Number(_) => return Err(RowAuditError::InvalidSnapshot("a number")),
            Value::String(_) => return Err(RowAuditError::InvalidSnapshot("a string")),
            Value::Array(_) => return Err(RowAuditError::InvalidSnapshot("an array")),
        };

        Ok(Self {
            columns: object
                .into_iter()
                .map(|(column, value)| (column, ColumnValue::from(value)))
                .collect(),
        })
    }
}

impl From<RowSnapshot> for Value {
    fn from(snapshot: RowSnapshot) -> Self {
        Value::Object(
            snapshot
                .columns
                .into_iter()
                .map(|(column, value)| (column, Value::from(value)))
                .collect::<Map<String, Value>>(),
        )
    }
}
