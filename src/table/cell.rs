//! Cell values of a result row.

use serde_json::Value as JsonValue;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::table::{ColumnType, TableError, TableResult};

/// Text marker standing for [`Cell::Total`] at the JSON and SQL boundaries.
pub const DEFAULT_TOTAL_MARKER: &str = "___total___";

/// A single value of a result row.
///
/// `Total` marks an aggregated grand-total slice with no concrete value.
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Total,
    Int32(i32),
    Int64(i64),
    Float64(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn is_total(&self) -> bool {
        matches!(self, Cell::Total)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Integer value of an integer cell, whatever its width.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Int32(v) => Some(i64::from(*v)),
            Cell::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric value of a numeric cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int32(v) => Some(f64::from(*v)),
            Cell::Int64(v) => Some(*v as f64),
            Cell::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Decode a JSON value into a cell of the given column type.
    pub fn from_json(
        value: &JsonValue,
        column: &str,
        column_type: ColumnType,
        total_marker: &str,
    ) -> TableResult<Cell> {
        let invalid = || TableError::InvalidCell {
            column: column.to_string(),
            column_type,
            value: value.to_string(),
        };

        match value {
            JsonValue::Null => return Ok(Cell::Null),
            JsonValue::String(s) if s == total_marker => return Ok(Cell::Total),
            _ => {}
        }

        match column_type {
            ColumnType::Int32 => value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(Cell::Int32)
                .ok_or_else(invalid),
            ColumnType::Int64 => value.as_i64().map(Cell::Int64).ok_or_else(invalid),
            ColumnType::Float64 => value.as_f64().map(Cell::Float64).ok_or_else(invalid),
            ColumnType::Text => value
                .as_str()
                .map(|s| Cell::Text(s.to_string()))
                .ok_or_else(invalid),
            ColumnType::Bool => value.as_bool().map(Cell::Bool).ok_or_else(invalid),
        }
    }

    /// Encode this cell as JSON, writing `Total` as the given marker.
    pub fn to_json(&self, total_marker: &str) -> JsonValue {
        match self {
            Cell::Null => JsonValue::Null,
            Cell::Total => JsonValue::String(total_marker.to_string()),
            Cell::Int32(v) => JsonValue::from(*v),
            Cell::Int64(v) => JsonValue::from(*v),
            Cell::Float64(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Cell::Text(s) => JsonValue::String(s.clone()),
            Cell::Bool(b) => JsonValue::Bool(*b),
        }
    }
}

// Floats compare by bit pattern so cells can key a hash map.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) | (Cell::Total, Cell::Total) => true,
            (Cell::Int32(a), Cell::Int32(b)) => a == b,
            (Cell::Int64(a), Cell::Int64(b)) => a == b,
            (Cell::Float64(a), Cell::Float64(b)) => a.to_bits() == b.to_bits(),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Null | Cell::Total => {}
            Cell::Int32(v) => v.hash(state),
            Cell::Int64(v) => v.hash(state),
            Cell::Float64(v) => v.to_bits().hash(state),
            Cell::Text(s) => s.hash(state),
            Cell::Bool(b) => b.hash(state),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str("null"),
            Cell::Total => f.write_str("Total"),
            Cell::Int32(v) => write!(f, "{}", v),
            Cell::Int64(v) => write!(f, "{}", v),
            Cell::Float64(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Int32(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int64(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float64(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}
