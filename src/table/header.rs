//! Column headers of a result table.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ComparisonError, ComparisonResult};
use crate::table::{Cell, TableError, TableResult};

/// Declared type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[serde(alias = "int", alias = "integer")]
    Int32,
    #[serde(alias = "long", alias = "bigint")]
    Int64,
    #[serde(alias = "double", alias = "float")]
    Float64,
    #[serde(alias = "string")]
    Text,
    #[serde(alias = "boolean")]
    Bool,
}

impl ColumnType {
    /// Map a SQLite declared column type to a column type.
    ///
    /// Follows SQLite affinity rules, with narrow integer names kept at 32 bits.
    pub fn from_sql_decl(decl: &str) -> Self {
        let decl = decl.trim().to_uppercase();
        match decl.as_str() {
            "INT" | "INT4" | "INT2" | "SMALLINT" | "TINYINT" | "MEDIUMINT" => ColumnType::Int32,
            "BOOL" | "BOOLEAN" => ColumnType::Bool,
            _ if decl.contains("INT") => ColumnType::Int64,
            _ if decl.contains("CHAR") || decl.contains("CLOB") || decl.contains("TEXT") => {
                ColumnType::Text
            }
            _ if decl.contains("REAL")
                || decl.contains("FLOA")
                || decl.contains("DOUB")
                || decl.contains("NUMERIC")
                || decl.contains("DECIMAL") =>
            {
                ColumnType::Float64
            }
            _ => ColumnType::Text,
        }
    }

    /// True when `cell` may be stored in a column of this type.
    ///
    /// `Null` and `Total` fit any column. Integer widths are not interchangeable.
    pub fn accepts(&self, cell: &Cell) -> bool {
        matches!(
            (self, cell),
            (_, Cell::Null | Cell::Total)
                | (ColumnType::Int32, Cell::Int32(_))
                | (ColumnType::Int64, Cell::Int64(_))
                | (ColumnType::Float64, Cell::Float64(_))
                | (ColumnType::Text, Cell::Text(_))
                | (ColumnType::Bool, Cell::Bool(_))
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Int32 | ColumnType::Int64 | ColumnType::Float64
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Int32 => "int32",
            ColumnType::Int64 => "int64",
            ColumnType::Float64 => "float64",
            ColumnType::Text => "text",
            ColumnType::Bool => "bool",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name, declared type and role of a result column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub is_measure: bool,
}

impl Header {
    pub fn new(name: impl Into<String>, column_type: ColumnType, is_measure: bool) -> Self {
        Self {
            name: name.into(),
            column_type,
            is_measure,
        }
    }

    pub fn dimension(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new(name, column_type, false)
    }

    pub fn measure(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self::new(name, column_type, true)
    }

    /// Reject a cell that does not match this column's declared type.
    pub fn check_cell(&self, cell: &Cell) -> TableResult<()> {
        if self.column_type.accepts(cell) {
            return Ok(());
        }
        Err(TableError::InvalidCell {
            column: self.name.clone(),
            column_type: self.column_type,
            value: format!("{:?}", cell),
        })
    }

    /// Build an integer cell with this column's declared width.
    pub fn integer_cell(&self, value: i32) -> ComparisonResult<Cell> {
        match self.column_type {
            ColumnType::Int32 => Ok(Cell::Int32(value)),
            ColumnType::Int64 => Ok(Cell::Int64(i64::from(value))),
            other => Err(ComparisonError::UnsupportedColumnType {
                column: self.name.clone(),
                column_type: other,
            }),
        }
    }
}
