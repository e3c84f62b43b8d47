//! Result tables the comparison engine reads and extends.
//!
//! A table is an ordered list of [`Header`]s plus rows of [`Cell`]s aligned
//! with them. Two layouts are provided: [`RowTable`] (one `Vec<Cell>` per row)
//! and [`ColumnarTable`] (one `Vec<Cell>` per column). Both implement
//! [`Table`], which is all the comparison executor needs.

mod cell;
mod columnar;
mod header;
mod render;
mod row_table;

pub use cell::{Cell, DEFAULT_TOTAL_MARKER};
pub use columnar::ColumnarTable;
pub use header::{ColumnType, Header};
pub use render::render;
pub use row_table::{RowTable, TableJson};

use std::collections::HashMap;
use thiserror::Error;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Errors raised while building or decoding tables.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("{actual} columns for {expected} headers")]
    ColumnCount { expected: usize, actual: usize },

    #[error("column '{column}' has {actual} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("invalid {column_type} value for column '{column}': {value}")]
    InvalidCell {
        column: String,
        column_type: ColumnType,
        value: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read access to a result table, plus appending computed columns.
pub trait Table {
    fn headers(&self) -> &[Header];

    fn row_count(&self) -> usize;

    fn cell(&self, row: usize, column: usize) -> &Cell;

    /// Append a column; `values` must hold one cell per row.
    fn add_column(&mut self, header: Header, values: Vec<Cell>) -> TableResult<()>;

    fn column_count(&self) -> usize {
        self.headers().len()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers().iter().position(|h| h.name == name)
    }

    /// Column positions by name.
    fn index_by_column(&self) -> HashMap<String, usize> {
        self.headers()
            .iter()
            .enumerate()
            .map(|(i, h)| (h.name.clone(), i))
            .collect()
    }

    /// Copy of one row.
    fn row(&self, row: usize) -> Vec<Cell> {
        (0..self.column_count())
            .map(|column| self.cell(row, column).clone())
            .collect()
    }
}

/// Check one row against the headers: width first, then each cell's type.
fn check_row(headers: &[Header], index: usize, row: &[Cell]) -> TableResult<()> {
    if row.len() != headers.len() {
        return Err(TableError::RowWidth {
            row: index,
            expected: headers.len(),
            actual: row.len(),
        });
    }
    headers
        .iter()
        .zip(row)
        .try_for_each(|(header, cell)| header.check_cell(cell))
}

fn check_new_column(headers: &[Header], header: &Header, values: &[Cell], rows: usize) -> TableResult<()> {
    if headers.iter().any(|h| h.name == header.name) {
        return Err(TableError::DuplicateColumn(header.name.clone()));
    }
    if values.len() != rows {
        return Err(TableError::ColumnLength {
            column: header.name.clone(),
            expected: rows,
            actual: values.len(),
        });
    }
    values.iter().try_for_each(|cell| header.check_cell(cell))
}
