//! Row-oriented table and its JSON fixture format.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::table::{check_new_column, check_row, Cell, Header, Table, TableError, TableResult};

/// A table stored one row at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct RowTable {
    headers: Vec<Header>,
    rows: Vec<Vec<Cell>>,
}

impl RowTable {
    /// Build a table, checking every row's width and cell types against the headers.
    pub fn new(headers: Vec<Header>, rows: Vec<Vec<Cell>>) -> TableResult<Self> {
        for (i, row) in rows.iter().enumerate() {
            check_row(&headers, i, row)?;
        }
        Ok(Self { headers, rows })
    }

    pub fn empty(headers: Vec<Header>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) -> TableResult<()> {
        check_row(&self.headers, self.rows.len(), &row)?;
        self.rows.push(row);
        Ok(())
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Flag the named columns as measures.
    pub fn mark_measures(&mut self, names: &HashSet<String>) {
        for header in &mut self.headers {
            if names.contains(&header.name) {
                header.is_measure = true;
            }
        }
    }

    /// Decode a table from its JSON fixture form.
    pub fn from_json(json: TableJson, total_marker: &str) -> TableResult<Self> {
        let mut rows = Vec::with_capacity(json.rows.len());
        for (i, raw) in json.rows.iter().enumerate() {
            if raw.len() != json.headers.len() {
                return Err(TableError::RowWidth {
                    row: i,
                    expected: json.headers.len(),
                    actual: raw.len(),
                });
            }
            let row = raw
                .iter()
                .zip(&json.headers)
                .map(|(value, header)| {
                    Cell::from_json(value, &header.name, header.column_type, total_marker)
                })
                .collect::<TableResult<Vec<_>>>()?;
            rows.push(row);
        }
        Self::new(json.headers, rows)
    }

    pub fn from_json_str(s: &str, total_marker: &str) -> TableResult<Self> {
        let json: TableJson = serde_json::from_str(s)?;
        Self::from_json(json, total_marker)
    }

    pub fn from_file<P: AsRef<Path>>(path: P, total_marker: &str) -> TableResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content, total_marker)
    }

    /// Encode this table in its JSON fixture form.
    pub fn to_json(&self, total_marker: &str) -> TableJson {
        TableJson {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_json(total_marker)).collect())
                .collect(),
        }
    }
}

impl Table for RowTable {
    fn headers(&self) -> &[Header] {
        &self.headers
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.rows[row][column]
    }

    fn add_column(&mut self, header: Header, values: Vec<Cell>) -> TableResult<()> {
        check_new_column(&self.headers, &header, &values, self.rows.len())?;
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
        self.headers.push(header);
        Ok(())
    }

    fn row(&self, row: usize) -> Vec<Cell> {
        self.rows[row].clone()
    }
}

/// JSON fixture form of a table.
///
/// ```json
/// {
///   "headers": [{"name": "year", "type": "int32"}, {"name": "sales", "type": "float64", "is_measure": true}],
///   "rows": [[2023, 10.0], ["___total___", 10.0]]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableJson {
    pub headers: Vec<Header>,
    pub rows: Vec<Vec<JsonValue>>,
}
