//! Column-oriented table.

use std::collections::HashSet;

use crate::table::{check_new_column, Cell, Header, RowTable, Table, TableError, TableResult};

/// A table stored one column at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnarTable {
    headers: Vec<Header>,
    columns: Vec<Vec<Cell>>,
    rows: usize,
}

impl ColumnarTable {
    pub fn new(headers: Vec<Header>, columns: Vec<Vec<Cell>>) -> TableResult<Self> {
        let rows = columns.first().map_or(0, Vec::len);
        if headers.len() != columns.len() {
            return Err(TableError::ColumnCount {
                expected: headers.len(),
                actual: columns.len(),
            });
        }
        for (header, column) in headers.iter().zip(&columns) {
            if column.len() != rows {
                return Err(TableError::ColumnLength {
                    column: header.name.clone(),
                    expected: rows,
                    actual: column.len(),
                });
            }
            column.iter().try_for_each(|cell| header.check_cell(cell))?;
        }
        Ok(Self {
            headers,
            columns,
            rows,
        })
    }

    /// Pivot a row table into columns, flagging the named columns as measures.
    pub fn from_rows(table: &RowTable, measures: &HashSet<String>) -> Self {
        let mut columns = vec![Vec::with_capacity(table.row_count()); table.column_count()];
        for row in table.rows() {
            for (column, cell) in columns.iter_mut().zip(row) {
                column.push(cell.clone());
            }
        }
        let headers = table
            .headers()
            .iter()
            .map(|h| {
                let mut header = h.clone();
                header.is_measure = h.is_measure || measures.contains(&h.name);
                header
            })
            .collect();
        Self {
            headers,
            columns,
            rows: table.row_count(),
        }
    }

    pub fn column(&self, index: usize) -> &[Cell] {
        &self.columns[index]
    }
}

impl Table for ColumnarTable {
    fn headers(&self) -> &[Header] {
        &self.headers
    }

    fn row_count(&self) -> usize {
        self.rows
    }

    fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.columns[column][row]
    }

    fn add_column(&mut self, header: Header, values: Vec<Cell>) -> TableResult<()> {
        check_new_column(&self.headers, &header, &values, self.rows)?;
        self.headers.push(header);
        self.columns.push(values);
        Ok(())
    }
}
