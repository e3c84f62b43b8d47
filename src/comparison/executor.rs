//! Period comparison over a result table.
//!
//! For every row, the executor shifts a copy of the row's key (its dimension
//! cells) to the reference position, looks the shifted key up among the
//! table's rows and combines the two measure values:
//!
//! ```text
//! year | quarter | sales        sales_vs_prev_quarter (AbsoluteDifference)
//! 2023 | 4       | 10           null   (2023 Q3 absent)
//! 2024 | 1       | 12           2      (12 - 10)
//! Total| Total   | 22           null   (no reference for the grand total)
//! ```

use log::{debug, info, warn};
use std::collections::HashMap;
use std::thread;

use crate::comparison::shift::ShiftProcedure;
use crate::error::{ComparisonError, ComparisonResult};
use crate::model::ComparisonMeasure;
use crate::table::{Cell, ColumnType, Header, Table};

/// Row count above which rows are compared on several threads.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// Computes a period comparison measure over a table.
#[derive(Debug, Clone)]
pub struct PeriodComparisonExecutor {
    measure: ComparisonMeasure,
    parallel_threshold: usize,
}

impl PeriodComparisonExecutor {
    pub fn new(measure: ComparisonMeasure) -> Self {
        Self {
            measure,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    pub fn measure(&self) -> &ComparisonMeasure {
        &self.measure
    }

    /// Compute the comparison value of every row.
    ///
    /// The result holds one cell per row: `Float64` when the reference row was
    /// found and the comparison is defined, `Null` otherwise. The shift
    /// procedure is compiled before any row is looked at, so a configuration
    /// error never produces partial output.
    pub fn compare<T>(&self, table: &T) -> ComparisonResult<Vec<Cell>>
    where
        T: Table + Sync + ?Sized,
    {
        let measure_index = self.measure_index(table)?;

        let key_columns: Vec<usize> = table
            .headers()
            .iter()
            .enumerate()
            .filter(|(i, h)| !h.is_measure && *i != measure_index)
            .map(|(i, _)| i)
            .collect();
        let key_headers: Vec<Header> = key_columns
            .iter()
            .map(|i| table.headers()[*i].clone())
            .collect();
        let index_by_column: HashMap<String, usize> = key_headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.name.clone(), i))
            .collect();

        let shift = ShiftProcedure::compile(
            &self.measure.period,
            &self.measure.reference_position,
            &index_by_column,
        )?;

        let keys: Vec<Vec<Cell>> = (0..table.row_count())
            .map(|row| {
                key_columns
                    .iter()
                    .map(|column| table.cell(row, *column).clone())
                    .collect()
            })
            .collect();
        let mut row_by_key: HashMap<&[Cell], usize> = HashMap::with_capacity(keys.len());
        for (row, key) in keys.iter().enumerate() {
            row_by_key.entry(key.as_slice()).or_insert(row);
        }
        if row_by_key.len() < keys.len() {
            // First occurrence wins.
            warn!(
                "comparison '{}': {} rows share a key with an earlier row",
                self.measure.alias,
                keys.len() - row_by_key.len()
            );
        }

        let context = CompareContext {
            table,
            shift: &shift,
            key_headers: &key_headers,
            keys: &keys,
            row_by_key: &row_by_key,
            measure_index,
            measure: &self.measure,
        };

        let rows = table.row_count();
        let values = if rows >= self.parallel_threshold {
            let workers = thread::available_parallelism().map_or(1, |n| n.get());
            let chunk = rows.div_ceil(workers).max(1);
            debug!(
                "comparing {} rows for '{}' on {} threads",
                rows, self.measure.alias, workers
            );
            let context = &context;
            let chunks: Vec<ComparisonResult<Vec<Cell>>> = thread::scope(|scope| {
                let handles: Vec<_> = (0..rows)
                    .step_by(chunk)
                    .map(|start| {
                        let end = (start + chunk).min(rows);
                        scope.spawn(move || context.compare_range(start, end))
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                    .collect()
            });
            let mut values = Vec::with_capacity(rows);
            for chunk in chunks {
                values.extend(chunk?);
            }
            values
        } else {
            context.compare_range(0, rows)?
        };

        let unresolved = values.iter().filter(|c| c.is_null()).count();
        info!(
            "comparison '{}': {} rows, {} without a reference value",
            self.measure.alias, rows, unresolved
        );
        Ok(values)
    }

    /// Compute the comparison and append it to the table as a measure column.
    pub fn execute<T>(&self, table: &mut T) -> ComparisonResult<()>
    where
        T: Table + Sync + ?Sized,
    {
        let values = self.compare(table)?;
        table
            .add_column(
                Header::measure(self.measure.alias.clone(), ColumnType::Float64),
                values,
            )
            .map_err(|e| ComparisonError::Table(e.to_string()))
    }

    fn measure_index<T: Table + ?Sized>(&self, table: &T) -> ComparisonResult<usize> {
        let index = table
            .column_index(&self.measure.measure)
            .ok_or_else(|| ComparisonError::UnknownColumn(self.measure.measure.clone()))?;
        let column_type = table.headers()[index].column_type;
        if !column_type.is_numeric() {
            return Err(ComparisonError::NonNumericMeasure {
                column: self.measure.measure.clone(),
                column_type,
            });
        }
        Ok(index)
    }
}

/// Run every comparison measure over the table, in order.
pub fn execute_all<T>(
    table: &mut T,
    measures: &[ComparisonMeasure],
    parallel_threshold: usize,
) -> ComparisonResult<()>
where
    T: Table + Sync + ?Sized,
{
    for measure in measures {
        PeriodComparisonExecutor::new(measure.clone())
            .with_parallel_threshold(parallel_threshold)
            .execute(table)?;
    }
    Ok(())
}

struct CompareContext<'a, T: ?Sized> {
    table: &'a T,
    shift: &'a ShiftProcedure,
    key_headers: &'a [Header],
    keys: &'a [Vec<Cell>],
    row_by_key: &'a HashMap<&'a [Cell], usize>,
    measure_index: usize,
    measure: &'a ComparisonMeasure,
}

impl<T: Table + ?Sized> CompareContext<'_, T> {
    fn compare_range(&self, start: usize, end: usize) -> ComparisonResult<Vec<Cell>> {
        (start..end).map(|row| self.compare_row(row)).collect()
    }

    fn compare_row(&self, row: usize) -> ComparisonResult<Cell> {
        let mut reference_key = self.keys[row].clone();
        if !self.shift.apply(&mut reference_key, self.key_headers)? {
            return Ok(Cell::Null);
        }
        let Some(reference_row) = self.row_by_key.get(reference_key.as_slice()) else {
            return Ok(Cell::Null);
        };

        let current = self.table.cell(row, self.measure_index).as_f64();
        let reference = self.table.cell(*reference_row, self.measure_index).as_f64();
        let value = match (current, reference) {
            (Some(current), Some(reference)) => self.measure.method.apply(current, reference),
            _ => None,
        };
        Ok(value.map_or(Cell::Null, Cell::Float64))
    }
}
