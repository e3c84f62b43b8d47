//! Shift procedures: relocating a row's period coordinates to its reference position.
//!
//! A [`ShiftProcedure`] is compiled once per comparison measure and result
//! shape, then applied to a copy of each row's key:
//!
//! ```text
//! Quarter(quarter, year), reference position {quarter: "-1", year: "c"}
//!
//!   [2024, 1]  --apply-->  [2023, 4]     carry into the year
//!   [Total, 1] --apply-->  false         no reference row
//! ```
//!
//! Per-unit state lives in fixed-size arrays indexed by [`PeriodUnit::ordinal`].

use chrono::{Datelike, Months, NaiveDate};
use log::debug;
use std::collections::HashMap;

use crate::comparison::offset::ReferenceOffset;
use crate::error::{ComparisonError, ComparisonResult};
use crate::model::{mapping, Field, Period, PeriodUnit, ReferencePosition};
use crate::table::{Cell, Header};

/// Where a period unit lives in the row being shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSlot {
    /// The period has no such unit.
    NotInPeriod,
    /// The period has the unit but the result has no column for it.
    Missing,
    /// Column index of the unit.
    At(usize),
}

/// A compiled reference-position shift for one period.
///
/// Immutable once compiled; a single procedure can be applied to many rows
/// from many threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftProcedure {
    period: Period,
    reference_position: [Option<ReferenceOffset>; PeriodUnit::COUNT],
    column_index: [ColumnSlot; PeriodUnit::COUNT],
}

impl ShiftProcedure {
    /// Compile a shift procedure.
    ///
    /// `index_by_column` maps column names to their position in the rows the
    /// procedure will be applied to. Period units with no entry in
    /// `reference_position` are held constant. A unit whose column is absent
    /// is only reported when a row actually needs it shifted. A period using
    /// one field for two units is rejected.
    pub fn compile(
        period: &Period,
        reference_position: &ReferencePosition,
        index_by_column: &HashMap<String, usize>,
    ) -> ComparisonResult<Self> {
        period.validate()?;
        let field_to_unit = mapping(period);
        let resolve = |field: &Field| match index_by_column.get(field.name()) {
            Some(index) => ColumnSlot::At(*index),
            None => ColumnSlot::Missing,
        };

        let mut positions: [Option<ReferenceOffset>; PeriodUnit::COUNT] = [None; PeriodUnit::COUNT];
        let mut column_index = [ColumnSlot::NotInPeriod; PeriodUnit::COUNT];

        for (field, expr) in reference_position {
            let unit = *field_to_unit
                .get(field)
                .ok_or_else(|| ComparisonError::unknown_field(field.name(), period.to_string()))?;
            positions[unit.ordinal()] = Some(ReferenceOffset::parse(expr)?);
            column_index[unit.ordinal()] = resolve(field);
        }

        for (field, unit) in period.fields() {
            let slot = unit.ordinal();
            if positions[slot].is_none() {
                positions[slot] = Some(ReferenceOffset::Constant);
                column_index[slot] = resolve(field);
            }
        }

        let procedure = Self {
            period: period.clone(),
            reference_position: positions,
            column_index,
        };
        debug!(
            "compiled shift procedure for {}: {}",
            period,
            procedure.describe()
        );
        Ok(procedure)
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    /// Reference offset of a unit, `None` when the period has no such unit.
    pub fn reference_position(&self, unit: PeriodUnit) -> Option<ReferenceOffset> {
        self.reference_position[unit.ordinal()]
    }

    pub fn column_slot(&self, unit: PeriodUnit) -> ColumnSlot {
        self.column_index[unit.ordinal()]
    }

    /// Shift of a unit, `None` when the unit is held constant or absent.
    pub fn transformation(&self, unit: PeriodUnit) -> Option<i32> {
        self.reference_position(unit).and_then(|offset| offset.shift())
    }

    /// True when no unit is shifted: every row is its own reference.
    pub fn is_identity(&self) -> bool {
        PeriodUnit::ALL
            .iter()
            .all(|unit| self.transformation(*unit).is_none())
    }

    /// Shift `row` to its reference position.
    ///
    /// Returns `Ok(false)` when the row has no defined reference position: a
    /// period cell that has to be read is the grand total, null, not an
    /// integer, negative or out of calendar range. In that case, and on error,
    /// `row` is left untouched.
    pub fn apply(&self, row: &mut [Cell], headers: &[Header]) -> ComparisonResult<bool> {
        let mut writes: Vec<(usize, Cell)> = Vec::with_capacity(3);

        let resolved = match &self.period {
            Period::Year { .. } => self.shift_year(row, headers, &mut writes)?,
            Period::Semester { .. } => {
                self.shift_within_year(PeriodUnit::Semester, row, headers, &mut writes)?
            }
            Period::Quarter { .. } => {
                self.shift_within_year(PeriodUnit::Quarter, row, headers, &mut writes)?
            }
            Period::Month { .. } => {
                self.shift_within_year(PeriodUnit::Month, row, headers, &mut writes)?
            }
        };

        if resolved {
            for (index, cell) in writes {
                row[index] = cell;
            }
        }
        Ok(resolved)
    }

    fn shift_year(
        &self,
        row: &[Cell],
        headers: &[Header],
        writes: &mut Vec<(usize, Cell)>,
    ) -> ComparisonResult<bool> {
        let Some(offset) = self.transformation(PeriodUnit::Year) else {
            return Ok(true);
        };
        let index = self.locate(PeriodUnit::Year, row, headers)?;
        let Some(year) = read_unit(&row[index], PeriodUnit::Year) else {
            return Ok(false);
        };
        let Some(shifted) = year.checked_add(offset) else {
            return Ok(false);
        };
        writes.push((index, headers[index].integer_cell(shifted)?));
        Ok(true)
    }

    /// Shift a period made of a year and one finer unit.
    ///
    /// The year is shifted first. The finer unit is then shifted from the
    /// already-shifted year through calendar arithmetic, and its carry
    /// overwrites the year cell.
    fn shift_within_year(
        &self,
        unit: PeriodUnit,
        row: &[Cell],
        headers: &[Header],
        writes: &mut Vec<(usize, Cell)>,
    ) -> ComparisonResult<bool> {
        let year_offset = self.transformation(PeriodUnit::Year);
        let unit_offset = self.transformation(unit);
        if year_offset.is_none() && unit_offset.is_none() {
            return Ok(true);
        }

        let year_index = self.locate(PeriodUnit::Year, row, headers)?;
        let Some(mut year) = read_unit(&row[year_index], PeriodUnit::Year) else {
            return Ok(false);
        };

        if let Some(offset) = year_offset {
            year = match year.checked_add(offset) {
                Some(shifted) => shifted,
                None => return Ok(false),
            };
            writes.push((year_index, headers[year_index].integer_cell(year)?));
        }

        if let Some(offset) = unit_offset {
            let index = self.locate(unit, row, headers)?;
            let Some(value) = read_unit(&row[index], unit) else {
                return Ok(false);
            };
            let Some((new_year, new_value)) = shift_months(year, value, unit, offset) else {
                return Ok(false);
            };
            writes.push((index, headers[index].integer_cell(new_value)?));
            writes.push((year_index, headers[year_index].integer_cell(new_year)?));
        }

        Ok(true)
    }

    fn locate(&self, unit: PeriodUnit, row: &[Cell], headers: &[Header]) -> ComparisonResult<usize> {
        match self.column_slot(unit) {
            ColumnSlot::At(index) if index < row.len() && index < headers.len() => Ok(index),
            _ => Err(ComparisonError::MissingPeriodColumn { unit }),
        }
    }

    fn describe(&self) -> String {
        self.period
            .units()
            .iter()
            .map(|unit| {
                let offset = self
                    .reference_position(*unit)
                    .map(|o| o.to_string())
                    .unwrap_or_default();
                format!("{}={}", unit, offset)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Read a period cell as a non-negative value within the unit's calendar range.
fn read_unit(cell: &Cell, unit: PeriodUnit) -> Option<i32> {
    let value = cell.as_i64()?;
    if value < 0 {
        return None;
    }
    if let Some(max) = unit.max_in_year() {
        if value < 1 || value > max {
            return None;
        }
    }
    i32::try_from(value).ok()
}

/// Move `(year, value)` by `offset` steps of `unit`, returning the new year and value.
///
/// The anchor is the first day of the unit's last month (quarter 2 is June 1st),
/// so the result only depends on month arithmetic.
fn shift_months(year: i32, value: i32, unit: PeriodUnit, offset: i32) -> Option<(i32, i32)> {
    let step = unit.months();
    let anchor_month = u32::try_from(value).ok()? * step;
    let anchor = NaiveDate::from_ymd_opt(year, anchor_month, 1)?;

    let months = i64::from(offset) * i64::from(step);
    let distance = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    let shifted = if months >= 0 {
        anchor.checked_add_months(distance)?
    } else {
        anchor.checked_sub_months(distance)?
    };

    let new_value = (shifted.month() - 1) / step + 1;
    Some((shifted.year(), i32::try_from(new_value).ok()?))
}
