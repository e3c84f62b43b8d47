//! Error types for period comparison.

use thiserror::Error;

use crate::model::{ConditionType, PeriodUnit};
use crate::table::ColumnType;

/// Result type for comparison operations.
pub type ComparisonResult<T> = Result<T, ComparisonError>;

/// Errors raised while building or running a period comparison.
///
/// Every variant is a configuration or schema problem. A row whose reference
/// position cannot be resolved is not an error: the shift procedure reports it
/// as `Ok(false)`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComparisonError {
    /// A period definition names a shape outside the supported set.
    #[error("unsupported period: {0}")]
    UnsupportedPeriod(String),

    /// A reference position names a field the period does not own.
    #[error("field '{field}' is not part of period {period}")]
    UnknownFieldForPeriod { field: String, period: String },

    /// An offset expression is neither `c` nor a signed integer.
    #[error("invalid offset expression '{0}': expected 'c' or a signed integer")]
    InvalidOffsetExpression(String),

    /// A shifted value was written into a column that is not a supported integer width.
    #[error("unsupported column type {column_type} for column '{column}'")]
    UnsupportedColumnType {
        column: String,
        column_type: ColumnType,
    },

    /// A single-value condition was built with an operator it does not accept.
    #[error("unsupported operator for single value condition: {0}")]
    UnsupportedConditionOperator(ConditionType),

    /// A unit that has to be shifted has no column in the result.
    #[error("period column for unit {unit} is missing from the result")]
    MissingPeriodColumn { unit: PeriodUnit },

    /// A measure column referenced by a comparison is missing from the result.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// A comparison was requested on a measure column that is not numeric.
    #[error("measure column '{column}' has non-numeric type {column_type}")]
    NonNumericMeasure {
        column: String,
        column_type: ColumnType,
    },

    /// The comparison column could not be added to the table.
    #[error("table error: {0}")]
    Table(String),
}

impl ComparisonError {
    /// Create an unknown-field error.
    pub fn unknown_field(field: impl Into<String>, period: impl Into<String>) -> Self {
        Self::UnknownFieldForPeriod {
            field: field.into(),
            period: period.into(),
        }
    }
}
