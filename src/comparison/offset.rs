//! Offset expressions of a reference position.

use std::fmt;
use std::str::FromStr;

use crate::error::{ComparisonError, ComparisonResult};

/// Offset expression meaning "keep the current value".
pub const CONSTANT_MARKER: &str = "c";

/// Parsed offset expression: `c` or `[+-]?[0-9]+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceOffset {
    /// Hold the unit at its current value.
    Constant,
    /// Move the unit by this many steps.
    Shift(i32),
}

impl ReferenceOffset {
    pub fn parse(expr: &str) -> ComparisonResult<Self> {
        if expr == CONSTANT_MARKER {
            return Ok(ReferenceOffset::Constant);
        }
        let digits = expr.strip_prefix(&['+', '-'][..]).unwrap_or(expr);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ComparisonError::InvalidOffsetExpression(expr.to_string()));
        }
        expr.parse::<i32>()
            .map(ReferenceOffset::Shift)
            .map_err(|_| ComparisonError::InvalidOffsetExpression(expr.to_string()))
    }

    /// Number of steps to shift by, `None` for constant units.
    pub fn shift(&self) -> Option<i32> {
        match self {
            ReferenceOffset::Constant => None,
            ReferenceOffset::Shift(n) => Some(*n),
        }
    }
}

impl FromStr for ReferenceOffset {
    type Err = ComparisonError;

    fn from_str(s: &str) -> ComparisonResult<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ReferenceOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceOffset::Constant => f.write_str(CONSTANT_MARKER),
            ReferenceOffset::Shift(n) => write!(f, "{}", n),
        }
    }
}
