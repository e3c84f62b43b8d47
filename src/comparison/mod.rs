//! Period comparison engine.
//!
//! - [`offset`]: reference offset expressions (`c` or a signed integer)
//! - [`shift`]: compiled shift procedures and their calendar arithmetic
//! - [`executor`]: comparison measures computed over a result table

pub mod executor;
pub mod offset;
pub mod shift;

pub use executor::{execute_all, PeriodComparisonExecutor, DEFAULT_PARALLEL_THRESHOLD};
pub use offset::{ReferenceOffset, CONSTANT_MARKER};
pub use shift::{ColumnSlot, ShiftProcedure};
