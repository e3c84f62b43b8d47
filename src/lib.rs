//! # Vantage
//!
//! Period comparison engine for analytical query results.
//!
//! ## Architecture
//!
//! Comparison measures ("sales vs. same quarter last year") are computed after
//! a query has produced its result table:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │          ComparisonMeasure (model)                       │
//! │  (period, reference position, method)                    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [shift compiler]
//! ┌─────────────────────────────────────────────────────────┐
//! │          ShiftProcedure                                  │
//! │  (per-unit offsets and column slots)                     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [executor, one row at a time]
//! ┌─────────────────────────────────────────────────────────┐
//! │          Result Table + comparison column                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Result tables come from a [`datastore`] query or from JSON fixtures.

pub mod comparison;
pub mod config;
pub mod datastore;
pub mod error;
pub mod model;
pub mod table;

pub use comparison::{PeriodComparisonExecutor, ReferenceOffset, ShiftProcedure};
pub use error::{ComparisonError, ComparisonResult};
pub use model::{ComparisonMeasure, ComparisonMethod, Field, Period, PeriodUnit};
pub use table::{Cell, ColumnType, Header, RowTable, Table};
