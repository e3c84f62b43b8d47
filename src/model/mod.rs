//! Declarative comparison model: periods, fields, conditions and measures.

pub mod condition;
pub mod field;
pub mod measure;
pub mod period;

pub use condition::{Condition, ConditionType, SingleValueCondition};
pub use field::Field;
pub use measure::{ComparisonMeasure, ComparisonMethod, ReferencePosition};
pub use period::{mapping, Period, PeriodDefinition, PeriodUnit};
