// src/model/measure.rs
use crate::model::field::Field;
use crate::model::period::Period;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Offset expression per period field, e.g. `{"year": "-1", "quarter": "c"}`.
pub type ReferencePosition = BTreeMap<Field, String>;

/// How the current value is combined with the reference value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMethod {
    /// `current - reference`
    AbsoluteDifference,
    /// `(current - reference) / reference`
    RelativeDifference,
    /// `current / reference`
    Divide,
}

impl ComparisonMethod {
    /// Combine two values. `None` when the result is undefined.
    pub fn apply(&self, current: f64, reference: f64) -> Option<f64> {
        match self {
            ComparisonMethod::AbsoluteDifference => Some(current - reference),
            ComparisonMethod::RelativeDifference => {
                (reference != 0.0).then(|| (current - reference) / reference)
            }
            ComparisonMethod::Divide => (reference != 0.0).then(|| current / reference),
        }
    }
}

/// A measure expressed relative to a reference period in the same result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMeasure {
    /// Name of the column the comparison produces.
    pub alias: String,
    /// Name of the measure column being compared.
    pub measure: String,
    pub method: ComparisonMethod,
    pub period: Period,
    #[serde(default)]
    pub reference_position: ReferencePosition,
}

impl ComparisonMeasure {
    pub fn new(
        alias: impl Into<String>,
        measure: impl Into<String>,
        method: ComparisonMethod,
        period: Period,
    ) -> Self {
        Self {
            alias: alias.into(),
            measure: measure.into(),
            method,
            period,
            reference_position: ReferencePosition::new(),
        }
    }

    /// Set the offset expression of one period field.
    pub fn with_reference(mut self, field: impl Into<Field>, offset: impl Into<String>) -> Self {
        self.reference_position.insert(field.into(), offset.into());
        self
    }
}
