// src/model/condition.rs
use crate::error::{ComparisonError, ComparisonResult};
use crate::model::field::Field;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator of a filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionType {
    Eq,
    Neq,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    In,
    IsNull,
    IsNotNull,
    Between,
    And,
    Or,
}

impl ConditionType {
    /// Operators a single-value condition may carry.
    pub const SINGLE_VALUE: [ConditionType; 7] = [
        ConditionType::Lt,
        ConditionType::Le,
        ConditionType::Gt,
        ConditionType::Ge,
        ConditionType::Eq,
        ConditionType::Neq,
        ConditionType::Like,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::Eq => "=",
            ConditionType::Neq => "<>",
            ConditionType::Lt => "<",
            ConditionType::Le => "<=",
            ConditionType::Gt => ">",
            ConditionType::Ge => ">=",
            ConditionType::Like => "LIKE",
            ConditionType::In => "IN",
            ConditionType::IsNull => "IS NULL",
            ConditionType::IsNotNull => "IS NOT NULL",
            ConditionType::Between => "BETWEEN",
            ConditionType::And => "AND",
            ConditionType::Or => "OR",
        }
    }

    pub fn is_single_value(&self) -> bool {
        Self::SINGLE_VALUE.contains(self)
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compares a column against one value.
///
/// The operator is checked when the condition is built, deserialization
/// included, so an invalid single-value condition never exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSingleValueCondition")]
pub struct SingleValueCondition {
    #[serde(rename = "type")]
    condition_type: ConditionType,
    value: Field,
}

impl SingleValueCondition {
    pub fn new(condition_type: ConditionType, value: impl Into<Field>) -> ComparisonResult<Self> {
        if !condition_type.is_single_value() {
            return Err(ComparisonError::UnsupportedConditionOperator(condition_type));
        }
        Ok(Self {
            condition_type,
            value: value.into(),
        })
    }

    pub fn condition_type(&self) -> ConditionType {
        self.condition_type
    }

    pub fn value(&self) -> &Field {
        &self.value
    }
}

#[derive(Deserialize)]
struct RawSingleValueCondition {
    #[serde(rename = "type")]
    condition_type: ConditionType,
    value: Field,
}

impl TryFrom<RawSingleValueCondition> for SingleValueCondition {
    type Error = ComparisonError;

    fn try_from(raw: RawSingleValueCondition) -> ComparisonResult<Self> {
        SingleValueCondition::new(raw.condition_type, raw.value)
    }
}

/// A filter condition attached to a query or measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum Condition {
    SingleValue(SingleValueCondition),
    In { values: Vec<Field> },
    IsNull,
    IsNotNull,
    And { children: Vec<Condition> },
    Or { children: Vec<Condition> },
}

impl Condition {
    /// Operator of this condition.
    pub fn condition_type(&self) -> ConditionType {
        match self {
            Condition::SingleValue(svc) => svc.condition_type(),
            Condition::In { .. } => ConditionType::In,
            Condition::IsNull => ConditionType::IsNull,
            Condition::IsNotNull => ConditionType::IsNotNull,
            Condition::And { .. } => ConditionType::And,
            Condition::Or { .. } => ConditionType::Or,
        }
    }

    pub fn equals(value: impl Into<Field>) -> Self {
        Condition::SingleValue(SingleValueCondition {
            condition_type: ConditionType::Eq,
            value: value.into(),
        })
    }

    pub fn like(value: impl Into<Field>) -> Self {
        Condition::SingleValue(SingleValueCondition {
            condition_type: ConditionType::Like,
            value: value.into(),
        })
    }

    pub fn and(children: Vec<Condition>) -> Self {
        Condition::And { children }
    }

    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Or { children }
    }
}
