// src/model/period.rs
use crate::error::{ComparisonError, ComparisonResult};
use crate::model::field::Field;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Calendar granularity of a period field, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodUnit {
    Year,
    Semester,
    Quarter,
    Month,
}

impl PeriodUnit {
    /// Number of units, used to size per-unit lookup arrays.
    pub const COUNT: usize = 4;

    pub const ALL: [PeriodUnit; Self::COUNT] = [
        PeriodUnit::Year,
        PeriodUnit::Semester,
        PeriodUnit::Quarter,
        PeriodUnit::Month,
    ];

    /// Position of this unit in per-unit arrays.
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Length of one step of this unit, in months.
    pub fn months(self) -> u32 {
        match self {
            PeriodUnit::Year => 12,
            PeriodUnit::Semester => 6,
            PeriodUnit::Quarter => 3,
            PeriodUnit::Month => 1,
        }
    }

    /// Largest valid value of this unit within a year, `None` for years.
    pub fn max_in_year(self) -> Option<i64> {
        match self {
            PeriodUnit::Year => None,
            PeriodUnit::Semester => Some(2),
            PeriodUnit::Quarter => Some(4),
            PeriodUnit::Month => Some(12),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodUnit::Year => "YEAR",
            PeriodUnit::Semester => "SEMESTER",
            PeriodUnit::Quarter => "QUARTER",
            PeriodUnit::Month => "MONTH",
        }
    }
}

impl fmt::Display for PeriodUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar period, decomposed into the result columns holding its values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodDefinition", into = "PeriodDefinition")]
pub enum Period {
    Year { year: Field },
    Semester { semester: Field, year: Field },
    Quarter { quarter: Field, year: Field },
    Month { month: Field, year: Field },
}

impl Period {
    pub fn year(year: impl Into<Field>) -> Self {
        Period::Year { year: year.into() }
    }

    pub fn semester(semester: impl Into<Field>, year: impl Into<Field>) -> Self {
        Period::Semester {
            semester: semester.into(),
            year: year.into(),
        }
    }

    pub fn quarter(quarter: impl Into<Field>, year: impl Into<Field>) -> Self {
        Period::Quarter {
            quarter: quarter.into(),
            year: year.into(),
        }
    }

    pub fn month(month: impl Into<Field>, year: impl Into<Field>) -> Self {
        Period::Month {
            month: month.into(),
            year: year.into(),
        }
    }

    /// Short name of the period shape.
    pub fn kind(&self) -> &'static str {
        match self {
            Period::Year { .. } => "year",
            Period::Semester { .. } => "semester",
            Period::Quarter { .. } => "quarter",
            Period::Month { .. } => "month",
        }
    }

    /// Units this period is made of, coarsest first.
    pub fn units(&self) -> &'static [PeriodUnit] {
        match self {
            Period::Year { .. } => &[PeriodUnit::Year],
            Period::Semester { .. } => &[PeriodUnit::Year, PeriodUnit::Semester],
            Period::Quarter { .. } => &[PeriodUnit::Year, PeriodUnit::Quarter],
            Period::Month { .. } => &[PeriodUnit::Year, PeriodUnit::Month],
        }
    }

    /// Fields of this period with the unit each one holds, coarsest first.
    pub fn fields(&self) -> Vec<(&Field, PeriodUnit)> {
        match self {
            Period::Year { year } => vec![(year, PeriodUnit::Year)],
            Period::Semester { semester, year } => {
                vec![(year, PeriodUnit::Year), (semester, PeriodUnit::Semester)]
            }
            Period::Quarter { quarter, year } => {
                vec![(year, PeriodUnit::Year), (quarter, PeriodUnit::Quarter)]
            }
            Period::Month { month, year } => {
                vec![(year, PeriodUnit::Year), (month, PeriodUnit::Month)]
            }
        }
    }

    /// Check that every unit of this period lives in its own field.
    ///
    /// The infallible constructors accept any fields; definitions arriving as
    /// data and shift compilation both go through this check.
    pub fn validate(&self) -> ComparisonResult<()> {
        let fields = self.fields();
        for (i, (field, unit)) in fields.iter().enumerate() {
            if let Some((_, other)) = fields[i + 1..].iter().find(|(f, _)| f == field) {
                return Err(ComparisonError::UnsupportedPeriod(format!(
                    "{} with field '{}' holding both {} and {}",
                    self.kind(),
                    field,
                    unit,
                    other
                )));
            }
        }
        Ok(())
    }

    /// Field holding the given unit, if this period has one.
    pub fn field_for(&self, unit: PeriodUnit) -> Option<&Field> {
        self.fields()
            .into_iter()
            .find(|(_, u)| *u == unit)
            .map(|(field, _)| field)
    }
}

/// Map each field of a period to the unit it holds.
pub fn mapping(period: &Period) -> HashMap<Field, PeriodUnit> {
    period
        .fields()
        .into_iter()
        .map(|(field, unit)| (field.clone(), unit))
        .collect()
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Year { year } => write!(f, "Year({})", year),
            Period::Semester { semester, year } => write!(f, "Semester({}, {})", semester, year),
            Period::Quarter { quarter, year } => write!(f, "Quarter({}, {})", quarter, year),
            Period::Month { month, year } => write!(f, "Month({}, {})", month, year),
        }
    }
}

/// Declarative period as it arrives from a measure definition.
///
/// ```json
/// { "kind": "quarter", "quarter": "q", "year": "y" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodDefinition {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quarter: Option<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<Field>,
}

impl PeriodDefinition {
    fn take(
        kind: &str,
        name: &str,
        field: Option<Field>,
    ) -> ComparisonResult<Field> {
        field.ok_or_else(|| {
            ComparisonError::UnsupportedPeriod(format!("{} without a '{}' field", kind, name))
        })
    }

    fn reject(kind: &str, name: &str, field: &Option<Field>) -> ComparisonResult<()> {
        match field {
            Some(_) => Err(ComparisonError::UnsupportedPeriod(format!(
                "{} with a '{}' field",
                kind, name
            ))),
            None => Ok(()),
        }
    }
}

impl TryFrom<PeriodDefinition> for Period {
    type Error = ComparisonError;

    fn try_from(def: PeriodDefinition) -> ComparisonResult<Self> {
        let kind = def.kind.to_lowercase();
        let period = match kind.as_str() {
            "year" => {
                PeriodDefinition::reject(&kind, "semester", &def.semester)?;
                PeriodDefinition::reject(&kind, "quarter", &def.quarter)?;
                PeriodDefinition::reject(&kind, "month", &def.month)?;
                Ok(Period::Year {
                    year: PeriodDefinition::take(&kind, "year", def.year)?,
                })
            }
            "semester" => {
                PeriodDefinition::reject(&kind, "quarter", &def.quarter)?;
                PeriodDefinition::reject(&kind, "month", &def.month)?;
                Ok(Period::Semester {
                    semester: PeriodDefinition::take(&kind, "semester", def.semester)?,
                    year: PeriodDefinition::take(&kind, "year", def.year)?,
                })
            }
            "quarter" => {
                PeriodDefinition::reject(&kind, "semester", &def.semester)?;
                PeriodDefinition::reject(&kind, "month", &def.month)?;
                Ok(Period::Quarter {
                    quarter: PeriodDefinition::take(&kind, "quarter", def.quarter)?,
                    year: PeriodDefinition::take(&kind, "year", def.year)?,
                })
            }
            "month" => {
                PeriodDefinition::reject(&kind, "semester", &def.semester)?;
                PeriodDefinition::reject(&kind, "quarter", &def.quarter)?;
                Ok(Period::Month {
                    month: PeriodDefinition::take(&kind, "month", def.month)?,
                    year: PeriodDefinition::take(&kind, "year", def.year)?,
                })
            }
            _ => Err(ComparisonError::UnsupportedPeriod(def.kind)),
        }?;
        period.validate()?;
        Ok(period)
    }
}

impl From<Period> for PeriodDefinition {
    fn from(period: Period) -> Self {
        let kind = period.kind().to_string();
        match period {
            Period::Year { year } => PeriodDefinition {
                kind,
                year: Some(year),
                ..Default::default()
            },
            Period::Semester { semester, year } => PeriodDefinition {
                kind,
                year: Some(year),
                semester: Some(semester),
                ..Default::default()
            },
            Period::Quarter { quarter, year } => PeriodDefinition {
                kind,
                year: Some(year),
                quarter: Some(quarter),
                ..Default::default()
            },
            Period::Month { month, year } => PeriodDefinition {
                kind,
                year: Some(year),
                month: Some(month),
                ..Default::default()
            },
        }
    }
}
