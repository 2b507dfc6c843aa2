use serde::Serialize;

use super::{Metric, metric};
use crate::aggregate::{Field, Mode, RecordSet, max, min, most_common, value_counts};
use crate::dataset::{Column, Value};
use crate::error::AggregateError;

/// One row of a categorical distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Share {
    pub value: String,
    pub count: usize,
}

/// Rider demographics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user_types: Metric<Vec<Share>>,
    pub genders: Metric<Vec<Share>>,
    pub latest_birth_year: Metric<i64>,
    pub earliest_birth_year: Metric<i64>,
    pub common_birth_year: Metric<Mode<i64>>,
}

fn distribution(set: &impl RecordSet, column: Column) -> Result<Vec<Share>, AggregateError> {
    Ok(value_counts(set, column.into())?
        .into_iter()
        .map(|(value, count)| Share {
            value: value.to_string(),
            count,
        })
        .collect())
}

fn year(value: Value) -> Result<i64, AggregateError> {
    value.as_i64().ok_or_else(|| AggregateError::TypeMismatch {
        field: Column::BirthYear.name().to_string(),
        value: value.to_string(),
    })
}

impl UserStats {
    #[tracing::instrument(name = "user_stats", skip_all)]
    pub fn compute(set: &impl RecordSet) -> Self {
        let birth_year = Field::Column(Column::BirthYear);

        UserStats {
            user_types: metric("user_types", distribution(set, Column::UserType)),
            genders: metric("genders", distribution(set, Column::Gender)),
            latest_birth_year: metric(
                "latest_birth_year",
                max(set, birth_year).and_then(year),
            ),
            earliest_birth_year: metric(
                "earliest_birth_year",
                min(set, birth_year).and_then(year),
            ),
            common_birth_year: metric(
                "common_birth_year",
                most_common(set, birth_year).and_then(|mode| {
                    let value = year(mode.value.clone())?;
                    Ok(mode.map(|_| value))
                }),
            ),
        }
    }
}
