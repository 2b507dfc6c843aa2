//! Frequency and summary aggregation over trip record fields.
//!
//! Every function here is a pure function of a [`RecordSet`] and a [`Field`].
//! Missing values are skipped; a field whose columns are absent from the
//! schema fails with [`AggregateError::FieldNotFound`], and a field with no
//! present values fails with [`AggregateError::EmptyCollection`].

use chrono::{Datelike, Timelike};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::dataset::{Column, Dataset, TripRecord, Value};
use crate::error::AggregateError;

/// Separator between start and end station in the derived trip field.
pub const TRIP_SEPARATOR: &str = " to ";

/// A collection of trip records together with its schema.
pub trait RecordSet {
    fn has_column(&self, column: Column) -> bool;
    fn records(&self) -> &[TripRecord];
}

impl RecordSet for Dataset {
    fn has_column(&self, column: Column) -> bool {
        Dataset::has_column(self, column)
    }

    fn records(&self) -> &[TripRecord] {
        Dataset::records(self)
    }
}

/// A value that can be read off a trip record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// A source column as is.
    Column(Column),
    /// Month of the start time (1..=12).
    StartMonth,
    /// Weekday of the start time (monday = 0).
    StartWeekday,
    /// Hour of the start time (0..=23).
    StartHour,
    /// `"<start station> to <end station>"`.
    Trip,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Column(c) => c.name(),
            Field::StartMonth => "Start Month",
            Field::StartWeekday => "Start Weekday",
            Field::StartHour => "Start Hour",
            Field::Trip => "Trip",
        }
    }

    /// Source columns this field is derived from.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Field::Column(c) => c.as_slice(),
            Field::StartMonth | Field::StartWeekday | Field::StartHour => &[Column::StartTime],
            Field::Trip => &[Column::StartStation, Column::EndStation],
        }
    }

    /// Reads the field from `record`. Derived values are computed on the fly
    /// and never stored back into the record.
    pub fn value(&self, record: &TripRecord) -> Option<Value> {
        match self {
            Field::Column(c) => record.get(*c),
            Field::StartMonth => Some(Value::Integer(i64::from(record.start_time.month()))),
            Field::StartWeekday => Some(Value::Integer(i64::from(
                record.start_time.weekday().num_days_from_monday(),
            ))),
            Field::StartHour => Some(Value::Integer(i64::from(record.start_time.hour()))),
            Field::Trip => match (&record.start_station, &record.end_station) {
                (Some(start), Some(end)) => {
                    Some(Value::Text(format!("{start}{TRIP_SEPARATOR}{end}")))
                }
                _ => None,
            },
        }
    }
}

impl From<Column> for Field {
    fn from(column: Column) -> Self {
        Field::Column(column)
    }
}

/// The most frequent value of a field and how often it occurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mode<T> {
    pub value: T,
    pub count: usize,
}

impl<T> Mode<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Mode<U> {
        Mode {
            value: f(self.value),
            count: self.count,
        }
    }
}

fn values(set: &impl RecordSet, field: Field) -> Result<Vec<Value>, AggregateError> {
    if let Some(missing) = field.columns().iter().find(|c| !set.has_column(**c)) {
        return Err(AggregateError::FieldNotFound(missing.name().to_string()));
    }

    let values: Vec<Value> = set.records().iter().filter_map(|r| field.value(r)).collect();
    if values.is_empty() {
        return Err(AggregateError::EmptyCollection(field.name().to_string()));
    }
    Ok(values)
}

fn numbers(set: &impl RecordSet, field: Field) -> Result<Vec<f64>, AggregateError> {
    values(set, field)?
        .into_iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| AggregateError::TypeMismatch {
                field: field.name().to_string(),
                value: v.to_string(),
            })
        })
        .collect()
}

/// Counts every distinct value of `field`.
///
/// Sorted by count, highest first; equal counts are ordered by ascending
/// value so the result does not depend on record order.
pub fn value_counts(
    set: &impl RecordSet,
    field: Field,
) -> Result<Vec<(Value, usize)>, AggregateError> {
    let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
    for value in values(set, field)? {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut counts: Vec<(Value, usize)> = counts.into_iter().collect();
    // Stable sort keeps the ascending key order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(counts)
}

/// The most frequent value of `field`.
///
/// When several values share the highest count, the smallest one (in
/// [`Value`] order: numerically, then chronologically, then lexically) wins.
pub fn most_common(set: &impl RecordSet, field: Field) -> Result<Mode<Value>, AggregateError> {
    let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
    for value in values(set, field)? {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(Value, usize)> = None;
    for (value, count) in counts {
        if best.as_ref().is_none_or(|(_, c)| count > *c) {
            best = Some((value, count));
        }
    }

    best.map(|(value, count)| Mode { value, count })
        .ok_or_else(|| AggregateError::EmptyCollection(field.name().to_string()))
}

pub fn sum(set: &impl RecordSet, field: Field) -> Result<f64, AggregateError> {
    Ok(numbers(set, field)?.iter().sum())
}

pub fn mean(set: &impl RecordSet, field: Field) -> Result<f64, AggregateError> {
    let values = numbers(set, field)?;
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Smallest present value of `field` in [`Value`] order.
pub fn min(set: &impl RecordSet, field: Field) -> Result<Value, AggregateError> {
    values(set, field)?
        .into_iter()
        .min()
        .ok_or_else(|| AggregateError::EmptyCollection(field.name().to_string()))
}

/// Largest present value of `field` in [`Value`] order.
pub fn max(set: &impl RecordSet, field: Field) -> Result<Value, AggregateError> {
    values(set, field)?
        .into_iter()
        .max()
        .ok_or_else(|| AggregateError::EmptyCollection(field.name().to_string()))
}
