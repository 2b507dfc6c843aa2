//! Themed statistics reports built on the frequency aggregator.
//!
//! Each report computes every one of its metrics independently. A metric
//! that cannot be computed is kept in the report as [`Metric::Unavailable`]
//! so callers can still list it, and never stops its siblings.

pub mod duration;
pub mod station;
pub mod time;
pub mod user;

use serde::Serialize;
use std::fmt;
use tracing::warn;

use crate::aggregate::RecordSet;
use crate::dataset::{Dataset, FilterCriteria};
use crate::error::AggregateError;

pub use duration::DurationStats;
pub use station::StationStats;
pub use time::TimeStats;
pub use user::UserStats;

/// Why a metric is missing from a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "field", rename_all = "snake_case")]
pub enum Unavailable {
    /// The trip log has no such column.
    MissingField(String),
    /// No trip carried a value for the field.
    NoTrips,
    /// Any other failure, e.g. a non-numeric cell in a numeric column.
    Unexpected,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::MissingField(field) => write!(f, "unavailable: {field}"),
            Unavailable::NoTrips => f.write_str("unavailable: no trips"),
            Unavailable::Unexpected => f.write_str("unavailable: unexpected error"),
        }
    }
}

impl From<&AggregateError> for Unavailable {
    fn from(err: &AggregateError) -> Self {
        match err {
            AggregateError::FieldNotFound(field) => Unavailable::MissingField(field.clone()),
            AggregateError::EmptyCollection(_) => Unavailable::NoTrips,
            AggregateError::TypeMismatch { .. } => Unavailable::Unexpected,
        }
    }
}

/// Outcome of a single metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric<T> {
    Available(T),
    Unavailable(Unavailable),
}

impl<T> Metric<T> {
    pub fn is_available(&self) -> bool {
        matches!(self, Metric::Available(_))
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Metric::Available(v) => Some(v),
            Metric::Unavailable(_) => None,
        }
    }

    pub fn unavailable(&self) -> Option<&Unavailable> {
        match self {
            Metric::Available(_) => None,
            Metric::Unavailable(reason) => Some(reason),
        }
    }
}

/// Records the outcome of one metric, logging failures.
pub(crate) fn metric<T>(name: &str, result: Result<T, AggregateError>) -> Metric<T> {
    match result {
        Ok(value) => Metric::Available(value),
        Err(e) => {
            warn!(metric = name, error = %e, "Metric unavailable");
            Metric::Unavailable(Unavailable::from(&e))
        }
    }
}

/// Full result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub city: String,
    pub month: String,
    pub day: String,
    pub trips: usize,
    pub time: TimeStats,
    pub station: StationStats,
    pub duration: DurationStats,
    pub user: UserStats,
}

impl AnalysisReport {
    pub fn compute(dataset: &Dataset, criteria: &FilterCriteria) -> Self {
        Self::from_set(dataset.city(), criteria, dataset)
    }

    pub fn from_set(city: &str, criteria: &FilterCriteria, set: &impl RecordSet) -> Self {
        AnalysisReport {
            city: city.to_string(),
            month: criteria.month_name().to_string(),
            day: criteria.day_name().to_string(),
            trips: set.records().len(),
            time: TimeStats::compute(set),
            station: StationStats::compute(set),
            duration: DurationStats::compute(set),
            user: UserStats::compute(set),
        }
    }
}
