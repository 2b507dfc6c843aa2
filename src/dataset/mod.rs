//! Trip log loading and time-window filtering.
//!
//! ```text
//!  city ──► CityTable ──► source::open ──► loader::read_trips ──► Dataset
//!                                                                   │
//!                                           FilterCriteria ──► Dataset::filter
//!                                                                   │
//!                                                                   ▼
//!                                                     filtered, complete Dataset
//! ```

pub mod loader;
pub mod model;

use chrono::{Datelike, NaiveDateTime};
use tracing::info;

use crate::calendar::{self, ALL};
use crate::config::CityTable;
use crate::error::LoadError;
use crate::source;

pub use loader::read_trips;
pub use model::{Column, TripRecord, Value};

/// Month and weekday codes restricting which trips are analysed.
///
/// `month` is 1..=6 and `day` is 0..=6 (monday = 0); [`ALL`] disables the
/// corresponding filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCriteria {
    month: u8,
    day: u8,
}

impl FilterCriteria {
    /// No time filter at all.
    pub const NONE: FilterCriteria = FilterCriteria { month: ALL, day: ALL };

    pub fn new(month: u8, day: u8) -> Result<Self, LoadError> {
        match (calendar::code_to_month(month), calendar::code_to_day(day)) {
            (Some(_), Some(_)) => Ok(Self { month, day }),
            _ => Err(LoadError::InvalidTimeFilter {
                month: month.to_string(),
                day: day.to_string(),
            }),
        }
    }

    /// Encodes month and weekday names, e.g. `("march", "all")`.
    pub fn from_names(month: &str, day: &str) -> Result<Self, LoadError> {
        match (calendar::month_to_code(month), calendar::day_to_code(day)) {
            (Some(month), Some(day)) => Ok(Self { month, day }),
            _ => Err(LoadError::InvalidTimeFilter {
                month: month.to_string(),
                day: day.to_string(),
            }),
        }
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn month_name(&self) -> &'static str {
        calendar::code_to_month(self.month).unwrap_or("all")
    }

    pub fn day_name(&self) -> &'static str {
        calendar::code_to_day(self.day).unwrap_or("all")
    }

    pub fn matches(&self, start: &NaiveDateTime) -> bool {
        (self.month == ALL || start.month() == u32::from(self.month))
            && (self.day == ALL || start.weekday().num_days_from_monday() == u32::from(self.day))
    }
}

/// An ordered, read-only collection of trips for one city.
///
/// The schema (`columns` plus `extra_columns`) records which columns the
/// source trip log carried, so a column that never existed can be told apart
/// from a record that merely lacks a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    city: String,
    columns: Vec<Column>,
    extra_columns: Vec<String>,
    records: Vec<TripRecord>,
}

impl Dataset {
    pub fn new(
        city: &str,
        columns: Vec<Column>,
        extra_columns: Vec<String>,
        records: Vec<TripRecord>,
    ) -> Self {
        Self {
            city: city.to_string(),
            columns,
            extra_columns,
            records,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// True when the record holds a value for every column in the schema.
    pub fn is_complete(&self, record: &TripRecord) -> bool {
        self.columns.iter().all(|c| record.has(*c))
            && record.extras.len() == self.extra_columns.len()
            && record.extras.iter().all(Option::is_some)
    }

    /// Keeps the records starting inside the criteria's time window that are
    /// also complete. Order is preserved and `self` is left untouched.
    pub fn filter(&self, criteria: &FilterCriteria) -> Dataset {
        let records: Vec<TripRecord> = self
            .records
            .iter()
            .filter(|r| criteria.matches(&r.start_time) && self.is_complete(r))
            .cloned()
            .collect();

        info!(
            city = %self.city,
            month = criteria.month_name(),
            day = criteria.day_name(),
            before = self.records.len(),
            after = records.len(),
            "Dataset filtered"
        );

        Dataset {
            city: self.city.clone(),
            columns: self.columns.clone(),
            extra_columns: self.extra_columns.clone(),
            records,
        }
    }

    /// Returns up to `len` records starting at `start`.
    pub fn preview(&self, start: usize, len: usize) -> &[TripRecord] {
        let start = start.min(self.records.len());
        let end = start.saturating_add(len).min(self.records.len());
        &self.records[start..end]
    }
}

/// Loads the trip log for `city` and narrows it to `criteria`.
///
/// Errors are not recovered here: an unknown city or an unreadable source
/// fails the whole load.
#[tracing::instrument(skip(table))]
pub fn load(
    table: &CityTable,
    data_dir: &str,
    city: &str,
    criteria: &FilterCriteria,
) -> Result<Dataset, LoadError> {
    let location = table.resolve(city, data_dir)?;

    let reader = source::open(&location)?;
    let dataset = read_trips(reader, &city.trim().to_ascii_lowercase())?;

    Ok(dataset.filter(criteria))
}

/// Like [`load`], but takes the month and day by name, e.g. `("march", "all")`.
/// An unknown name fails with [`LoadError::InvalidTimeFilter`].
pub fn load_and_filter(
    table: &CityTable,
    data_dir: &str,
    city: &str,
    month: &str,
    day: &str,
) -> Result<Dataset, LoadError> {
    let criteria = FilterCriteria::from_names(month, day)?;
    load(table, data_dir, city, &criteria)
}
