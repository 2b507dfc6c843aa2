//! Output formatting and persistence for analysis reports.
//!
//! Supports plain-text sections, JSON serialization, a tabular record preview,
//! and appending a one-row summary to a CSV history file.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;
use tracing::debug;

use crate::aggregate::Mode;
use crate::dataset::{Column, Dataset, TripRecord};
use crate::reports::{
    AnalysisReport, DurationStats, Metric, StationStats, TimeStats, UserStats,
};

/// Separator printed after every section.
pub fn rule() -> String {
    "-".repeat(40)
}

fn mode_lines<T: std::fmt::Display>(
    out: &mut String,
    label: &str,
    unit: &str,
    metric: &Metric<Mode<T>>,
) {
    match metric {
        Metric::Available(mode) => {
            let _ = writeln!(out, "\nMost common {label}: {}", mode.value);
            let _ = writeln!(out, "Number of {unit}: {}", mode.count);
        }
        Metric::Unavailable(reason) => {
            let _ = writeln!(out, "\nMost common {label}: {reason}");
        }
    }
    let _ = writeln!(out, "-----");
}

fn value_line<T: std::fmt::Display>(out: &mut String, label: &str, metric: &Metric<T>) {
    match metric {
        Metric::Available(v) => {
            let _ = writeln!(out, "\n{label}: {v}");
        }
        Metric::Unavailable(reason) => {
            let _ = writeln!(out, "\n{label}: {reason}");
        }
    }
}

pub fn render_time(stats: &TimeStats) -> String {
    let mut out = String::from("\nCalculating The Most Frequent Times of Travel...\n");
    mode_lines(&mut out, "month", "rides", &stats.month);
    mode_lines(&mut out, "day", "rides", &stats.weekday);
    mode_lines(&mut out, "hour", "rides", &stats.hour);
    out
}

pub fn render_station(stats: &StationStats) -> String {
    let mut out = String::from("\nCalculating The Most Popular Stations and Trip...\n");
    mode_lines(&mut out, "start station", "rides", &stats.start_station);
    mode_lines(&mut out, "end station", "rides", &stats.end_station);
    mode_lines(&mut out, "trip", "rides", &stats.trip);
    out
}

pub fn render_duration(stats: &DurationStats) -> String {
    let mut out = String::from("\nCalculating Trip Duration...\n");
    value_line(&mut out, "Total time for all trips", &stats.total);
    let _ = writeln!(out, "-----");
    value_line(&mut out, "Average trip duration", &stats.mean);
    let _ = writeln!(out, "-----");
    out
}

pub fn render_user(stats: &UserStats) -> String {
    let mut out = String::from("\nCalculating User Stats...\n");

    for (label, metric) in [("User Type", &stats.user_types), ("Gender", &stats.genders)] {
        match metric {
            Metric::Available(shares) => {
                let _ = writeln!(out, "\n{label:<24}count");
                for share in shares {
                    let _ = writeln!(out, "{:<24}{}", share.value, share.count);
                }
            }
            Metric::Unavailable(reason) => {
                let _ = writeln!(out, "\n{label}: {reason}");
            }
        }
        let _ = writeln!(out, "-----");
    }

    value_line(&mut out, "Most recent birth year", &stats.latest_birth_year);
    value_line(&mut out, "Earliest birth year", &stats.earliest_birth_year);
    mode_lines(&mut out, "birth year", "people", &stats.common_birth_year);
    out
}

/// Renders every section of `report` as plain text.
pub fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} trips in {} (month: {}, day: {})",
        report.trips, report.city, report.month, report.day
    );
    for section in [
        render_time(&report.time),
        render_station(&report.station),
        render_duration(&report.duration),
        render_user(&report.user),
    ] {
        out.push_str(&section);
        let _ = writeln!(out, "{}", rule());
    }
    out
}

/// Renders `report` as pretty-printed JSON.
pub fn render_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn cell(record: &TripRecord, column: Column) -> String {
    record.get(column).map(|v| v.to_string()).unwrap_or_default()
}

/// Renders `records` as a tab-separated table over the dataset's columns,
/// numbered from `first_row`.
pub fn render_preview(dataset: &Dataset, first_row: usize, records: &[TripRecord]) -> String {
    let mut out = String::new();
    let header: Vec<&str> = dataset.columns().iter().map(|c| c.name()).collect();
    let _ = writeln!(out, "\t{}", header.join("\t"));

    for (offset, record) in records.iter().enumerate() {
        let row: Vec<String> = dataset.columns().iter().map(|c| cell(record, *c)).collect();
        let _ = writeln!(out, "{}\t{}", first_row + offset, row.join("\t"));
    }
    out
}

/// Flattened one-row view of an [`AnalysisReport`] for CSV history files.
#[derive(Debug, Serialize)]
pub struct SummaryRow {
    pub timestamp: DateTime<Utc>,
    pub city: String,
    pub month: String,
    pub day: String,
    pub trips: usize,
    pub popular_month: Option<String>,
    pub popular_weekday: Option<String>,
    pub popular_hour: Option<u32>,
    pub popular_start_station: Option<String>,
    pub popular_end_station: Option<String>,
    pub popular_trip: Option<String>,
    pub total_duration: Option<f64>,
    pub mean_duration: Option<f64>,
    pub earliest_birth_year: Option<i64>,
    pub latest_birth_year: Option<i64>,
    pub common_birth_year: Option<i64>,
}

fn mode_value<T: Clone>(metric: &Metric<Mode<T>>) -> Option<T> {
    metric.available().map(|m| m.value.clone())
}

impl SummaryRow {
    pub fn from_report(report: &AnalysisReport) -> Self {
        SummaryRow {
            timestamp: Utc::now(),
            city: report.city.clone(),
            month: report.month.clone(),
            day: report.day.clone(),
            trips: report.trips,
            popular_month: mode_value(&report.time.month),
            popular_weekday: mode_value(&report.time.weekday),
            popular_hour: mode_value(&report.time.hour),
            popular_start_station: mode_value(&report.station.start_station),
            popular_end_station: mode_value(&report.station.end_station),
            popular_trip: mode_value(&report.station.trip),
            total_duration: report.duration.total.available().copied(),
            mean_duration: report.duration.mean.available().copied(),
            earliest_birth_year: report.user.earliest_birth_year.available().copied(),
            latest_birth_year: report.user.latest_birth_year.available().copied(),
            common_birth_year: mode_value(&report.user.common_birth_year),
        }
    }
}

/// Appends a [`SummaryRow`] for `report` to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_summary(path: &str, report: &AnalysisReport) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending CSV summary");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(SummaryRow::from_report(report))?;
    writer.flush()?;

    Ok(())
}
