use chrono::NaiveDateTime;
use csv::StringRecord;
use std::io::Read;
use tracing::{debug, info};

use super::Dataset;
use super::model::{Column, TripRecord, Value};
use crate::error::LoadError;

/// Cells treated as missing, following common CSV export conventions.
static MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

static TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a trip log timestamp in any of the accepted layouts.
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(cell, fmt).ok())
}

fn present(cell: &str) -> Option<&str> {
    let cell = cell.trim();
    if MISSING_TOKENS.contains(&cell) {
        None
    } else {
        Some(cell)
    }
}

/// Where each recognised column sits in a CSV row.
struct Layout {
    columns: Vec<(Column, usize)>,
    extras: Vec<usize>,
    start_time: usize,
}

impl Layout {
    fn from_headers(headers: &StringRecord) -> Result<(Self, Vec<String>), LoadError> {
        let mut columns = Vec::new();
        let mut extras = Vec::new();
        let mut extra_names = Vec::new();

        for (idx, header) in headers.iter().enumerate() {
            match Column::from_header(header) {
                Some(column) => columns.push((column, idx)),
                None => {
                    extras.push(idx);
                    extra_names.push(header.to_string());
                }
            }
        }

        let start_time = columns
            .iter()
            .find(|(c, _)| *c == Column::StartTime)
            .map(|(_, idx)| *idx)
            .ok_or_else(|| LoadError::MissingColumn(Column::StartTime.name().to_string()))?;

        Ok((
            Self {
                columns,
                extras,
                start_time,
            },
            extra_names,
        ))
    }

    fn record(&self, row: &StringRecord) -> Option<TripRecord> {
        let start_time = parse_timestamp(row.get(self.start_time)?)?;
        let mut record = TripRecord::starting_at(start_time);

        for &(column, idx) in &self.columns {
            let Some(cell) = row.get(idx).and_then(present) else {
                continue;
            };
            match column {
                Column::StartTime => {}
                Column::EndTime => {
                    record.end_time = Some(
                        parse_timestamp(cell)
                            .map_or_else(|| Value::Text(cell.to_string()), Value::Timestamp),
                    )
                }
                Column::StartStation => record.start_station = Some(cell.to_string()),
                Column::EndStation => record.end_station = Some(cell.to_string()),
                Column::TripDuration => record.trip_duration = Some(Value::parse(cell)),
                Column::UserType => record.user_type = Some(cell.to_string()),
                Column::Gender => record.gender = Some(cell.to_string()),
                Column::BirthYear => record.birth_year = Some(Value::parse(cell)),
            }
        }

        record.extras = self
            .extras
            .iter()
            .map(|&idx| row.get(idx).and_then(present).map(str::to_string))
            .collect();

        Some(record)
    }
}

/// Reads every record of a trip log whose start time parses.
///
/// No time or completeness filter is applied; see [`Dataset::filter`].
pub fn read_trips<R: Read>(reader: R, city: &str) -> Result<Dataset, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let (layout, extra_columns) = Layout::from_headers(rdr.headers()?)?;

    let mut records = Vec::new();
    let mut rejected = 0usize;

    for (row_no, result) in rdr.records().enumerate() {
        let row = result?;
        match layout.record(&row) {
            Some(record) => records.push(record),
            None => {
                rejected += 1;
                debug!(row = row_no + 1, "Skipping row with unparseable start time");
            }
        }
    }

    info!(city, read = records.len(), rejected, "Trip log read");

    let columns = layout.columns.iter().map(|(c, _)| *c).collect();
    Ok(Dataset::new(city, columns, extra_columns, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::FilterCriteria;
    use chrono::{Datelike, Timelike};

    const LOG: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1423854,2017-06-23 15:09:32,2017-06-23 15:14:53,321,Wood St & Hubbard St,Damen Ave & Chicago Ave,Subscriber,Male,1992.0
955915,2017-05-25 18:19:03,2017-05-25 18:45:53,1610,Theater on the Lake,Sheffield Ave & Waveland Ave,Subscriber,Female,1992.0
9031,garbage,2017-01-04 08:34:45,416,May St & Taylor St,Wood St & Taylor St,Subscriber,,
";

    #[test]
    fn test_parse_timestamp_formats() {
        let ts = parse_timestamp("2017-06-23 15:09:32").unwrap();
        assert_eq!((ts.month(), ts.day(), ts.hour()), (6, 23, 15));
        assert!(parse_timestamp("2017-06-23T15:09:32").is_some());
        assert!(parse_timestamp("2017-06-23 15:09:32.500").is_some());
        assert!(parse_timestamp("2017-06-23 15:09").is_some());
        assert!(parse_timestamp("23/06/2017").is_none());
    }

    #[test]
    fn test_read_trips_skips_unparseable_start_time() {
        let dataset = read_trips(LOG.as_bytes(), "chicago").unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.city(), "chicago");
    }

    #[test]
    fn test_read_trips_maps_columns() {
        let dataset = read_trips(LOG.as_bytes(), "chicago").unwrap();
        let first = &dataset.records()[0];

        assert_eq!(first.start_station.as_deref(), Some("Wood St & Hubbard St"));
        assert_eq!(first.trip_duration, Some(Value::Integer(321)));
        assert_eq!(first.birth_year, Some(Value::Integer(1992)));
        assert_eq!(first.extras, vec![Some("1423854".to_string())]);
        assert!(dataset.has_column(Column::Gender));
        assert_eq!(dataset.extra_columns(), &["".to_string()]);
    }

    #[test]
    fn test_read_trips_missing_optional_columns() {
        let log = "Start Time,Trip Duration,Start Station,End Station,User Type\n\
                   2017-03-01 08:00:00,100,A,B,Customer\n";
        let dataset = read_trips(log.as_bytes(), "washington").unwrap();

        assert_eq!(dataset.len(), 1);
        assert!(!dataset.has_column(Column::Gender));
        assert!(!dataset.has_column(Column::BirthYear));
    }

    #[test]
    fn test_read_trips_requires_start_time() {
        let log = "Trip Duration,Start Station\n100,A\n";
        let err = read_trips(log.as_bytes(), "chicago").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == "Start Time"));
    }

    #[test]
    fn test_missing_tokens() {
        let log = "Start Time,Gender\n2017-03-01 08:00:00,NaN\n2017-03-01 09:00:00,Male\n";
        let dataset = read_trips(log.as_bytes(), "chicago").unwrap();
        assert_eq!(dataset.records()[0].gender, None);
        assert_eq!(dataset.records()[1].gender.as_deref(), Some("Male"));
    }

    #[test]
    fn test_unparseable_end_time_still_counts_as_present() {
        let log = "Start Time,End Time,Start Station\n\
                   2017-01-02 08:00:00,2017-01-02 08:10:00,A\n\
                   2017-01-02 09:00:00,01/02/2017 09:10,B\n";
        let dataset = read_trips(log.as_bytes(), "chicago").unwrap();

        assert_eq!(
            dataset.records()[1].end_time,
            Some(Value::Text("01/02/2017 09:10".into()))
        );
        assert_eq!(dataset.filter(&FilterCriteria::NONE).len(), 2);
    }
}
