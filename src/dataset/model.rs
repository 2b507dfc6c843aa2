//! Core data types: cell values, schema columns, and trip records.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A dynamically typed cell value.
///
/// Values are totally ordered so they can key a `BTreeMap` and break ties
/// deterministically: numbers sort before timestamps, timestamps before text.
/// Integers and floats compare numerically, so `1985` and `1985.0` are the
/// same value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl Value {
    /// Guesses the narrowest type for a non-missing cell. Integral floats
    /// such as `1992.0` come back as integers.
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if let Ok(i) = cell.parse::<i64>() {
            return Value::Integer(i);
        }
        if let Ok(f) = cell.parse::<f64>() {
            return match integral(f) {
                Some(i) => Value::Integer(i),
                None => Value::Float(f),
            };
        }
        Value::Text(cell.to_string())
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the value as a whole number. Floats qualify only when integral,
    /// which is how integer columns with gaps come out of most CSV exports.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Float(f) => integral(*f),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Integer(_) | Value::Float(_) => 0,
            Value::Timestamp(_) => 1,
            Value::Text(_) => 2,
        }
    }
}

/// The float as an `i64` when it is a whole number inside the `i64` range.
fn integral(f: f64) -> Option<i64> {
    const LIMIT: f64 = 9_223_372_036_854_775_808.0; // 2^63

    (f.is_finite() && f.fract() == 0.0 && (-LIMIT..LIMIT).contains(&f)).then_some(f as i64)
}

fn cmp_mixed(a: i64, b: f64) -> Ordering {
    match integral(b) {
        Some(b) => a.cmp(&b),
        None => (a as f64).total_cmp(&b),
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        use Value::*;
        match self.rank().cmp(&other.rank()) {
            Ordering::Equal => {}
            ord => return ord,
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Integer(a), Float(b)) => cmp_mixed(*a, *b),
            (Float(a), Integer(b)) => cmp_mixed(*b, *a).reverse(),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Timestamp(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// The trip log columns this crate understands, keyed by exact header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Column {
    StartTime,
    EndTime,
    StartStation,
    EndStation,
    TripDuration,
    UserType,
    Gender,
    BirthYear,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::StartTime,
        Column::EndTime,
        Column::StartStation,
        Column::EndStation,
        Column::TripDuration,
        Column::UserType,
        Column::Gender,
        Column::BirthYear,
    ];

    /// The CSV header for this column (case-sensitive).
    pub fn name(self) -> &'static str {
        match self {
            Column::StartTime => "Start Time",
            Column::EndTime => "End Time",
            Column::StartStation => "Start Station",
            Column::EndStation => "End Station",
            Column::TripDuration => "Trip Duration",
            Column::UserType => "User Type",
            Column::Gender => "Gender",
            Column::BirthYear => "Birth Year",
        }
    }

    /// This column as a one-element slice.
    pub const fn as_slice(self) -> &'static [Column] {
        match self {
            Column::StartTime => &[Column::StartTime],
            Column::EndTime => &[Column::EndTime],
            Column::StartStation => &[Column::StartStation],
            Column::EndStation => &[Column::EndStation],
            Column::TripDuration => &[Column::TripDuration],
            Column::UserType => &[Column::UserType],
            Column::Gender => &[Column::Gender],
            Column::BirthYear => &[Column::BirthYear],
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One bicycle rental.
///
/// Only the start time is mandatory; every other field depends on which
/// columns the city's trip log carries. `extras` holds the cells of
/// unrecognised columns, aligned with [`super::Dataset::extra_columns`].
/// An end time in an unrecognised layout is kept as text.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRecord {
    pub start_time: NaiveDateTime,
    pub end_time: Option<Value>,
    pub start_station: Option<String>,
    pub end_station: Option<String>,
    pub trip_duration: Option<Value>,
    pub user_type: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<Value>,
    pub extras: Vec<Option<String>>,
}

impl TripRecord {
    /// A record with only a start time, for building records by hand.
    pub fn starting_at(start_time: NaiveDateTime) -> Self {
        Self {
            start_time,
            end_time: None,
            start_station: None,
            end_station: None,
            trip_duration: None,
            user_type: None,
            gender: None,
            birth_year: None,
            extras: Vec::new(),
        }
    }

    /// Returns the value held for `column`, or `None` when it is missing.
    pub fn get(&self, column: Column) -> Option<Value> {
        match column {
            Column::StartTime => Some(Value::Timestamp(self.start_time)),
            Column::EndTime => self.end_time.clone(),
            Column::StartStation => self.start_station.clone().map(Value::Text),
            Column::EndStation => self.end_station.clone().map(Value::Text),
            Column::TripDuration => self.trip_duration.clone(),
            Column::UserType => self.user_type.clone().map(Value::Text),
            Column::Gender => self.gender.clone().map(Value::Text),
            Column::BirthYear => self.birth_year.clone(),
        }
    }

    pub fn has(&self, column: Column) -> bool {
        match column {
            Column::StartTime => true,
            Column::EndTime => self.end_time.is_some(),
            Column::StartStation => self.start_station.is_some(),
            Column::EndStation => self.end_station.is_some(),
            Column::TripDuration => self.trip_duration.is_some(),
            Column::UserType => self.user_type.is_some(),
            Column::Gender => self.gender.is_some(),
            Column::BirthYear => self.birth_year.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_guesses_type() {
        assert_eq!(Value::parse("42"), Value::Integer(42));
        assert_eq!(Value::parse("1992.0"), Value::Integer(1992));
        assert_eq!(Value::parse("1992.5"), Value::Float(1992.5));
        assert_eq!(Value::parse(" Subscriber "), Value::Text("Subscriber".into()));
    }

    #[test]
    fn test_as_i64_accepts_integral_floats() {
        assert_eq!(Value::Float(1992.0).as_i64(), Some(1992));
        assert_eq!(Value::Float(1992.5).as_i64(), None);
        assert_eq!(Value::Float(f64::INFINITY).as_i64(), None);
        assert_eq!(Value::Float(1e300).as_i64(), None);
        assert_eq!(Value::Text("x".into()).as_i64(), None);
    }

    #[test]
    fn test_ordering_across_kinds() {
        let ts = NaiveDate::from_ymd_opt(2017, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let mut values = vec![
            Value::Text("b".into()),
            Value::Timestamp(ts),
            Value::Float(2.5),
            Value::Integer(3),
            Value::Text("a".into()),
            Value::Integer(1),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::Integer(3),
                Value::Timestamp(ts),
                Value::Text("a".into()),
                Value::Text("b".into()),
            ]
        );
    }

    #[test]
    fn test_mixed_spellings_of_one_number_are_equal() {
        assert_eq!(Value::parse("1985"), Value::parse("1985.0"));
        assert_eq!(Value::Integer(2), Value::Float(2.0));
        assert!(Value::Integer(2) < Value::Float(2.5));
        assert!(Value::Float(1.5) < Value::Integer(2));

        let mut counts = std::collections::BTreeMap::new();
        for cell in ["1985", "1985.0", "1990"] {
            *counts.entry(Value::parse(cell)).or_insert(0) += 1;
        }
        assert_eq!(counts.get(&Value::Integer(1985)), Some(&2));
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_column_header_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_header(column.name()), Some(column));
        }
        assert_eq!(Column::from_header("gender"), None);
    }
}
