use chrono::Month;
use serde::Serialize;

use super::{Metric, metric};
use crate::aggregate::{Field, Mode, RecordSet, most_common};
use crate::calendar;
use crate::dataset::Value;
use crate::error::AggregateError;

/// Most frequent times of travel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStats {
    pub month: Metric<Mode<String>>,
    pub weekday: Metric<Mode<String>>,
    pub hour: Metric<Mode<u32>>,
}

fn decode(
    field: Field,
    value: Value,
    names: impl Fn(u8) -> Option<String>,
) -> Result<String, AggregateError> {
    value
        .as_i64()
        .and_then(|v| u8::try_from(v).ok())
        .and_then(names)
        .ok_or_else(|| AggregateError::TypeMismatch {
            field: field.name().to_string(),
            value: value.to_string(),
        })
}

/// Month names outside the filterable range come from chrono instead of the
/// calendar codes, so unfiltered logs spanning a whole year still decode.
fn month_name(code: u8) -> Option<String> {
    calendar::code_to_month(code)
        .filter(|_| code != calendar::ALL)
        .map(str::to_string)
        .or_else(|| {
            Month::try_from(code)
                .ok()
                .map(|m| m.name().to_ascii_lowercase())
        })
}

fn day_name(code: u8) -> Option<String> {
    calendar::code_to_day(code)
        .filter(|_| code != calendar::ALL)
        .map(str::to_string)
}

fn named_mode(
    set: &impl RecordSet,
    field: Field,
    names: impl Fn(u8) -> Option<String>,
) -> Result<Mode<String>, AggregateError> {
    let mode = most_common(set, field)?;
    let name = decode(field, mode.value.clone(), names)?;
    Ok(mode.map(|_| name))
}

impl TimeStats {
    #[tracing::instrument(name = "time_stats", skip_all)]
    pub fn compute(set: &impl RecordSet) -> Self {
        let hour = most_common(set, Field::StartHour).and_then(|mode| {
            let hour = mode
                .value
                .as_i64()
                .and_then(|h| u32::try_from(h).ok())
                .ok_or_else(|| AggregateError::TypeMismatch {
                    field: Field::StartHour.name().to_string(),
                    value: mode.value.to_string(),
                })?;
            Ok(mode.map(|_| hour))
        });

        TimeStats {
            month: metric("month", named_mode(set, Field::StartMonth, month_name)),
            weekday: metric("weekday", named_mode(set, Field::StartWeekday, day_name)),
            hour: metric("hour", hour),
        }
    }
}
