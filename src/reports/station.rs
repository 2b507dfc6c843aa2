use serde::Serialize;

use super::{Metric, metric};
use crate::aggregate::{Field, Mode, RecordSet, most_common};
use crate::dataset::Column;
use crate::error::AggregateError;

/// Most popular stations and trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationStats {
    pub start_station: Metric<Mode<String>>,
    pub end_station: Metric<Mode<String>>,
    /// Most frequent `"<start> to <end>"` pair.
    pub trip: Metric<Mode<String>>,
}

fn text_mode(set: &impl RecordSet, field: Field) -> Result<Mode<String>, AggregateError> {
    Ok(most_common(set, field)?.map(|v| v.to_string()))
}

impl StationStats {
    #[tracing::instrument(name = "station_stats", skip_all)]
    pub fn compute(set: &impl RecordSet) -> Self {
        StationStats {
            start_station: metric(
                "start_station",
                text_mode(set, Column::StartStation.into()),
            ),
            end_station: metric("end_station", text_mode(set, Column::EndStation.into())),
            trip: metric("trip", text_mode(set, Field::Trip)),
        }
    }
}
