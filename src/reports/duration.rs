use serde::Serialize;

use super::{Metric, metric};
use crate::aggregate::{RecordSet, mean, sum};
use crate::dataset::Column;

/// Total and average trip duration, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub total: Metric<f64>,
    pub mean: Metric<f64>,
}

impl DurationStats {
    #[tracing::instrument(name = "duration_stats", skip_all)]
    pub fn compute(set: &impl RecordSet) -> Self {
        DurationStats {
            total: metric("total_duration", sum(set, Column::TripDuration.into())),
            mean: metric("mean_duration", mean(set, Column::TripDuration.into())),
        }
    }
}
