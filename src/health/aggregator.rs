use chrono::DateTime;

use crate::health::metric_type::MetricType;
use crate::models::google_fit::{Bucket, Point};
use crate::models::health_data::{DailyHealthMap, DailySummary};

/// UTC calendar date (`YYYY-MM-DD`) of an epoch-millisecond instant.
///
/// Returns `None` only for instants chrono cannot represent.
pub fn date_key(start_time_millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(start_time_millis)
        .map(|start| start.format("%Y-%m-%d").to_string())
}

pub struct DailyAggregator;

impl DailyAggregator {
    /// Fold provider buckets into one summary per UTC date.
    ///
    /// Dates appear in the order their first bucket was seen. Buckets that land on
    /// the same date add up; weight is overwritten by the latest reading instead.
    pub fn aggregate(buckets: &[Bucket]) -> DailyHealthMap {
        let mut health_data = DailyHealthMap::new();

        for bucket in buckets {
            let Some(date) = date_key(bucket.start_time_millis) else {
                tracing::warn!(
                    "Skipping bucket with unrepresentable start time {}",
                    bucket.start_time_millis
                );
                continue;
            };

            let summary = health_data.entry(date);
            for point in bucket.dataset.iter().flat_map(|dataset| dataset.point.iter()) {
                Self::apply_point(summary, point);
            }
        }

        tracing::debug!("Aggregated {} buckets into {} days", buckets.len(), health_data.len());
        health_data
    }

    /// Only the first value of a point counts. A missing value reads as zero, or as
    /// no reading at all for weight.
    fn apply_point(summary: &mut DailySummary, point: &Point) {
        let Some(metric) = MetricType::from_data_type_name(&point.data_type_name) else {
            return;
        };

        let value = point.first_value();
        let int_val = value.and_then(|v| v.int_val).unwrap_or(0);
        let fp_val = value.and_then(|v| v.fp_val);

        match metric {
            MetricType::Steps => summary.steps = summary.steps.saturating_add(int_val),
            MetricType::HeartRate => summary.heart_rate.push(fp_val.unwrap_or(0.0)),
            MetricType::Calories => summary.calories_burned += fp_val.unwrap_or(0.0),
            MetricType::Distance => summary.distance += fp_val.unwrap_or(0.0),
            MetricType::Weight => summary.weight = fp_val,
            MetricType::Sleep => {
                summary.sleep_duration = summary.sleep_duration.saturating_add(int_val)
            }
        }
    }
}
