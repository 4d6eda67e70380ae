pub mod aggregator;
pub mod metric_type;

pub use aggregator::{date_key, DailyAggregator};
pub use metric_type::MetricType;
