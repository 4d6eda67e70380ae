/// The data types requested from the aggregate endpoint and folded into a `DailySummary`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Steps,
    HeartRate,
    Calories,
    Distance,
    Weight,
    Sleep,
}

impl MetricType {
    pub const ALL: [MetricType; 6] = [
        MetricType::Steps,
        MetricType::HeartRate,
        MetricType::Calories,
        MetricType::Distance,
        MetricType::Weight,
        MetricType::Sleep,
    ];

    pub fn data_type_name(self) -> &'static str {
        match self {
            MetricType::Steps => "com.google.step_count.delta",
            MetricType::HeartRate => "com.google.heart_rate.bpm",
            MetricType::Calories => "com.google.calories.expended",
            MetricType::Distance => "com.google.distance.delta",
            MetricType::Weight => "com.google.weight",
            MetricType::Sleep => "com.google.sleep.segment",
        }
    }

    /// Exact, case sensitive match. Anything else is not a tracked metric.
    pub fn from_data_type_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|metric| metric.data_type_name() == name)
    }
}
