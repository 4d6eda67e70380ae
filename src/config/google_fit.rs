use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct GoogleFitSettings {
    pub base_url: String,
    pub default_days: i64,
    pub bucket_duration_millis: i64,
    pub request_timeout_secs: u64,
}
