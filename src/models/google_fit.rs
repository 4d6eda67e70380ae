use serde::{de, Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Body of `POST /fitness/v1/users/me/dataset:aggregate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    pub aggregate_by: Vec<AggregateBy>,
    pub bucket_by_time: BucketByTime,
    pub start_time_millis: i64,
    pub end_time_millis: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBy {
    pub data_type_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketByTime {
    pub duration_millis: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregateResponse {
    #[serde(default)]
    pub bucket: Vec<Bucket>,
}

/// A time-boxed window of datasets, one per requested data type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    #[serde(deserialize_with = "deserialize_millis")]
    pub start_time_millis: i64,
    #[serde(default)]
    pub dataset: Vec<Dataset>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub point: Vec<Point>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub data_type_name: String,
    #[serde(default)]
    pub value: Vec<Value>,
}

impl Point {
    /// Only the first value is ever read; any further values the provider attaches are ignored.
    pub fn first_value(&self) -> Option<&Value> {
        self.value.first()
    }
}

/// A single typed reading. The provider sets exactly one of the members; map and
/// string values are not used by any aggregated metric.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(default)]
    pub int_val: Option<i64>,
    #[serde(default)]
    pub fp_val: Option<f64>,
}

#[derive(Debug, Error)]
pub enum FitnessApiError {
    #[error("Fitness provider returned HTTP {status}")]
    Provider {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(reqwest::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Millis {
    Number(i64),
    Text(String),
}

/// int64 fields arrive as JSON strings from the provider; plain numbers are accepted too.
fn deserialize_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Millis::deserialize(deserializer)? {
        Millis::Number(millis) => Ok(millis),
        Millis::Text(text) => text.trim().parse::<i64>().map_err(de::Error::custom),
    }
}
