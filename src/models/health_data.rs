use std::collections::HashMap;

use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accumulated metrics for one calendar day (UTC).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub steps: i64,
    pub heart_rate: Vec<f64>,
    pub calories_burned: f64,
    pub distance: f64,
    /// Last reading seen for the day, never summed.
    pub weight: Option<f64>,
    /// Raw units of the sleep segment metric, not normalized.
    pub sleep_duration: i64,
}

/// Date keyed summaries that keep the order in which dates were first seen.
///
/// Serializes as a JSON object `{"YYYY-MM-DD": DailySummary, ...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyHealthMap {
    entries: Vec<(String, DailySummary)>,
    index: HashMap<String, usize>,
}

impl DailyHealthMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary for `date`, inserting a zeroed one at the end if the date is new.
    pub fn entry(&mut self, date: String) -> &mut DailySummary {
        let position = match self.index.get(&date) {
            Some(position) => *position,
            None => {
                let position = self.entries.len();
                self.index.insert(date.clone(), position);
                self.entries.push((date, DailySummary::default()));
                position
            }
        };
        &mut self.entries[position].1
    }

    pub fn get(&self, date: &str) -> Option<&DailySummary> {
        self.index.get(date).map(|position| &self.entries[*position].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DailySummary)> {
        self.entries.iter().map(|(date, summary)| (date.as_str(), summary))
    }

    pub fn dates(&self) -> Vec<&str> {
        self.entries.iter().map(|(date, _)| date.as_str()).collect()
    }
}

impl Serialize for DailyHealthMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(self.iter())
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDataResponse {
    pub health_data: DailyHealthMap,
    pub analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: serde_json::Value) -> Self {
        Self {
            error: error.into(),
            details: Some(details),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HealthDataQueryError {
    #[error("days must be at least 1, got {0}")]
    NonPositiveDays(i64),
}

/// Query string of `GET /get_health_data`.
#[derive(Debug, Deserialize)]
pub struct HealthDataQuery {
    #[serde(default)]
    pub days: Option<String>,
}

impl HealthDataQuery {
    /// Trailing window length in days. A missing or non-numeric value falls back to
    /// `default_days`; a numeric value below one is rejected.
    pub fn window_days(&self, default_days: i64) -> Result<i64, HealthDataQueryError> {
        let days = match self.days.as_deref().map(str::trim) {
            Some(raw) => raw.parse::<i64>().unwrap_or(default_days),
            None => default_days,
        };

        if days < 1 {
            return Err(HealthDataQueryError::NonPositiveDays(days));
        }
        Ok(days)
    }
}
