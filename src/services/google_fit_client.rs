use std::time::Duration;

use chrono::Utc;
use reqwest::Client;

use crate::config::google_fit::GoogleFitSettings;
use crate::health::MetricType;
use crate::models::google_fit::{
    AggregateBy, AggregateRequest, AggregateResponse, BucketByTime, FitnessApiError,
};

const DAY_MILLIS: i64 = 86_400_000;

#[derive(Clone)]
pub struct GoogleFitClient {
    client: Client,
    settings: GoogleFitSettings,
}

impl GoogleFitClient {
    pub fn new(settings: GoogleFitSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn default_days(&self) -> i64 {
        self.settings.default_days
    }

    /// Request for the `days` days ending at `end_time_millis`, bucketed per day,
    /// covering every tracked metric.
    pub fn aggregate_request(&self, end_time_millis: i64, days: i64) -> AggregateRequest {
        let window_millis = days.saturating_mul(DAY_MILLIS);

        AggregateRequest {
            aggregate_by: MetricType::ALL
                .iter()
                .map(|metric| AggregateBy {
                    data_type_name: metric.data_type_name().to_string(),
                })
                .collect(),
            bucket_by_time: BucketByTime {
                duration_millis: self.settings.bucket_duration_millis,
            },
            start_time_millis: end_time_millis.saturating_sub(window_millis),
            end_time_millis,
        }
    }

    #[tracing::instrument(name = "Fetch aggregated fitness data", skip(self, access_token))]
    pub async fn fetch_aggregate(
        &self,
        access_token: &str,
        days: i64,
    ) -> Result<AggregateResponse, FitnessApiError> {
        let request = self.aggregate_request(Utc::now().timestamp_millis(), days);
        let url = format!(
            "{}/fitness/v1/users/me/dataset:aggregate",
            self.settings.base_url.trim_end_matches('/')
        );

        let response = self.client
            .post(&url)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FitnessApiError::Timeout
                } else {
                    FitnessApiError::NetworkError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Fitness API returned error {}: {}", status, error_text);

            // Relay the provider's error document as is; wrap it when it is not JSON
            let body = serde_json::from_str(&error_text)
                .unwrap_or(serde_json::Value::String(error_text));
            return Err(FitnessApiError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let aggregate = response
            .json::<AggregateResponse>()
            .await
            .map_err(|e| FitnessApiError::InvalidResponse(e.to_string()))?;

        tracing::info!("Received {} buckets from fitness API", aggregate.bucket.len());
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GoogleFitClient {
        GoogleFitClient::new(GoogleFitSettings {
            base_url: "https://fitness.example.com".to_string(),
            default_days: 7,
            bucket_duration_millis: DAY_MILLIS,
            request_timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_aggregate_request_covers_trailing_window() {
        let end = 1_700_000_000_000;
        let request = client().aggregate_request(end, 7);

        assert_eq!(request.end_time_millis, end);
        assert_eq!(request.start_time_millis, end - 7 * DAY_MILLIS);
        assert_eq!(request.bucket_by_time.duration_millis, DAY_MILLIS);
    }

    #[test]
    fn test_aggregate_request_asks_for_all_metrics() {
        let request = client().aggregate_request(1_700_000_000_000, 1);
        let names: Vec<&str> = request
            .aggregate_by
            .iter()
            .map(|by| by.data_type_name.as_str())
            .collect();

        assert_eq!(
            names,
            vec![
                "com.google.step_count.delta",
                "com.google.heart_rate.bpm",
                "com.google.calories.expended",
                "com.google.distance.delta",
                "com.google.weight",
                "com.google.sleep.segment",
            ]
        );
    }

    #[test]
    fn test_huge_window_saturates() {
        let request = client().aggregate_request(1_700_000_000_000, i64::MAX);
        assert_eq!(request.start_time_millis, 1_700_000_000_000 - i64::MAX);
    }
}
