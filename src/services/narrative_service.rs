use std::time::{Duration, Instant};

use reqwest::Client;
use secrecy::ExposeSecret;

use crate::config::gemini::GeminiSettings;
use crate::models::health_data::DailyHealthMap;
use crate::models::llm::{GenerateContentRequest, GenerateContentResponse, NarrativeError};

/// Turns the per-day summaries into free text insights through the Gemini API.
#[derive(Clone)]
pub struct NarrativeService {
    client: Client,
    settings: GeminiSettings,
}

impl NarrativeService {
    pub fn new(settings: GeminiSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn build_prompt(health_data: &DailyHealthMap) -> Result<String, NarrativeError> {
        let data = serde_json::to_string_pretty(health_data)?;

        Ok(format!(
            "Analyze the following health data trends:
{}

Provide structured insights about:
- Overall health trends (steps, calories burned, distance, sleep)
- Areas of improvement
- Personalized health tips
- Potential health risks

Output should be structured and concise.",
            data
        ))
    }

    /// Single attempt, no retry. The provider text is returned untouched.
    #[tracing::instrument(
        name = "Generate health analysis",
        skip(self, health_data),
        fields(days = health_data.len(), model = %self.settings.model_name)
    )]
    pub async fn generate_analysis(&self, health_data: &DailyHealthMap) -> Result<String, NarrativeError> {
        let start_time = Instant::now();
        let prompt = Self::build_prompt(health_data)?;
        let request = GenerateContentRequest::from_prompt(prompt);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.model_name
        );

        let response = self.client
            .post(&url)
            .header("x-goog-api-key", self.settings.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NarrativeError::Timeout
                } else {
                    NarrativeError::NetworkError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            tracing::error!("Gemini API error {}: {}", status, error_text);

            return Err(match status.as_u16() {
                429 => NarrativeError::RateLimited,
                500..=599 => NarrativeError::ServiceUnavailable(error_text),
                _ => NarrativeError::InvalidResponse(format!("HTTP {}: {}", status, error_text))
            });
        }

        let generated: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| NarrativeError::InvalidResponse(e.to_string()))?;

        if let Some(reason) = generated.block_reason() {
            return Err(NarrativeError::Blocked(reason.to_string()));
        }

        let text = generated
            .text()
            .ok_or_else(|| NarrativeError::InvalidResponse("No text in first candidate".to_string()))?;

        tracing::info!(
            "Health analysis generated in {}ms ({} chars)",
            start_time.elapsed().as_millis(),
            text.len()
        );
        Ok(text)
    }
}
