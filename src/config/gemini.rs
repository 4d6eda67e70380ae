use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiSettings {
    pub api_key: SecretString,
    pub base_url: String,
    pub model_name: String,
    pub request_timeout_secs: u64,
}

