use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// OAuth2 token bundle kept per browser session.
///
/// Only `access_token` is used outside the OAuth service, as a bearer header.
/// Secrets serialize in clear text so the Redis store can hand them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSet {
    #[serde(serialize_with = "serialize_secret_string", deserialize_with = "deserialize_secret_string")]
    pub access_token: SecretString,
    #[serde(
        default,
        serialize_with = "serialize_optional_secret_string",
        deserialize_with = "deserialize_optional_secret_string"
    )]
    pub refresh_token: Option<SecretString>,
    pub token_endpoint: String,
    pub client_id: String,
    #[serde(serialize_with = "serialize_secret_string", deserialize_with = "deserialize_secret_string")]
    pub client_secret: SecretString,
    pub granted_scopes: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

pub fn serialize_secret_string<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

pub fn deserialize_secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s.into_boxed_str()))
}

fn serialize_optional_secret_string<S>(secret: &Option<SecretString>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match secret {
        Some(secret) => serializer.serialize_some(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_optional_secret_string<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?;
    Ok(s.map(|s| SecretString::new(s.into_boxed_str())))
}

/// Token endpoint response for both the code exchange and the refresh grant.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(deserialize_with = "deserialize_secret_string")]
    pub access_token: SecretString,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_secret_string")]
    pub refresh_token: Option<SecretString>,
    /// Space separated.
    #[serde(default)]
    pub scope: Option<String>,
}

/// Query parameters the provider appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid authorization endpoint: {0}")]
    InvalidAuthorizationUrl(#[from] url::ParseError),

    #[error("Token endpoint returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Network error: {0}")]
    NetworkError(reqwest::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("No refresh token available")]
    MissingRefreshToken,
}

#[derive(Debug, Error)]
pub enum CredentialStoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Credential store misconfigured: {0}")]
    Misconfigured(String),
}
