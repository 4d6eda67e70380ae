use secrecy::SecretString;
use serde::Deserialize;

/// OAuth2 client registration and provider endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub scopes: Vec<String>,
    /// Where the browser lands after a successful callback.
    pub frontend_redirect_url: String,
    pub request_timeout_secs: u64,
}
