use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use secrecy::ExposeSecret;
use url::Url;

use crate::config::oauth::OAuthSettings;
use crate::models::credentials::{CredentialSet, OAuthError, TokenResponse};

/// Tokens this close to expiry are treated as already expired.
const EXPIRY_SKEW_SECS: i64 = 10;

#[derive(Clone)]
pub struct OAuthService {
    client: Client,
    settings: OAuthSettings,
}

impl OAuthService {
    pub fn new(settings: OAuthSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self { client, settings })
    }

    pub fn frontend_redirect_url(&self) -> &str {
        &self.settings.frontend_redirect_url
    }

    /// Consent screen URL requesting offline access so a refresh token is issued.
    pub fn authorization_url(&self, state: &str) -> Result<Url, OAuthError> {
        let mut url = Url::parse(&self.settings.auth_uri)?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", &self.settings.redirect_uri)
            .append_pair("scope", &self.settings.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("include_granted_scopes", "true");

        Ok(url)
    }

    #[tracing::instrument(name = "Exchange authorization code", skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<CredentialSet, OAuthError> {
        let client_secret = self.settings.client_secret.expose_secret();
        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", client_secret),
            ("redirect_uri", self.settings.redirect_uri.as_str()),
        ];

        let token = self.request_token(&self.settings.token_uri, &form).await?;
        let granted_scopes = match &token.scope {
            Some(scope) => split_scopes(scope),
            None => self.settings.scopes.clone(),
        };

        tracing::info!("Authorization code exchanged, {} scopes granted", granted_scopes.len());

        Ok(CredentialSet {
            expires_at: expiry_from(token.expires_in, Utc::now()),
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            token_endpoint: self.settings.token_uri.clone(),
            client_id: self.settings.client_id.clone(),
            client_secret: self.settings.client_secret.clone(),
            granted_scopes,
        })
    }

    pub fn is_expired(credentials: &CredentialSet) -> bool {
        Self::is_expired_at(credentials, Utc::now())
    }

    /// A credential set without a known expiry never counts as expired.
    pub fn is_expired_at(credentials: &CredentialSet, now: DateTime<Utc>) -> bool {
        match credentials.expires_at {
            Some(expires_at) => now + chrono::Duration::seconds(EXPIRY_SKEW_SECS) >= expires_at,
            None => false,
        }
    }

    /// Trade the refresh token for a new access token, using the endpoint and client
    /// recorded in the credential set itself.
    #[tracing::instrument(name = "Refresh access token", skip(self, credentials))]
    pub async fn refresh(&self, credentials: &CredentialSet) -> Result<CredentialSet, OAuthError> {
        let refresh_token = credentials
            .refresh_token
            .as_ref()
            .ok_or(OAuthError::MissingRefreshToken)?;

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.expose_secret()),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.expose_secret()),
        ];

        let token = self.request_token(&credentials.token_endpoint, &form).await?;

        let mut refreshed = credentials.clone();
        refreshed.expires_at = expiry_from(token.expires_in, Utc::now());
        refreshed.access_token = token.access_token;
        // Providers usually omit the refresh token on this grant; keep the old one then
        if let Some(new_refresh_token) = token.refresh_token {
            refreshed.refresh_token = Some(new_refresh_token);
        }
        if let Some(scope) = token.scope {
            refreshed.granted_scopes = split_scopes(&scope);
        }

        tracing::info!("Access token refreshed");
        Ok(refreshed)
    }

    async fn request_token(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<TokenResponse, OAuthError> {
        let response = self.client
            .post(endpoint)
            .form(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OAuthError::Timeout
                } else {
                    OAuthError::NetworkError(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Token endpoint returned {}: {}", status, body);
            return Err(OAuthError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))
    }
}

fn expiry_from(expires_in: Option<i64>, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    expires_in.map(|seconds| issued_at + chrono::Duration::seconds(seconds))
}

fn split_scopes(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_string).collect()
}
