use std::env;
use config::{Config, File, ConfigError};
use dotenv::dotenv;
use secrecy::SecretString;

use crate::config::cors::CorsSettings;
use crate::config::gemini::GeminiSettings;
use crate::config::google_fit::GoogleFitSettings;
use crate::config::oauth::OAuthSettings;
use crate::config::redis::CredentialStoreSettings;
use crate::config::session::SessionSettings;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct Settings{
    pub application: ApplicationSettings,
    pub oauth: OAuthSettings,
    pub google_fit: GoogleFitSettings,
    pub gemini: GeminiSettings,
    pub session: SessionSettings,
    pub credential_store: CredentialStoreSettings,
    pub cors: CorsSettings,
}

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ApplicationSettings{
    pub port: u16,
    pub host: String,
    pub log_level: String,
}

pub fn get_config() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| ConfigError::Message(format!("Failed to determine the current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    dotenv().ok();

    let environment: Environment = env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(ConfigError::Message)?;

    let env_filename = format!("{}.yml", environment.as_str());
    let config = Config::builder()
        .add_source(File::from(configuration_directory.join("base.yml")))
        .add_source(File::from(configuration_directory.join(env_filename)).required(false))
        .add_source(
            config::Environment::default()
                .prefix("APP")
                .prefix_separator("__")
                .separator("__")
        )
        .build()?;

    let mut settings = config.try_deserialize::<Settings>()?;
    apply_legacy_env_overrides(&mut settings)?;

    Ok(settings)
}

/// The flat variable names the deployment has always used win over the layered files.
fn apply_legacy_env_overrides(settings: &mut Settings) -> Result<(), ConfigError> {
    if let Ok(client_id) = env::var("CLIENT_ID") {
        settings.oauth.client_id = client_id;
    }

    if let Ok(client_secret) = env::var("CLIENT_SECRET") {
        settings.oauth.client_secret = SecretString::new(client_secret.into_boxed_str());
    }

    if let Ok(redirect_uri) = env::var("REDIRECT_URI") {
        settings.oauth.redirect_uri = redirect_uri;
    }

    if let Ok(api_key) = env::var("GEMINI_API_KEY") {
        settings.gemini.api_key = SecretString::new(api_key.into_boxed_str());
    }

    // Hosting platforms expose the listen port as PORT
    if let Ok(port) = env::var("PORT") {
        settings.application.port = port
            .parse()
            .map_err(|e| ConfigError::Message(format!("Invalid PORT value '{}': {}", port, e)))?;
    }

    Ok(())
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. \
                Use either `local` or `production`.",
                other
            )),
        }
    }
}
