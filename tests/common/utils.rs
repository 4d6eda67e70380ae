use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use reqwest::Client;
use secrecy::SecretString;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use fit_insights_backend::run;
use fit_insights_backend::config::settings::{get_config, Settings};
use fit_insights_backend::models::credentials::CredentialSet;
use fit_insights_backend::services::{CredentialStore, InMemoryCredentialStore};
use fit_insights_backend::telemetry::{get_subscriber, init_subscriber};

use super::mock_upstream::{MockUpstream, TOKEN_PATH};

pub const FRONTEND_ORIGIN: &str = "http://localhost:3000";
pub const TEST_CLIENT_ID: &str = "test-client-id.apps.example.com";
pub const TEST_CLIENT_SECRET: &str = "test-client-secret";
pub const TEST_GEMINI_KEY: &str = "test-gemini-key";

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::stdout
        );
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(
            subscriber_name,
            default_filter_level,
            std::io::sink
        );
        init_subscriber(subscriber);
    }
});

pub struct TestApp {
    pub address: String,
    pub upstream: MockUpstream,
    pub credential_store: Arc<InMemoryCredentialStore>,
    /// Does not follow redirects, so tests can assert on them.
    pub client: Client,
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Like `spawn_app`, with a last chance to adjust the settings before the server starts.
pub async fn spawn_app_with(configure: impl FnOnce(&mut Settings)) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let upstream = MockUpstream::start();

    let listener = TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_config().expect("Failed to read configuration.");
    configuration.oauth.client_id = TEST_CLIENT_ID.to_string();
    configuration.oauth.client_secret = secret(TEST_CLIENT_SECRET);
    configuration.oauth.redirect_uri = format!("{}/callback", address);
    configuration.oauth.auth_uri = format!("{}/o/oauth2/auth", upstream.address);
    configuration.oauth.token_uri = format!("{}{}", upstream.address, TOKEN_PATH);
    configuration.oauth.frontend_redirect_url = format!("{}/google-fit-dashboard", FRONTEND_ORIGIN);
    configuration.google_fit.base_url = upstream.address.clone();
    configuration.google_fit.default_days = 7;
    configuration.gemini.base_url = upstream.address.clone();
    configuration.gemini.api_key = secret(TEST_GEMINI_KEY);
    configuration.cors.allowed_origins = vec![FRONTEND_ORIGIN.to_string()];
    configure(&mut configuration);

    let credential_store = Arc::new(InMemoryCredentialStore::new(Duration::from_secs(3600)));
    let server = run(listener, configuration, credential_store.clone())
        .expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client");

    TestApp {
        address,
        upstream,
        credential_store,
        client,
    }
}

impl TestApp {
    /// Store credentials under a fresh session and return the matching `Cookie` header value.
    pub async fn login_with(&self, credentials: &CredentialSet) -> (String, String) {
        let session_id = Uuid::new_v4().to_string();
        self.credential_store
            .put(&session_id, credentials)
            .await
            .expect("Failed to seed credentials");
        let cookie = format!("session_id={}", session_id);
        (session_id, cookie)
    }

    pub async fn get_health_data(&self, query: &str, cookie: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(&format!("{}/get_health_data{}", &self.address, query));
        if let Some(cookie) = cookie {
            request = request.header("Cookie", cookie);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}{}", self.upstream.address, TOKEN_PATH)
    }
}

pub fn test_credentials(
    token_endpoint: &str,
    access_token: &str,
    refresh_token: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
) -> CredentialSet {
    CredentialSet {
        access_token: secret(access_token),
        refresh_token: refresh_token.map(secret),
        token_endpoint: token_endpoint.to_string(),
        client_id: TEST_CLIENT_ID.to_string(),
        client_secret: secret(TEST_CLIENT_SECRET),
        granted_scopes: vec!["https://www.googleapis.com/auth/fitness.activity.read".to_string()],
        expires_at,
    }
}

pub fn secret(value: &str) -> SecretString {
    SecretString::new(value.to_string().into_boxed_str())
}

/// Value of the cookie `name` from the response's `Set-Cookie` headers.
pub fn set_cookie_value(response: &reqwest::Response, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with(&prefix))
        .map(|value| {
            value[prefix.len()..]
                .split(';')
                .next()
                .unwrap_or_default()
                .to_string()
        })
}

pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get("location")
        .expect("No location header")
        .to_str()
        .unwrap()
        .to_string()
}
