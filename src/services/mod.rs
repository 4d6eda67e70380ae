pub mod credential_store;
pub mod google_fit_client;
pub mod narrative_service;
pub mod oauth_service;

pub use credential_store::{CredentialStore, InMemoryCredentialStore, RedisCredentialStore};
pub use google_fit_client::GoogleFitClient;
pub use narrative_service::NarrativeService;
pub use oauth_service::OAuthService;
