use actix_web::{get, options, web, HttpResponse};

use crate::auth::session::SessionId;
use crate::config::cors::CorsSettings;
use crate::handlers::health_data_handler;
use crate::models::health_data::HealthDataQuery;
use crate::services::{CredentialStore, GoogleFitClient, NarrativeService, OAuthService};

#[get("/get_health_data")]
async fn get_health_data(
    session: SessionId,
    query: web::Query<HealthDataQuery>,
    credential_store: web::Data<dyn CredentialStore>,
    oauth_service: web::Data<OAuthService>,
    google_fit: web::Data<GoogleFitClient>,
    narrative_service: web::Data<NarrativeService>,
) -> HttpResponse {
    health_data_handler::get_health_data(
        session,
        query,
        credential_store,
        oauth_service,
        google_fit,
        narrative_service,
    )
    .await
}

#[options("/get_health_data")]
async fn health_data_preflight(cors_settings: web::Data<CorsSettings>) -> HttpResponse {
    health_data_handler::health_data_preflight(cors_settings).await
}
