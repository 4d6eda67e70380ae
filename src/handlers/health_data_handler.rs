use actix_web::{http::header, http::StatusCode, web, HttpResponse};
use secrecy::ExposeSecret;

use crate::auth::session::SessionId;
use crate::config::cors::CorsSettings;
use crate::health::DailyAggregator;
use crate::models::credentials::CredentialSet;
use crate::models::google_fit::FitnessApiError;
use crate::models::health_data::{ErrorResponse, HealthDataQuery, HealthDataResponse};
use crate::services::{CredentialStore, GoogleFitClient, NarrativeService, OAuthService};

/// Preflight answer. For browsers sending a permitted `Origin`, the CORS middleware
/// rewrites the origin header and adds the credentials flag on the way out.
pub async fn health_data_preflight(cors_settings: web::Data<CorsSettings>) -> HttpResponse {
    let allow_origin = if cors_settings.allows_any_origin() {
        "*"
    } else {
        cors_settings
            .allowed_origins
            .first()
            .map(String::as_str)
            .unwrap_or("*")
    };

    HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Authorization"))
        .insert_header((header::ACCESS_CONTROL_MAX_AGE, cors_settings.max_age_secs.to_string()))
        .finish()
}

/// Refresh token (if needed), fetch the trailing window, aggregate per day, then ask
/// for the narrative. Each step runs only after the previous one succeeded.
#[tracing::instrument(
    name = "Get health data",
    skip(session, query, credential_store, oauth_service, google_fit, narrative_service)
)]
pub async fn get_health_data(
    session: SessionId,
    query: web::Query<HealthDataQuery>,
    credential_store: web::Data<dyn CredentialStore>,
    oauth_service: web::Data<OAuthService>,
    google_fit: web::Data<GoogleFitClient>,
    narrative_service: web::Data<NarrativeService>,
) -> HttpResponse {
    let Some(session_id) = session.0 else {
        return redirect_to_login();
    };

    let credentials = match credential_store.get(&session_id).await {
        Ok(Some(credentials)) => credentials,
        Ok(None) => return redirect_to_login(),
        Err(e) => {
            tracing::error!("Failed to load credentials: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to load session"));
        }
    };

    let days = match query.window_days(google_fit.default_days()) {
        Ok(days) => days,
        Err(e) => return HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string())),
    };

    let credentials = match ensure_fresh_credentials(
        &session_id,
        credentials,
        credential_store.get_ref(),
        &oauth_service,
    )
    .await
    {
        Ok(credentials) => credentials,
        Err(response) => return response,
    };

    let aggregate = match google_fit.fetch_aggregate(credentials.access_token.expose_secret(), days).await {
        Ok(aggregate) => aggregate,
        Err(e) => return fitness_error_response(e),
    };

    let health_data = DailyAggregator::aggregate(&aggregate.bucket);

    // A failed narrative does not cost the caller the metrics
    let (analysis, analysis_error) = match narrative_service.generate_analysis(&health_data).await {
        Ok(text) => (Some(text), None),
        Err(e) => {
            tracing::warn!("Health analysis unavailable: {}", e);
            (None, Some(format!("Failed to generate analysis: {}", e)))
        }
    };

    tracing::info!("Returning {} days of health data", health_data.len());
    HttpResponse::Ok().json(HealthDataResponse {
        health_data,
        analysis,
        analysis_error,
    })
}

async fn ensure_fresh_credentials(
    session_id: &str,
    credentials: CredentialSet,
    credential_store: &dyn CredentialStore,
    oauth_service: &OAuthService,
) -> Result<CredentialSet, HttpResponse> {
    if !OAuthService::is_expired(&credentials) || credentials.refresh_token.is_none() {
        return Ok(credentials);
    }

    let refreshed = oauth_service.refresh(&credentials).await.map_err(|e| {
        tracing::error!("Failed to refresh access token: {}", e);
        HttpResponse::BadGateway().json(ErrorResponse::new("Failed to refresh credentials"))
    })?;

    if let Err(e) = credential_store.put(session_id, &refreshed).await {
        tracing::warn!("Failed to persist refreshed credentials: {}", e);
    }

    Ok(refreshed)
}

fn fitness_error_response(error: FitnessApiError) -> HttpResponse {
    match error {
        FitnessApiError::Provider { status, body } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            HttpResponse::build(status).json(ErrorResponse::with_details("Failed to fetch data", body))
        }
        FitnessApiError::Timeout => {
            tracing::error!("Fitness API request timed out");
            HttpResponse::GatewayTimeout().json(ErrorResponse::new("Fitness provider timed out"))
        }
        e => {
            tracing::error!("Fitness API request failed: {}", e);
            HttpResponse::BadGateway().json(ErrorResponse::new("Failed to fetch data"))
        }
    }
}

fn redirect_to_login() -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/login"))
        .finish()
}
