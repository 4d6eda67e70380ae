use actix_web::{http::header, web, HttpRequest, HttpResponse};
use uuid::Uuid;

use crate::auth::session::{removal_cookie, session_cookie, state_cookie, SessionId};
use crate::config::session::SessionSettings;
use crate::models::credentials::CallbackParams;
use crate::models::health_data::ErrorResponse;
use crate::services::{CredentialStore, OAuthService};

#[tracing::instrument(name = "Start OAuth login", skip(oauth_service, session_settings))]
pub async fn login(
    oauth_service: web::Data<OAuthService>,
    session_settings: web::Data<SessionSettings>,
) -> HttpResponse {
    let state = Uuid::new_v4().to_string();

    match oauth_service.authorization_url(&state) {
        Ok(url) => HttpResponse::Found()
            .insert_header((header::LOCATION, url.as_str()))
            .cookie(state_cookie(&session_settings, &state))
            .finish(),
        Err(e) => {
            tracing::error!("Failed to build authorization URL: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to start login"))
        }
    }
}

#[tracing::instrument(
    name = "Handle OAuth callback",
    skip(req, params, oauth_service, credential_store, session_settings)
)]
pub async fn callback(
    req: HttpRequest,
    params: web::Query<CallbackParams>,
    oauth_service: web::Data<OAuthService>,
    credential_store: web::Data<dyn CredentialStore>,
    session_settings: web::Data<SessionSettings>,
) -> HttpResponse {
    if let Some(error) = &params.error {
        tracing::warn!("Authorization was not granted: {}", error);
        return HttpResponse::BadRequest().json(ErrorResponse::with_details(
            "Authorization was not granted",
            serde_json::Value::String(error.clone()),
        ));
    }

    let expected_state = req
        .cookie(&session_settings.state_cookie_name)
        .map(|cookie| cookie.value().to_string());
    match (params.state.as_deref(), expected_state.as_deref()) {
        (Some(received), Some(expected)) if received == expected => {}
        _ => {
            tracing::warn!("OAuth state missing or mismatched");
            return HttpResponse::BadRequest().json(ErrorResponse::new("Invalid OAuth state"));
        }
    }

    let Some(code) = params.code.as_deref() else {
        return HttpResponse::BadRequest().json(ErrorResponse::new("Missing authorization code"));
    };

    let credentials = match oauth_service.exchange_code(code).await {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!("Failed to exchange authorization code: {}", e);
            return HttpResponse::BadGateway()
                .json(ErrorResponse::new("Failed to exchange authorization code"));
        }
    };

    let session_id = Uuid::new_v4().to_string();
    if let Err(e) = credential_store.put(&session_id, &credentials).await {
        tracing::error!("Failed to store credentials: {}", e);
        return HttpResponse::InternalServerError().json(ErrorResponse::new("Failed to store session"));
    }

    tracing::info!("OAuth login completed, redirecting to front-end");
    HttpResponse::Found()
        .insert_header((header::LOCATION, oauth_service.frontend_redirect_url()))
        .cookie(session_cookie(&session_settings, &session_id))
        .cookie(removal_cookie(&session_settings.state_cookie_name))
        .finish()
}

#[tracing::instrument(name = "Logout", skip(session, credential_store, session_settings))]
pub async fn logout(
    session: SessionId,
    credential_store: web::Data<dyn CredentialStore>,
    session_settings: web::Data<SessionSettings>,
) -> HttpResponse {
    if let SessionId(Some(session_id)) = &session {
        if let Err(e) = credential_store.clear(session_id).await {
            tracing::warn!("Failed to clear stored credentials: {}", e);
        }
    }

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .cookie(removal_cookie(&session_settings.cookie_name))
        .body("Logged out successfully. <a href='/'>Go Home</a>")
}
