use actix_web::{get, web, HttpRequest, HttpResponse};

use crate::auth::session::SessionId;
use crate::config::session::SessionSettings;
use crate::handlers::oauth_handler;
use crate::models::credentials::CallbackParams;
use crate::services::{CredentialStore, OAuthService};

#[get("/login")]
async fn login(
    oauth_service: web::Data<OAuthService>,
    session_settings: web::Data<SessionSettings>,
) -> HttpResponse {
    oauth_handler::login(oauth_service, session_settings).await
}

#[get("/callback")]
async fn callback(
    req: HttpRequest,
    params: web::Query<CallbackParams>,
    oauth_service: web::Data<OAuthService>,
    credential_store: web::Data<dyn CredentialStore>,
    session_settings: web::Data<SessionSettings>,
) -> HttpResponse {
    oauth_handler::callback(req, params, oauth_service, credential_store, session_settings).await
}

#[get("/logout")]
async fn logout(
    session: SessionId,
    credential_store: web::Data<dyn CredentialStore>,
    session_settings: web::Data<SessionSettings>,
) -> HttpResponse {
    oauth_handler::logout(session, credential_store, session_settings).await
}
