use actix_web::{http, web, App, HttpServer};
use actix_web::dev::Server;
use tracing_actix_web::TracingLogger;
use std::net::TcpListener;
use std::sync::Arc;
use actix_cors::Cors;

pub mod auth;
pub mod config;
mod routes;
mod handlers;
pub mod health;
pub mod models;
pub mod services;
pub mod telemetry;
use crate::routes::init_routes;
use crate::config::cors::CorsSettings;
use crate::config::settings::Settings;
use crate::services::{CredentialStore, GoogleFitClient, NarrativeService, OAuthService};

pub fn run(
    listener: TcpListener,
    settings: Settings,
    credential_store: Arc<dyn CredentialStore>,
) -> Result<Server, std::io::Error> {
    // Wrap using web::Data, which boils down to an Arc smart pointer
    let oauth_service = web::Data::new(
        OAuthService::new(settings.oauth).map_err(std::io::Error::other)?
    );
    let google_fit = web::Data::new(
        GoogleFitClient::new(settings.google_fit).map_err(std::io::Error::other)?
    );
    let narrative_service = web::Data::new(
        NarrativeService::new(settings.gemini).map_err(std::io::Error::other)?
    );
    let credential_store: web::Data<dyn CredentialStore> = web::Data::from(credential_store);
    let session_settings = web::Data::new(settings.session);
    let cors_settings = web::Data::new(settings.cors);

    let server = HttpServer::new(move || {
        let cors = build_cors(&cors_settings);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(oauth_service.clone())
            .app_data(google_fit.clone())
            .app_data(narrative_service.clone())
            .app_data(credential_store.clone())
            .app_data(session_settings.clone())
            .app_data(cors_settings.clone())
            .configure(init_routes)
    })
    .listen(listener)?
    .run();

    Ok(server)
}

fn build_cors(settings: &CorsSettings) -> Cors {
    // OPTIONS is routed to the handlers, which answer preflights themselves
    let mut cors = Cors::default()
        .disable_preflight()
        .expose_headers(vec![http::header::CONTENT_TYPE])
        .supports_credentials();

    if settings.allows_any_origin() {
        cors = cors.allow_any_origin();
    } else {
        for origin in &settings.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
