use actix_web::web;

pub mod auth;
pub mod backend_health;
pub mod health_data;
pub mod index;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(index::index)
        .service(backend_health::backend_health)
        .service(auth::login)
        .service(auth::callback)
        .service(auth::logout)
        .service(health_data::get_health_data)
        .service(health_data::health_data_preflight);
}
