pub mod backend_health_handler;
pub mod health_data_handler;
pub mod index_handler;
pub mod oauth_handler;
