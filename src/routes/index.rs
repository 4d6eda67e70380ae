use actix_web::{get, HttpResponse};

use crate::handlers::index_handler::landing_page;

#[get("/")]
async fn index() -> HttpResponse {
    landing_page().await
}
