use actix_web::HttpResponse;

const LANDING_PAGE: &str = include_str!("../../static/index.html");

pub async fn landing_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(LANDING_PAGE)
}
