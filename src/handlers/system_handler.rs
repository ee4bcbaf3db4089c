use actix_web::HttpResponse;
use serde_json::json;

/// GET /
pub async fn root_endpoint() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Welcome to Call Insights API" }))
}

/// GET /health
pub async fn health_endpoint() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
