use actix_web::{HttpResponse, Responder};
use chrono::Local;
use serde_json::json;

/// Liveness probe. Never touches the database.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "API is running", body = Object, example = json!({
            "status": "success",
            "message": "API is running",
            "timestamp": "2024-01-01T12:00:00+00:00"
        }))
    ),
    tag = "Health"
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "API is running",
        "timestamp": Local::now(),
    }))
}
