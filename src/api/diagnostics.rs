use actix_web::{HttpResponse, web};
use chrono::Local;
use serde_json::json;

use crate::db::{DataAccess, DbError};

/// Diagnostics return the error text on failure, unlike the data endpoints.
fn failure(e: &DbError) -> HttpResponse {
    tracing::error!(error = %e, "Database diagnostic failed");
    HttpResponse::InternalServerError().json(json!({
        "status": "error",
        "message": e.to_string(),
    }))
}

/// Opens and closes one database connection.
#[utoipa::path(
    get,
    path = "/api/diagnostics/connection",
    responses(
        (status = 200, description = "Database reachable", body = Object, example = json!({
            "status": "success",
            "message": "Database connection succeeded",
            "timestamp": "2024-01-01T12:00:00+00:00"
        })),
        (status = 500, description = "Database unreachable", body = Object, example = json!({
            "status": "error",
            "message": "database connection failed: pool timed out while waiting for an open connection"
        }))
    ),
    tag = "Diagnostics"
)]
pub async fn check_connection(db: web::Data<DataAccess>) -> HttpResponse {
    let conn = match db.connect().await {
        Ok(conn) => conn,
        Err(e) => return failure(&e),
    };

    if let Err(e) = db.disconnect(conn).await {
        return failure(&e);
    }

    HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Database connection succeeded",
        "timestamp": Local::now(),
    }))
}

/// Runs `SELECT 1` and returns its value.
#[utoipa::path(
    get,
    path = "/api/diagnostics/simple-query",
    responses(
        (status = 200, description = "Check query executed", body = Object, example = json!({
            "status": "success",
            "message": "Query executed",
            "result": 1,
            "timestamp": "2024-01-01T12:00:00+00:00"
        })),
        (status = 500, description = "Check query failed")
    ),
    tag = "Diagnostics"
)]
pub async fn simple_query(db: web::Data<DataAccess>) -> HttpResponse {
    match db.execute_scalar("SELECT 1", &[]).await {
        Ok(result) => HttpResponse::Ok().json(json!({
            "status": "success",
            "message": "Query executed",
            "result": result,
            "timestamp": Local::now(),
        })),
        Err(e) => failure(&e),
    }
}
