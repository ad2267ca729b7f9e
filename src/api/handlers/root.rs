use axum::{extract::State, http::StatusCode, Json, response::IntoResponse};
use serde_json::json;

use crate::api::state::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Virtual Notice Board API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "api": "/api/v1",
            "docs": "/docs"
        }
    }))
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = sqlx::query("SELECT 1")
        .execute(&state.service_context.db_pool)
        .await;

    let timestamp = chrono::Utc::now().to_rfc3339();
    match database {
        Ok(_) => (StatusCode::OK, Json(json!({
            "status": "healthy",
            "database": "ok",
            "timestamp": timestamp
        }))),
        Err(e) => {
            tracing::warn!("Health check failed to reach the database: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({
                "status": "unhealthy",
                "database": "unreachable",
                "timestamp": timestamp
            })))
        }
    }
}
