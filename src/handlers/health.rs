use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::{json, Value};

use crate::database;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to Open WebUI Dashboard API" }))
}

async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match database::ping(&state.db).await {
        Ok(()) => Ok(Json(json!({
            "status": "ok",
            "database": "connected",
            "timestamp": chrono::Utc::now(),
            "version": env!("CARGO_PKG_VERSION"),
        }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "error": "Database connection failed",
                })),
            ))
        }
    }
}
