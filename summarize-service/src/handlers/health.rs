use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. Reports ok even when summarization is disabled.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
