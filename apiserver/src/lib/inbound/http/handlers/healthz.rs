use axum::Json;
use serde_json::json;
use serde_json::Value;

/// Liveness check; does not touch storage.
pub async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
