//! Health probe; the only unauthenticated endpoint

use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::api::state::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "connected",
        Err(_) => "unavailable",
    };

    Json(json!({
        "status": if database == "connected" { "healthy" } else { "degraded" },
        "timestamp": Utc::now().to_rfc3339(),
        "database": database,
        "api_keys_loaded": state.registry.len(),
    }))
}
