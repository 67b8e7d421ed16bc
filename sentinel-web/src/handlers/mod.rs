use axum::{extract::State, http::StatusCode, response::Json};
use std::collections::HashMap;

use crate::error_handling::{check_database_health, HealthStatus};
use crate::AppState;

pub mod auth;
pub mod logs;
pub mod progress;
pub mod stream;

pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, StatusCode> {
    let mut services = HashMap::new();
    services.insert(
        "database".to_string(),
        check_database_health(state.db.pool()).await,
    );

    let overall_status = if services.values().all(|s| s.status == "healthy") {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(HealthStatus {
        status: overall_status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    }))
}
