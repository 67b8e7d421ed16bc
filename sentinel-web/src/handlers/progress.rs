use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;

use crate::error_handling::AppError;
use crate::models::{ProgressRecord, ProgressResponse, ProgressUpdate, StatusResponse, User, UserQuery};
use crate::AppState;

async fn find_user(state: &AppState, username: &str) -> Result<User, AppError> {
    sqlx::query_as::<_, User>("SELECT id, username, hashed_password FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", username)))
}

pub async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ProgressResponse>, AppError> {
    let user = find_user(&state, &query.username).await?;

    let record = sqlx::query_as::<_, ProgressRecord>(
        "SELECT id, user_id, data, updated_at FROM progress WHERE user_id = ?",
    )
    .bind(user.id)
    .fetch_optional(state.db.pool())
    .await?;

    let data = match record {
        Some(record) => serde_json::from_str(&record.data).unwrap_or_else(|e| {
            tracing::warn!("Stored progress for {} is not valid JSON: {}", user.username, e);
            serde_json::json!({})
        }),
        None => serde_json::json!({}),
    };

    Ok(Json(ProgressResponse { data }))
}

pub async fn update_progress(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    Json(update): Json<ProgressUpdate>,
) -> Result<Json<StatusResponse>, AppError> {
    let user = find_user(&state, &query.username).await?;

    let payload = serde_json::to_string(&update.data)
        .map_err(|e| AppError::validation(format!("Progress payload is not serializable: {}", e)))?;

    sqlx::query(
        "INSERT INTO progress (user_id, data, updated_at) VALUES (?, ?, ?)
         ON CONFLICT(user_id) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
    )
    .bind(user.id)
    .bind(&payload)
    .bind(Utc::now())
    .execute(state.db.pool())
    .await?;

    Ok(Json(StatusResponse {
        status: "success".to_string(),
    }))
}
