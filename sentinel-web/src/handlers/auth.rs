use axum::{extract::State, response::Json};
use chrono::{Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error_handling::AppError;
use crate::models::{LoginRequest, TokenResponse, User};
use crate::AppState;

// One salt for the single fixed account. A real deployment would use a
// per-user salt from the environment.
const PASSWORD_SALT: &str = "SENTINEL_SALT_A7";

const FIXED_USERNAME: &str = "admin";
const FIXED_PASSWORD: &str = "admin";

fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(format!("{}{}", password, PASSWORD_SALT).as_bytes());
    hex::encode(digest)
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Validate the fixed credential pair and mint an opaque, expiring bearer
/// token. The admin user row is created on first successful login so later
/// progress writes have something to reference.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    if req.username != FIXED_USERNAME || req.password != FIXED_PASSWORD {
        return Err(AppError::unauthorized(
            "Access denied: specialized credentials required",
        ));
    }

    let pool = state.db.pool();

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, hashed_password FROM users WHERE username = ?",
    )
    .bind(FIXED_USERNAME)
    .fetch_optional(pool)
    .await?;

    let user_id = match user {
        Some(user) => user.id,
        None => {
            let result = sqlx::query("INSERT INTO users (username, hashed_password) VALUES (?, ?)")
                .bind(FIXED_USERNAME)
                .bind(hash_password(FIXED_PASSWORD))
                .execute(pool)
                .await?;
            tracing::info!("Bootstrapped user {}", FIXED_USERNAME);
            result.last_insert_rowid()
        }
    };

    let token = generate_token();
    let now = Utc::now();
    let expires_at = now + Duration::hours(state.config.token_ttl_hours);

    sqlx::query("INSERT INTO tokens (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)")
        .bind(user_id)
        .bind(&token)
        .bind(now)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}
