use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Auth routes
        .route("/auth/login", post(handlers::auth::login))
        // Progress routes
        .route("/user/progress", get(handlers::progress::get_progress))
        .route("/user/progress", put(handlers::progress::update_progress))
        // Alert log routes
        .route("/logs", get(handlers::logs::get_logs))
        // Real-time streaming WebSocket endpoint
        .route("/ws/stream", get(handlers::stream::stream_handler))
}
