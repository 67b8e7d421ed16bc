use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Store(#[from] sentinel_core::StoreError),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: String, code: String) -> Self {
        Self {
            error: error_type.to_string(),
            message,
            code,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(ref e) => {
                error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "database_error",
                        "A database error occurred".to_string(),
                        "DB_ERROR".to_string(),
                    ),
                )
            }

            AppError::Store(ref e) => {
                error!("Storage error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "storage_error",
                        "A storage error occurred".to_string(),
                        "STORAGE_ERROR".to_string(),
                    ),
                )
            }

            AppError::Validation { ref message } => {
                warn!("Validation error: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(
                        "validation_error",
                        message.clone(),
                        "VALIDATION_FAILED".to_string(),
                    ),
                )
            }

            AppError::NotFound { ref resource } => {
                warn!("Resource not found: {}", resource);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new(
                        "not_found",
                        format!("Resource not found: {}", resource),
                        "NOT_FOUND".to_string(),
                    ),
                )
            }

            AppError::Unauthorized { ref message } => {
                warn!("Unauthorized access attempt");
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorResponse::new(
                        "unauthorized",
                        message.clone(),
                        "AUTH_REQUIRED".to_string(),
                    ),
                )
            }

            AppError::Internal { ref message } => {
                error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "internal_error",
                        "An internal error occurred".to_string(),
                        "INTERNAL_ERROR".to_string(),
                    ),
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

// Helper constructors for the specific errors the handlers raise
impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub services: HashMap<String, ServiceHealth>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ServiceHealth {
    pub status: String,
    pub response_time_ms: Option<f64>,
    pub error: Option<String>,
    pub last_check: String,
}

pub async fn check_database_health(pool: &sqlx::Pool<sqlx::Sqlite>) -> ServiceHealth {
    let start = std::time::Instant::now();

    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => ServiceHealth {
            status: "healthy".to_string(),
            response_time_ms: Some(start.elapsed().as_millis() as f64),
            error: None,
            last_check: chrono::Utc::now().to_rfc3339(),
        },
        Err(e) => ServiceHealth {
            status: "unhealthy".to_string(),
            response_time_ms: Some(start.elapsed().as_millis() as f64),
            error: Some(e.to_string()),
            last_check: chrono::Utc::now().to_rfc3339(),
        },
    }
}
