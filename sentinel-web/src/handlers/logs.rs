use axum::{extract::State, response::Json};
use sentinel_core::AlertRecord;

use crate::error_handling::AppError;
use crate::AppState;

/// Most recent page of the alert log.
const LOG_PAGE_SIZE: i64 = 100;

pub async fn get_logs(State(state): State<AppState>) -> Result<Json<Vec<AlertRecord>>, AppError> {
    let records = state.store.recent(LOG_PAGE_SIZE).await?;
    Ok(Json(records))
}
