// Route handlers: listings, nested reviews, and user accounts.
//
// Access control is not done here. Login, ownership and authorship checks
// run as interceptors before a handler is reached (see crate::middleware),
// and payloads arrive already validated through ValidatedForm.

pub mod listings;
pub mod reviews;
pub mod users;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::redirect::Found;
use crate::state::AppState;

/// Parse a path identifier; anything that is not a UUID is a cast failure
pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| {
        tracing::debug!("Rejected malformed id '{}'", raw);
        AppError::invalid_id()
    })
}

pub async fn root() -> Found {
    Found::to("/listings")
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

pub async fn not_found() -> AppError {
    AppError::not_found("Page Not Found!")
}
