//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::darwin::DepartureBoard;
use crate::domain::StationCode;
use crate::service::CheckError;

use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/trains", get(default_trains))
        .route("/api/v1/trains", get(default_trains))
        .route("/api/v1/trains/:origin/to/:destination", get(trains_between))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Check the configured route.
async fn default_trains(
    State(state): State<AppState>,
) -> Result<Json<Option<DepartureBoard>>, AppError> {
    let pair = state.default_pair.clone();
    let board = state
        .trains
        .check_and_notify(&pair.origin, &pair.destination)
        .await?;
    Ok(Json(board))
}

/// Check an arbitrary route given as path segments.
async fn trains_between(
    State(state): State<AppState>,
    Path((origin, destination)): Path<(String, String)>,
) -> Result<Json<Option<DepartureBoard>>, AppError> {
    let origin = StationCode::parse_normalized(&origin).map_err(|_| AppError::BadRequest {
        message: "Origin station code is required".to_string(),
    })?;
    let destination =
        StationCode::parse_normalized(&destination).map_err(|_| AppError::BadRequest {
            message: "Destination station code is required".to_string(),
        })?;

    let board = state.trains.check_and_notify(&origin, &destination).await?;
    Ok(Json(board))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl From<CheckError> for AppError {
    fn from(e: CheckError) -> Self {
        AppError::Internal {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::BadRequest { message } => {
                tracing::debug!(%message, "rejected request");
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            AppError::Internal { message } => {
                tracing::error!(error = %message, "error checking train status");
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}
