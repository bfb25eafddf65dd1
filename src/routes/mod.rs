//! API Routes
//!
//! HTTP endpoints for the evaluation service:
//! - `POST /api/evaluate` - Submit a company with optional documents (multipart)
//! - `GET /api/status` - Current pipeline stage, last error and last evaluation
//! - `GET /api/history` - Recent searches, most recent first
//! - `GET /api/health` - Health check

pub mod evaluate;
pub mod health;
pub mod history;
pub mod status;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::models::AppState;
use crate::types::AppError;

/// Request bodies above this are refused before the upload policy sees them
pub const MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(evaluate::router(state.clone()))
        .merge(status::router(state.clone()))
        .merge(history::router(state.clone()))
        .merge(health::router(state))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// HTTP status for a failed submission
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) | AppError::Read(_) => StatusCode::BAD_REQUEST,
        AppError::SubmissionInProgress => StatusCode::CONFLICT,
        AppError::Evaluation(_) | AppError::DocumentProcessing(_) | AppError::LLMApi(_) => {
            StatusCode::BAD_GATEWAY
        }
        AppError::Config(_) | AppError::History(_) | AppError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// JSON error body: `{"error": <user message>, "details": <raw error>}`
pub fn error_response(err: &AppError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        error!(error = %err, status = status.as_u16(), "Request failed");
    } else {
        warn!(error = %err, status = status.as_u16(), "Request rejected");
    }

    (
        status,
        Json(serde_json::json!({
            "error": err.user_message(),
            "details": err.to_string(),
        })),
    )
        .into_response()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EvaluationError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_for(&AppError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AppError::Read("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&AppError::SubmissionInProgress), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&AppError::Evaluation(EvaluationError::EmptyResponse)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AppError::DocumentProcessing("x".into())),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&AppError::Internal("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
