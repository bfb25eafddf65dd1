use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::error_response;
use crate::models::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .with_state(state)
}

/// GET /api/status - Stage, last error and last evaluation
async fn get_status(State(state): State<AppState>) -> Response {
    match state.orchestrator.snapshot() {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(&e),
    }
}
