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
        .route("/api/history", get(get_history))
        .with_state(state)
}

/// GET /api/history - Recent searches, most recent first
async fn get_history(State(state): State<AppState>) -> Response {
    match state.orchestrator.history() {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => error_response(&e),
    }
}
