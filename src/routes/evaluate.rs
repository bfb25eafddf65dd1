use axum::{
    extract::{multipart::Field, Multipart, State},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tracing::{info, warn};

use super::error_response;
use crate::models::AppState;
use crate::types::{AppError, AppResult};
use crate::upload::UploadCandidate;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/evaluate", post(post_evaluate))
        .with_state(state)
}

/// Submission decoded from the multipart body
struct EvaluateForm {
    query: String,
    files: Vec<UploadCandidate>,
}

/// POST /api/evaluate - `query` text field plus zero or more `file` fields
async fn post_evaluate(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            if let Err(busy) = state.orchestrator.record_failure(&e).await {
                warn!(error = %busy, "Unreadable request not recorded");
            }
            return error_response(&e);
        }
    };

    info!(query = %form.query, files = form.files.len(), "Evaluation request received");

    match state.orchestrator.submit(&form.query, form.files).await {
        Ok(evaluation) => Json(evaluation).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn read_form(mut multipart: Multipart) -> AppResult<EvaluateForm> {
    let mut query = String::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Read(e.to_string()))?
    {
        match field.name() {
            Some("query") => {
                query = field.text().await.map_err(|e| AppError::Read(e.to_string()))?;
            }
            Some("file") => {
                if let Some(file) = read_file(field).await? {
                    files.push(file);
                }
            }
            _ => {}
        }
    }

    Ok(EvaluateForm { query, files })
}

/// `None` for the empty part a browser sends when no file was picked
async fn read_file(field: Field<'_>) -> AppResult<Option<UploadCandidate>> {
    let name = field.file_name().unwrap_or_default().to_string();

    // Browsers fall back to octet-stream for types they do not know
    let media_type = match field.content_type() {
        Some(ct) if ct != mime::APPLICATION_OCTET_STREAM.essence_str() => ct.to_string(),
        _ => mime_guess::from_path(&name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };

    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::Read(format!("{}: {}", name, e)))?;

    if name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }
    let name = if name.is_empty() { "upload".to_string() } else { name };

    Ok(Some(UploadCandidate::new(name, media_type, bytes)))
}
