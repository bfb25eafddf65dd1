use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        model: state.config.llm.model.clone(),
        upload_policy: state.config.upload.name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::testing::ScriptedLLM;
    use crate::routes::test_support;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_health_reports_model_and_policy() {
        let state = test_support::state(ScriptedLLM::new(vec![]), vec![]).await;
        let response = test_support::send(
            state,
            Request::get("/api/health").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = test_support::json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model"], "gemini-2.5-flash");
        assert_eq!(body["upload_policy"], "multi");
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    }
}
