// Google Gemini adapter
// REST reference: https://ai.google.dev/api/generate-content
//
// Both free-form and schema-constrained calls go through generateContent.
// Structured output is requested with responseMimeType = application/json
// plus a responseSchema in the OpenAPI subset Gemini accepts.

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, ContentPart, LLMRequest, LLMResponse, ResponseFormat, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub struct GoogleAdapter {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

// Request types for the Gemini API
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

// Response types for the Gemini API
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Deserialize)]
struct GeminiError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl GoogleAdapter {
    pub fn new(api_key: &str, api_base: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }

    fn convert_part(part: &ContentPart) -> GeminiPart {
        match part {
            ContentPart::Text { text } => GeminiPart::Text { text: text.clone() },
            ContentPart::InlineData { media_type, data } => GeminiPart::Inline {
                inline_data: GeminiInlineData {
                    mime_type: media_type.clone(),
                    data: data.clone(),
                },
            },
        }
    }

    fn build_request(request: &LLMRequest) -> GeminiRequest {
        let mut generation_config = GeminiGenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
            ..Default::default()
        };

        if let ResponseFormat::Json { schema } = &request.response_format {
            generation_config.response_mime_type = Some("application/json");
            generation_config.response_schema = Some(schema.clone());
        }

        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: request.parts.iter().map(Self::convert_part).collect(),
            }],
            generation_config: Some(generation_config),
        }
    }
}

#[async_trait]
impl LLMAdapter for GoogleAdapter {
    async fn generate(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let model = if request.model.is_empty() {
            self.model.as_str()
        } else {
            request.model.as_str()
        };
        let url = self.endpoint(model);

        debug!(
            model = %model,
            attachments = request.attachment_count(),
            structured = matches!(request.response_format, ResponseFormat::Json { .. }),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request(request))
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Gemini request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&error_text) {
                return Err(AppError::LLMApi(format!(
                    "Gemini API error ({}): {} (status: {})",
                    status,
                    error_response.error.message,
                    error_response.error.status.unwrap_or_default()
                )));
            }

            return Err(AppError::LLMApi(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMApi(format!("Failed to parse Gemini response: {}", e)))?;

        if let Some(reason) = gemini_response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            warn!(reason = %reason, "Gemini blocked the prompt");
        }

        let candidate = gemini_response.candidates.first();

        // Multi-part answers are concatenated in order
        let content = candidate
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let finish_reason = candidate
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| "UNKNOWN".to_string());

        let usage = gemini_response.usage_metadata.unwrap_or_default();

        Ok(LLMResponse {
            content,
            finish_reason,
            usage: TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
                total_tokens: usage.total_token_count,
            },
        })
    }

    fn default_model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_build_request_plain_text() {
        let request = LLMRequest::text("gemini-2.5-flash", "extract this")
            .with_attachment("application/pdf", "JVBERi0=");
        let body = serde_json::to_value(GoogleAdapter::build_request(&request)).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "extract this");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["mimeType"],
            "application/pdf"
        );
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["data"], "JVBERi0=");
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_build_request_with_schema() {
        let request = LLMRequest::text("m", "evaluate").with_json_schema(json!({"type": "OBJECT"}));
        let body = serde_json::to_value(GoogleAdapter::build_request(&request)).unwrap();

        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[tokio::test]
    async fn test_generate_joins_parts() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/model-x:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}]
            })))
            .with_status(200)
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"{\"a\":"},{"text":"1}"}]},"finishReason":"STOP"}],
                   "usageMetadata":{"promptTokenCount":3,"candidatesTokenCount":4,"totalTokenCount":7}}"#,
            )
            .create_async()
            .await;

        let adapter = GoogleAdapter::new("test-key", &server.url(), "model-x");
        let response = adapter.generate(&LLMRequest::text("", "hi")).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "{\"a\":1}");
        assert_eq!(response.finish_reason, "STOP");
        assert_eq!(response.usage.total_tokens, 7);
    }

    #[tokio::test]
    async fn test_generate_no_candidates_is_empty_content() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/model-x:generateContent")
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let adapter = GoogleAdapter::new("k", &server.url(), "model-x");
        let response = adapter.generate(&LLMRequest::text("", "hi")).await.unwrap();
        assert!(response.content.is_empty());
        assert_eq!(response.finish_reason, "UNKNOWN");
    }

    #[tokio::test]
    async fn test_generate_http_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/model-x:generateContent")
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#)
            .create_async()
            .await;

        let adapter = GoogleAdapter::new("bad", &server.url(), "model-x");
        let err = adapter.generate(&LLMRequest::text("", "hi")).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("API key not valid"));
        assert!(message.contains("PERMISSION_DENIED"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let adapter = GoogleAdapter::new("k", "https://example.test/v1beta/", "gemini-2.5-flash");
        assert_eq!(
            adapter.endpoint("gemini-2.5-flash"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(adapter.default_model(), "gemini-2.5-flash");
    }
}
