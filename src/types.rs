// Type definitions shared by the LLM layer and the pipeline

use serde::{Deserialize, Serialize};

/// A single part of a generation request: prompt text or an inline attachment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "inline_data")]
    InlineData {
        media_type: String, // e.g. "application/pdf"
        data: String,       // base64, no data-URI prefix
    },
}

/// Requested output format for a generation call
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseFormat {
    /// Free-form text
    Text,
    /// JSON constrained by the given schema
    Json { schema: serde_json::Value },
}

#[derive(Debug, Clone)]
pub struct LLMRequest {
    pub model: String,
    pub parts: Vec<ContentPart>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub response_format: ResponseFormat,
}

impl LLMRequest {
    /// Create a free-form text request with a single prompt part
    pub fn text(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            parts: vec![ContentPart::Text { text: prompt.into() }],
            temperature: None,
            max_tokens: None,
            response_format: ResponseFormat::Text,
        }
    }

    /// Append an inline attachment
    pub fn with_attachment(mut self, media_type: impl Into<String>, data: impl Into<String>) -> Self {
        self.parts.push(ContentPart::InlineData {
            media_type: media_type.into(),
            data: data.into(),
        });
        self
    }

    /// Constrain the response to JSON matching `schema`
    pub fn with_json_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_format = ResponseFormat::Json { schema };
        self
    }

    pub fn attachment_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, ContentPart::InlineData { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Failures of the schema-constrained evaluation call
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Received an empty response from the AI service")]
    EmptyResponse,

    #[error("The AI service returned a response that did not match the evaluation schema: {0}")]
    SchemaMismatch(String),

    #[error("The AI service could not be reached: {0}")]
    Transport(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("LLM API error: {0}")]
    LLMApi(String),

    #[error("Could not read the uploaded file: {0}")]
    Read(String),

    #[error("Failed to process documents with the AI service: {0}")]
    DocumentProcessing(String),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("An evaluation is already in progress")]
    SubmissionInProgress,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("History storage error: {0}")]
    History(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message shown to the user; upstream failures carry a retry hint
    pub fn user_message(&self) -> String {
        match self {
            AppError::Evaluation(_) | AppError::DocumentProcessing(_) => {
                format!("{}. Please try again.", self)
            }
            _ => self.to_string(),
        }
    }

    /// True when the error was caused by user input rather than the service
    pub fn is_user_error(&self) -> bool {
        matches!(self, AppError::Validation(_) | AppError::Read(_))
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = LLMRequest::text("gemini-2.5-flash", "hello")
            .with_attachment("application/pdf", "QUJD")
            .with_attachment("text/plain", "eHl6");

        assert_eq!(request.parts.len(), 3);
        assert_eq!(request.attachment_count(), 2);
        assert_eq!(request.response_format, ResponseFormat::Text);

        let request = request.with_json_schema(serde_json::json!({"type": "OBJECT"}));
        assert!(matches!(request.response_format, ResponseFormat::Json { .. }));
    }

    #[test]
    fn test_user_message_adds_retry_hint() {
        let err = AppError::from(EvaluationError::EmptyResponse);
        assert_eq!(
            err.user_message(),
            "Received an empty response from the AI service. Please try again."
        );

        let err = AppError::Validation("File deck.key has an unsupported type".to_string());
        assert_eq!(err.user_message(), "File deck.key has an unsupported type");
        assert!(err.is_user_error());
    }
}
