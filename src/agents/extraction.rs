//! Extraction Client
//!
//! Runs an unconstrained generation call over the uploaded documents and
//! returns a plain-text digest organised under the four analysis categories.

use std::sync::Arc;

use tracing::{error, info};

use super::prompts;
use crate::llm::LLMAdapter;
use crate::types::{AppError, AppResult, LLMRequest};
use crate::upload::EncodedFile;

pub struct ExtractionClient {
    llm: Arc<dyn LLMAdapter>,
    model: String,
}

impl ExtractionClient {
    pub fn new(llm: Arc<dyn LLMAdapter>) -> Self {
        let model = llm.default_model().to_string();
        Self { llm, model }
    }

    /// Extract a digest from the documents. No documents means no call.
    pub async fn extract(&self, files: &[EncodedFile]) -> AppResult<String> {
        if files.is_empty() {
            return Ok(String::new());
        }

        info!(files = files.len(), "Extracting information from documents");

        let mut request = LLMRequest::text(&self.model, prompts::build_extraction_prompt());
        request.temperature = Some(0.1);
        for file in files {
            request = request.with_attachment(&file.media_type, &file.data);
        }

        let response = self.llm.generate(&request).await.map_err(|e| {
            error!(error = %e, "Document extraction call failed");
            AppError::DocumentProcessing(e.to_string())
        })?;

        let digest = response.content.trim();
        if digest.is_empty() {
            error!(finish_reason = %response.finish_reason, "Document extraction returned no text");
            return Err(AppError::DocumentProcessing(
                "the AI service returned no text for the provided documents".to_string(),
            ));
        }

        info!(digest_len = digest.len(), "Document extraction complete");
        Ok(digest.to_string())
    }
}
