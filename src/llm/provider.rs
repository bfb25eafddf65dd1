use std::sync::Arc;

use async_trait::async_trait;

use crate::config::LLMConfig;
use crate::types::{AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn generate(&self, request: &LLMRequest) -> AppResult<LLMResponse>;

    /// Model used when a caller does not pick one
    fn default_model(&self) -> &str;
}

/// Build the adapter for the configured upstream service
pub fn create_adapter(config: &LLMConfig) -> Arc<dyn LLMAdapter> {
    Arc::new(crate::llm::google::GoogleAdapter::new(
        &config.api_key,
        &config.api_base,
        &config.model,
    ))
}
