// Scripted adapter used by client and orchestrator tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::llm::LLMAdapter;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};

pub struct ScriptedLLM {
    replies: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<LLMRequest>>,
}

impl ScriptedLLM {
    /// Replies are consumed in order; `Err` becomes a transport failure
    pub fn new(replies: Vec<Result<String, String>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<LLMRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LLMAdapter for ScriptedLLM {
    async fn generate(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted reply left".to_string()));

        reply
            .map(|content| LLMResponse {
                content,
                finish_reason: "STOP".to_string(),
                usage: TokenUsage::default(),
            })
            .map_err(AppError::LLMApi)
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }
}
