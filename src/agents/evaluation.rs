//! Evaluation Client
//!
//! Issues the schema-constrained generation call and turns the response text
//! into a [`CompanyEvaluation`]. Every failure is classified; nothing is
//! downgraded to a default evaluation and nothing is retried here.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::prompts;
use crate::llm::LLMAdapter;
use crate::models::CompanyEvaluation;
use crate::schema;
use crate::types::{EvaluationError, LLMRequest};

/// Delivered and locally weighted overall scores may differ by this much
/// before a warning is logged
pub const SCORE_DRIFT_TOLERANCE: u8 = 10;

pub struct EvaluationClient {
    llm: Arc<dyn LLMAdapter>,
    model: String,
}

impl EvaluationClient {
    pub fn new(llm: Arc<dyn LLMAdapter>) -> Self {
        let model = llm.default_model().to_string();
        Self { llm, model }
    }

    pub async fn evaluate(
        &self,
        company_name: &str,
        digest: Option<&str>,
    ) -> Result<CompanyEvaluation, EvaluationError> {
        let prompt = prompts::build_evaluation_prompt(company_name, digest);
        let mut request = LLMRequest::text(&self.model, prompt).with_json_schema(schema::evaluation_schema());
        request.temperature = Some(0.3);

        info!(
            company = %company_name,
            with_digest = digest.is_some_and(|d| !d.trim().is_empty()),
            schema = schema::SCHEMA_VERSION,
            "Requesting evaluation"
        );

        let response = self.llm.generate(&request).await.map_err(|e| {
            error!(error = %e, "Evaluation call failed");
            EvaluationError::Transport(e.to_string())
        })?;

        let evaluation = parse_evaluation(&response.content).map_err(|e| {
            error!(error = %e, finish_reason = %response.finish_reason, "Evaluation response rejected");
            e
        })?;

        let drift = evaluation.score_drift();
        if drift > SCORE_DRIFT_TOLERANCE {
            warn!(
                delivered = evaluation.overall_score,
                weighted = evaluation.weighted_score(),
                "Overall score differs from the weighted sub-scores"
            );
        }

        info!(
            company = %evaluation.company_name,
            overall_score = evaluation.overall_score,
            total_tokens = response.usage.total_tokens,
            "Evaluation complete"
        );
        Ok(evaluation)
    }
}

/// Remove a surrounding Markdown code fence if the model added one
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Parse and validate the raw response text of an evaluation call
pub fn parse_evaluation(text: &str) -> Result<CompanyEvaluation, EvaluationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(EvaluationError::EmptyResponse);
    }

    let json = strip_code_fence(text);
    let evaluation: CompanyEvaluation =
        serde_json::from_str(json).map_err(|e| EvaluationError::SchemaMismatch(e.to_string()))?;

    schema::validate(&evaluation).map_err(EvaluationError::SchemaMismatch)?;
    Ok(evaluation)
}
