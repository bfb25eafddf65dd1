//! Request Orchestrator
//!
//! Drives one submission at a time through the evaluation pipeline:
//!
//! ```text
//! Idle → Validating → Encoding → Extracting → Evaluating → Done
//!             │           │           │            │
//!             └───────────┴───────────┴────────────┴──────→ Failed
//! ```
//!
//! Encoding and Extracting are skipped when no documents are attached.
//! Stage changes are published as [`PipelineEvent`]s for whichever surface is
//! presenting progress.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::agents::{EvaluationClient, ExtractionClient};
use crate::history::{HistoryStore, SearchHistory};
use crate::llm::LLMAdapter;
use crate::models::CompanyEvaluation;
use crate::types::{AppError, AppResult};
use crate::upload::{FileEncoder, FileValidator, UploadCandidate, UploadPolicy};

/// Pipeline stage of the current (or last) submission
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "stage", content = "detail", rename_all = "snake_case")]
pub enum PipelineStage {
    /// Waiting for a submission
    #[default]
    Idle,
    /// Checking the query and attached documents
    Validating,
    /// Encoding attached documents
    Encoding { files: usize },
    /// Extracting information from documents
    Extracting { files: usize },
    /// Waiting for the evaluation
    Evaluating { company: String },
    /// Last submission succeeded
    Done,
    /// Last submission failed with this message
    Failed(String),
}

impl PipelineStage {
    /// True while a submission is in flight
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle | Self::Done | Self::Failed(_))
    }

    /// Progress message for the stage
    pub fn message(&self) -> String {
        match self {
            Self::Idle => "Ready".to_string(),
            Self::Validating => "Checking your input...".to_string(),
            Self::Encoding { files } => format!("Reading {} document(s)...", files),
            Self::Extracting { files } => {
                format!("Extracting information from {} document(s)...", files)
            }
            Self::Evaluating { company } => format!("Evaluating {}...", company),
            Self::Done => "Evaluation complete".to_string(),
            Self::Failed(message) => message.clone(),
        }
    }
}

/// Events from the pipeline
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    StageChanged(PipelineStage),
}

/// Point-in-time view of the orchestrator state
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorSnapshot {
    pub stage: PipelineStage,
    pub message: String,
    pub evaluation: Option<CompanyEvaluation>,
    pub last_error: Option<String>,
    pub history: Vec<String>,
}

#[derive(Default)]
struct State {
    stage: PipelineStage,
    evaluation: Option<CompanyEvaluation>,
    last_error: Option<String>,
    history: SearchHistory,
}

pub struct RequestOrchestrator {
    validator: FileValidator,
    extraction: ExtractionClient,
    evaluation: EvaluationClient,
    store: Arc<dyn HistoryStore>,
    state: Mutex<State>,
    events: Option<mpsc::Sender<PipelineEvent>>,
}

impl RequestOrchestrator {
    /// Create an orchestrator and load the persisted history
    pub async fn new(
        llm: Arc<dyn LLMAdapter>,
        policy: UploadPolicy,
        store: Arc<dyn HistoryStore>,
    ) -> AppResult<Self> {
        let history = store.load().await?;
        info!(entries = history.len(), policy = policy.name, "Orchestrator ready");

        Ok(Self {
            validator: FileValidator::new(policy),
            extraction: ExtractionClient::new(llm.clone()),
            evaluation: EvaluationClient::new(llm),
            store,
            state: Mutex::new(State {
                history,
                ..Default::default()
            }),
            events: None,
        })
    }

    /// Publish stage changes on `tx`
    pub fn with_events(mut self, tx: mpsc::Sender<PipelineEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn policy(&self) -> &UploadPolicy {
        self.validator.policy()
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| AppError::Internal("orchestrator state lock poisoned".to_string()))
    }

    pub fn stage(&self) -> AppResult<PipelineStage> {
        Ok(self.lock()?.stage.clone())
    }

    pub fn history(&self) -> AppResult<Vec<String>> {
        Ok(self.lock()?.history.entries().to_vec())
    }

    pub fn snapshot(&self) -> AppResult<OrchestratorSnapshot> {
        let state = self.lock()?;
        Ok(OrchestratorSnapshot {
            stage: state.stage.clone(),
            message: state.stage.message(),
            evaluation: state.evaluation.clone(),
            last_error: state.last_error.clone(),
            history: state.history.entries().to_vec(),
        })
    }

    /// Record a submission that failed before it reached the pipeline,
    /// e.g. an unreadable request body. Ignored while a submission is in flight.
    pub async fn record_failure(&self, err: &AppError) -> AppResult<()> {
        let message = err.user_message();
        {
            let mut state = self.lock()?;
            if state.stage.is_busy() {
                return Err(AppError::SubmissionInProgress);
            }
            state.evaluation = None;
            state.last_error = Some(message.clone());
            state.stage = PipelineStage::Failed(message.clone());
        }
        self.emit(PipelineStage::Failed(message)).await;
        Ok(())
    }

    async fn set_stage(&self, stage: PipelineStage) -> AppResult<()> {
        self.lock()?.stage = stage.clone();
        self.emit(stage).await;
        Ok(())
    }

    async fn emit(&self, stage: PipelineStage) {
        if let Some(tx) = &self.events {
            tx.send(PipelineEvent::StageChanged(stage)).await.ok();
        }
    }

    /// Run one submission to completion.
    ///
    /// Rejected with [`AppError::SubmissionInProgress`] while another
    /// submission is in flight; that rejection leaves all state untouched.
    pub async fn submit(&self, query: &str, files: Vec<UploadCandidate>) -> AppResult<CompanyEvaluation> {
        {
            let mut state = self.lock()?;
            if state.stage.is_busy() {
                warn!(query = %query, "Submission rejected, another one is in flight");
                return Err(AppError::SubmissionInProgress);
            }
            state.stage = PipelineStage::Validating;
            state.evaluation = None;
            state.last_error = None;
        }
        let guard = CancelGuard {
            state: &self.state,
            events: self.events.as_ref(),
            armed: true,
        };
        self.emit(PipelineStage::Validating).await;

        let submission_id = uuid::Uuid::new_v4();
        info!(%submission_id, query = %query, files = files.len(), "Submission started");

        let result = self.run_pipeline(query, files).await;
        guard.disarm();

        match result {
            Ok(evaluation) => {
                let history = {
                    let mut state = self.lock()?;
                    state.history.record(query);
                    state.evaluation = Some(evaluation.clone());
                    state.stage = PipelineStage::Done;
                    state.history.clone()
                };
                self.emit(PipelineStage::Done).await;

                if let Err(e) = self.store.save(&history).await {
                    error!(error = %e, "Failed to persist search history");
                }

                info!(%submission_id, overall_score = evaluation.overall_score, "Submission succeeded");
                Ok(evaluation)
            }
            Err(e) => {
                let message = e.user_message();
                {
                    let mut state = self.lock()?;
                    state.evaluation = None;
                    state.last_error = Some(message.clone());
                    state.stage = PipelineStage::Failed(message.clone());
                }
                self.emit(PipelineStage::Failed(message)).await;

                error!(%submission_id, error = %e, "Submission failed");
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self, query: &str, files: Vec<UploadCandidate>) -> AppResult<CompanyEvaluation> {
        let company = query.trim();
        if company.is_empty() {
            return Err(AppError::Validation(
                "Please enter a startup name or website URL.".to_string(),
            ));
        }

        let outcome = self.validator.admit(Vec::new(), files);
        if let Some(reason) = outcome.error {
            return Err(AppError::Validation(reason));
        }
        let accepted = outcome.accepted;

        let digest = if accepted.is_empty() {
            None
        } else {
            self.set_stage(PipelineStage::Encoding { files: accepted.len() }).await?;
            let encoded = FileEncoder::encode_all(&accepted).await?;
            drop(accepted);

            self.set_stage(PipelineStage::Extracting { files: encoded.len() }).await?;
            Some(self.extraction.extract(&encoded).await?)
        };

        self.set_stage(PipelineStage::Evaluating {
            company: company.to_string(),
        })
        .await?;

        Ok(self.evaluation.evaluate(company, digest.as_deref()).await?)
    }
}

/// Fails the submission if its future is dropped before the pipeline returns
struct CancelGuard<'a> {
    state: &'a Mutex<State>,
    events: Option<&'a mpsc::Sender<PipelineEvent>>,
    armed: bool,
}

impl CancelGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for CancelGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if !state.stage.is_busy() {
            return;
        }

        let message = CANCELLED_MESSAGE.to_string();
        warn!(stage = ?state.stage, "Submission dropped before completion");
        state.evaluation = None;
        state.last_error = Some(message.clone());
        state.stage = PipelineStage::Failed(message.clone());
        if let Some(tx) = self.events {
            tx.try_send(PipelineEvent::StageChanged(PipelineStage::Failed(message))).ok();
        }
    }
}

pub const CANCELLED_MESSAGE: &str = "The evaluation was cancelled. Please try again.";
