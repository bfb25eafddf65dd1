//! Model-facing clients
//!
//! Two calls are made against the upstream model for a submission:
//!
//! - **Extraction Client**: digests uploaded documents into plain text,
//!   one section per analysis category (skipped when nothing is uploaded)
//! - **Evaluation Client**: requests the schema-constrained evaluation
//!
//! ```text
//!  Encoded documents          Company name
//!        │                         │
//!        ▼                         │
//! ┌─────────────┐                  │
//! │ Extraction  │  → digest ───────┤
//! │   Client    │                  │
//! └─────────────┘                  ▼
//!                           ┌─────────────┐
//!                           │ Evaluation  │  → CompanyEvaluation
//!                           │   Client    │
//!                           └─────────────┘
//! ```

pub mod evaluation;
pub mod extraction;
pub mod prompts;

#[cfg(test)]
pub(crate) mod testing;

pub use evaluation::{parse_evaluation, EvaluationClient};
pub use extraction::ExtractionClient;
