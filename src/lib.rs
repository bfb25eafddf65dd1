// Unicorn Finder - AI-assisted startup evaluation over Gemini

pub mod config;
pub mod models;
pub mod types;
pub mod schema;
pub mod upload;
pub mod llm;
pub mod agents;
pub mod history;
pub mod orchestrator;
pub mod routes;
pub mod render;

// Re-exports for convenience
pub use config::Config;
pub use models::{AppState, CompanyEvaluation};
pub use orchestrator::RequestOrchestrator;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
