use crate::analysis::pipeline::Analyzer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// LLM client, regression model and telemetry sink, all process-scoped and
    /// read-only after startup.
    pub analyzer: Analyzer,
}
