//! Fakes for the pipeline's process-scoped dependencies.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::analysis::pipeline::Analyzer;
use crate::llm_client::{ChatModel, ChatRequest, LlmError};
use crate::prediction::features::FEATURE_NAMES;
use crate::prediction::model::{ModelError, RegressionModel};
use crate::profile::Timeouts;
use crate::telemetry::{TelemetryError, TelemetryEvent, TelemetrySink};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

/// Replays canned replies in order. Running out of replies is a test bug
/// and surfaces as `EmptyContent`.
pub struct ScriptedChat {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedChat {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: request.system.to_string(),
            user: request.user.to_string(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            timeout: request.timeout,
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Returns a fixed value and records every row it was asked about.
pub struct FixedModel {
    value: f64,
    feature_names: Vec<String>,
    rows: Mutex<Vec<Vec<f64>>>,
}

impl FixedModel {
    pub fn returning(value: f64) -> Self {
        Self {
            value,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            rows: Mutex::new(Vec::new()),
        }
    }

    pub fn with_feature_names(mut self, names: &[&str]) -> Self {
        self.feature_names = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.rows.lock().unwrap().clone()
    }
}

impl RegressionModel for FixedModel {
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        self.rows.lock().unwrap().push(row.to_vec());
        Ok(self.value)
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn kind(&self) -> &'static str {
        "fixed"
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl TelemetrySink for RecordingTelemetry {
    async fn record(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct FailingTelemetry;

#[async_trait]
impl TelemetrySink for FailingTelemetry {
    async fn record(&self, _event: TelemetryEvent) -> Result<(), TelemetryError> {
        Err(TelemetryError::Rejected {
            status: 401,
            body: "invalid credentials".to_string(),
        })
    }
}

/// An analyzer wired to fakes, plus handles for inspecting them afterwards.
pub fn analyzer_with(
    replies: Vec<Result<String, LlmError>>,
    model_output: f64,
) -> (
    Analyzer,
    Arc<ScriptedChat>,
    Arc<FixedModel>,
    Arc<RecordingTelemetry>,
) {
    let llm = Arc::new(ScriptedChat::new(replies));
    let model = Arc::new(FixedModel::returning(model_output));
    let telemetry = Arc::new(RecordingTelemetry::default());
    let analyzer = Analyzer::new(
        llm.clone(),
        model.clone(),
        telemetry.clone(),
        Timeouts::default(),
    );
    (analyzer, llm, model, telemetry)
}
