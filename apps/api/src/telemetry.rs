//! Telemetry: optional trace sink for LLM and prediction calls.
//!
//! Default: `NoopTelemetry` (nothing configured).
//! `LangfuseTelemetry` posts one `trace-create` event per record to the
//! Langfuse ingestion API. Recording never affects a response: `emit` logs
//! and swallows every failure.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::LangfuseConfig;

const INGESTION_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ingestion rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// One traced operation: `(operation_name, input, output, metadata)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    pub name: &'static str,
    pub input: Value,
    pub output: Value,
    pub metadata: Value,
}

#[async_trait]
pub trait TelemetrySink: Send + Sync {
    async fn record(&self, event: TelemetryEvent) -> Result<(), TelemetryError>;
}

/// Records an event, logging and discarding any failure.
pub async fn emit(sink: &dyn TelemetrySink, event: TelemetryEvent) {
    let name = event.name;
    if let Err(e) = sink.record(event).await {
        warn!("Telemetry logging failed for {name}: {e}");
    }
}

pub struct NoopTelemetry;

#[async_trait]
impl TelemetrySink for NoopTelemetry {
    async fn record(&self, _event: TelemetryEvent) -> Result<(), TelemetryError> {
        Ok(())
    }
}

pub struct LangfuseTelemetry {
    client: Client,
    config: LangfuseConfig,
}

impl LangfuseTelemetry {
    pub fn new(config: LangfuseConfig) -> Result<Self, TelemetryError> {
        Ok(Self {
            client: Client::builder().timeout(INGESTION_TIMEOUT).build()?,
            config,
        })
    }

    fn ingestion_url(&self) -> String {
        format!(
            "{}/api/public/ingestion",
            self.config.host.trim_end_matches('/')
        )
    }
}

/// Wraps an event in the ingestion batch envelope.
fn ingestion_batch(event: &TelemetryEvent) -> Value {
    let timestamp = Utc::now().to_rfc3339();
    json!({
        "batch": [{
            "id": Uuid::new_v4(),
            "timestamp": timestamp,
            "type": "trace-create",
            "body": {
                "id": Uuid::new_v4(),
                "timestamp": timestamp,
                "name": event.name,
                "input": event.input,
                "output": event.output,
                "metadata": event.metadata,
            }
        }]
    })
}

#[async_trait]
impl TelemetrySink for LangfuseTelemetry {
    async fn record(&self, event: TelemetryEvent) -> Result<(), TelemetryError> {
        let response = self
            .client
            .post(self.ingestion_url())
            .basic_auth(&self.config.public_key, Some(&self.config.secret_key))
            .json(&ingestion_batch(&event))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TelemetryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Telemetry event {} recorded", event.name);
        Ok(())
    }
}
