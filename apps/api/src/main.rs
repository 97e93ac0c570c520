mod analysis;
mod config;
mod errors;
mod llm_client;
mod prediction;
mod profile;
mod routes;
mod state;
mod telemetry;
#[cfg(test)]
mod test_support;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::pipeline::Analyzer;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::prediction::model::{ArtifactModel, RegressionModel};
use crate::profile::Timeouts;
use crate::routes::build_router;
use crate::state::AppState;
use crate::telemetry::{LangfuseTelemetry, NoopTelemetry, TelemetrySink};

/// Half-marathon finish time predictor.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// Overrides PORT.
        #[arg(long)]
        port: Option<u16>,
    },
    /// Interactive form on stdin/stdout.
    Form,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging. stderr keeps the form's stdout clean.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting half-marathon predictor v{}", env!("CARGO_PKG_VERSION"));

    let analyzer = build_analyzer(&config)?;

    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(&config, analyzer, port.unwrap_or(config.port)).await,
        Command::Form => analysis::form::run_form(&analyzer).await,
    }
}

/// Loads the model and wires the LLM client and telemetry sink into the pipeline.
fn build_analyzer(config: &Config) -> Result<Analyzer> {
    let model = ArtifactModel::from_file(&config.model_path).with_context(|| {
        format!(
            "Failed to load regression model from {}",
            config.model_path.display()
        )
    })?;
    info!(
        "Regression model loaded ({}, features: {:?})",
        model.kind(),
        model.feature_names()
    );

    let llm = LlmClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    )
    .context("Failed to build LLM client")?;
    info!("LLM client initialized (model: {})", config.openai_model);

    let telemetry: Arc<dyn TelemetrySink> = match &config.langfuse {
        Some(langfuse) => match LangfuseTelemetry::new(langfuse.clone()) {
            Ok(sink) => {
                info!("Langfuse telemetry enabled ({})", langfuse.host);
                Arc::new(sink)
            }
            Err(e) => {
                warn!("Langfuse initialization failed, telemetry disabled: {e}");
                Arc::new(NoopTelemetry)
            }
        },
        None => {
            info!("Langfuse keys missing - telemetry disabled");
            Arc::new(NoopTelemetry)
        }
    };

    Ok(Analyzer::new(
        Arc::new(llm),
        Arc::new(model),
        telemetry,
        Timeouts {
            extraction: config.extraction_timeout,
            gender: config.gender_timeout,
        },
    ))
}

async fn serve(config: &Config, analyzer: Analyzer, port: u16) -> Result<()> {
    let state = AppState { analyzer };

    let app = build_router(state, Some(&config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
