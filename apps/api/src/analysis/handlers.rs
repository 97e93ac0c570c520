//! Axum route handlers for the analysis API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::analysis::pipeline::{current_year, Analysis};
use crate::errors::AppError;
use crate::profile::models::Gender;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeResponse {
    pub name: String,
    pub age: i32,
    pub birth_year: i32,
    pub gender: Gender,
    /// 5 km time in minutes.
    pub time_5k: f64,
    pub predicted_time_seconds: f64,
    pub predicted_time_formatted: String,
}

impl From<&Analysis> for AnalyzeResponse {
    fn from(analysis: &Analysis) -> Self {
        let resolved = &analysis.resolved;
        Self {
            name: resolved.name.clone(),
            age: resolved.age,
            birth_year: resolved.birth_year,
            gender: resolved.gender,
            time_5k: resolved.time_5k_minutes,
            predicted_time_seconds: analysis.prediction.seconds,
            predicted_time_formatted: analysis.prediction.formatted.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /analyze
///
/// Extracts the runner profile from free text and predicts a half-marathon time.
/// Failures come back as `{"error": ...}` (plus `"data"` for missing fields).
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let analysis = state
        .analyzer
        .analyze(&request.text, current_year())
        .await?;

    Ok(Json(AnalyzeResponse::from(&analysis)))
}
