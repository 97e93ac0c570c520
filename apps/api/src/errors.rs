use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::analysis::pipeline::Stage;
use crate::llm_client::LlmError;
use crate::prediction::model::ModelError;
use crate::profile::models::ExtractedProfile;
use crate::profile::resolution::{missing_labels, MissingField};

pub const EMPTY_INPUT_MESSAGE: &str = "Brak tekstu wejściowego";
const EXTRACTION_FAILED_MESSAGE: &str =
    "Nie udało się przetworzyć danych. Spróbuj ponownie lub podaj dane jaśniej.";
const PREDICTION_FAILED_MESSAGE: &str =
    "Nie udało się przewidzieć czasu półmaratonu. Spróbuj ponownie później.";

/// Application-level error type, one variant per request failure class.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected before any external call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// LLM unreachable, timed out, or replied with something other than the profile JSON.
    #[error("Extraction failed: {0}")]
    Extraction(#[from] LlmError),

    /// Extraction worked but required fields are still unresolved after backfill.
    #[error("Missing fields: {}", missing_labels(.missing))]
    MissingFields {
        missing: Vec<MissingField>,
        data: Box<ExtractedProfile>,
    },

    #[error("Prediction failed: {0}")]
    Prediction(#[from] ModelError),
}

impl AppError {
    /// The terminal pipeline stage this error ends a request in.
    pub fn stage(&self) -> Stage {
        match self {
            AppError::Validation(_) => Stage::Received,
            AppError::Extraction(_) => Stage::ExtractionFailed,
            AppError::MissingFields { .. } => Stage::ValidationFailed,
            AppError::Prediction(_) => Stage::PredictionFailed,
        }
    }

    /// Message shown to the user. Internal details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Extraction(_) => EXTRACTION_FAILED_MESSAGE.to_string(),
            AppError::MissingFields { missing, .. } => {
                format!("Brakuje/niepoprawne: {}", missing_labels(missing))
            }
            AppError::Prediction(_) => PREDICTION_FAILED_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a ExtractedProfile>,
}

/// Every pipeline failure is a 200 with an `error` string (and the partial
/// profile for missing fields): the front end only inspects the body.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Extraction(e) => tracing::error!("LLM error: {e}"),
            AppError::Prediction(e) => tracing::error!("Model error: {e}"),
            AppError::Validation(_) | AppError::MissingFields { .. } => {
                tracing::debug!("Request rejected at {:?}: {self}", self.stage())
            }
        }

        let data = match &self {
            AppError::MissingFields { data, .. } => Some(data.as_ref()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.user_message(),
            data,
        };

        (StatusCode::OK, Json(body)).into_response()
    }
}
