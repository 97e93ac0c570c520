//! Analysis pipeline: text in, predicted half-marathon time out.
//!
//! RECEIVED → EXTRACTING → FIELDS_PARTIAL → GENDER_INFERRING → FIELDS_RESOLVED
//! → PREDICTING → DONE, with EXTRACTION_FAILED, VALIDATION_FAILED and
//! PREDICTION_FAILED as the terminal error states. One request makes at most
//! two LLM calls and one model call; nothing is shared between requests except
//! the immutable handles held by `Analyzer`.

use std::sync::Arc;

use chrono::Datelike;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::errors::{AppError, EMPTY_INPUT_MESSAGE};
use crate::llm_client::ChatModel;
use crate::prediction::features::{predict_seconds, PredictionFeatures, FEATURE_NAMES};
use crate::prediction::format::{format_duration, half_marathon_pace, Pace};
use crate::prediction::model::RegressionModel;
use crate::profile::extraction::extract_profile;
use crate::profile::gender::infer_gender;
use crate::profile::models::ExtractedProfile;
use crate::profile::prompts::{
    EXTRACTION_MAX_TOKENS, EXTRACTION_TEMPERATURE, GENDER_MAX_TOKENS, GENDER_TEMPERATURE,
};
use crate::profile::resolution::{resolve, ResolvedProfile};
use crate::profile::Timeouts;
use crate::telemetry::{emit, TelemetryEvent, TelemetrySink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Extracting,
    ExtractionFailed,
    FieldsPartial,
    GenderInferring,
    FieldsResolved,
    ValidationFailed,
    Predicting,
    PredictionFailed,
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub seconds: f64,
    pub formatted: String,
    pub pace_per_km: Pace,
}

impl PredictionResult {
    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            seconds,
            formatted: format_duration(seconds),
            pace_per_km: half_marathon_pace(seconds),
        }
    }
}

/// Everything a successful request produced.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub resolved: ResolvedProfile,
    pub gender_inferred: bool,
    pub prediction: PredictionResult,
}

/// Process-scoped dependencies of the pipeline. Cheap to clone.
#[derive(Clone)]
pub struct Analyzer {
    llm: Arc<dyn ChatModel>,
    model: Arc<dyn RegressionModel>,
    telemetry: Arc<dyn TelemetrySink>,
    timeouts: Timeouts,
}

impl Analyzer {
    pub fn new(
        llm: Arc<dyn ChatModel>,
        model: Arc<dyn RegressionModel>,
        telemetry: Arc<dyn TelemetrySink>,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            llm,
            model,
            telemetry,
            timeouts,
        }
    }

    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    /// Runs one request through the pipeline.
    pub async fn analyze(&self, text: &str, current_year: i32) -> Result<Analysis, AppError> {
        let text = text.trim();
        debug!(stage = ?Stage::Received, chars = text.chars().count(), "analysis request");
        if text.is_empty() {
            return Err(AppError::Validation(EMPTY_INPUT_MESSAGE.to_string()));
        }

        debug!(stage = ?Stage::Extracting, "extracting profile");
        let mut profile = extract_profile(
            self.llm.as_ref(),
            text,
            current_year,
            self.timeouts.extraction,
        )
        .await
        .map_err(|e| {
            warn!(stage = ?Stage::ExtractionFailed, "Profile extraction failed: {e}");
            AppError::Extraction(e)
        })?;

        emit(
            self.telemetry.as_ref(),
            TelemetryEvent {
                name: "extract_user_data",
                input: json!({ "user_input": text }),
                output: serde_json::to_value(&profile).unwrap_or_default(),
                metadata: json!({
                    "model": self.llm.model_name(),
                    "temperature": EXTRACTION_TEMPERATURE,
                    "max_tokens": EXTRACTION_MAX_TOKENS,
                }),
            },
        )
        .await;

        debug!(stage = ?Stage::FieldsPartial, ?profile, "profile extracted");
        let gender_inferred = self.backfill_gender(&mut profile).await;

        let resolved = match resolve(&profile, current_year) {
            Ok(resolved) => resolved,
            Err(missing) => {
                debug!(stage = ?Stage::ValidationFailed, ?missing, "required fields missing");
                return Err(AppError::MissingFields {
                    missing,
                    data: Box::new(profile),
                });
            }
        };
        debug!(stage = ?Stage::FieldsResolved, "all fields resolved");

        let features = PredictionFeatures::from_profile(&resolved, current_year);
        debug!(stage = ?Stage::Predicting, ?features, "running regression model");
        let seconds = predict_seconds(self.model.as_ref(), &features).map_err(|e| {
            warn!(stage = ?Stage::PredictionFailed, "Prediction failed: {e}");
            AppError::Prediction(e)
        })?;
        let prediction = PredictionResult::from_seconds(seconds);

        emit(
            self.telemetry.as_ref(),
            TelemetryEvent {
                name: "half_marathon_prediction",
                input: json!({
                    "name": resolved.name,
                    "age": resolved.age,
                    "gender": resolved.gender,
                    "time_5k_minutes": resolved.time_5k_minutes,
                    "original_input": text,
                }),
                output: json!({
                    "predicted_time_seconds": prediction.seconds,
                    "predicted_time_formatted": prediction.formatted,
                }),
                metadata: json!({
                    "model_type": self.model.kind(),
                    "features": FEATURE_NAMES,
                }),
            },
        )
        .await;

        info!(
            stage = ?Stage::Done,
            "Predicted half marathon {} for {}",
            prediction.formatted, resolved.name
        );

        Ok(Analysis {
            resolved,
            gender_inferred,
            prediction,
        })
    }

    /// Fills in gender from the name when the text did not state it.
    /// Returns true when a gender was inferred.
    async fn backfill_gender(&self, profile: &mut ExtractedProfile) -> bool {
        if profile.gender.is_some() {
            return false;
        }
        let Some(name) = profile.name.as_deref() else {
            return false;
        };

        debug!(stage = ?Stage::GenderInferring, runner = name, "inferring gender from name");
        let Some(gender) = infer_gender(self.llm.as_ref(), name, self.timeouts.gender).await
        else {
            return false;
        };

        emit(
            self.telemetry.as_ref(),
            TelemetryEvent {
                name: "infer_gender_from_name",
                input: json!({ "name": name }),
                output: json!({ "gender": gender }),
                metadata: json!({
                    "model": self.llm.model_name(),
                    "temperature": GENDER_TEMPERATURE,
                    "max_tokens": GENDER_MAX_TOKENS,
                }),
            },
        )
        .await;

        profile.gender = Some(gender);
        true
    }
}

/// Calendar year used for age and birth-year arithmetic.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}
