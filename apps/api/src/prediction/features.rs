//! Feature record: the exact three-column input the regression model was trained on.

use serde::Serialize;

use crate::prediction::model::{ModelError, RegressionModel};
use crate::profile::models::Gender;
use crate::profile::resolution::ResolvedProfile;

/// Column names at training time, in order. Must match the artifact byte for byte.
pub const FEATURE_NAMES: [&str; 3] = ["Średni Czas na 5 km", "Rocznik", "Płeć_LE"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionFeatures {
    pub avg_5k_seconds: f64,
    pub birth_year: i32,
    pub gender_encoded: i32,
}

impl PredictionFeatures {
    /// `birth_year` is always recomputed from `age`, even when the user gave a
    /// birth year of their own.
    pub fn new(time_5k_minutes: f64, age: i32, gender: Gender, current_year: i32) -> Self {
        Self {
            avg_5k_seconds: time_5k_minutes * 60.0,
            birth_year: current_year - age,
            gender_encoded: gender.encoded(),
        }
    }

    pub fn from_profile(profile: &ResolvedProfile, current_year: i32) -> Self {
        Self::new(
            profile.time_5k_minutes,
            profile.age,
            profile.gender,
            current_year,
        )
    }

    /// Values in `FEATURE_NAMES` order.
    pub fn to_row(&self) -> [f64; 3] {
        [
            self.avg_5k_seconds,
            f64::from(self.birth_year),
            f64::from(self.gender_encoded),
        ]
    }
}

/// Runs the model on one feature record and returns the predicted seconds.
///
/// The model's schema is checked before every call; a non-finite or
/// non-positive result is an error rather than a displayed time.
pub fn predict_seconds(
    model: &dyn RegressionModel,
    features: &PredictionFeatures,
) -> Result<f64, ModelError> {
    let names = model.feature_names();
    if !names.iter().map(String::as_str).eq(FEATURE_NAMES) {
        return Err(ModelError::SchemaMismatch {
            expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            found: names.to_vec(),
        });
    }

    let seconds = model.predict(&features.to_row())?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(ModelError::InvalidOutput(seconds));
    }
    Ok(seconds)
}
