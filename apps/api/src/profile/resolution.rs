//! Field resolution: age/birth-year backfill and the required-field check.

use std::fmt;

use serde::Serialize;

use crate::profile::models::{ExtractedProfile, Gender};
use crate::profile::time::parse_time_5k;

/// A required field that is absent or invalid after extraction and backfill.
/// Declaration order is the order fields are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Name,
    Age,
    Gender,
    Time5k,
}

impl MissingField {
    /// User-facing Polish label.
    pub fn label(self) -> &'static str {
        match self {
            MissingField::Name => "imię",
            MissingField::Age => "wiek",
            MissingField::Gender => "płeć",
            MissingField::Time5k => "czas na 5km (MM:SS lub minuty)",
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A profile with all four required fields present and valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedProfile {
    pub name: String,
    pub age: i32,
    /// User-supplied birth year when given, otherwise `current_year - age`.
    /// May disagree with `age`; feature building trusts `age`.
    pub birth_year: i32,
    pub gender: Gender,
    pub time_5k_minutes: f64,
    /// True when `age` was derived from the birth year.
    pub age_from_birth_year: bool,
}

/// Resolves the extracted fields, or lists every missing one in a stable order.
///
/// `age` falls back to `current_year - birth_year`; `birth_year` falls back to
/// `current_year - age`. Non-positive ages, and birth years too far out of
/// range to subtract, count as missing.
pub fn resolve(
    profile: &ExtractedProfile,
    current_year: i32,
) -> Result<ResolvedProfile, Vec<MissingField>> {
    let stated_age = profile.age.filter(|age| *age > 0);
    let age_from_birth_year = stated_age.is_none() && profile.birth_year.is_some();
    let age = stated_age
        .or_else(|| {
            profile
                .birth_year
                .and_then(|year| current_year.checked_sub(year))
        })
        .filter(|age| *age > 0);
    let time_5k_minutes = profile.time_5k_minutes.as_ref().and_then(parse_time_5k);

    let mut missing = Vec::new();
    if profile.name.is_none() {
        missing.push(MissingField::Name);
    }
    if age.is_none() {
        missing.push(MissingField::Age);
    }
    if profile.gender.is_none() {
        missing.push(MissingField::Gender);
    }
    if time_5k_minutes.is_none() {
        missing.push(MissingField::Time5k);
    }

    match (&profile.name, age, profile.gender, time_5k_minutes) {
        (Some(name), Some(age), Some(gender), Some(time_5k_minutes)) => Ok(ResolvedProfile {
            name: name.clone(),
            age,
            birth_year: profile
                .birth_year
                .unwrap_or_else(|| current_year.saturating_sub(age)),
            gender,
            time_5k_minutes,
            age_from_birth_year,
        }),
        _ => Err(missing),
    }
}

/// Comma-separated labels, as shown to the user.
pub fn missing_labels(missing: &[MissingField]) -> String {
    missing
        .iter()
        .map(|m| m.label())
        .collect::<Vec<_>>()
        .join(", ")
}
