use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Runner gender as the regression model was trained on it.
/// Serialized with the Polish codes the front end expects (`M` / `K`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "K")]
    Female,
}

impl Gender {
    /// Lenient code parser for extraction replies. `F` is accepted as an alias for `K`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "M" => Some(Gender::Male),
            "K" | "F" => Some(Gender::Female),
            _ => None,
        }
    }

    /// Label encoding used at training time: M=1, K=0.
    pub fn encoded(self) -> i32 {
        match self {
            Gender::Male => 1,
            Gender::Female => 0,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Gender::Male => "Mężczyzna",
            Gender::Female => "Kobieta",
        }
    }
}

/// 5 km time as the LLM returned it: a bare number of minutes or a string
/// such as `"22:45"` or `"24.5"`. Validated later by `parse_time_5k`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    Minutes(f64),
    Text(String),
}

/// Structured fields pulled out of the user's free text.
///
/// Every field is independently optional. Malformed values (a word where a
/// number was expected, an unrecognised gender code) deserialize to `None`
/// rather than failing the whole record, so they surface later as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedProfile {
    #[serde(default, deserialize_with = "lenient_name")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub age: Option<i32>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub birth_year: Option<i32>,
    #[serde(default, deserialize_with = "lenient_gender")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "lenient_time")]
    pub time_5k_minutes: Option<RawTime>,
}

fn lenient_name<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => {
            let s = s.trim();
            // The prompt's schema literally says "imię lub null"; models sometimes quote it.
            (!s.is_empty() && !s.eq_ignore_ascii_case("null")).then(|| s.to_string())
        }
        _ => None,
    }))
}

fn lenient_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| value_to_i32(&v)))
}

fn value_to_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i32::try_from(i).ok()
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .and_then(|f| i32::try_from(f as i64).ok())
            }
        }
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

fn lenient_gender<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Gender>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| v.as_str().and_then(Gender::from_code)))
}

fn lenient_time<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RawTime>, D::Error> {
    let value = Option::<Value>::deserialize(d)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64().map(RawTime::Minutes),
        Value::String(s) => Some(RawTime::Text(s)),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_profile_deserializes() {
        let json = r#"{
            "name": "Anna",
            "age": 28,
            "birth_year": null,
            "gender": "K",
            "time_5k_minutes": 24
        }"#;
        let profile: ExtractedProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Anna"));
        assert_eq!(profile.age, Some(28));
        assert_eq!(profile.birth_year, None);
        assert_eq!(profile.gender, Some(Gender::Female));
        assert_eq!(profile.time_5k_minutes, Some(RawTime::Minutes(24.0)));
    }

    #[test]
    fn test_missing_keys_default_to_none() {
        let profile: ExtractedProfile = serde_json::from_str(r#"{"name": "Janek"}"#).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Janek"));
        assert_eq!(profile.age, None);
        assert_eq!(profile.gender, None);
        assert_eq!(profile.time_5k_minutes, None);
    }

    #[test]
    fn test_malformed_fields_become_none() {
        let json = r#"{
            "name": "null",
            "age": "około trzydziestki",
            "birth_year": 1990.5,
            "gender": "NIEZNANA",
            "time_5k_minutes": [22, 45]
        }"#;
        let profile: ExtractedProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile, ExtractedProfile::default());
    }

    #[test]
    fn test_numeric_strings_and_whole_floats_are_accepted() {
        let json = r#"{"age": "35", "birth_year": 1990.0, "time_5k_minutes": "22:45"}"#;
        let profile: ExtractedProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.age, Some(35));
        assert_eq!(profile.birth_year, Some(1990));
        assert_eq!(
            profile.time_5k_minutes,
            Some(RawTime::Text("22:45".to_string()))
        );
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::from_code(" m "), Some(Gender::Male));
        assert_eq!(Gender::from_code("k"), Some(Gender::Female));
        assert_eq!(Gender::from_code("F"), Some(Gender::Female));
        assert_eq!(Gender::from_code("UNKNOWN"), None);
        assert_eq!(Gender::Male.encoded(), 1);
        assert_eq!(Gender::Female.encoded(), 0);
    }

    #[test]
    fn test_profile_serializes_with_polish_gender_code() {
        let profile = ExtractedProfile {
            name: Some("Kasia".to_string()),
            gender: Some(Gender::Female),
            time_5k_minutes: Some(RawTime::Text("26:30".to_string())),
            ..Default::default()
        };
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["gender"], "K");
        assert_eq!(json["time_5k_minutes"], "26:30");
        assert!(json["age"].is_null());
    }
}
