//! Profile extraction: one LLM call that turns user text into an `ExtractedProfile`.

use std::time::Duration;

use serde_json::Value;

use crate::llm_client::{parse_json_reply, ChatModel, ChatRequest, LlmError};
use crate::profile::models::ExtractedProfile;
use crate::profile::prompts::{
    extraction_system_prompt, extraction_user_prompt, EXTRACTION_MAX_TOKENS,
    EXTRACTION_TEMPERATURE,
};

/// Sends the user's text to the LLM and parses the reply.
///
/// Single attempt. Transport errors, timeouts, empty replies and replies that
/// are not a JSON object all come back as `Err`; the caller reports them as a
/// generic "could not process" failure.
pub async fn extract_profile(
    llm: &dyn ChatModel,
    user_input: &str,
    current_year: i32,
    timeout: Duration,
) -> Result<ExtractedProfile, LlmError> {
    let system = extraction_system_prompt(current_year);
    let user = extraction_user_prompt(user_input);

    let reply = llm
        .complete(ChatRequest {
            system: &system,
            user: &user,
            temperature: EXTRACTION_TEMPERATURE,
            max_tokens: EXTRACTION_MAX_TOKENS,
            timeout,
        })
        .await?;

    parse_profile(&reply)
}

/// Parses a raw extraction reply. Pure: the same reply always yields the same record.
///
/// Only a non-empty JSON object is a profile. `{}` counts as an empty reply.
pub fn parse_profile(reply: &str) -> Result<ExtractedProfile, LlmError> {
    match parse_json_reply::<Value>(reply)? {
        Value::Object(fields) if fields.is_empty() => Err(LlmError::EmptyContent),
        value @ Value::Object(_) => Ok(serde_json::from_value(value)?),
        other => Err(LlmError::UnexpectedShape(json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::{Gender, RawTime};
    use crate::test_support::ScriptedChat;

    const MAREK_REPLY: &str = r#"{
        "name": "Marek",
        "age": 35,
        "birth_year": null,
        "gender": null,
        "time_5k_minutes": 22.75
    }"#;

    #[test]
    fn test_parse_profile_marek() {
        let profile = parse_profile(MAREK_REPLY).unwrap();
        assert_eq!(profile.name.as_deref(), Some("Marek"));
        assert_eq!(profile.age, Some(35));
        assert_eq!(profile.gender, None);
        assert_eq!(profile.time_5k_minutes, Some(RawTime::Minutes(22.75)));
    }

    #[test]
    fn test_parse_profile_is_idempotent() {
        let first = parse_profile(MAREK_REPLY).unwrap();
        let second = parse_profile(MAREK_REPLY).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parse_profile_accepts_fenced_json() {
        let reply = "```json\n{\"name\": \"Anna\", \"gender\": \"K\"}\n```";
        let profile = parse_profile(reply).unwrap();
        assert_eq!(profile.gender, Some(Gender::Female));
    }

    #[test]
    fn test_parse_profile_rejects_non_json() {
        assert!(matches!(parse_profile(""), Err(LlmError::EmptyContent)));
        assert!(parse_profile("Nie rozumiem pytania.").is_err());
        assert!(parse_profile("null").is_err());
        assert!(parse_profile("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_parse_profile_rejects_positional_array() {
        let result = parse_profile(r#"["Marek", 35, null, "M", 22]"#);
        assert!(matches!(result, Err(LlmError::UnexpectedShape("an array"))));
    }

    #[test]
    fn test_parse_profile_empty_object_is_empty_reply() {
        assert!(matches!(parse_profile("{}"), Err(LlmError::EmptyContent)));
        assert!(matches!(
            parse_profile("```json\n{ }\n```"),
            Err(LlmError::EmptyContent)
        ));
    }

    #[test]
    fn test_parse_profile_all_null_fields_is_still_a_profile() {
        let reply = r#"{"name": null, "age": null, "birth_year": null, "gender": null, "time_5k_minutes": null}"#;
        assert_eq!(parse_profile(reply).unwrap(), ExtractedProfile::default());
    }

    #[tokio::test]
    async fn test_extract_profile_sends_fixed_prompt() {
        let llm = ScriptedChat::new(vec![Ok(MAREK_REPLY.to_string())]);

        let profile = extract_profile(
            &llm,
            "Marek, 35 lat, czas na 5km: 22:45",
            2026,
            Duration::from_secs(25),
        )
        .await
        .unwrap();
        assert_eq!(profile.age, Some(35));

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert!(request.system.contains("Obecny rok: 2026"));
        assert_eq!(
            request.user,
            "Tekst użytkownika: Marek, 35 lat, czas na 5km: 22:45"
        );
        assert_eq!(request.max_tokens, 200);
        assert!((request.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(request.timeout, Duration::from_secs(25));
    }

    #[tokio::test]
    async fn test_extract_profile_propagates_llm_failure() {
        let llm = ScriptedChat::new(vec![Err(LlmError::Timeout(Duration::from_secs(25)))]);
        let result = extract_profile(&llm, "Anna", 2026, Duration::from_secs(25)).await;
        assert!(matches!(result, Err(LlmError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_extract_profile_unparseable_reply_is_error() {
        let llm = ScriptedChat::new(vec![Ok("Oto dane: imię Anna".to_string())]);
        let result = extract_profile(&llm, "Anna", 2026, Duration::from_secs(25)).await;
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }
}
