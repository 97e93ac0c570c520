//! Gender backfill: infers gender from a first name when the text did not state it.

use std::time::Duration;

use tracing::warn;

use crate::llm_client::{ChatModel, ChatRequest};
use crate::profile::models::Gender;
use crate::profile::prompts::{
    gender_user_prompt, GENDER_MAX_TOKENS, GENDER_SYSTEM, GENDER_TEMPERATURE,
};

/// Asks the LLM for the gender associated with `name`.
///
/// Returns `None` for `NIEZNANA`/`UNKNOWN`, malformed replies, transport
/// errors and timeouts alike: an unresolved gender is reported later as a
/// missing field, never as a failure of its own.
pub async fn infer_gender(llm: &dyn ChatModel, name: &str, timeout: Duration) -> Option<Gender> {
    let user = gender_user_prompt(name);
    let reply = llm
        .complete(ChatRequest {
            system: GENDER_SYSTEM,
            user: &user,
            temperature: GENDER_TEMPERATURE,
            max_tokens: GENDER_MAX_TOKENS,
            timeout,
        })
        .await;

    match reply {
        Ok(reply) => parse_gender_reply(&reply),
        Err(e) => {
            warn!("Gender inference failed for name {name:?}: {e}");
            None
        }
    }
}

/// Only an exact `M` or `K` (after trimming and upper-casing) resolves.
pub fn parse_gender_reply(reply: &str) -> Option<Gender> {
    match reply.trim().to_uppercase().as_str() {
        "M" => Some(Gender::Male),
        "K" => Some(Gender::Female),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;
    use crate::test_support::ScriptedChat;

    #[test]
    fn test_parse_gender_reply() {
        assert_eq!(parse_gender_reply("M"), Some(Gender::Male));
        assert_eq!(parse_gender_reply(" k\n"), Some(Gender::Female));
        assert_eq!(parse_gender_reply("NIEZNANA"), None);
        assert_eq!(parse_gender_reply("UNKNOWN"), None);
        assert_eq!(parse_gender_reply("F"), None);
        assert_eq!(parse_gender_reply("M."), None);
        assert_eq!(parse_gender_reply("Mężczyzna"), None);
    }

    #[tokio::test]
    async fn test_infer_gender_sends_name_prompt() {
        let llm = ScriptedChat::new(vec![Ok("M".to_string())]);
        let gender = infer_gender(&llm, "Marek", Duration::from_secs(10)).await;
        assert_eq!(gender, Some(Gender::Male));

        let requests = llm.requests();
        assert_eq!(requests[0].user, "Jaką płeć ma osoba o imieniu: Marek?");
        assert_eq!(requests[0].system, GENDER_SYSTEM);
        assert_eq!(requests[0].max_tokens, 10);
        assert_eq!(requests[0].timeout, Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_infer_gender_unknown_is_none() {
        let llm = ScriptedChat::new(vec![Ok("UNKNOWN".to_string())]);
        assert_eq!(infer_gender(&llm, "Alex", Duration::from_secs(10)).await, None);
    }

    #[tokio::test]
    async fn test_infer_gender_error_is_none() {
        let llm = ScriptedChat::new(vec![Err(LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        })]);
        assert_eq!(infer_gender(&llm, "Ola", Duration::from_secs(10)).await, None);
    }
}
