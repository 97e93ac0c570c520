// Profile extraction: turning free text into the fields the predictor needs.
// LLM access goes through llm_client::ChatModel only.

pub mod extraction;
pub mod gender;
pub mod models;
pub mod prompts;
pub mod resolution;
pub mod time;

use std::time::Duration;

/// Per-call timeouts for the two LLM round trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub extraction: Duration,
    pub gender: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            extraction: Duration::from_secs(25),
            gender: Duration::from_secs(10),
        }
    }
}
