//! Generative explanations
//!
//! Features:
//! - OpenAI-compatible chat-completions client (Groq by default)
//! - Retry with exponential backoff on transient failures
//! - Language-aware explanation prompts

pub mod backend;
pub mod prompt;

pub use backend::{ChatCompletionsExplainer, LlmConfig};
pub use prompt::{explanation_messages, Message, Role};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for finspeak_core::Error {
    fn from(err: LlmError) -> Self {
        finspeak_core::Error::Explanation(err.to_string())
    }
}
