//! Chat messages and the explanation prompt

use std::fmt;

use finspeak_core::Language;
use serde::{Deserialize, Serialize};

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Reply style for a language; Hindi listeners get Roman-script Hinglish
fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::Hindi | Language::Hinglish => {
            "Reply in Hinglish: Hindi written in Roman script, mixed with common English words."
        }
        Language::English => "Reply in simple English.",
    }
}

/// System and user messages asking for a beginner-level explanation of `term`
pub fn explanation_messages(term: &str, language: Language) -> Vec<Message> {
    let system = format!(
        "You explain mutual fund terms to first-time Indian investors. {} \
         Use small examples in Indian Rupees (₹). Keep the answer under 100 words.",
        language_instruction(language)
    );
    let user = format!(
        "Explain '{}' in the context of mutual funds, in very simple words, \
         for someone who has never invested.",
        term.trim()
    );
    vec![Message::system(system), Message::user(user)]
}
