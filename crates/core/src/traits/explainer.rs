//! Explanation capability

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::answer::ExplanationSource;
use crate::{Language, Result};

/// Explanation of a financial term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Canonical term (glossary key or the phrase as asked)
    pub term: String,
    pub text: String,
    pub source: ExplanationSource,
}

/// Something that can explain a financial term
///
/// Implementations:
/// - `CuratedExplainer` - Glossary lookup, no I/O
/// - `ChatCompletionsExplainer` - OpenAI-compatible chat API
///
/// A miss is reported as `Error::ExplanationUnavailable`; transport or
/// backend failures as `Error::Explanation`. Callers treat both as values.
#[async_trait]
pub trait Explainer: Send + Sync + 'static {
    /// Explain `term` in `language`
    async fn explain(&self, term: &str, language: Language) -> Result<Explanation>;

    /// Name for logging
    fn name(&self) -> &str;

    /// Whether the explainer can currently be called
    fn is_available(&self) -> bool {
        true
    }
}
