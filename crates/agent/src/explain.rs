//! Term explanation: curated glossary first, generative explainer on a miss

use std::sync::Arc;

use async_trait::async_trait;
use finspeak_config::{ExplanationPolicy, Glossary, GlossaryEntry};
use finspeak_core::{
    canonicalize, Error, Explainer, Explanation, ExplanationSource, Language, Result,
};
use strsim::normalized_levenshtein;

/// Similarity needed for a near-exact glossary hit ("expence ratio")
const NEAR_EXACT_THRESHOLD: f64 = 0.8;

/// Glossary-backed explainer, no I/O
#[derive(Debug, Clone)]
pub struct CuratedExplainer {
    glossary: Arc<Glossary>,
}

impl CuratedExplainer {
    pub fn new(glossary: Arc<Glossary>) -> Self {
        Self { glossary }
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    /// Exact key/alias match, else the closest surface form above threshold
    pub fn find(&self, term: &str) -> Option<&GlossaryEntry> {
        if let Some(entry) = self.glossary.lookup(term) {
            return Some(entry);
        }

        let needle = canonicalize(term);
        if needle.is_empty() {
            return None;
        }

        let mut best: Option<(&GlossaryEntry, f64)> = None;
        for entry in self.glossary.entries() {
            for form in entry.surface_forms() {
                let form = canonicalize(form);
                if form == needle {
                    return Some(entry);
                }
                let score = normalized_levenshtein(&needle, &form);
                if score >= NEAR_EXACT_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
                    best = Some((entry, score));
                }
            }
        }
        best.map(|(entry, _)| entry)
    }
}

#[async_trait]
impl Explainer for CuratedExplainer {
    async fn explain(&self, term: &str, language: Language) -> Result<Explanation> {
        let entry = self
            .find(term)
            .ok_or_else(|| Error::ExplanationUnavailable(term.to_string()))?;

        Ok(Explanation {
            term: entry.key.clone(),
            text: entry.text(language).to_string(),
            source: ExplanationSource::Curated,
        })
    }

    fn name(&self) -> &str {
        "curated"
    }
}

/// Explanation policy over a curated and an optional generative explainer
#[derive(Clone)]
pub struct ExplanationService {
    curated: CuratedExplainer,
    generative: Option<Arc<dyn Explainer>>,
    policy: ExplanationPolicy,
}

impl ExplanationService {
    pub fn new(glossary: Arc<Glossary>, policy: ExplanationPolicy) -> Self {
        Self {
            curated: CuratedExplainer::new(glossary),
            generative: None,
            policy,
        }
    }

    pub fn with_generative(mut self, explainer: Arc<dyn Explainer>) -> Self {
        self.generative = Some(explainer);
        self
    }

    pub fn policy(&self) -> ExplanationPolicy {
        self.policy
    }

    pub fn glossary(&self) -> &Glossary {
        self.curated.glossary()
    }

    /// Curated glossary keys
    pub fn terms(&self) -> Vec<&str> {
        self.curated.glossary().keys()
    }

    /// Explain `term`; every failure ends as `Error::ExplanationUnavailable`
    pub async fn explain(&self, term: &str, language: Language) -> Result<Explanation> {
        let term = term.trim();
        if term.is_empty() {
            return Err(Error::ExplanationUnavailable(String::new()));
        }

        match self.curated.explain(term, language).await {
            Ok(explanation) => return Ok(explanation),
            Err(Error::ExplanationUnavailable(_)) => {}
            Err(e) => return Err(e),
        }

        let generative = match (&self.policy, &self.generative) {
            (ExplanationPolicy::CuratedThenGenerative, Some(g)) if g.is_available() => g,
            _ => return Err(Error::ExplanationUnavailable(term.to_string())),
        };

        match generative.explain(term, language).await {
            Ok(explanation) => Ok(explanation),
            Err(e) => {
                tracing::warn!(
                    explainer = generative.name(),
                    term,
                    error = %e,
                    "Generative explainer failed"
                );
                Err(Error::ExplanationUnavailable(term.to_string()))
            }
        }
    }
}

impl std::fmt::Debug for ExplanationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplanationService")
            .field("policy", &self.policy)
            .field("terms", &self.curated.glossary().len())
            .field("generative", &self.generative.as_ref().map(|g| g.name().to_string()))
            .finish()
    }
}
