//! Query resolver
//!
//! Orchestrates classifier -> matcher -> knowledge base -> templated answer.
//! Each call works on one knowledge-base snapshot taken at the start, so a
//! reload in the middle of a query never mixes data sets.

use std::sync::Arc;

use finspeak_config::{Glossary, Settings};
use finspeak_core::{
    Answer, AnswerData, ErrorKind, Explainer, FundId, FundRecord, IntentKind, KnowledgeBase,
    KnowledgeBaseHandle, Language,
};

use crate::classifier::{Intent, IntentClassifier};
use crate::explain::ExplanationService;
use crate::matcher::{FundMatcher, MatchOutcome, MatchResult};
use crate::returns::compute_return;
use crate::templates::{error_text, nav_text, return_text};
use crate::AgentError;

/// Answer engine over a shared knowledge-base handle
#[derive(Debug, Clone)]
pub struct QueryResolver {
    kb: Arc<KnowledgeBaseHandle>,
    classifier: IntentClassifier,
    matcher: FundMatcher,
    explainer: ExplanationService,
}

impl QueryResolver {
    pub fn new(
        kb: Arc<KnowledgeBaseHandle>,
        classifier: IntentClassifier,
        matcher: FundMatcher,
        explainer: ExplanationService,
    ) -> Self {
        Self {
            kb,
            classifier,
            matcher,
            explainer,
        }
    }

    /// Build from settings with the given glossary
    pub fn from_settings(
        settings: &Settings,
        kb: Arc<KnowledgeBaseHandle>,
        glossary: Arc<Glossary>,
    ) -> Self {
        let classifier = IntentClassifier::new(&settings.classifier, &glossary);
        let matcher = FundMatcher::new(settings.matcher.clone());
        let explainer = ExplanationService::new(glossary, settings.explain.policy);
        Self::new(kb, classifier, matcher, explainer)
    }

    /// Attach a generative explainer used on glossary misses
    pub fn with_generative(mut self, explainer: Arc<dyn Explainer>) -> Self {
        self.explainer = self.explainer.with_generative(explainer);
        self
    }

    pub fn knowledge_base(&self) -> &Arc<KnowledgeBaseHandle> {
        &self.kb
    }

    pub fn explanation_service(&self) -> &ExplanationService {
        &self.explainer
    }

    pub fn classify(&self, transcript: &str, language: Language) -> Intent {
        self.classifier.classify(transcript, language)
    }

    /// Match a phrase against the current snapshot
    pub fn match_fund(&self, phrase: &str) -> MatchResult {
        self.matcher.match_fund(phrase, &self.kb.snapshot())
    }

    /// Discovery search over the current snapshot, best hits first
    pub fn search_funds(&self, query: &str, limit: usize) -> Vec<FundRecord> {
        self.kb
            .snapshot()
            .search_funds(query)
            .into_iter()
            .take(limit)
            .cloned()
            .collect()
    }

    /// Resolve a transcript into an answer in `language`
    pub async fn resolve(&self, transcript: &str, language: Language) -> Answer {
        let kb = self.kb.snapshot();
        let intent = self.classifier.classify(transcript, language);

        let answer = match intent {
            Intent::Unknown => failure(
                IntentKind::Unknown,
                language,
                ErrorKind::UnrecognizedQuery,
                None,
            ),
            Intent::Explain { term_phrase } => self.explain(&term_phrase, language).await,
            Intent::GetNav { fund_name_phrase } => {
                self.resolve_nav(&kb, &fund_name_phrase, language)
            }
            Intent::GetReturn {
                fund_name_phrase,
                period_months,
            } => self.resolve_return(&kb, &fund_name_phrase, period_months, language),
        };

        tracing::debug!(
            intent = %answer.intent,
            success = answer.success,
            error_kind = ?answer.error_kind,
            fund_id = ?answer.fund_id,
            "Resolved query"
        );
        answer
    }

    /// Resolve with a raw language code; unsupported codes are answered in English
    pub async fn resolve_with_code(&self, transcript: &str, language_code: &str) -> Answer {
        match Language::from_str_loose(language_code) {
            Some(language) => self.resolve(transcript, language).await,
            None => {
                tracing::debug!(code = language_code, "Unsupported language code");
                failure(
                    IntentKind::Unknown,
                    Language::English,
                    ErrorKind::UnrecognizedQuery,
                    None,
                )
            }
        }
    }

    /// Explain a financial term
    pub async fn explain(&self, term: &str, language: Language) -> Answer {
        match self.explainer.explain(term, language).await {
            Ok(explanation) => Answer::success(
                IntentKind::Explain,
                language,
                explanation.text,
                AnswerData::Explanation {
                    term: explanation.term,
                    source: explanation.source,
                },
            ),
            Err(_) => failure(
                IntentKind::Explain,
                language,
                ErrorKind::ExplanationUnavailable,
                Some(term),
            ),
        }
    }

    fn resolve_nav(&self, kb: &KnowledgeBase, phrase: &str, language: Language) -> Answer {
        let fund_id = match self.confident_match(kb, phrase, IntentKind::GetNav, language) {
            Ok(id) => id,
            Err(answer) => return *answer,
        };

        let lookup = kb
            .lookup_fund(&fund_id)
            .and_then(|fund| kb.latest_nav(&fund_id).map(|latest| (fund, latest)));
        let (fund, latest) = match lookup {
            Ok(found) => found,
            Err(err) => {
                let name = kb.lookup_fund(&fund_id).map(|f| f.name.as_str()).ok();
                return failure(
                    IntentKind::GetNav,
                    language,
                    AgentError::from(err).kind(),
                    name,
                )
                .with_fund(fund_id);
            }
        };

        Answer::success(
            IntentKind::GetNav,
            language,
            nav_text(language, &fund.name, latest.nav, latest.date),
            AnswerData::Nav {
                fund_name: fund.name.clone(),
                nav: latest.nav,
                date: latest.date,
            },
        )
        .with_fund(fund_id)
        .with_value(latest.nav)
    }

    fn resolve_return(
        &self,
        kb: &KnowledgeBase,
        phrase: &str,
        months: u32,
        language: Language,
    ) -> Answer {
        let fund_id = match self.confident_match(kb, phrase, IntentKind::GetReturn, language) {
            Ok(id) => id,
            Err(answer) => return *answer,
        };
        let fund_name = kb
            .lookup_fund(&fund_id)
            .map(|f| f.name.clone())
            .unwrap_or_else(|_| fund_id.to_string());

        let figures = match compute_return(kb, &fund_id, months) {
            Ok(figures) => figures,
            Err(err) => {
                return failure(IntentKind::GetReturn, language, err.kind(), Some(&fund_name))
                    .with_fund(fund_id);
            }
        };

        Answer::success(
            IntentKind::GetReturn,
            language,
            return_text(language, &fund_name, months, figures.returns_percent),
            AnswerData::Return {
                fund_name,
                period_months: months,
                returns_percent: figures.returns_percent,
                start_date: figures.start.date,
                start_nav: figures.start.nav,
                end_date: figures.end.date,
                end_nav: figures.end.nav,
                absolute_change: figures.absolute_change,
            },
        )
        .with_fund(fund_id)
        .with_value(figures.returns_percent)
    }

    /// Accepted fund id, or the failure answer to return
    fn confident_match(
        &self,
        kb: &KnowledgeBase,
        phrase: &str,
        intent: IntentKind,
        language: Language,
    ) -> Result<FundId, Box<Answer>> {
        let result = self.matcher.match_fund(phrase, kb);
        match (result.outcome, result.fund_id) {
            (MatchOutcome::Matched, Some(id)) => Ok(id),
            (MatchOutcome::Ambiguous, _) => Err(Box::new(
                failure(intent, language, ErrorKind::AmbiguousFund, Some(phrase))
                    .with_candidates(result.candidates),
            )),
            _ => Err(Box::new(
                failure(intent, language, ErrorKind::FundNotFound, Some(phrase))
                    .with_candidates(result.candidates),
            )),
        }
    }
}

fn failure(
    intent: IntentKind,
    language: Language,
    kind: ErrorKind,
    subject: Option<&str>,
) -> Answer {
    Answer::failure(intent, language, kind, error_text(kind, language, subject))
}
