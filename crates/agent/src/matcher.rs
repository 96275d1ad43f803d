//! Lexical fund-name matcher
//!
//! Maps a noisy fund-name phrase (typos, transliteration, missing words)
//! onto a knowledge-base fund. Every fund is scored with a blend of
//! token-set and token-sort similarity; the best one is accepted only when
//! it clears the acceptance threshold and leads the runner-up by a margin.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use finspeak_config::MatcherConfig;
use finspeak_core::{canonicalize, FundId, KnowledgeBase, MatchCandidate};
use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

const TOKEN_SET_WEIGHT: f64 = 0.7;
const TOKEN_SORT_WEIGHT: f64 = 0.3;

/// Why a match was or was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    Matched,
    /// Top candidate scored well but did not lead by the minimum margin
    Ambiguous,
    BelowThreshold,
    EmptyPhrase,
}

/// Result of matching one phrase against the knowledge base
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub fund_id: Option<FundId>,
    /// Score of the top candidate, in [0, 1]
    pub confidence: f64,
    /// Best candidates, descending by score
    pub candidates: Vec<MatchCandidate>,
    pub outcome: MatchOutcome,
}

impl MatchResult {
    fn empty() -> Self {
        Self {
            fund_id: None,
            confidence: 0.0,
            candidates: Vec::new(),
            outcome: MatchOutcome::EmptyPhrase,
        }
    }

    pub fn is_match(&self) -> bool {
        self.outcome == MatchOutcome::Matched
    }
}

/// Fuzzy matcher over fund names
#[derive(Debug, Clone, Default)]
pub struct FundMatcher {
    config: MatcherConfig,
}

impl FundMatcher {
    pub fn new(config: MatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Match `phrase` against every fund in `kb`
    pub fn match_fund(&self, phrase: &str, kb: &KnowledgeBase) -> MatchResult {
        let phrase = canonicalize(phrase);
        if phrase.is_empty() {
            return MatchResult::empty();
        }

        let mut exact: Option<&FundId> = None;
        let mut exact_count = 0usize;
        let mut scored: Vec<MatchCandidate> = kb
            .fund_name_keys()
            .map(|(record, name_key)| {
                if name_key == phrase {
                    exact = Some(&record.fund_id);
                    exact_count += 1;
                }
                MatchCandidate {
                    fund_id: record.fund_id.clone(),
                    fund_name: record.name.clone(),
                    score: similarity(&phrase, name_key),
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.fund_name.cmp(&b.fund_name))
                .then_with(|| a.fund_id.cmp(&b.fund_id))
        });

        let Some(top) = scored.first() else {
            return MatchResult {
                outcome: MatchOutcome::BelowThreshold,
                ..MatchResult::empty()
            };
        };

        let confidence = top.score;
        let runner_up = scored.get(1).map(|c| c.score).unwrap_or(0.0);
        let margin = confidence - runner_up;

        // A phrase spelling out exactly one fund's full name is never ambiguous,
        // even when a longer sibling ("... Direct") contains it
        let exact_top = exact_count == 1 && exact == Some(&top.fund_id);

        let outcome = if confidence < self.config.acceptance_threshold {
            MatchOutcome::BelowThreshold
        } else if margin < self.config.min_margin && !exact_top {
            MatchOutcome::Ambiguous
        } else {
            MatchOutcome::Matched
        };

        let fund_id = (outcome == MatchOutcome::Matched).then(|| top.fund_id.clone());

        tracing::debug!(
            phrase = %phrase,
            best = %top.fund_name,
            confidence,
            margin,
            ?outcome,
            "Fund match"
        );

        scored.truncate(self.config.max_candidates.max(1));

        MatchResult {
            fund_id,
            confidence,
            candidates: scored,
            outcome,
        }
    }
}

/// Weighted token-set / token-sort similarity of two normalized strings
pub fn similarity(a: &str, b: &str) -> f64 {
    TOKEN_SET_WEIGHT * token_set_ratio(a, b) + TOKEN_SORT_WEIGHT * token_sort_ratio(a, b)
}

/// Similarity after sorting the tokens of both sides
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let sort = |s: &str| {
        let mut tokens: Vec<&str> = s.split_whitespace().collect();
        tokens.sort_unstable();
        tokens.join(" ")
    };
    normalized_levenshtein(&sort(a), &sort(b))
}

/// Similarity of the shared tokens against each side's full token set.
/// One side's tokens being a subset of the other's scores 1.0.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();

    if left.is_empty() || right.is_empty() {
        return if left.is_empty() && right.is_empty() { 1.0 } else { 0.0 };
    }

    let shared: Vec<&str> = left.intersection(&right).copied().collect();
    let only_left: Vec<&str> = left.difference(&right).copied().collect();
    let only_right: Vec<&str> = right.difference(&left).copied().collect();

    if !shared.is_empty() && (only_left.is_empty() || only_right.is_empty()) {
        return 1.0;
    }

    let base = shared.join(" ");
    let with_left = join_parts(&base, &only_left);
    let with_right = join_parts(&base, &only_right);

    let mut best = normalized_levenshtein(&with_left, &with_right);
    if !base.is_empty() {
        best = best
            .max(normalized_levenshtein(&base, &with_left))
            .max(normalized_levenshtein(&base, &with_right));
    }
    best
}

fn join_parts(base: &str, rest: &[&str]) -> String {
    let rest = rest.join(" ");
    match (base.is_empty(), rest.is_empty()) {
        (true, _) => rest,
        (_, true) => base.to_string(),
        _ => format!("{base} {rest}"),
    }
}
