//! Structured answers returned by the query resolver

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::fund::FundId;
use crate::language::Language;

/// Intent label carried on every answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    GetNav,
    GetReturn,
    Explain,
    Unknown,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::GetNav => "get_nav",
            IntentKind::GetReturn => "get_return",
            IntentKind::Explain => "explain",
            IntentKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recoverable failure categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnrecognizedQuery,
    FundNotFound,
    AmbiguousFund,
    NoDataForFund,
    NoDataBeforeDate,
    InsufficientHistory,
    ExplanationUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnrecognizedQuery => "unrecognized_query",
            ErrorKind::FundNotFound => "fund_not_found",
            ErrorKind::AmbiguousFund => "ambiguous_fund",
            ErrorKind::NoDataForFund => "no_data_for_fund",
            ErrorKind::NoDataBeforeDate => "no_data_before_date",
            ErrorKind::InsufficientHistory => "insufficient_history",
            ErrorKind::ExplanationUnavailable => "explanation_unavailable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an explanation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationSource {
    Curated,
    Ai,
}

impl ExplanationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExplanationSource::Curated => "curated",
            ExplanationSource::Ai => "ai",
        }
    }
}

/// Intent-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerData {
    Nav {
        fund_name: String,
        /// Unrounded NAV as stored
        nav: f64,
        date: NaiveDate,
    },
    Return {
        fund_name: String,
        period_months: u32,
        returns_percent: f64,
        start_date: NaiveDate,
        start_nav: f64,
        end_date: NaiveDate,
        end_nav: f64,
        absolute_change: f64,
    },
    Explanation {
        term: String,
        source: ExplanationSource,
    },
}

/// Scored fund candidate, reported for ambiguous matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub fund_id: FundId,
    pub fund_name: String,
    pub score: f64,
}

/// Result of resolving one transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub intent: IntentKind,
    pub fund_id: Option<FundId>,
    pub computed_value: Option<f64>,
    pub formatted_text: String,
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    pub language: Language,
    pub data: Option<AnswerData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<MatchCandidate>,
}

impl Answer {
    pub fn success(
        intent: IntentKind,
        language: Language,
        formatted_text: impl Into<String>,
        data: AnswerData,
    ) -> Self {
        Self {
            intent,
            fund_id: None,
            computed_value: None,
            formatted_text: formatted_text.into(),
            success: true,
            error_kind: None,
            language,
            data: Some(data),
            candidates: Vec::new(),
        }
    }

    pub fn failure(
        intent: IntentKind,
        language: Language,
        error_kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            intent,
            fund_id: None,
            computed_value: None,
            formatted_text: message.into(),
            success: false,
            error_kind: Some(error_kind),
            language,
            data: None,
            candidates: Vec::new(),
        }
    }

    pub fn with_fund(mut self, fund_id: FundId) -> Self {
        self.fund_id = Some(fund_id);
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.computed_value = Some(value);
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<MatchCandidate>) -> Self {
        self.candidates = candidates;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_labels() {
        assert_eq!(serde_json::to_string(&IntentKind::GetReturn).unwrap(), "\"get_return\"");
        assert_eq!(
            serde_json::to_string(&ErrorKind::InsufficientHistory).unwrap(),
            "\"insufficient_history\""
        );
        assert_eq!(ErrorKind::AmbiguousFund.to_string(), "ambiguous_fund");
        assert_eq!(ExplanationSource::Ai.as_str(), "ai");
    }

    #[test]
    fn test_nav_payload_is_flat() {
        let data = AnswerData::Nav {
            fund_name: "Fund X".into(),
            nav: 45.67,
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["fund_name"], "Fund X");
        assert_eq!(json["nav"], 45.67);
        assert_eq!(json["date"], "2024-05-01");
    }

    #[test]
    fn test_failure_builder() {
        let answer = Answer::failure(
            IntentKind::GetNav,
            Language::English,
            ErrorKind::FundNotFound,
            "not found",
        )
        .with_candidates(vec![MatchCandidate {
            fund_id: FundId::from("F1"),
            fund_name: "Fund One".into(),
            score: 0.4,
        }]);

        assert!(!answer.success);
        assert_eq!(answer.error_kind, Some(ErrorKind::FundNotFound));
        assert!(answer.data.is_none());
        assert_eq!(answer.candidates.len(), 1);
    }
}
