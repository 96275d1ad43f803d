//! Query understanding and answer engine
//!
//! Features:
//! - Rule-based intent classification with period and fund-phrase slots
//! - Fuzzy fund-name matching with ambiguity detection
//! - Point-to-point return computation
//! - Curated and generative term explanation
//! - Answer templating in English, Hinglish and Hindi

pub mod classifier;
pub mod explain;
pub mod matcher;
pub mod period;
pub mod resolver;
pub mod returns;
pub mod templates;

pub use classifier::{Intent, IntentClassifier};
pub use explain::{CuratedExplainer, ExplanationService};
pub use matcher::{FundMatcher, MatchOutcome, MatchResult};
pub use period::{extract_period, has_inexact_period, PeriodMatch};
pub use resolver::QueryResolver;
pub use returns::{compute_return, ReturnFigures};

use chrono::NaiveDate;
use finspeak_core::{ErrorKind, FundId};
use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Not enough NAV history for fund {fund_id} back to {start_date}")]
    InsufficientHistory { fund_id: FundId, start_date: NaiveDate },

    #[error("Unsupported period: {0} months")]
    UnsupportedPeriod(u32),

    #[error(transparent)]
    Core(#[from] finspeak_core::Error),
}

impl AgentError {
    /// Answer error category for this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::InsufficientHistory { .. } => ErrorKind::InsufficientHistory,
            AgentError::UnsupportedPeriod(_) => ErrorKind::UnrecognizedQuery,
            AgentError::Core(err) => core_error_kind(err),
        }
    }
}

fn core_error_kind(err: &finspeak_core::Error) -> ErrorKind {
    use finspeak_core::Error;
    match err {
        Error::UnknownFund(_) => ErrorKind::FundNotFound,
        Error::NoDataBeforeDate { .. } => ErrorKind::NoDataBeforeDate,
        Error::ExplanationUnavailable(_) | Error::Explanation(_) => {
            ErrorKind::ExplanationUnavailable
        }
        _ => ErrorKind::NoDataForFund,
    }
}
