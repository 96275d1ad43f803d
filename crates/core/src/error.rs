//! Error types shared across the engine

use chrono::NaiveDate;
use thiserror::Error;

use crate::fund::FundId;

/// Core errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("No NAV history for fund {0}")]
    NoDataForFund(FundId),

    #[error("No NAV for fund {fund_id} on or before {date}")]
    NoDataBeforeDate { fund_id: FundId, date: NaiveDate },

    #[error("Unknown fund: {0}")]
    UnknownFund(FundId),

    #[error("Duplicate fund id: {0}")]
    DuplicateFund(FundId),

    #[error("Duplicate NAV point for fund {fund_id} on {date}")]
    DuplicateNavPoint { fund_id: FundId, date: NaiveDate },

    #[error("NAV point references unknown fund {0}")]
    OrphanNavPoint(FundId),

    #[error("Invalid NAV {nav} for fund {fund_id} on {date}")]
    InvalidNav {
        fund_id: FundId,
        date: NaiveDate,
        nav: f64,
    },

    #[error("Invalid row in {source_name} at line {line}: {message}")]
    InvalidRow {
        source_name: String,
        line: u64,
        message: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Explanation unavailable: {0}")]
    ExplanationUnavailable(String),

    #[error("Explanation backend error: {0}")]
    Explanation(String),
}

pub type Result<T> = std::result::Result<T, Error>;
