//! Fund records and NAV points

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable fund identifier (scheme code)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FundId(String);

impl FundId {
    pub fn new(id: impl Into<String>) -> Self {
        let id: String = id.into();
        Self(id.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FundId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FundId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FundId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// Fund master record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundRecord {
    /// Primary key
    pub fund_id: FundId,
    /// Canonical display name
    pub name: String,
    /// Issuing fund house
    pub house: String,
    /// Free-text classification (Equity, Debt, ...)
    pub category: String,
}

impl FundRecord {
    pub fn new(
        fund_id: impl Into<FundId>,
        name: impl Into<String>,
        house: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            fund_id: fund_id.into(),
            name: name.into(),
            house: house.into(),
            category: category.into(),
        }
    }
}

/// One NAV observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavPoint {
    pub fund_id: FundId,
    pub date: NaiveDate,
    /// Currency units per fund unit
    pub nav: f64,
}

impl NavPoint {
    pub fn new(fund_id: impl Into<FundId>, date: NaiveDate, nav: f64) -> Self {
        Self {
            fund_id: fund_id.into(),
            date,
            nav,
        }
    }
}

/// Return periods, in months, the engine computes
pub const SUPPORTED_PERIOD_MONTHS: [u32; 5] = [3, 6, 12, 36, 60];
