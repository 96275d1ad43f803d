//! Immutable fund knowledge base
//!
//! A `KnowledgeBase` is built once from fund records and NAV points, validated,
//! and never mutated afterwards. Reloading means building a new one and
//! swapping it in through [`crate::KnowledgeBaseHandle`].

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use strsim::jaro_winkler;

use crate::error::{Error, Result};
use crate::fund::{FundId, FundRecord, NavPoint};
use crate::text::normalize;

/// Per-token similarity needed for a fuzzy search hit
const SEARCH_FUZZY_THRESHOLD: f64 = 0.88;

/// Fund record with its precomputed comparison keys
#[derive(Debug, Clone)]
struct IndexedFund {
    record: FundRecord,
    name_key: String,
    house_key: String,
    category_key: String,
}

impl IndexedFund {
    fn new(record: FundRecord) -> Self {
        Self {
            name_key: normalize(&record.name),
            house_key: normalize(&record.house),
            category_key: normalize(&record.category),
            record,
        }
    }

    /// Search rank for a normalized query, lower is better
    fn search_rank(&self, query: &str) -> Option<u8> {
        if self.name_key.starts_with(query) {
            return Some(0);
        }
        if self.name_key.split(' ').any(|token| token.starts_with(query)) {
            return Some(1);
        }
        if self.name_key.contains(query) || self.house_key.contains(query) {
            return Some(2);
        }
        if self.category_key.contains(query) {
            return Some(3);
        }

        let fuzzy_hit = query.split(' ').all(|q| {
            self.name_key
                .split(' ')
                .chain(self.house_key.split(' '))
                .any(|token| jaro_winkler(q, token) >= SEARCH_FUZZY_THRESHOLD)
        });
        fuzzy_hit.then_some(4)
    }
}

/// Read-only store of funds and NAV history
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    funds: BTreeMap<FundId, IndexedFund>,
    /// Sorted ascending by date, one point per date
    history: HashMap<FundId, Vec<NavPoint>>,
    loaded_at: DateTime<Utc>,
}

impl KnowledgeBase {
    /// Start building a knowledge base
    pub fn builder() -> KnowledgeBaseBuilder {
        KnowledgeBaseBuilder::default()
    }

    /// An empty knowledge base (no funds, no history)
    pub fn empty() -> Self {
        Self {
            funds: BTreeMap::new(),
            history: HashMap::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Chronologically last NAV point of a fund
    pub fn latest_nav(&self, fund_id: &FundId) -> Result<&NavPoint> {
        self.history_of(fund_id)?
            .last()
            .ok_or_else(|| Error::NoDataForFund(fund_id.clone()))
    }

    /// Chronologically first NAV point of a fund
    pub fn earliest_nav(&self, fund_id: &FundId) -> Result<&NavPoint> {
        self.history_of(fund_id)?
            .first()
            .ok_or_else(|| Error::NoDataForFund(fund_id.clone()))
    }

    /// Most recent NAV point with `date <= target`
    pub fn nav_on_or_before(&self, fund_id: &FundId, target: NaiveDate) -> Result<&NavPoint> {
        let points = self.history_of(fund_id)?;
        if points.is_empty() {
            return Err(Error::NoDataForFund(fund_id.clone()));
        }

        let idx = points.partition_point(|p| p.date <= target);
        if idx == 0 {
            return Err(Error::NoDataBeforeDate {
                fund_id: fund_id.clone(),
                date: target,
            });
        }
        Ok(&points[idx - 1])
    }

    /// Full NAV history of a fund, oldest first
    pub fn nav_history(&self, fund_id: &FundId) -> Result<&[NavPoint]> {
        self.history_of(fund_id)
    }

    /// Look up a fund record
    pub fn lookup_fund(&self, fund_id: &FundId) -> Result<&FundRecord> {
        self.funds
            .get(fund_id)
            .map(|f| &f.record)
            .ok_or_else(|| Error::UnknownFund(fund_id.clone()))
    }

    /// Discovery search over name, house and category
    ///
    /// Ranking: name prefix, word prefix, name/house substring, category
    /// substring, then per-token fuzzy hits. Ties are ordered by name.
    pub fn search_funds(&self, query: &str) -> Vec<&FundRecord> {
        let query = normalize(query);
        if query.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<(u8, &IndexedFund)> = self
            .funds
            .values()
            .filter_map(|f| f.search_rank(&query).map(|rank| (rank, f)))
            .collect();

        hits.sort_by(|(ra, a), (rb, b)| {
            ra.cmp(rb)
                .then_with(|| a.record.name.cmp(&b.record.name))
                .then_with(|| a.record.fund_id.cmp(&b.record.fund_id))
        });

        hits.into_iter().map(|(_, f)| &f.record).collect()
    }

    /// All funds ordered by id
    pub fn funds(&self) -> impl Iterator<Item = &FundRecord> {
        self.funds.values().map(|f| &f.record)
    }

    /// Funds paired with their normalized name, ordered by id
    pub fn fund_name_keys(&self) -> impl Iterator<Item = (&FundRecord, &str)> {
        self.funds
            .values()
            .map(|f| (&f.record, f.name_key.as_str()))
    }

    pub fn fund_count(&self) -> usize {
        self.funds.len()
    }

    pub fn nav_point_count(&self) -> usize {
        self.history.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.funds.is_empty()
    }

    /// When this snapshot was built
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    fn history_of(&self, fund_id: &FundId) -> Result<&[NavPoint]> {
        if !self.funds.contains_key(fund_id) {
            return Err(Error::UnknownFund(fund_id.clone()));
        }
        Ok(self
            .history
            .get(fund_id)
            .map(Vec::as_slice)
            .unwrap_or(&[]))
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::empty()
    }
}

/// Collects records and validates them into a [`KnowledgeBase`]
#[derive(Debug, Default)]
pub struct KnowledgeBaseBuilder {
    funds: Vec<FundRecord>,
    points: Vec<NavPoint>,
}

impl KnowledgeBaseBuilder {
    pub fn add_fund(&mut self, record: FundRecord) -> &mut Self {
        self.funds.push(record);
        self
    }

    pub fn add_nav_point(&mut self, point: NavPoint) -> &mut Self {
        self.points.push(point);
        self
    }

    /// Chainable fund insert
    pub fn fund(mut self, record: FundRecord) -> Self {
        self.add_fund(record);
        self
    }

    /// Chainable NAV insert
    pub fn nav(mut self, fund_id: impl Into<FundId>, date: NaiveDate, nav: f64) -> Self {
        self.add_nav_point(NavPoint::new(fund_id, date, nav));
        self
    }

    /// Validate and freeze
    pub fn build(self) -> Result<KnowledgeBase> {
        let mut funds = BTreeMap::new();
        for record in self.funds {
            let id = record.fund_id.clone();
            if funds.insert(id.clone(), IndexedFund::new(record)).is_some() {
                return Err(Error::DuplicateFund(id));
            }
        }

        let mut history: HashMap<FundId, Vec<NavPoint>> = HashMap::new();
        let mut seen: HashSet<(FundId, NaiveDate)> = HashSet::new();
        for point in self.points {
            if !funds.contains_key(&point.fund_id) {
                return Err(Error::OrphanNavPoint(point.fund_id));
            }
            if !point.nav.is_finite() || point.nav <= 0.0 {
                return Err(Error::InvalidNav {
                    fund_id: point.fund_id,
                    date: point.date,
                    nav: point.nav,
                });
            }
            if !seen.insert((point.fund_id.clone(), point.date)) {
                return Err(Error::DuplicateNavPoint {
                    fund_id: point.fund_id,
                    date: point.date,
                });
            }
            history.entry(point.fund_id.clone()).or_default().push(point);
        }

        for points in history.values_mut() {
            points.sort_by_key(|p| p.date);
        }

        let kb = KnowledgeBase {
            funds,
            history,
            loaded_at: Utc::now(),
        };
        tracing::debug!(
            funds = kb.fund_count(),
            nav_points = kb.nav_point_count(),
            "Built knowledge base snapshot"
        );
        Ok(kb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> KnowledgeBase {
        KnowledgeBase::builder()
            .fund(FundRecord::new("F1", "HDFC Top 100 Fund", "HDFC Mutual Fund", "Equity"))
            .fund(FundRecord::new("F2", "SBI Bluechip Fund", "SBI Mutual Fund", "Equity"))
            .fund(FundRecord::new("F3", "ICICI Liquid Fund", "ICICI Prudential", "Debt"))
            .fund(FundRecord::new("F4", "Empty History Fund", "Nobody AMC", "Equity"))
            // Out of order on purpose
            .nav("F1", d(2024, 3, 1), 110.0)
            .nav("F1", d(2024, 1, 1), 100.0)
            .nav("F1", d(2024, 2, 1), 105.0)
            .nav("F2", d(2024, 1, 15), 50.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_latest_and_earliest() {
        let kb = sample();
        let f1 = FundId::from("F1");
        assert_eq!(kb.latest_nav(&f1).unwrap().date, d(2024, 3, 1));
        assert_eq!(kb.earliest_nav(&f1).unwrap().nav, 100.0);
        assert_eq!(kb.nav_history(&f1).unwrap().len(), 3);
    }

    #[test]
    fn test_latest_nav_without_history() {
        let kb = sample();
        let err = kb.latest_nav(&FundId::from("F4")).unwrap_err();
        assert!(matches!(err, Error::NoDataForFund(_)));

        let err = kb.latest_nav(&FundId::from("NOPE")).unwrap_err();
        assert!(matches!(err, Error::UnknownFund(_)));
    }

    #[test]
    fn test_nav_on_or_before_tolerates_gaps() {
        let kb = sample();
        let f1 = FundId::from("F1");

        // Exact date
        assert_eq!(kb.nav_on_or_before(&f1, d(2024, 2, 1)).unwrap().nav, 105.0);
        // Gap: falls back to the previous trading date
        assert_eq!(kb.nav_on_or_before(&f1, d(2024, 2, 20)).unwrap().nav, 105.0);
        // After the last point
        assert_eq!(kb.nav_on_or_before(&f1, d(2025, 1, 1)).unwrap().nav, 110.0);
    }

    #[test]
    fn test_nav_on_or_before_earlier_than_history() {
        let kb = sample();
        let err = kb
            .nav_on_or_before(&FundId::from("F1"), d(2023, 12, 31))
            .unwrap_err();
        assert!(matches!(err, Error::NoDataBeforeDate { .. }));
    }

    #[test]
    fn test_build_rejects_duplicates() {
        let err = KnowledgeBase::builder()
            .fund(FundRecord::new("F1", "A", "H", "C"))
            .fund(FundRecord::new("F1", "B", "H", "C"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateFund(_)));

        let err = KnowledgeBase::builder()
            .fund(FundRecord::new("F1", "A", "H", "C"))
            .nav("F1", d(2024, 1, 1), 10.0)
            .nav("F1", d(2024, 1, 1), 11.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateNavPoint { .. }));
    }

    #[test]
    fn test_build_rejects_bad_points() {
        let err = KnowledgeBase::builder()
            .nav("GHOST", d(2024, 1, 1), 10.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::OrphanNavPoint(_)));

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = KnowledgeBase::builder()
                .fund(FundRecord::new("F1", "A", "H", "C"))
                .nav("F1", d(2024, 1, 1), bad)
                .build()
                .unwrap_err();
            assert!(matches!(err, Error::InvalidNav { .. }));
        }
    }

    #[test]
    fn test_search_ranking() {
        let kb = sample();

        let names: Vec<&str> = kb.search_funds("hdfc").iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["HDFC Top 100 Fund"]);

        // Word prefix
        let names: Vec<&str> = kb.search_funds("blue").iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["SBI Bluechip Fund"]);

        // Category match
        let names: Vec<&str> = kb.search_funds("debt").iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["ICICI Liquid Fund"]);

        // Prefix hits sort before plain substring hits
        let results = kb.search_funds("fund");
        assert_eq!(results.len(), 4);
    }

    #[test]
    fn test_search_fuzzy_and_empty() {
        let kb = sample();
        let names: Vec<&str> = kb.search_funds("bluechp").iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["SBI Bluechip Fund"]);

        assert!(kb.search_funds("   ").is_empty());
        assert!(kb.search_funds("zzzzqqq").is_empty());
    }
}
