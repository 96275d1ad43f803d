//! Point-to-point return computation
//!
//! `returns_percent = (latest - base) / base * 100`, where `base` is the last
//! NAV on or before `latest.date - months`. Simple percentage for every
//! period, never annualized.

use chrono::Months;
use finspeak_core::{FundId, KnowledgeBase, NavPoint, SUPPORTED_PERIOD_MONTHS};

use crate::AgentError;

/// Inputs and result of one return computation
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnFigures {
    pub period_months: u32,
    pub start: NavPoint,
    pub end: NavPoint,
    /// Rounded to 2 decimals
    pub returns_percent: f64,
    pub absolute_change: f64,
}

/// Compute the return of `fund_id` over the last `months` months
pub fn compute_return(
    kb: &KnowledgeBase,
    fund_id: &FundId,
    months: u32,
) -> Result<ReturnFigures, AgentError> {
    if !SUPPORTED_PERIOD_MONTHS.contains(&months) {
        return Err(AgentError::UnsupportedPeriod(months));
    }

    let end = kb.latest_nav(fund_id)?.clone();

    // chrono clamps to the last day of the target month
    let start_date = end
        .date
        .checked_sub_months(Months::new(months))
        .ok_or(AgentError::UnsupportedPeriod(months))?;

    let start = kb
        .nav_on_or_before(fund_id, start_date)
        .map_err(|_| AgentError::InsufficientHistory {
            fund_id: fund_id.clone(),
            start_date,
        })?
        .clone();

    let absolute_change = end.nav - start.nav;
    let returns_percent = round2(absolute_change / start.nav * 100.0);

    tracing::debug!(
        fund_id = %fund_id,
        months,
        start = %start.date,
        end = %end.date,
        returns_percent,
        "Computed return"
    );

    Ok(ReturnFigures {
        period_months: months,
        start,
        end,
        returns_percent,
        absolute_change,
    })
}

/// Round half away from zero to 2 decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finspeak_core::FundRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn kb() -> KnowledgeBase {
        KnowledgeBase::builder()
            .fund(FundRecord::new("F1", "Fund One", "House", "Equity"))
            .fund(FundRecord::new("F2", "Fund Two", "House", "Equity"))
            .nav("F1", date(2023, 5, 1), 100.0)
            .nav("F1", date(2023, 11, 1), 104.0)
            .nav("F1", date(2024, 2, 29), 108.0)
            .nav("F1", date(2024, 5, 1), 112.5)
            .nav("F2", date(2024, 1, 10), 10.0)
            .nav("F2", date(2024, 5, 31), 11.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_twelve_month_return() {
        let figures = compute_return(&kb(), &FundId::from("F1"), 12).unwrap();
        assert!((figures.returns_percent - 12.5).abs() < 1e-6);
        assert_eq!(figures.start.date, date(2023, 5, 1));
        assert_eq!(figures.end.date, date(2024, 5, 1));
        assert!((figures.absolute_change - 12.5).abs() < 1e-9);
    }

    #[test]
    fn test_base_uses_last_nav_before_gap() {
        // 2024-05-01 minus 6 months is 2023-11-01
        let figures = compute_return(&kb(), &FundId::from("F1"), 6).unwrap();
        assert_eq!(figures.start.date, date(2023, 11, 1));

        // 2024-05-01 minus 3 months is 2024-02-01, last point before is 2023-11-01
        let figures = compute_return(&kb(), &FundId::from("F1"), 3).unwrap();
        assert_eq!(figures.start.date, date(2023, 11, 1));
        assert!((figures.returns_percent - 8.17).abs() < 1e-6);
    }

    #[test]
    fn test_end_of_month_clamp() {
        // 2024-05-31 minus 3 months clamps to 2024-02-29
        let figures = compute_return(&kb(), &FundId::from("F2"), 3).unwrap();
        assert_eq!(figures.start.date, date(2024, 1, 10));
        assert!((figures.returns_percent - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_insufficient_history() {
        let err = compute_return(&kb(), &FundId::from("F1"), 36).unwrap_err();
        assert!(matches!(err, AgentError::InsufficientHistory { .. }));
    }

    #[test]
    fn test_unknown_fund_and_bad_period() {
        assert!(compute_return(&kb(), &FundId::from("F9"), 12).is_err());
        assert!(matches!(
            compute_return(&kb(), &FundId::from("F1"), 24),
            Err(AgentError::UnsupportedPeriod(24))
        ));
    }

    #[test]
    fn test_idempotent() {
        let kb = kb();
        let id = FundId::from("F1");
        assert_eq!(
            compute_return(&kb, &id, 6).unwrap(),
            compute_return(&kb, &id, 6).unwrap()
        );
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.345_6), 12.35);
        assert_eq!(round2(-3.333), -3.33);
    }
}
