//! CSV data source for the knowledge base
//!
//! Two tables are read:
//! - funds: `fund_id, name, house, category`
//! - NAV history: `fund_id, date, nav`
//!
//! Headers are matched case-insensitively and accept the AMFI-style aliases
//! (`scheme_code`, `fund_name`, `scheme_name`, `fund_house`, `amc`). Dates may
//! be ISO (`2024-05-01`) or AMFI (`01-05-2024`, `01-May-2024`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::fund::{FundRecord, NavPoint};
use crate::knowledge_base::KnowledgeBase;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%d-%b-%Y", "%d/%m/%Y"];

#[derive(Debug, Deserialize)]
struct FundRow {
    #[serde(alias = "scheme_code", alias = "fund_code")]
    fund_id: String,
    #[serde(alias = "fund_name", alias = "scheme_name")]
    name: String,
    #[serde(default, alias = "fund_house", alias = "amc")]
    house: String,
    #[serde(default)]
    category: String,
}

#[derive(Debug, Deserialize)]
struct NavRow {
    #[serde(alias = "scheme_code", alias = "fund_code")]
    fund_id: String,
    date: String,
    nav: String,
}

/// Load the knowledge base from the two CSV files
pub fn load_knowledge_base(funds_csv: &Path, nav_history_csv: &Path) -> Result<KnowledgeBase> {
    let funds = File::open(funds_csv)?;
    let navs = File::open(nav_history_csv)?;

    let kb = load_from_readers(
        funds,
        &funds_csv.display().to_string(),
        navs,
        &nav_history_csv.display().to_string(),
    )?;

    tracing::info!(
        funds = kb.fund_count(),
        nav_points = kb.nav_point_count(),
        funds_csv = %funds_csv.display(),
        nav_history_csv = %nav_history_csv.display(),
        "Loaded knowledge base"
    );
    Ok(kb)
}

/// Load the knowledge base from any pair of readers
pub fn load_from_readers<F: Read, N: Read>(
    funds: F,
    funds_source: &str,
    navs: N,
    navs_source: &str,
) -> Result<KnowledgeBase> {
    let mut builder = KnowledgeBase::builder();

    for (line, row) in read_rows::<_, FundRow>(funds, funds_source)? {
        if row.fund_id.trim().is_empty() || row.name.trim().is_empty() {
            return Err(invalid(funds_source, line, "fund_id and name are required"));
        }
        builder.add_fund(FundRecord::new(
            row.fund_id,
            row.name.trim(),
            row.house.trim(),
            row.category.trim(),
        ));
    }

    for (line, row) in read_rows::<_, NavRow>(navs, navs_source)? {
        let date = parse_date(&row.date)
            .ok_or_else(|| invalid(navs_source, line, &format!("unparseable date '{}'", row.date)))?;
        let nav = parse_nav(&row.nav)
            .ok_or_else(|| invalid(navs_source, line, &format!("unparseable nav '{}'", row.nav)))?;
        builder.add_nav_point(NavPoint::new(row.fund_id, date, nav));
    }

    builder.build()
}

/// Deserialize all non-blank rows, keeping their line numbers
fn read_rows<R: Read, T: for<'de> Deserialize<'de>>(reader: R, source: &str) -> Result<Vec<(u64, T)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: csv::StringRecord = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    rdr.set_headers(headers.clone());

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row = record
            .deserialize::<T>(Some(&headers))
            .map_err(|e| invalid(source, line, &e.to_string()))?;
        rows.push((line, row));
    }
    Ok(rows)
}

/// Parse a date in any of the accepted formats
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_nav(raw: &str) -> Option<f64> {
    raw.trim().replace(',', "").parse::<f64>().ok()
}

fn invalid(source: &str, line: u64, message: &str) -> Error {
    Error::InvalidRow {
        source_name: source.to_string(),
        line,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fund::FundId;
    use std::io::Write;

    const FUNDS: &str = "\
fund_id,fund_name,fund_house,category
F1,HDFC Top 100 Fund,HDFC Mutual Fund,Equity
F2,SBI Bluechip Fund,SBI Mutual Fund,Equity
";

    const NAVS: &str = "\
fund_id,date,nav
F1,2024-01-01,100.00
F1,01-02-2024,105.50
F1,01-Mar-2024,\"1,110.25\"

F2,2024-01-15,50
";

    #[test]
    fn test_load_from_readers() {
        let kb = load_from_readers(FUNDS.as_bytes(), "funds", NAVS.as_bytes(), "navs").unwrap();
        assert_eq!(kb.fund_count(), 2);
        assert_eq!(kb.nav_point_count(), 4);

        let f1 = FundId::from("F1");
        let latest = kb.latest_nav(&f1).unwrap();
        assert_eq!(latest.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!((latest.nav - 1110.25).abs() < 1e-9);
        assert_eq!(kb.lookup_fund(&f1).unwrap().house, "HDFC Mutual Fund");
    }

    #[test]
    fn test_header_case_and_aliases() {
        let funds = "Scheme_Code,Scheme_Name,AMC,Category\n100,Axis Midcap Fund,Axis,Equity\n";
        let navs = "SCHEME_CODE,Date,NAV\n100,2024-04-30,88.1\n";
        let kb = load_from_readers(funds.as_bytes(), "funds", navs.as_bytes(), "navs").unwrap();
        assert_eq!(kb.lookup_fund(&FundId::from("100")).unwrap().name, "Axis Midcap Fund");
    }

    #[test]
    fn test_bad_date_reports_line() {
        let navs = "fund_id,date,nav\nF1,2024-01-01,10\nF1,yesterday,11\n";
        let err = load_from_readers(FUNDS.as_bytes(), "funds", navs.as_bytes(), "navs").unwrap_err();
        match err {
            Error::InvalidRow { source_name, line, message } => {
                assert_eq!(source_name, "navs");
                assert_eq!(line, 3);
                assert!(message.contains("yesterday"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_orphan_nav_rejected() {
        let navs = "fund_id,date,nav\nF9,2024-01-01,10\n";
        let err = load_from_readers(FUNDS.as_bytes(), "funds", navs.as_bytes(), "navs").unwrap_err();
        assert!(matches!(err, Error::OrphanNavPoint(_)));
    }

    #[test]
    fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let funds_path = dir.path().join("funds.csv");
        let navs_path = dir.path().join("nav_history.csv");
        std::fs::File::create(&funds_path).unwrap().write_all(FUNDS.as_bytes()).unwrap();
        std::fs::File::create(&navs_path).unwrap().write_all(NAVS.as_bytes()).unwrap();

        let kb = load_knowledge_base(&funds_path, &navs_path).unwrap();
        assert_eq!(kb.fund_count(), 2);

        let missing = load_knowledge_base(&dir.path().join("nope.csv"), &navs_path).unwrap_err();
        assert!(matches!(missing, Error::Io(_)));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(parse_date("2024-05-01"), expected);
        assert_eq!(parse_date("01-05-2024"), expected);
        assert_eq!(parse_date("01-May-2024"), expected);
        assert_eq!(parse_date(" 01/05/2024 "), expected);
        assert_eq!(parse_date("May 1"), None);
    }
}
