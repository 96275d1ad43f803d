//! Time-period extraction
//!
//! Recognizes digit+unit ("6 months", "5 saal", "3 महीने") and
//! word-number ("six month", "ek saal", "छह महीने") phrases in canonical
//! text and converts them to months. Time phrases in other units ("90
//! days", "two weeks", "last quarter") are reported as unrecognized so
//! they never fall back to a default period.

use std::ops::Range;

use finspeak_core::SUPPORTED_PERIOD_MONTHS;
use once_cell::sync::Lazy;
use regex::Regex;

const MONTH_UNITS: &str = "months?|mahine|mahina|mahino|maheene|महीने|महीना|महिने|महीनों";
const YEAR_UNITS: &str = "years?|yrs?|saal|sal|साल|वर्ष|varsh|baras";
const NUMBER_WORDS: &str = "one|an|a|ek|एक|two|do|दो|three|teen|तीन|six|chhe|chah|cheh|chhah|che|छह|छः|छे|five|paanch|panch|पांच|twelve|barah|बारह";

/// Digits followed by a unit
static DIGIT_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,3}})\s*({MONTH_UNITS}|{YEAR_UNITS})\b"
    ))
    .unwrap()
});

/// Number word followed by a unit
static WORD_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b({NUMBER_WORDS})\s+({MONTH_UNITS}|{YEAR_UNITS})\b"
    ))
    .unwrap()
});

/// Half a year, in the forms people say it
static HALF_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(half\s+(?:a\s+)?year|half\s+yearly|six\s+monthly|aadha\s+saal|adha\s+saal|आधा\s+साल|आधे\s+साल)\b",
    )
    .unwrap()
});

/// Counts with no entry in [`number_word`]
const OTHER_NUMBER_WORDS: &str = "four|seven|eight|nine|ten|eleven|char|chaar|saat|aath|nau|das|dedh|dhai|चार|सात|आठ|नौ|दस|डेढ|ढाई";

const OTHER_UNITS: &str = "days?|din|dino|दिन|दिनों|weeks?|hafte|hafta|hafton|हफ्ते|हफ्ता|हफ्तों|सप्ताह|quarters?|timahi|तिमाही|fortnights?|decades?";

/// Time spans the engine cannot turn into a supported month count
static OTHER_PERIOD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"\b\d+\s*(?:{OTHER_UNITS})\b|\b(?:{NUMBER_WORDS}|{OTHER_NUMBER_WORDS})\s+(?:{OTHER_UNITS})\b|\b(?:{OTHER_NUMBER_WORDS})\s+(?:{MONTH_UNITS}|{YEAR_UNITS})\b|\b(?:weeks?|weekly|quarters?|quarterly|timahi|तिमाही|fortnights?|decades?|ytd|year\s+to\s+date)\b"
    ))
    .unwrap()
});

/// Fractions and ranges ("1.5 years", "3-5 saal") on raw text, before
/// normalization turns them into "1 5 years"
static INEXACT_COUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b\d+\s*(?:[.,/\-–]|to|or|se|ya)\s*\d+\s*(?:{MONTH_UNITS}|{YEAR_UNITS}|{OTHER_UNITS})\b"
    ))
    .unwrap()
});

static YEAR_UNIT: Lazy<Regex> = Lazy::new(|| Regex::new(&format!("^(?:{YEAR_UNITS})$")).unwrap());

/// Outcome of period extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodMatch {
    /// No period phrase in the text
    Absent,
    /// Period in the supported set
    Supported { months: u32, span: Range<usize> },
    /// Recognized but not a period the engine computes ("2 years", "1 month")
    Unsupported { months: u32, span: Range<usize> },
    /// Time phrase with no month count ("90 days", "last quarter")
    Unrecognized { span: Range<usize> },
}

impl PeriodMatch {
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            PeriodMatch::Absent => None,
            PeriodMatch::Supported { span, .. }
            | PeriodMatch::Unsupported { span, .. }
            | PeriodMatch::Unrecognized { span } => Some(span.clone()),
        }
    }

    pub fn months(&self) -> Option<u32> {
        match self {
            PeriodMatch::Supported { months, .. } => Some(*months),
            _ => None,
        }
    }
}

/// Extract the first period phrase from canonical text
pub fn extract_period(text: &str) -> PeriodMatch {
    let digit = DIGIT_PERIOD.captures(text).and_then(|caps| {
        let whole = caps.get(0)?;
        let count: u32 = caps.get(1)?.as_str().parse().ok()?;
        Some((whole.range(), count, caps.get(2)?.as_str()))
    });
    let word = WORD_PERIOD.captures(text).and_then(|caps| {
        let whole = caps.get(0)?;
        let count = number_word(caps.get(1)?.as_str())?;
        Some((whole.range(), count, caps.get(2)?.as_str()))
    });
    let counted = [digit, word].into_iter().flatten().map(|(span, count, unit)| {
        let months = if YEAR_UNIT.is_match(unit) {
            count.saturating_mul(12)
        } else {
            count
        };
        (span, Some(months))
    });
    let half = HALF_YEAR.find(text).map(|m| (m.range(), Some(6)));
    let other = OTHER_PERIOD.find(text).map(|m| (m.range(), None));

    // Earliest phrase wins; on a tie the longer one ("half a year" over "a year")
    let found = counted
        .chain(half)
        .chain(other)
        .min_by(|a, b| a.0.start.cmp(&b.0.start).then_with(|| b.0.end.cmp(&a.0.end)));

    let Some((span, months)) = found else {
        return PeriodMatch::Absent;
    };

    let Some(months) = months else {
        tracing::debug!(phrase = &text[span.clone()], "Unrecognized period");
        return PeriodMatch::Unrecognized { span };
    };

    if SUPPORTED_PERIOD_MONTHS.contains(&months) {
        PeriodMatch::Supported { months, span }
    } else {
        tracing::debug!(months, "Unsupported period");
        PeriodMatch::Unsupported { months, span }
    }
}

/// Whether the raw transcript states a fractional or ranged period
pub fn has_inexact_period(raw: &str) -> bool {
    INEXACT_COUNT.is_match(raw)
}

fn number_word(word: &str) -> Option<u32> {
    let n = match word {
        "one" | "an" | "a" | "ek" | "एक" => 1,
        "two" | "do" | "दो" => 2,
        "three" | "teen" | "तीन" => 3,
        "five" | "paanch" | "panch" | "पांच" => 5,
        "six" | "chhe" | "chah" | "cheh" | "chhah" | "che" | "छह" | "छः" | "छे" => 6,
        "twelve" | "barah" | "बारह" => 12,
        _ => return None,
    };
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finspeak_core::canonicalize;

    fn months(text: &str) -> PeriodMatch {
        extract_period(&canonicalize(text))
    }

    #[test]
    fn test_digit_periods() {
        assert_eq!(months("3 month return").months(), Some(3));
        assert_eq!(months("6 months").months(), Some(6));
        assert_eq!(months("1 year").months(), Some(12));
        assert_eq!(months("3yrs").months(), Some(36));
        assert_eq!(months("5 saal ka return").months(), Some(60));
        assert_eq!(months("12 mahine").months(), Some(12));
    }

    #[test]
    fn test_devanagari_periods() {
        assert_eq!(months("3 महीने का रिटर्न").months(), Some(3));
        assert_eq!(months("६ महीने").months(), Some(6));
        assert_eq!(months("छह महीने").months(), Some(6));
        assert_eq!(months("एक साल").months(), Some(12));
        assert_eq!(months("पाँच साल").months(), Some(60));
        assert_eq!(months("तीन साल").months(), Some(36));
    }

    #[test]
    fn test_word_periods() {
        assert_eq!(months("six month return").months(), Some(6));
        assert_eq!(months("ek saal").months(), Some(12));
        assert_eq!(months("teen mahine").months(), Some(3));
        assert_eq!(months("chhe mahine").months(), Some(6));
        assert_eq!(months("over a year").months(), Some(12));
        assert_eq!(months("five years").months(), Some(60));
    }

    #[test]
    fn test_unsupported_periods() {
        assert!(matches!(months("2 years"), PeriodMatch::Unsupported { months: 24, .. }));
        assert!(matches!(months("1 month"), PeriodMatch::Unsupported { months: 1, .. }));
        assert!(matches!(months("do saal"), PeriodMatch::Unsupported { months: 24, .. }));
    }

    #[test]
    fn test_half_year() {
        assert_eq!(months("half year return").months(), Some(6));
        assert_eq!(months("return over half a year").months(), Some(6));
        assert_eq!(months("aadha saal").months(), Some(6));
        assert_eq!(months("आधा साल").months(), Some(6));
    }

    #[test]
    fn test_unrecognized_periods() {
        for text in [
            "90 days return",
            "return over two weeks",
            "2 quarters",
            "last quarter",
            "pichle 10 din",
            "90 दिन का रिटर्न",
            "do hafte",
            "four years",
            "das saal",
            "डेढ़ साल",
            "ytd return",
        ] {
            assert!(
                matches!(months(text), PeriodMatch::Unrecognized { .. }),
                "{text}"
            );
        }
    }

    #[test]
    fn test_inexact_periods() {
        assert!(has_inexact_period("Fund X 1.5 years return"));
        assert!(has_inexact_period("fund x ka 3-5 saal ka return"));
        assert!(has_inexact_period("Fund X 3 to 5 years"));
        assert!(!has_inexact_period("Fund X 5 years"));
        assert!(!has_inexact_period("Nifty 50 index fund 5 saal"));
        assert!(!has_inexact_period("₹10,000 invested 3 years ago"));
    }

    #[test]
    fn test_absent_period() {
        assert_eq!(months("nav of fund x"), PeriodMatch::Absent);
        assert_eq!(months("hdfc top 100 fund"), PeriodMatch::Absent);
        assert_eq!(months(""), PeriodMatch::Absent);
        assert_eq!(months("what is the nav today"), PeriodMatch::Absent);
    }

    #[test]
    fn test_span_covers_phrase() {
        let text = canonicalize("Fund X ka 6 month return?");
        let found = extract_period(&text);
        let span = found.span().unwrap();
        assert_eq!(&text[span], "6 month");
    }
}
