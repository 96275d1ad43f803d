//! Intent classification and slot extraction
//!
//! Rule-based classifier over canonical text (see [`finspeak_core::text`]).
//! Intents are tried in a fixed order: `Explain`, `GetReturn`, `GetNav`,
//! then `Unknown`. The same rules apply to English, Hinglish and Devanagari
//! input; the language hint is only carried along for tracing.

use finspeak_config::{ClassifierConfig, Glossary};
use finspeak_core::{canonicalize, IntentKind, Language};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::period::{extract_period, has_inexact_period, PeriodMatch};

/// Triggers that ask for an explanation on their own
static STRONG_EXPLAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(what does|explain|define|definition|meaning|means|mean|matlab|samjhao|samjhaiye|samjhana|मतलब|अर्थ|समझाओ|समझाइए)\b",
    )
    .unwrap()
});

/// Question forms that only mean "explain" when nothing else is asked
static WEAK_EXPLAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(what is|what are|what s|whats|tell me about|kya hai|kya hain|kya hota hai|kya hoti hai|kya hote hain|क्या है|क्या हैं|क्या होता है|क्या होती है|क्या होते हैं)\b",
    )
    .unwrap()
});

static NAV_SIGNAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(nav|navs|price|value|keemat|kimat|daam|कीमत|मूल्य|भाव)\b").unwrap()
});

static RETURN_SIGNAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(return|returns|performance|perform|performed|growth|grown|gain|gains|badha|kamaya|प्रदर्शन|बढत|मुनाफा)\b",
    )
    .unwrap()
});

/// Tokens that never belong to a fund name
const QUERY_STOP_WORDS: &[&str] = &[
    // English
    "what", "whats", "s", "is", "are", "the", "a", "an", "nav", "navs", "of", "for", "current",
    "currently", "latest", "today", "todays", "now", "value", "price", "show", "me", "tell",
    "about", "get", "give", "please", "returns", "return", "performance", "perform",
    "performed", "growth", "grown", "gain", "gains", "how", "much", "has", "have", "had", "given",
    "did", "does", "was", "its", "it", "in", "over", "last", "past", "previous", "since", "ago",
    "to", "my", "from", "on", "and", "mutual", "i", "want", "know", "check", "find",
    // Hinglish
    "kya", "hai", "hain", "ka", "ki", "ke", "ko", "se", "ne", "mein", "me", "batao", "bataiye",
    "bataye", "dikhao", "dikhaiye", "kitna", "kitni", "kitne", "abhi", "aaj", "mujhe", "diya",
    "hua", "pichle", "pichhle", "pichla", "aur", "keemat", "kimat", "daam", "wala", "vala",
    "badha", "kamaya",
    // Devanagari
    "क्या", "है", "हैं", "का", "की", "के", "को", "से", "ने", "में", "बताओ", "बताइए",
    "दिखाओ", "कितना", "कितनी", "कितने", "आज", "अभी", "मुझे", "दिया", "पिछले", "वर्तमान",
    "मौजूदा", "कीमत", "मूल्य", "भाव", "और", "वाला", "प्रदर्शन", "बढत", "मुनाफा",
];

/// Filler around an explained term
const EXPLAIN_FILLER: &[&str] = &[
    "the", "a", "an", "of", "is", "are", "does", "do", "mean", "means", "term", "word",
    "me", "please", "to", "by", "ka", "ki", "ke", "ko", "hai", "hain", "kya", "hota", "hoti",
    "hote", "batao", "bataiye", "का", "की", "के", "को", "है", "हैं", "क्या", "होता", "होती",
    "होते", "बताओ", "बताइए", "यह", "ये", "ye", "yeh",
];

/// Words allowed around a glossary term ("what is nav in mutual funds")
const GENERIC_CONTEXT: &[&str] = &[
    "in", "mutual", "fund", "funds", "investing", "investment", "mein", "में", "simple",
    "words", "language", "hindi", "english",
];

/// Tokens that point at a specific fund rather than a concept
const FUND_HINTS: &[&str] = &[
    "fund", "funds", "scheme", "hdfc", "sbi", "icici", "axis", "kotak", "nippon", "tata",
    "birla", "aditya", "dsp", "franklin", "mirae", "parag", "parikh", "uti", "canara", "idfc",
    "sundaram", "motilal", "edelweiss", "bandhan", "pgim", "invesco", "quant", "baroda",
    "hsbc", "mahindra", "lic", "ppfas", "quantum",
];

/// Classified intent with its slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    GetNav {
        fund_name_phrase: String,
    },
    GetReturn {
        fund_name_phrase: String,
        period_months: u32,
    },
    Explain {
        term_phrase: String,
    },
    Unknown,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::GetNav { .. } => IntentKind::GetNav,
            Intent::GetReturn { .. } => IntentKind::GetReturn,
            Intent::Explain { .. } => IntentKind::Explain,
            Intent::Unknown => IntentKind::Unknown,
        }
    }
}

/// Rule-based intent classifier
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    /// Canonical glossary surface forms as token lists, longest first
    glossary_forms: Vec<Vec<String>>,
    default_return_months: Option<u32>,
}

impl IntentClassifier {
    pub fn new(config: &ClassifierConfig, glossary: &Glossary) -> Self {
        let forms = glossary
            .entries()
            .iter()
            .flat_map(|entry| entry.surface_forms())
            .map(str::to_string);
        Self::with_terms(config, forms)
    }

    /// Build with an explicit list of explainable terms
    pub fn with_terms(config: &ClassifierConfig, terms: impl IntoIterator<Item = String>) -> Self {
        let mut glossary_forms: Vec<Vec<String>> = terms
            .into_iter()
            .map(|term| tokens(&canonicalize(&term)))
            .filter(|form| !form.is_empty())
            .collect();
        glossary_forms.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        glossary_forms.dedup();

        Self {
            glossary_forms,
            default_return_months: config.default_return_months,
        }
    }

    /// Classify a transcript
    pub fn classify(&self, transcript: &str, language: Language) -> Intent {
        let text = canonicalize(transcript);
        let intent = if has_inexact_period(transcript) {
            Intent::Unknown
        } else {
            self.classify_canonical(&text)
        };
        tracing::debug!(
            language = language.code(),
            text = %text,
            intent = %intent.kind(),
            "Classified query"
        );
        intent
    }

    fn classify_canonical(&self, text: &str) -> Intent {
        if text.is_empty() {
            return Intent::Unknown;
        }

        let period = extract_period(text);

        if let Some(term_phrase) = self.explain_term(text, &period) {
            return Intent::Explain { term_phrase };
        }

        match period {
            PeriodMatch::Supported { months, ref span } => {
                return Intent::GetReturn {
                    fund_name_phrase: fund_phrase(text, Some(span.clone())),
                    period_months: months,
                };
            }
            PeriodMatch::Unsupported { .. } | PeriodMatch::Unrecognized { .. } => {
                return Intent::Unknown
            }
            PeriodMatch::Absent => {}
        }

        if RETURN_SIGNAL.is_match(text) {
            return match self.default_return_months {
                Some(months) => Intent::GetReturn {
                    fund_name_phrase: fund_phrase(text, None),
                    period_months: months,
                },
                None => Intent::Unknown,
            };
        }

        if NAV_SIGNAL.is_match(text) {
            return Intent::GetNav {
                fund_name_phrase: fund_phrase(text, None),
            };
        }

        Intent::Unknown
    }

    /// Term to explain, if the text is an explanation request
    fn explain_term(&self, text: &str, period: &PeriodMatch) -> Option<String> {
        let strong = STRONG_EXPLAIN.is_match(text);
        if !strong && !WEAK_EXPLAIN.is_match(text) {
            return None;
        }

        let stripped = STRONG_EXPLAIN.replace_all(text, " ");
        let stripped = WEAK_EXPLAIN.replace_all(&stripped, " ");
        let residual: Vec<String> = tokens(&stripped)
            .into_iter()
            .filter(|t| !EXPLAIN_FILLER.contains(&t.as_str()))
            .collect();

        if residual.is_empty() {
            return None;
        }

        if let Some(term) = self.glossary_term_in(&residual) {
            return Some(term);
        }

        let has_signal = NAV_SIGNAL.is_match(text)
            || RETURN_SIGNAL.is_match(text)
            || *period != PeriodMatch::Absent;
        if has_signal {
            return None;
        }

        let names_fund = residual.iter().any(|t| FUND_HINTS.contains(&t.as_str()));
        if strong || !names_fund {
            return Some(residual.join(" "));
        }
        None
    }

    /// Glossary form that makes up the residual, allowing generic context words
    fn glossary_term_in(&self, residual: &[String]) -> Option<String> {
        for form in &self.glossary_forms {
            let Some(start) = find_window(residual, form) else {
                continue;
            };
            let rest_is_generic = residual
                .iter()
                .enumerate()
                .filter(|(i, _)| *i < start || *i >= start + form.len())
                .all(|(_, t)| GENERIC_CONTEXT.contains(&t.as_str()));
            if rest_is_generic {
                return Some(form.join(" "));
            }
        }
        None
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default(), &Glossary::default())
    }
}

/// Fund-name phrase: the text minus the period span and query words
pub fn fund_phrase(text: &str, period_span: Option<std::ops::Range<usize>>) -> String {
    let without_period = match period_span {
        Some(span) => format!("{} {}", &text[..span.start], &text[span.end..]),
        None => text.to_string(),
    };

    tokens(&without_period)
        .into_iter()
        .filter(|t| !QUERY_STOP_WORDS.contains(&t.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Unicode word tokens; canonical text is already lowercase and punctuation-free
fn tokens(text: &str) -> Vec<String> {
    text.split_word_bounds()
        .filter(|w| !w.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn find_window(haystack: &[String], needle: &[String]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use finspeak_core::{normalize, SUPPORTED_PERIOD_MONTHS};

    fn classify(text: &str) -> Intent {
        IntentClassifier::default().classify(text, Language::English)
    }

    fn nav(phrase: &str) -> Intent {
        Intent::GetNav {
            fund_name_phrase: phrase.to_string(),
        }
    }

    fn ret(phrase: &str, months: u32) -> Intent {
        Intent::GetReturn {
            fund_name_phrase: phrase.to_string(),
            period_months: months,
        }
    }

    fn explain(term: &str) -> Intent {
        Intent::Explain {
            term_phrase: term.to_string(),
        }
    }

    #[test]
    fn test_nav_queries() {
        assert_eq!(classify("What is the current NAV of Fund X?"), nav("fund x"));
        assert_eq!(classify("NAV of Fnd X"), nav("fnd x"));
        assert_eq!(classify("HDFC Top 100 fund ka NAV kya hai"), nav("hdfc top 100 fund"));
        assert_eq!(classify("एचडीएफसी टॉप 100 का एनएवी क्या है?"), nav("hdfc top 100"));
        assert_eq!(classify("price of SBI Bluechip"), nav("sbi bluechip"));
    }

    #[test]
    fn test_return_queries() {
        assert_eq!(classify("Fund X ka 6 month return?"), ret("fund x", 6));
        assert_eq!(
            classify("What are the 3 year returns of HDFC Top 100?"),
            ret("hdfc top 100", 36)
        );
        assert_eq!(classify("fund x ne pichle ek saal mein kitna return diya"), ret("fund x", 12));
        assert_eq!(classify("छह महीने में फंड X का रिटर्न"), ret("fund x", 6));
        assert_eq!(classify("Nifty 50 index fund 5 saal"), ret("nifty 50 index fund", 60));
    }

    #[test]
    fn test_return_keyword_defaults_period() {
        assert_eq!(classify("How has Fund X performed?"), ret("fund x", 12));

        let strict = IntentClassifier::with_terms(
            &ClassifierConfig {
                default_return_months: None,
            },
            Vec::new(),
        );
        assert_eq!(strict.classify("Fund X returns", Language::English), Intent::Unknown);
    }

    #[test]
    fn test_unsupported_period_is_unknown() {
        assert_eq!(classify("Fund X 2 years return"), Intent::Unknown);
        assert_eq!(classify("1 month return of fund x"), Intent::Unknown);
    }

    #[test]
    fn test_unrecognized_period_is_unknown() {
        assert_eq!(classify("Fund X 90 days return"), Intent::Unknown);
        assert_eq!(classify("Fund X return over two weeks"), Intent::Unknown);
        assert_eq!(classify("Fund X ka 2 quarters return"), Intent::Unknown);
        assert_eq!(classify("फंड X का 90 दिन का रिटर्न"), Intent::Unknown);
        assert_eq!(classify("fund x ka das saal ka return"), Intent::Unknown);
        assert_eq!(classify("Fund X 1.5 years return"), Intent::Unknown);
        assert_eq!(classify("Fund X return over 3-5 years"), Intent::Unknown);
    }

    #[test]
    fn test_half_year_return() {
        assert_eq!(classify("Fund X ka half year return"), ret("fund x", 6));
        assert_eq!(classify("fund x aadha saal return"), ret("fund x", 6));
    }

    #[test]
    fn test_return_period_is_supported_or_unknown() {
        let queries = [
            "Fund X 6 month return",
            "Fund X returns",
            "Fund X 90 days return",
            "Fund X return over two weeks",
            "Fund X ka half year return",
            "fund x aadha saal ka return",
            "Fund X 2 quarters",
            "Fund X last quarter performance",
            "Fund X 18 months return",
            "Fund X 1 year",
            "Fund X ten years",
            "Fund X 7 saal",
            "फंड X का 90 दिन का रिटर्न",
            "फंड X का डेढ़ साल का रिटर्न",
            "fund x do hafte ka return",
            "fund x ytd return",
            "Fund X return this week",
            "Fund X 1.5 years return",
            "fund x ka 3 se 5 saal ka return",
        ];
        for query in queries {
            match classify(query) {
                Intent::GetReturn { period_months, .. } => assert!(
                    SUPPORTED_PERIOD_MONTHS.contains(&period_months),
                    "{query} -> {period_months}"
                ),
                Intent::Unknown => {}
                other => panic!("{query} -> {other:?}"),
            }
        }
    }

    #[test]
    fn test_devanagari_return_words() {
        assert_eq!(classify("फंड X की बढ़त"), ret("fund x", 12));
        assert_eq!(classify("फंड X का मुनाफा"), ret("fund x", 12));
        assert_eq!(classify("फंड X का प्रदर्शन"), ret("fund x", 12));
    }

    #[test]
    fn test_devanagari_word_lists_are_normalized() {
        for word in QUERY_STOP_WORDS
            .iter()
            .chain(EXPLAIN_FILLER)
            .chain(GENERIC_CONTEXT)
        {
            assert_eq!(normalize(word), *word);
        }
        for text in ["बढ़त", "मुनाफा", "प्रदर्शन", "कीमत", "मतलब", "समझाइए"] {
            let text = normalize(text);
            assert!(
                RETURN_SIGNAL.is_match(&text)
                    || NAV_SIGNAL.is_match(&text)
                    || STRONG_EXPLAIN.is_match(&text),
                "{text}"
            );
        }
    }

    #[test]
    fn test_explain_queries() {
        assert_eq!(classify("What is NAV?"), explain("nav"));
        assert_eq!(classify("what are returns"), explain("returns"));
        assert_eq!(classify("SIP kya hota hai"), explain("sip"));
        assert_eq!(classify("expense ratio ka matlab"), explain("expense ratio"));
        assert_eq!(classify("एनएवी क्या है"), explain("nav"));
        assert_eq!(classify("what is a mutual fund"), explain("mutual fund"));
        assert_eq!(classify("what is NAV in mutual funds"), explain("nav"));
        assert_eq!(classify("What does CAGR mean?"), explain("cagr"));
    }

    #[test]
    fn test_explain_unknown_term() {
        assert_eq!(classify("define sharpe ratio"), explain("sharpe ratio"));
        assert_eq!(classify("what is a debenture"), explain("debenture"));
    }

    #[test]
    fn test_fund_words_block_weak_explain() {
        assert_eq!(classify("What is HDFC Top 100?"), Intent::Unknown);
    }

    #[test]
    fn test_unknown_queries() {
        assert_eq!(classify("asdkjasd"), Intent::Unknown);
        assert_eq!(classify(""), Intent::Unknown);
        assert_eq!(classify("   ?! "), Intent::Unknown);
        assert_eq!(classify("what is"), Intent::Unknown);
    }

    #[test]
    fn test_precedence_order() {
        // Explain beats the return signal when the residual is a glossary term
        assert_eq!(classify("what are returns"), explain("returns"));
        // A period beats a NAV signal
        assert_eq!(classify("nav of fund x 6 months"), ret("fund x", 6));
    }

    #[test]
    fn test_language_hint_does_not_change_rules() {
        let classifier = IntentClassifier::default();
        for lang in Language::all() {
            assert_eq!(
                classifier.classify("Fund X ka 6 month return?", *lang),
                ret("fund x", 6)
            );
        }
    }

    #[test]
    fn test_intent_kind() {
        assert_eq!(nav("x").kind(), IntentKind::GetNav);
        assert_eq!(Intent::Unknown.kind(), IntentKind::Unknown);
    }
}
