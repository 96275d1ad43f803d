//! Curated glossary of financial terms
//!
//! Each entry carries a canonical key, aliases (expanded forms, Devanagari
//! spellings) and an explanation per language. Text missing for a language
//! falls back to English.

use std::path::Path;

use finspeak_core::{normalize, Language};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One curated term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// Canonical key, e.g. "expense ratio"
    pub key: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// English explanation
    pub en: String,
    /// Devanagari Hindi explanation
    #[serde(default)]
    pub hi: Option<String>,
    /// Roman-script Hinglish explanation
    #[serde(default)]
    pub hinglish: Option<String>,
}

impl GlossaryEntry {
    pub fn new(key: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            aliases: Vec::new(),
            en: en.into(),
            hi: None,
            hinglish: None,
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_hindi(mut self, text: impl Into<String>) -> Self {
        self.hi = Some(text.into());
        self
    }

    pub fn with_hinglish(mut self, text: impl Into<String>) -> Self {
        self.hinglish = Some(text.into());
        self
    }

    /// Explanation in `language`, falling back to English
    pub fn text(&self, language: Language) -> &str {
        let localized = match language {
            Language::English => None,
            Language::Hindi => self.hi.as_deref(),
            Language::Hinglish => self.hinglish.as_deref(),
        };
        localized.unwrap_or(&self.en)
    }

    /// Key followed by aliases
    pub fn surface_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.key.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

/// Collection of curated terms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glossary {
    #[serde(default)]
    pub terms: Vec<GlossaryEntry>,
}

impl Glossary {
    pub fn new(terms: Vec<GlossaryEntry>) -> Self {
        Self { terms }
    }

    pub fn empty() -> Self {
        Self { terms: Vec::new() }
    }

    /// Exact lookup on the normalized key or any alias
    pub fn lookup(&self, term: &str) -> Option<&GlossaryEntry> {
        let needle = normalize(term);
        if needle.is_empty() {
            return None;
        }
        self.terms
            .iter()
            .find(|entry| entry.surface_forms().any(|form| normalize(form) == needle))
    }

    pub fn entries(&self) -> &[GlossaryEntry] {
        &self.terms
    }

    /// Canonical keys, in glossary order
    pub fn keys(&self) -> Vec<&str> {
        self.terms.iter().map(|e| e.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Load from YAML or JSON, chosen by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy();
        let glossary = if path_str.ends_with(".yaml") || path_str.ends_with(".yml") {
            Self::from_yaml_file(path)?
        } else {
            Self::from_json_file(path)?
        };
        tracing::info!(terms = glossary.len(), path = %path.display(), "Loaded glossary");
        Ok(glossary)
    }

    /// Load from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = read_existing(path.as_ref())?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load from JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = read_existing(path.as_ref())?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save to JSON file
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate glossary contents
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for entry in &self.terms {
            let key = normalize(&entry.key);
            if key.is_empty() {
                errors.push("Glossary entry with empty key".to_string());
            }
            if entry.en.trim().is_empty() {
                errors.push(format!("Glossary entry '{}' has no English text", entry.key));
            }
            for form in entry.surface_forms() {
                let form = normalize(form);
                if !form.is_empty() && !seen.insert(form.clone()) {
                    errors.push(format!("Glossary surface form '{}' is used twice", form));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn read_existing(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    std::fs::read_to_string(path).map_err(|e| ConfigError::ParseError(e.to_string()))
}

impl Default for Glossary {
    fn default() -> Self {
        Self::new(vec![
            GlossaryEntry::new(
                "nav",
                "NAV (Net Asset Value) is the price of a single unit of a mutual fund. \
                 If a fund's NAV is ₹50, one unit costs ₹50 that day.",
            )
            .with_aliases(&["net asset value", "एनएवी", "एन ए वी"])
            .with_hindi(
                "NAV यानी नेट एसेट वैल्यू, म्यूचुअल फंड की एक यूनिट की कीमत है। \
                 अगर NAV ₹50 है तो उस दिन एक यूनिट ₹50 में मिलेगी।",
            )
            .with_hinglish(
                "NAV yaani Net Asset Value, fund ki ek unit ka daam. \
                 NAV ₹50 hai toh us din ek unit ₹50 mein milegi.",
            ),
            GlossaryEntry::new(
                "sip",
                "A SIP (Systematic Investment Plan) invests a fixed amount in a mutual fund \
                 at regular intervals, usually monthly. Many funds accept SIPs from ₹500.",
            )
            .with_aliases(&["systematic investment plan", "एसआईपी", "एस आई पी"])
            .with_hindi(
                "SIP यानी सिस्टमैटिक इन्वेस्टमेंट प्लान, जिसमें हर महीने एक तय रकम \
                 म्यूचुअल फंड में लगाई जाती है। कई फंड ₹500 से SIP शुरू करने देते हैं।",
            )
            .with_hinglish(
                "SIP mein aap har mahine ek fixed amount mutual fund mein daalte ho, \
                 bank ki RD jaisa. Kai funds mein ₹500 se shuru kar sakte ho.",
            ),
            GlossaryEntry::new(
                "returns",
                "Returns measure how much an investment gained or lost. \
                 ₹1,000 growing to ₹1,150 is a 15% return.",
            )
            .with_aliases(&["return", "रिटर्न", "रिटर्न्स"])
            .with_hindi(
                "रिटर्न बताता है कि निवेश पर कितना फायदा या नुकसान हुआ। \
                 ₹1,000 अगर ₹1,150 हो जाएं तो रिटर्न 15% है।",
            )
            .with_hinglish(
                "Return matlab aapke paise ne kitna kamaya ya gawaya. \
                 ₹1,000 ke ₹1,150 ho gaye toh 15% return hua.",
            ),
            GlossaryEntry::new(
                "mutual fund",
                "A mutual fund pools money from many investors and a professional manager \
                 invests it in stocks, bonds or both on their behalf.",
            )
            .with_aliases(&["mutual funds", "म्यूचुअल फंड", "म्युचुअल फंड"])
            .with_hindi(
                "म्यूचुअल फंड कई निवेशकों का पैसा इकट्ठा करता है और एक प्रोफेशनल \
                 फंड मैनेजर उसे शेयरों या बॉन्ड में लगाता है।",
            )
            .with_hinglish(
                "Mutual fund mein bahut saare log paisa daalte hain aur ek expert fund \
                 manager use stocks ya bonds mein lagata hai.",
            ),
            GlossaryEntry::new(
                "expense ratio",
                "The expense ratio is the yearly fee a fund charges to manage your money. \
                 At 1%, a ₹10,000 investment pays about ₹100 a year.",
            )
            .with_aliases(&["एक्सपेंस रेशियो"])
            .with_hindi(
                "एक्सपेंस रेशियो वह सालाना फीस है जो फंड पैसा संभालने के लिए लेता है। \
                 1% पर ₹10,000 के निवेश पर लगभग ₹100 सालाना लगते हैं।",
            )
            .with_hinglish(
                "Expense ratio fund ki saalana fees hai. 1% ho toh ₹10,000 par \
                 lagbhag ₹100 har saal katte hain. Kam ratio behtar.",
            ),
            GlossaryEntry::new(
                "aum",
                "AUM (Assets Under Management) is the total money a fund manages \
                 on behalf of all its investors.",
            )
            .with_aliases(&["assets under management", "एयूएम"])
            .with_hindi("AUM यानी एसेट्स अंडर मैनेजमेंट, वह कुल पैसा जो फंड अपने सभी निवेशकों के लिए संभालता है।")
            .with_hinglish("AUM matlab kul kitna paisa fund sab investors ki taraf se manage kar raha hai."),
            GlossaryEntry::new(
                "cagr",
                "CAGR (Compound Annual Growth Rate) is the steady yearly rate that would \
                 turn the starting value into the ending value over the period.",
            )
            .with_aliases(&["compound annual growth rate", "सीएजीआर"])
            .with_hindi("CAGR यानी कंपाउंड एनुअल ग्रोथ रेट, निवेश की औसत सालाना बढ़त की दर।")
            .with_hinglish("CAGR matlab average saalana growth rate. 12% CAGR yaani paisa har saal average 12% badha."),
            GlossaryEntry::new(
                "exit load",
                "Exit load is a charge for redeeming units before a set period, \
                 commonly 1% if you withdraw within a year.",
            )
            .with_aliases(&["एक्जिट लोड", "एग्जिट लोड"])
            .with_hindi("एग्जिट लोड वह शुल्क है जो तय समय से पहले पैसा निकालने पर लगता है, आमतौर पर एक साल के अंदर 1%।")
            .with_hinglish("Exit load jaldi paisa nikalne ka charge hai, aksar 1 saal ke andar nikalo toh 1%."),
            GlossaryEntry::new(
                "elss",
                "ELSS (Equity Linked Savings Scheme) is a tax-saving equity fund under \
                 Section 80C with a three-year lock-in.",
            )
            .with_aliases(&["equity linked savings scheme", "ईएलएसएस"])
            .with_hindi("ELSS एक टैक्स बचाने वाला इक्विटी फंड है जिस पर धारा 80C की छूट मिलती है और तीन साल का लॉक-इन होता है।")
            .with_hinglish("ELSS tax bachane wala equity fund hai, Section 80C ke under. Paisa 3 saal lock rehta hai."),
            GlossaryEntry::new(
                "large cap",
                "Large cap funds invest in the biggest listed companies. \
                 They tend to be steadier, with moderate returns.",
            )
            .with_aliases(&["large cap fund", "largecap", "लार्ज कैप"])
            .with_hindi("लार्ज कैप फंड सबसे बड़ी कंपनियों में निवेश करते हैं। इनमें उतार-चढ़ाव कम और रिटर्न मध्यम होते हैं।")
            .with_hinglish("Large cap fund badi companies mein paisa lagate hain. Risk kam, return moderate."),
            GlossaryEntry::new(
                "small cap",
                "Small cap funds invest in smaller companies. They can grow fast \
                 but swing sharply, so they suit long horizons.",
            )
            .with_aliases(&["small cap fund", "smallcap", "स्मॉल कैप"])
            .with_hindi("स्मॉल कैप फंड छोटी कंपनियों में निवेश करते हैं। बढ़त तेज़ हो सकती है पर जोखिम भी ज़्यादा है।")
            .with_hinglish("Small cap fund chhoti companies mein invest karte hain. Return zyada ho sakta hai par risk bhi zyada."),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_glossary() {
        let glossary = Glossary::default();
        assert_eq!(glossary.len(), 11);
        assert!(glossary.validate().is_ok());
        assert!(glossary.keys().contains(&"expense ratio"));
    }

    #[test]
    fn test_lookup_key_and_alias() {
        let glossary = Glossary::default();
        assert_eq!(glossary.lookup("NAV").unwrap().key, "nav");
        assert_eq!(glossary.lookup("Net Asset Value").unwrap().key, "nav");
        assert_eq!(glossary.lookup("एनएवी").unwrap().key, "nav");
        assert_eq!(glossary.lookup("  Expense-Ratio? ").unwrap().key, "expense ratio");
        assert!(glossary.lookup("fixed deposit").is_none());
        assert!(glossary.lookup("").is_none());
    }

    #[test]
    fn test_language_fallback() {
        let entry = GlossaryEntry::new("nav", "english text").with_hinglish("hinglish text");
        assert_eq!(entry.text(Language::Hinglish), "hinglish text");
        assert_eq!(entry.text(Language::Hindi), "english text");
        assert_eq!(entry.text(Language::English), "english text");
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let glossary = Glossary::new(vec![
            GlossaryEntry::new("nav", "a").with_aliases(&["price"]),
            GlossaryEntry::new("sip", "b").with_aliases(&["Price"]),
        ]);
        let errors = glossary.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_yaml_and_json_roundtrip_files() {
        let dir = tempfile::tempdir().unwrap();
        let glossary = Glossary::default();

        let yaml = dir.path().join("glossary.yaml");
        glossary.to_yaml_file(&yaml).unwrap();
        assert_eq!(Glossary::from_file(&yaml).unwrap(), glossary);

        let json = dir.path().join("glossary.json");
        glossary.to_json_file(&json).unwrap();
        assert_eq!(Glossary::from_file(&json).unwrap(), glossary);
    }

    #[test]
    fn test_missing_file() {
        let err = Glossary::from_file("/nonexistent/glossary.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
