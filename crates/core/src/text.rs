//! Text normalization for transcripts, fund names and glossary keys
//!
//! Every comparison in the engine happens on normalized text so that
//! Devanagari, transliterated Hindi and English tokens line up:
//! - Unicode canonical form with Latin accents, nukta and ZWJ/ZWNJ folded away
//! - lowercase
//! - Devanagari digits mapped to ASCII digits
//! - punctuation (including danda) replaced by whitespace, digits kept
//! - whitespace collapsed

use std::collections::HashMap;

use once_cell::sync::Lazy;
use unicode_normalization::UnicodeNormalization;

use crate::language::is_devanagari;

/// Devanagari loanwords and brand names mapped to the Roman token the
/// rest of the engine uses. Multi-token keys are matched greedily.
const LOANWORDS: &[(&str, &str)] = &[
    ("एन ए वी", "nav"),
    ("एनएवी", "nav"),
    ("नेव", "nav"),
    ("रिटर्न", "return"),
    ("रिटर्न्स", "returns"),
    ("फंड", "fund"),
    ("फण्ड", "fund"),
    ("फंड्स", "funds"),
    ("म्यूचुअल", "mutual"),
    ("म्युचुअल", "mutual"),
    ("एस आई पी", "sip"),
    ("एसआईपी", "sip"),
    ("सीएजीआर", "cagr"),
    ("एयूएम", "aum"),
    ("ईएलएसएस", "elss"),
    ("एक्सपेंस", "expense"),
    ("रेशियो", "ratio"),
    ("एक्जिट", "exit"),
    ("एग्जिट", "exit"),
    ("लोड", "load"),
    ("एचडीएफसी", "hdfc"),
    ("एसबीआई", "sbi"),
    ("आईसीआईसीआई", "icici"),
    ("एक्सिस", "axis"),
    ("कोटक", "kotak"),
    ("निप्पॉन", "nippon"),
    ("टाटा", "tata"),
    ("बिड़ला", "birla"),
    ("आदित्य", "aditya"),
    ("यूटीआई", "uti"),
    ("मिराए", "mirae"),
    ("पराग", "parag"),
    ("पारिख", "parikh"),
    ("क्वांट", "quant"),
    ("टॉप", "top"),
    ("इक्विटी", "equity"),
    ("लार्ज", "large"),
    ("मिड", "mid"),
    ("स्मॉल", "small"),
    ("कैप", "cap"),
    ("ब्लूचिप", "bluechip"),
    ("फ्लेक्सी", "flexi"),
    ("इंडेक्स", "index"),
    ("निफ्टी", "nifty"),
    ("ग्रोथ", "growth"),
    ("डायरेक्ट", "direct"),
    ("प्लान", "plan"),
];

/// Loanword table keyed by normalized token sequences
static LOANWORD_TABLE: Lazy<HashMap<Vec<String>, &'static str>> = Lazy::new(|| {
    LOANWORDS
        .iter()
        .map(|(dev, roman)| {
            let key = normalize(dev)
                .split(' ')
                .map(str::to_string)
                .collect::<Vec<_>>();
            (key, *roman)
        })
        .collect()
});

/// Longest loanword key, in tokens
static LOANWORD_MAX_TOKENS: Lazy<usize> =
    Lazy::new(|| LOANWORD_TABLE.keys().map(Vec::len).max().unwrap_or(1));

/// Normalize text for comparison
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());

    for c in text.nfd() {
        match c {
            // Latin combining accents, Devanagari nukta, ZWNJ/ZWJ
            '\u{0300}'..='\u{036F}' | '\u{093C}' | '\u{200C}' | '\u{200D}' => continue,
            // Chandrabindu folds onto anusvara (पाँच == पांच)
            '\u{0901}' => folded.push('\u{0902}'),
            // Danda and double danda are sentence punctuation
            '\u{0964}' | '\u{0965}' => folded.push(' '),
            '\u{0966}'..='\u{096F}' => {
                let digit = (c as u32 - 0x0966) as u8;
                folded.push(char::from(b'0' + digit));
            }
            c if is_devanagari(c) => folded.push(c),
            c if c.is_alphanumeric() => folded.extend(c.to_lowercase()),
            _ => folded.push(' '),
        }
    }

    let composed: String = folded.nfc().collect();
    composed.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace known Devanagari loanwords in normalized text with Roman tokens
pub fn transliterate_loanwords(normalized: &str) -> String {
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    let mut out: Vec<String> = Vec::with_capacity(tokens.len());
    let mut i = 0;

    'outer: while i < tokens.len() {
        let longest = (*LOANWORD_MAX_TOKENS).min(tokens.len() - i);
        for width in (1..=longest).rev() {
            let window: Vec<String> = tokens[i..i + width].iter().map(|t| t.to_string()).collect();
            if let Some(roman) = LOANWORD_TABLE.get(&window) {
                out.push((*roman).to_string());
                i += width;
                continue 'outer;
            }
        }
        out.push(tokens[i].to_string());
        i += 1;
    }

    out.join(" ")
}

/// Normalize and transliterate in one step
pub fn canonicalize(text: &str) -> String {
    transliterate_loanwords(&normalize(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation_and_case() {
        assert_eq!(
            normalize("What is the current NAV of Fund X?"),
            "what is the current nav of fund x"
        );
        assert_eq!(normalize("  HDFC Top-100   Fund "), "hdfc top 100 fund");
        assert_eq!(normalize("???"), "");
    }

    #[test]
    fn test_normalize_keeps_digits() {
        assert_eq!(normalize("Nifty 50 (Direct) 12.5"), "nifty 50 direct 12 5");
    }

    #[test]
    fn test_normalize_devanagari() {
        assert_eq!(normalize("एनएवी क्या है?"), "एनएवी क्या है");
        assert_eq!(normalize("६ महीने।"), "6 महीने");
        // Chandrabindu and anusvara spellings compare equal
        assert_eq!(normalize("पाँच साल"), normalize("पांच साल"));
    }

    #[test]
    fn test_normalize_strips_latin_accents() {
        assert_eq!(normalize("Café Fund"), "cafe fund");
    }

    #[test]
    fn test_normalize_drops_joiners() {
        assert_eq!(normalize("फंड\u{200D}"), "फंड");
    }

    #[test]
    fn test_transliterate_loanwords() {
        assert_eq!(canonicalize("एचडीएफसी टॉप 100 का एनएवी"), "hdfc top 100 का nav");
        assert_eq!(canonicalize("एन ए वी बताओ"), "nav बताओ");
        assert_eq!(canonicalize("fund x ka nav"), "fund x ka nav");
    }
}
