//! Answer templates per language
//!
//! Numbers are shown with 2 decimals; structured data keeps full precision.
//! Error messages fall back to English when a language has no text.

use chrono::NaiveDate;
use finspeak_core::{ErrorKind, Language};

/// Human-readable period ("6 months", "1 saal", "3 साल")
pub fn period_label(months: u32, language: Language) -> String {
    let years = months / 12;
    let whole_years = months >= 12 && months % 12 == 0;
    match (language, whole_years) {
        (Language::English, true) if years == 1 => "1 year".to_string(),
        (Language::English, true) => format!("{years} years"),
        (Language::English, false) if months == 1 => "1 month".to_string(),
        (Language::English, false) => format!("{months} months"),
        (Language::Hinglish, true) => format!("{years} saal"),
        (Language::Hinglish, false) => format!("{months} mahine"),
        (Language::Hindi, true) => format!("{years} साल"),
        (Language::Hindi, false) => format!("{months} महीने"),
    }
}

pub fn nav_text(language: Language, fund_name: &str, nav: f64, date: NaiveDate) -> String {
    match language {
        Language::English => {
            format!("The current NAV of {fund_name} is ₹{nav:.2} as of {date}.")
        }
        Language::Hinglish => format!("{fund_name} ka current NAV ₹{nav:.2} hai ({date})."),
        Language::Hindi => format!("{fund_name} का वर्तमान NAV ₹{nav:.2} है ({date})।"),
    }
}

pub fn return_text(language: Language, fund_name: &str, months: u32, percent: f64) -> String {
    let period = period_label(months, language);
    match language {
        Language::English => {
            format!("{fund_name} has given {percent:.2}% returns over the last {period}.")
        }
        Language::Hinglish => {
            format!("{fund_name} ne last {period} mein {percent:.2}% return diya hai.")
        }
        Language::Hindi => {
            format!("{fund_name} ने पिछले {period} में {percent:.2}% रिटर्न दिया है।")
        }
    }
}

/// Failure message; `subject` is the fund name, phrase or term involved
pub fn error_text(kind: ErrorKind, language: Language, subject: Option<&str>) -> String {
    let subject = subject.filter(|s| !s.trim().is_empty());
    localized_error(kind, language, subject)
        .unwrap_or_else(|| localized_error(kind, Language::English, subject).unwrap_or_default())
}

fn localized_error(kind: ErrorKind, language: Language, subject: Option<&str>) -> Option<String> {
    let text = match (language, kind) {
        (Language::English, ErrorKind::UnrecognizedQuery) => {
            "Sorry, I didn't understand that. You can ask for a fund's NAV, its returns \
             over 3 months to 5 years, or what a term like NAV or SIP means."
                .to_string()
        }
        (Language::English, ErrorKind::FundNotFound) => match subject {
            Some(s) => format!("I couldn't find a fund matching \"{s}\". Please say the fund name again."),
            None => "I couldn't tell which fund you meant. Please say the fund name.".to_string(),
        },
        (Language::English, ErrorKind::AmbiguousFund) => match subject {
            Some(s) => format!("\"{s}\" matches more than one fund. Please say the full fund name."),
            None => "That matches more than one fund. Please say the full fund name.".to_string(),
        },
        (Language::English, ErrorKind::NoDataForFund) => {
            format!("There is no NAV data for {} yet.", subject.unwrap_or("this fund"))
        }
        (Language::English, ErrorKind::NoDataBeforeDate) => {
            format!("There is no NAV data for {} on or before that date.", subject.unwrap_or("this fund"))
        }
        (Language::English, ErrorKind::InsufficientHistory) => format!(
            "{} does not have enough NAV history for that period.",
            subject.unwrap_or("This fund")
        ),
        (Language::English, ErrorKind::ExplanationUnavailable) => match subject {
            Some(s) => format!("Sorry, I don't have an explanation for \"{s}\". Try terms like NAV, SIP or ELSS."),
            None => "Sorry, I don't have an explanation for that. Try terms like NAV, SIP or ELSS.".to_string(),
        },

        (Language::Hinglish, ErrorKind::UnrecognizedQuery) => {
            "Maaf kijiye, samajh nahi aaya. Aap kisi fund ka NAV, 3 mahine se 5 saal tak ka \
             return, ya NAV/SIP jaise term ka matlab pooch sakte hain."
                .to_string()
        }
        (Language::Hinglish, ErrorKind::FundNotFound) => match subject {
            Some(s) => format!("\"{s}\" naam ka koi fund nahi mila. Fund ka naam dobara batayein."),
            None => "Kaunsa fund, samajh nahi aaya. Fund ka naam batayein.".to_string(),
        },
        (Language::Hinglish, ErrorKind::AmbiguousFund) => {
            "Is naam se ek se zyada fund milte hain. Poora fund naam batayein.".to_string()
        }
        (Language::Hinglish, ErrorKind::InsufficientHistory) => format!(
            "{} ka itna purana NAV data available nahi hai.",
            subject.unwrap_or("Is fund")
        ),
        (Language::Hinglish, ErrorKind::NoDataForFund) => format!(
            "{} ka NAV data abhi available nahi hai.",
            subject.unwrap_or("Is fund")
        ),
        (Language::Hinglish, ErrorKind::ExplanationUnavailable) => match subject {
            Some(s) => format!("'{s}' ki explanation abhi available nahi hai. NAV, SIP, ELSS jaise terms try karein."),
            None => "Iski explanation abhi available nahi hai. NAV, SIP, ELSS jaise terms try karein.".to_string(),
        },

        (Language::Hindi, ErrorKind::UnrecognizedQuery) => {
            "माफ़ कीजिए, सवाल समझ नहीं आया। आप किसी फंड का NAV, 3 महीने से 5 साल तक का \
             रिटर्न, या NAV/SIP जैसे शब्द का मतलब पूछ सकते हैं।"
                .to_string()
        }
        (Language::Hindi, ErrorKind::FundNotFound) => match subject {
            Some(s) => format!("\"{s}\" नाम का कोई फंड नहीं मिला। कृपया फंड का नाम दोबारा बताएं।"),
            None => "कौन सा फंड, यह समझ नहीं आया। कृपया फंड का नाम बताएं।".to_string(),
        },
        (Language::Hindi, ErrorKind::AmbiguousFund) => {
            "इस नाम से एक से ज़्यादा फंड मिलते हैं। कृपया पूरा नाम बताएं।".to_string()
        }
        (Language::Hindi, ErrorKind::InsufficientHistory) => format!(
            "{} का इतना पुराना NAV डेटा उपलब्ध नहीं है।",
            subject.unwrap_or("इस फंड")
        ),
        (Language::Hindi, ErrorKind::NoDataForFund) => format!(
            "{} का NAV डेटा अभी उपलब्ध नहीं है।",
            subject.unwrap_or("इस फंड")
        ),
        (Language::Hindi, ErrorKind::ExplanationUnavailable) => {
            "इस शब्द की जानकारी अभी उपलब्ध नहीं है। NAV, SIP, ELSS जैसे शब्द आज़माएं।".to_string()
        }

        _ => return None,
    };
    Some(text)
}
