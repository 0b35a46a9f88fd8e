//! Free-text extraction of booking hints.
//!
//! The agents never see structured requests from the UI, only sentences such
//! as `book appointment for John Smith with Cardiology specialist in the
//! morning phone +1 555 123 4567`. [`MessageParser`] pulls the pieces the
//! tools need out of such text.

use crate::domain::model::TimePreference;
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

const SPECIALTY_KEYWORDS: &[(&str, &[&str])] = &[
    ("cardiology", &["cardiology", "cardiologist", "heart", "cardiac"]),
    ("dermatology", &["dermatology", "dermatologist", "skin"]),
    (
        "pediatrics",
        &["pediatrics", "pediatrician", "child", "children", "kids"],
    ),
    ("orthopedics", &["orthopedics", "orthopedic", "bone", "joint"]),
    ("neurology", &["neurology", "neurologist", "brain", "nerve"]),
];

/// Words that end a patient name.
const NAME_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "with", "in", "at", "on", "for", "and", "phone", "tel", "me", "my", "all",
    "appointment", "appointments", "today", "tomorrow", "morning", "afternoon", "evening",
    "doctor", "dr", "specialist", "please", "patient",
];

/// Everything the agents may use from one message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedMessage {
    pub specialty: Option<String>,
    pub patient_name: Option<String>,
    pub time_preference: Option<TimePreference>,
    pub doctor_id: Option<String>,
    pub appointment_slot: Option<String>,
    pub patient_phone: Option<String>,
    pub appointment_id: Option<String>,
}

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static regex pattern"))
}

fn name_after_keyword() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(
        &RE,
        r"(?i)\b(?:for|patient)\s+(\p{L}[\p{L}'-]*)(?:\s+(\p{L}[\p{L}'-]*))?",
    )
}

fn name_after_book() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)\bbook\s+(\p{L}[\p{L}'-]*)(?:\s+(\p{L}[\p{L}'-]*))?")
}

fn doctor_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)\b(dr\d+)\b")
}

fn slot_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}")
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\d{4}-\d{2}-\d{2}(?:\s+\d{2}:\d{2})?")
}

fn clock_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\b(\d{1,2}):(\d{2})\b")
}

fn phone_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\+?\d[\d\s\-()]{8,}\d")
}

fn appointment_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"(?i)\bAPT\d{4}\b")
}

pub struct MessageParser;

impl MessageParser {
    pub fn parse(message: &str) -> ParsedMessage {
        ParsedMessage {
            specialty: Self::extract_specialty(message),
            patient_name: Self::extract_patient_name(message),
            time_preference: Self::extract_time_preference(message),
            doctor_id: Self::extract_doctor_id(message),
            appointment_slot: Self::extract_appointment_slot(message),
            patient_phone: Self::extract_phone(message),
            appointment_id: Self::extract_appointment_id(message),
        }
    }

    /// Whole words only, outside the patient's name, so "Jo Skinner" is not
    /// a dermatology request.
    pub fn extract_specialty(message: &str) -> Option<String> {
        let text = match name_match(message) {
            Some((_, span)) => format!("{} {}", &message[..span.start], &message[span.end..]),
            None => message.to_string(),
        };
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        SPECIALTY_KEYWORDS
            .iter()
            .find(|(_, keywords)| {
                words
                    .iter()
                    .any(|w| keywords.iter().any(|k| is_keyword_form(w, k)))
            })
            .map(|(specialty, _)| specialty.to_string())
    }

    pub fn extract_patient_name(message: &str) -> Option<String> {
        name_match(message).map(|(name, _)| name)
    }

    /// A full slot is an exact request. Clock times and period words map to
    /// morning (09-11:00), afternoon (14-16:00) or evening (17-18:00); other
    /// clock times carry no preference.
    pub fn extract_time_preference(message: &str) -> Option<TimePreference> {
        if let Some(slot) = Self::extract_appointment_slot(message) {
            return Some(TimePreference::Exact(slot));
        }
        let periods = [
            ("morning", TimePreference::Morning),
            ("afternoon", TimePreference::Afternoon),
            ("evening", TimePreference::Evening),
        ];
        for caps in clock_re().captures_iter(message) {
            let Ok(hour) = caps[1].parse::<u32>() else {
                continue;
            };
            let clock = format!("{:02}:{}", hour, &caps[2]);
            let period = periods
                .iter()
                .find(|(_, p)| p.hours().contains(&clock.as_str()));
            if let Some((_, pref)) = period {
                return Some(pref.clone());
            }
        }
        let lower = message.to_lowercase();
        periods
            .into_iter()
            .find(|(word, _)| lower.contains(word))
            .map(|(_, pref)| pref)
    }

    pub fn extract_doctor_id(message: &str) -> Option<String> {
        doctor_id_re()
            .captures(message)
            .map(|caps| caps[1].to_lowercase())
    }

    /// Slot in the directory's `YYYY-MM-DD HH:MM` form, whitespace normalised.
    pub fn extract_appointment_slot(message: &str) -> Option<String> {
        slot_re()
            .find(message)
            .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
    }

    /// Dates and slots are removed first so they are never read as numbers.
    pub fn extract_phone(message: &str) -> Option<String> {
        let without_dates = date_re().replace_all(message, " ");
        phone_re()
            .find(&without_dates)
            .map(|m| m.as_str().trim().to_string())
    }

    pub fn extract_appointment_id(message: &str) -> Option<String> {
        appointment_id_re()
            .find(message)
            .map(|m| m.as_str().to_uppercase())
    }
}

/// Whole-word test, so `list` does not fire on `specialist`.
pub fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .any(|w| w.eq_ignore_ascii_case(word))
}

/// The patient's name and its byte span in `message`.
fn name_match(message: &str) -> Option<(String, Range<usize>)> {
    [name_after_keyword(), name_after_book()]
        .into_iter()
        .flat_map(|re| re.captures_iter(message))
        .find_map(|caps| {
            let first = caps.get(1)?;
            if is_stop_word(first.as_str()) {
                return None;
            }
            let mut words = vec![title_case(first.as_str())];
            let mut end = first.end();
            if let Some(second) = caps.get(2) {
                if !is_stop_word(second.as_str()) {
                    words.push(title_case(second.as_str()));
                    end = second.end();
                }
            }
            Some((words.join(" "), first.start()..end))
        })
}

/// `word` is `keyword` or its plural.
fn is_keyword_form(word: &str, keyword: &str) -> bool {
    word == keyword || word.strip_suffix('s') == Some(keyword)
}

fn is_stop_word(word: &str) -> bool {
    let lower = word.to_lowercase();
    NAME_STOP_WORDS.contains(&lower.as_str())
        || SPECIALTY_KEYWORDS
            .iter()
            .any(|(s, kw)| *s == lower || kw.iter().any(|k| is_keyword_form(&lower, k)))
}

/// Capitalises each part of hyphenated or apostrophe names (`Mary-Kate`, `O'Neil`).
fn title_case(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut start_of_part = true;
    for c in word.chars() {
        if start_of_part {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        start_of_part = c == '-' || c == '\'';
    }
    out
}
