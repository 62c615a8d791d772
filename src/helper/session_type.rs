//! Session type tokens
//!
//! Logs name their sessions in many ways (`R`, `Race2`, `QUALIFY`, `FP1`,
//! `Lone Qualifying`). [`detect_session`] maps them onto [`SessionType`] and
//! keeps the original spelling as display name whenever the type alone would
//! lose information.

use std::collections::HashMap;

use crate::model::SessionType;

/// Tokens that are fully described by their type and get no display name
const SELF_EVIDENT: &[&str] = &["p", "q", "w", "r", "practice", "qualify", "warmup", "race"];

const TABLE: &[(&str, SessionType)] = &[
    ("p", SessionType::Practice),
    ("practice", SessionType::Practice),
    ("fp", SessionType::Practice),
    ("freepractice", SessionType::Practice),
    ("q", SessionType::Qualify),
    ("qualify", SessionType::Qualify),
    ("qualifying", SessionType::Qualify),
    ("quali", SessionType::Qualify),
    ("qual", SessionType::Qualify),
    ("w", SessionType::Warmup),
    ("warmup", SessionType::Warmup),
    ("r", SessionType::Race),
    ("race", SessionType::Race),
];

/// Substrings recognized inside longer spellings, checked in order
const CONTAINED: &[(&str, SessionType)] = &[
    ("qualif", SessionType::Qualify),
    ("warmup", SessionType::Warmup),
    ("practice", SessionType::Practice),
    ("race", SessionType::Race),
];

/// Map a raw session token to a type and optional display name.
///
/// `custom` is consulted first, by exact token and then case-insensitively.
/// Unknown tokens become [`SessionType::Practice`] named after the token.
pub fn detect_session(
    token: &str,
    custom: Option<&HashMap<String, SessionType>>,
) -> (SessionType, Option<String>) {
    let trimmed = token.trim();
    let display = || (!trimmed.is_empty()).then(|| trimmed.to_string());

    if let Some(custom) = custom {
        let found = custom.get(trimmed).or_else(|| {
            custom.iter().find(|(key, _)| key.eq_ignore_ascii_case(trimmed)).map(|(_, value)| value)
        });
        if let Some(session_type) = found {
            return (*session_type, display());
        }
    }

    let normalized: String =
        trimmed.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
    let base = normalized.trim_end_matches(|c: char| c.is_ascii_digit());

    let session_type = TABLE
        .iter()
        .find(|(key, _)| *key == base)
        .or_else(|| CONTAINED.iter().find(|(needle, _)| base.contains(needle)))
        .map(|(_, session_type)| *session_type);

    match session_type {
        Some(session_type) if SELF_EVIDENT.contains(&normalized.as_str()) => (session_type, None),
        Some(session_type) => (session_type, display()),
        None => (SessionType::Practice, display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_codes_and_canonical_names_have_no_display_name() {
        for (token, expected) in [
            ("P", SessionType::Practice),
            ("q", SessionType::Qualify),
            (" W ", SessionType::Warmup),
            ("R", SessionType::Race),
            ("PRACTICE", SessionType::Practice),
            ("Qualify", SessionType::Qualify),
            ("Warm Up", SessionType::Warmup),
            ("race", SessionType::Race),
        ] {
            assert_eq!(detect_session(token, None), (expected, None), "{token}");
        }
    }

    #[test]
    fn variations_keep_the_original_token() {
        assert_eq!(detect_session("Race2", None), (SessionType::Race, Some("Race2".into())));
        assert_eq!(detect_session("R1", None), (SessionType::Race, Some("R1".into())));
        assert_eq!(detect_session("FP1", None), (SessionType::Practice, Some("FP1".into())));
        assert_eq!(
            detect_session("Qualifying", None),
            (SessionType::Qualify, Some("Qualifying".into()))
        );
        assert_eq!(
            detect_session("Lone Qualifying", None),
            (SessionType::Qualify, Some("Lone Qualifying".into()))
        );
        assert_eq!(detect_session("Practice1", None), (SessionType::Practice, Some("Practice1".into())));
    }

    #[test]
    fn unknown_tokens_fall_back_to_practice() {
        assert_eq!(detect_session("Hotlap", None), (SessionType::Practice, Some("Hotlap".into())));
        assert_eq!(detect_session("", None), (SessionType::Practice, None));
    }

    #[test]
    fn custom_mapping_wins() {
        let custom = HashMap::from([("Heat".to_string(), SessionType::Race)]);
        assert_eq!(detect_session("Heat", Some(&custom)), (SessionType::Race, Some("Heat".into())));
        assert_eq!(detect_session("heat", Some(&custom)), (SessionType::Race, Some("heat".into())));
        assert_eq!(detect_session("R", Some(&custom)), (SessionType::Race, None));
    }
}
