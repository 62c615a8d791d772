//! Text utilities for raw result logs
//!
//! Result files come from game servers on every platform and are not always
//! UTF-8:
//! - ACC writes UTF-16 (usually with a BOM) and older builds Windows-1252
//! - Project CARS embeds `//` comment lines in its JSON
//! - Race07 family logs are INI-like with repeated keys
//!
//! This module turns raw bytes into text and splits INI-like text without
//! interpreting any field.

use std::borrow::Cow;

use encoding_rs::{UTF_16BE, UTF_16LE, WINDOWS_1252};

/// Decode raw bytes into text.
///
/// Tries, in order: any BOM (UTF-8 or UTF-16), UTF-16 without BOM (detected
/// by zero high bytes), UTF-8, then Windows-1252 which never fails.
pub fn decode_bytes(data: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_length)) = encoding_rs::Encoding::for_bom(data) {
        let (text, _) = encoding.decode_without_bom_handling(&data[bom_length..]);
        return text;
    }

    // checked before UTF-8 since ASCII in UTF-16 is also valid UTF-8
    if looks_like_utf16(data, 1) {
        let (text, had_errors) = UTF_16LE.decode_without_bom_handling(data);
        if !had_errors {
            return text;
        }
    }
    if looks_like_utf16(data, 0) {
        let (text, had_errors) = UTF_16BE.decode_without_bom_handling(data);
        if !had_errors {
            return text;
        }
    }

    if let Ok(text) = std::str::from_utf8(data) {
        return Cow::Borrowed(text);
    }

    let (text, _) = WINDOWS_1252.decode_without_bom_handling(data);
    text
}

/// ASCII text in UTF-16 has a zero byte at every other position.
fn looks_like_utf16(data: &[u8], zero_offset: usize) -> bool {
    if data.len() < 4 || data.len() % 2 != 0 {
        return false;
    }
    let sample = &data[..data.len().min(256)];
    let zeros = sample.iter().skip(zero_offset).step_by(2).filter(|&&byte| byte == 0).count();
    zeros * 4 >= sample.len() / 2 * 3
}

/// Remove whole-line `//` comments.
pub fn strip_line_comments(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for line in text.lines() {
        if line.trim_start().starts_with("//") {
            continue;
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}

/// One `[Name]` section of an INI-like log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniSection {
    pub name: String,
    /// Entries in file order; keys may repeat
    pub entries: Vec<(String, String)>,
}

impl IniSection {
    /// First value of a key (case-insensitive), trimmed
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(entry_key, _)| entry_key.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// First non-empty value of a key
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|value| !value.is_empty())
    }

    /// Every value of a repeated key in file order
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(entry_key, _)| entry_key.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }
}

/// Split INI-like text into sections.
///
/// Lines before the first header land in a section with an empty name.
/// Lines without `=` and `;` comments are ignored.
pub fn parse_ini(text: &str) -> Vec<IniSection> {
    let mut sections = vec![IniSection::default()];

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            sections.push(IniSection { name: name.trim().to_string(), entries: Vec::new() });
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if let Some(section) = sections.last_mut() {
            section.entries.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    if sections.first().is_some_and(|section| section.entries.is_empty()) {
        sections.remove(0);
    }
    sections
}
