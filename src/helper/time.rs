//! Formatted time strings
//!
//! Logs print times as `h:mm:ss.ffff`, `mm:ss.fff`, `ss.fff` or, in the
//! acServer case, `m:ss:mmm` with a colon before the milliseconds.

use crate::model::round_to;
use crate::{Result, ResultsError};

/// Parse a formatted time into seconds rounded to 4 decimals.
///
/// With `lenient` set, a string without a `.` and with at least two colons
/// is read with its last colon as the decimal separator (`1:23:456` is
/// 83.456). A string with neither `:` nor `.` is rejected.
pub fn seconds_from_formatted_time(input: &str, lenient: bool) -> Result<f64> {
    let trimmed = input.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };

    if !unsigned.contains([':', '.']) {
        return Err(ResultsError::invalid_time(input));
    }

    let mut normalized = unsigned.to_string();
    if lenient && !normalized.contains('.') && normalized.matches(':').count() >= 2 {
        if let Some(index) = normalized.rfind(':') {
            normalized.replace_range(index..=index, ".");
        }
    }

    let parts: Vec<&str> = normalized.split(':').collect();
    if parts.len() > 3 {
        return Err(ResultsError::invalid_time(input));
    }

    let Some((seconds, larger)) = parts.split_last() else {
        return Err(ResultsError::invalid_time(input));
    };
    let mut total = parse_component(seconds, input)?;
    // minutes, then hours
    for (power, part) in larger.iter().rev().enumerate() {
        total += parse_component(part, input)? * 60f64.powi(power as i32 + 1);
    }

    let total = round_to(total, 4);
    Ok(if negative { -total } else { total })
}

fn parse_component(part: &str, input: &str) -> Result<f64> {
    let part = part.trim();
    if part.is_empty() || part.starts_with(['-', '+']) {
        return Err(ResultsError::invalid_time(input));
    }
    part.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ResultsError::invalid_time(input))
}

/// Format seconds as `[-][hh:]mm:ss.ffff`.
///
/// Hours are printed when non-zero or when `force_hours` is set.
pub fn format_time(seconds: f64, force_hours: bool) -> String {
    let ticks = (seconds.abs() * 10_000.0).round() as u64;
    let fraction = ticks % 10_000;
    let whole = ticks / 10_000;
    let (hours, minutes, secs) = (whole / 3600, (whole % 3600) / 60, whole % 60);

    let sign = if seconds < 0.0 && ticks > 0 { "-" } else { "" };
    if hours > 0 || force_hours {
        format!("{sign}{hours:02}:{minutes:02}:{secs:02}.{fraction:04}")
    } else {
        format!("{sign}{minutes:02}:{secs:02}.{fraction:04}")
    }
}
