//! Process-wide defaults and per-reader options
//!
//! The only process-wide setting is the default timezone used when a result
//! log carries a date without an offset. Set it once before reading.

use std::sync::RwLock;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone};
use chrono_tz::Tz;

use crate::{Result, ResultsError};

static DEFAULT_TIMEZONE: RwLock<Tz> = RwLock::new(Tz::UTC);

/// Set the default timezone from an IANA name such as `Europe/Amsterdam`.
pub fn set_default_timezone(name: &str) -> Result<()> {
    let tz: Tz =
        name.parse().map_err(|_| ResultsError::UnknownTimezone { name: name.to_string() })?;
    match DEFAULT_TIMEZONE.write() {
        Ok(mut guard) => *guard = tz,
        Err(poisoned) => *poisoned.into_inner() = tz,
    }
    Ok(())
}

/// Current default timezone (`UTC` unless changed).
pub fn default_timezone() -> Tz {
    match DEFAULT_TIMEZONE.read() {
        Ok(guard) => *guard,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

/// Options a reader instance is constructed with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReaderOptions {
    /// Apply the "under 50% of lasted laps" NONE finish status rule
    pub finish_status_by_laps: bool,
    /// Timezone for dates without offset; `None` uses the process default
    pub timezone: Option<Tz>,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self { finish_status_by_laps: true, timezone: None }
    }
}

impl ReaderOptions {
    /// Timezone to use for naive dates.
    pub fn effective_timezone(&self) -> Tz {
        self.timezone.unwrap_or_else(default_timezone)
    }

    /// Interpret a naive local date in the effective timezone.
    ///
    /// Ambiguous local times (DST fold) resolve to the earliest instant;
    /// non-existent ones yield `None`.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self.effective_timezone().from_local_datetime(&naive) {
            LocalResult::Single(date) => Some(date.fixed_offset()),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.fixed_offset()),
            LocalResult::None => None,
        }
    }

    /// Convert a unix timestamp into the effective timezone.
    pub fn from_timestamp(&self, seconds: i64) -> Option<DateTime<FixedOffset>> {
        let utc = DateTime::from_timestamp(seconds, 0)?;
        Some(utc.with_timezone(&self.effective_timezone()).fixed_offset())
    }

    /// Parse a naive date string with one of the given `strftime` formats.
    pub fn parse_local(&self, raw: &str, formats: &[&str]) -> Option<DateTime<FixedOffset>> {
        let raw = raw.trim();
        formats
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .and_then(|naive| self.localize(naive))
    }

    /// Parse an RFC 3339 date, falling back to naive formats in the effective timezone.
    pub fn parse_date(&self, raw: &str) -> Option<DateTime<FixedOffset>> {
        let raw = raw.trim();
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date);
        }
        self.parse_local(
            raw,
            &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"],
        )
    }
}
