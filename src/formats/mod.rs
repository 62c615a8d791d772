//! Format specific readers
//!
//! One module per simulator or server format. Each reader implements
//! [`ReaderFormat`](crate::reader::ReaderFormat) for sniffing and
//! construction and [`FormatReader`](crate::reader::FormatReader) for
//! extracting raw sessions, including the repairs only that format needs.
//!
//! | Module | Input |
//! |---|---|
//! | [`rfactor2`] | rFactor / rFactor 2 XML (`rFactorXML` root) |
//! | [`assetto_corsa`] | Assetto Corsa offline JSON |
//! | [`assetto_corsa_server`] | acServer text log |
//! | [`assetto_corsa_server_json`] | acServer JSON results |
//! | [`acc`] | Assetto Corsa Competizione JSON (server or client) |
//! | [`project_cars`] | Project CARS dedicated server stats |
//! | [`raceroom`] | RaceRoom dedicated server JSON |
//! | [`race07`] | Race07 / GTR / GTR2 / F1 Challenge INI-like text |
//! | [`iracing`] | iRacing results JSON |
//! | [`second_monitor`] | Second Monitor JSON |

pub mod acc;
pub mod assetto_corsa;
pub mod assetto_corsa_server;
pub mod assetto_corsa_server_json;
pub mod iracing;
pub mod project_cars;
pub mod race07;
pub mod raceroom;
pub mod rfactor2;
pub mod second_monitor;

pub use acc::AccReader;
pub use assetto_corsa::AssettoCorsaReader;
pub use assetto_corsa_server::AssettoCorsaServerReader;
pub use assetto_corsa_server_json::AssettoCorsaServerJsonReader;
pub use iracing::IracingReader;
pub use project_cars::ProjectCarsReader;
pub use race07::Race07Reader;
pub use raceroom::RaceRoomReader;
pub use rfactor2::RfactorReader;
pub use second_monitor::SecondMonitorReader;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::text::decode_bytes;
use crate::{Result, ResultsError};

/// Root object of a JSON document; `None` for anything else
pub(crate) fn json_object(text: &str) -> Option<Map<String, Value>> {
    let text = text.trim_start();
    if !text.starts_with('{') {
        return None;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Whether raw bytes decode to a JSON object with all of `keys` at the root
pub(crate) fn json_has_keys(data: &[u8], keys: &[&str]) -> bool {
    json_object(&decode_bytes(data)).is_some_and(|map| keys.iter().all(|key| map.contains_key(*key)))
}

/// Deserialize a JSON document into a schema type.
pub(crate) fn parse_json<T: DeserializeOwned>(format: &'static str, text: &str) -> Result<T> {
    serde_json::from_str(text.trim_start())
        .map_err(|e| ResultsError::parse(format!("{format} JSON"), e.to_string()))
}

/// Compile a line pattern of a text format.
pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| ResultsError::parse("line pattern", e.to_string()))
}

/// Trimmed string, `None` when empty
pub(crate) fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|value| !value.is_empty()).map(str::to_string)
}

/// Milliseconds to seconds where zero or negative means unknown
pub(crate) fn positive_ms(ms: Option<f64>) -> Option<f64> {
    ms.filter(|ms| *ms > 0.0).map(crate::model::ms_to_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sniffing_checks_root_keys() {
        assert!(json_has_keys(br#"{"TrackName": "monza", "Cars": []}"#, &["TrackName"]));
        assert!(!json_has_keys(br#"{"data": {"TrackName": "monza"}}"#, &["TrackName"]));
        assert!(!json_has_keys(b"[1, 2]", &["TrackName"]));
        assert!(!json_has_keys(b"{broken", &["TrackName"]));
        assert!(!json_has_keys(b"", &["TrackName"]));
    }

    #[test]
    fn value_helpers() {
        assert_eq!(non_empty(Some("  Spa ")), Some("Spa".to_string()));
        assert_eq!(non_empty(Some("   ")), None);
        assert_eq!(positive_ms(Some(92345.0)), Some(92.345));
        assert_eq!(positive_ms(Some(-1.0)), None);
        assert_eq!(positive_ms(Some(0.0)), None);
    }
}
