//! iRacing results JSON
//!
//! Exported from the member site or the data API, the latter wrapped in a
//! `data` object. Results only carry lap aggregates, so laps are synthesized
//! from the completed lap count, the average lap and the best lap. Because
//! of that the lap-count based finish status rule is switched off for this
//! format.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ReaderOptions;
use crate::formats::{json_object, non_empty};
use crate::helper::detect_session;
use crate::model::{Driver, FinishStatus, Game, Lap, Participant, Session, Track, Vehicle, round_to};
use crate::reader::{FormatReader, ReaderFormat, fix_participant_positions};
use crate::text::decode_bytes;
use crate::{Result, ResultsError};

/// iRacing times are in 1/10000 s
const TIME_UNITS_PER_SECOND: f64 = 10_000.0;

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IracingResults {
    pub subsession_id: Option<i64>,
    /// RFC 3339
    pub start_time: Option<String>,
    pub track: IracingTrack,
    pub series_name: Option<String>,
    pub session_results: Vec<IracingSession>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IracingTrack {
    pub track_name: Option<String>,
    pub config_name: Option<String>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IracingSession {
    /// 0 race, negative for the sessions before it
    pub simsession_number: Option<i64>,
    pub simsession_type_name: Option<String>,
    pub simsession_name: Option<String>,
    pub results: Vec<IracingResult>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IracingResult {
    pub cust_id: Option<i64>,
    pub team_id: Option<i64>,
    pub display_name: Option<String>,
    /// 0-based
    pub finish_position: Option<u32>,
    pub finish_position_in_class: Option<u32>,
    /// 0-based
    pub starting_position: Option<i64>,
    pub laps_complete: Option<u32>,
    pub best_lap_time: Option<i64>,
    pub best_lap_num: Option<i64>,
    pub average_lap: Option<i64>,
    pub interval: Option<i64>,
    pub reason_out: Option<String>,
    pub incidents: Option<i64>,
    pub car_name: Option<String>,
    pub car_class_name: Option<String>,
    pub livery: IracingLivery,
    /// Team members in team events
    pub driver_results: Vec<IracingResult>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IracingLivery {
    pub car_number: Option<String>,
}

fn seconds(units: Option<i64>) -> Option<f64> {
    units.filter(|units| *units > 0).map(|units| round_to(units as f64 / TIME_UNITS_PER_SECOND, 4))
}

/// The results object, unwrapping the data API envelope
fn results_object(text: &str) -> Option<Value> {
    let mut root = json_object(text)?;
    if root.contains_key("session_results") {
        return Some(Value::Object(root));
    }
    match root.remove("data") {
        Some(Value::Object(data)) if data.contains_key("session_results") => Some(Value::Object(data)),
        _ => None,
    }
}

fn finish_status(reason_out: Option<&str>) -> FinishStatus {
    match reason_out.map(str::trim) {
        None | Some("") | Some("Running") => FinishStatus::Normal,
        Some(reason) if reason.to_lowercase().contains("disqualified") => FinishStatus::Dq,
        Some(_) => FinishStatus::Dnf,
    }
}

/// Reader for iRacing results
#[derive(Debug)]
pub struct IracingReader {
    results: IracingResults,
    options: ReaderOptions,
}

impl ReaderFormat for IracingReader {
    const NAME: &'static str = "iracing";

    fn can_read(data: &[u8]) -> bool {
        results_object(&decode_bytes(data))
            .is_some_and(|results| results.get("subsession_id").is_some() || results.get("track").is_some())
    }

    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
        let value = results_object(&decode_bytes(data))
            .ok_or_else(|| ResultsError::cannot_read_data(Self::NAME, "no session_results"))?;
        let results =
            serde_json::from_value(value).map_err(|e| ResultsError::parse("iracing JSON", e.to_string()))?;
        Ok(Self { results, options })
    }

    fn default_options() -> ReaderOptions {
        ReaderOptions { finish_status_by_laps: false, ..Default::default() }
    }
}

impl IracingReader {
    fn read_result(session: &mut Session, result: &IracingResult) -> Participant {
        let mut participant = session.create_participant();
        let driver = |result: &IracingResult| {
            let driver = Driver::new(result.display_name.clone().unwrap_or_default());
            match result.cust_id.filter(|id| *id > 0) {
                Some(id) => driver.with_id(id.to_string()),
                None => driver,
            }
        };
        if result.driver_results.is_empty() {
            participant.drivers.push(driver(result));
        } else {
            participant.drivers = result.driver_results.iter().map(driver).collect();
            participant.team = non_empty(result.display_name.as_deref());
        }
        participant.vehicle = Vehicle {
            name: result.car_name.clone().unwrap_or_default(),
            class: non_empty(result.car_class_name.as_deref()),
            number: non_empty(result.livery.car_number.as_deref()),
            ..Default::default()
        };
        participant.grid_position = result.starting_position.filter(|grid| *grid >= 0).map(|grid| grid as u32 + 1);
        participant.class_position = result.finish_position_in_class.map(|position| position + 1);
        participant.finish_status = finish_status(result.reason_out.as_deref());

        let average = seconds(result.average_lap);
        let best = seconds(result.best_lap_time);
        let best_number = result.best_lap_num.filter(|number| *number > 0);
        for number in 1..=result.laps_complete.unwrap_or(0) {
            let time = match best_number {
                Some(best_number) if best_number == i64::from(number) => best.or(average),
                _ => average,
            };
            participant.laps.push(Lap::with_time(number, time));
        }
        participant
    }
}

impl FormatReader for IracingReader {
    fn format_name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_sessions(&self) -> Result<Vec<Session>> {
        let results = &self.results;
        let mut raw_sessions: Vec<&IracingSession> = results.session_results.iter().collect();
        raw_sessions.sort_by_key(|session| session.simsession_number.unwrap_or(0));

        let mut sessions = Vec::new();
        for raw in raw_sessions {
            let token = raw.simsession_type_name.as_deref().or(raw.simsession_name.as_deref()).unwrap_or("practice");
            let (session_type, name) = detect_session(token, None);
            let mut session = Session::new(session_type);
            session.name = name;
            session.game = Game::named("iRacing");
            session.track = Track {
                venue: non_empty(results.track.track_name.as_deref()),
                course: non_empty(results.track.config_name.as_deref()),
                ..Default::default()
            };
            session.mod_name = non_empty(results.series_name.as_deref());
            session.date = results.start_time.as_deref().and_then(|date| self.options.parse_date(date));
            if let Some(id) = results.subsession_id {
                session.other_settings.insert("SubsessionId".to_string(), id.to_string());
            }

            let mut ordered: Vec<&IracingResult> = raw.results.iter().collect();
            ordered.sort_by_key(|result| result.finish_position.unwrap_or(u32::MAX));
            for result in ordered {
                let participant = Self::read_result(&mut session, result);
                session.push_participant(participant);
            }
            fix_participant_positions(&mut session);
            sessions.push(session);
        }
        debug!(sessions = sessions.len(), subsession = ?results.subsession_id, "Read iRacing results");
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SessionType;

    const RESULTS: &str = r#"{"data": {
        "subsession_id": 45000001,
        "start_time": "2022-03-01T19:00:00Z",
        "track": {"track_name": "Okayama International Circuit", "config_name": "Full Course"},
        "series_name": "Production Car Challenge",
        "session_results": [
            {"simsession_number": 0, "simsession_type_name": "Race", "simsession_name": "RACE", "results": [
                {"cust_id": 2, "display_name": "Bravo", "finish_position": 1, "starting_position": 0, "laps_complete": 2,
                 "best_lap_time": 905000, "best_lap_num": 2, "average_lap": 910000, "reason_out": "Running",
                 "car_name": "Mazda MX-5 Cup", "car_class_name": "MX5", "livery": {"car_number": "22"}, "driver_results": []},
                {"cust_id": 1, "display_name": "Alpha", "finish_position": 0, "starting_position": 1, "laps_complete": 3,
                 "best_lap_time": 900000, "best_lap_num": 3, "average_lap": 905000, "reason_out": "Running",
                 "car_name": "Mazda MX-5 Cup", "car_class_name": "MX5", "livery": {"car_number": "11"}, "driver_results": []}
            ]},
            {"simsession_number": -1, "simsession_type_name": "Lone Qualifying", "simsession_name": "QUALIFY", "results": [
                {"cust_id": 1, "display_name": "Alpha", "finish_position": 0, "laps_complete": 1, "best_lap_time": 899000, "best_lap_num": 1, "average_lap": 899000}
            ]}
        ]
    }}"#;

    #[test]
    fn sniffs_wrapped_and_plain_results() {
        assert!(IracingReader::can_read(RESULTS.as_bytes()));
        assert!(IracingReader::can_read(br#"{"subsession_id": 1, "session_results": []}"#));
        assert!(!IracingReader::can_read(br#"{"data": {"subsession_id": 1}}"#));
    }

    #[test]
    fn finish_status_rule_is_disabled() -> anyhow::Result<()> {
        let reader = IracingReader::from_bytes(RESULTS.as_bytes())?;
        assert!(!reader.options().finish_status_by_laps);
        Ok(())
    }

    #[test]
    fn sessions_are_in_running_order_with_synthesized_laps() -> anyhow::Result<()> {
        let sessions = IracingReader::from_bytes(RESULTS.as_bytes())?.read_sessions()?;
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].session_type, SessionType::Qualify);
        assert_eq!(sessions[0].name.as_deref(), Some("Lone Qualifying"));

        let race = &sessions[1];
        assert_eq!(race.session_type, SessionType::Race);
        assert_eq!(race.track.course.as_deref(), Some("Full Course"));
        let winner = &race.participants[0];
        assert_eq!(winner.driver_name(), "Alpha");
        assert_eq!(winner.grid_position, Some(2));
        assert_eq!(winner.vehicle.number.as_deref(), Some("11"));
        assert_eq!(winner.laps.len(), 3);
        assert_eq!(winner.laps[0].time, Some(90.5));
        assert_eq!(winner.laps[2].time, Some(90.0));
        assert_eq!(winner.best_lap().and_then(|lap| lap.number), Some(3));
        Ok(())
    }
}
