//! Second Monitor session summaries
//!
//! Second Monitor records sessions of many simulators through their
//! telemetry and exports one JSON summary per session.

use serde::Deserialize;
use tracing::debug;

use crate::config::ReaderOptions;
use crate::formats::{json_has_keys, non_empty, parse_json};
use crate::helper::{detect_session, seconds_from_formatted_time};
use crate::model::{Driver, FinishStatus, Game, Lap, Participant, Session, Track, Vehicle};
use crate::reader::{FormatReader, ReaderFormat, fix_participant_positions};
use crate::text::decode_bytes;
use crate::Result;

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SecondMonitorSession {
    /// `hh:mm:ss.fffffff`
    pub session_run_time: Option<String>,
    pub session_type: Option<String>,
    pub simulator: Option<String>,
    pub track_info: SecondMonitorTrack,
    pub date_time: Option<String>,
    pub total_number_of_laps: Option<u32>,
    pub drivers: Vec<SecondMonitorDriver>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SecondMonitorTrack {
    pub track_name: Option<String>,
    pub track_layout_name: Option<String>,
    /// Meters
    pub layout_length: Option<f64>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SecondMonitorDriver {
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
    pub car_name: Option<String>,
    pub class_name: Option<String>,
    pub finishing_position: Option<u32>,
    pub initial_position: Option<u32>,
    pub total_laps: Option<u32>,
    pub finished: Option<bool>,
    /// `Finished`, `Dnf`, `Dq`, `Dns`, `Na`
    pub finish_status: Option<String>,
    pub is_player: Option<bool>,
    pub laps: Vec<SecondMonitorLap>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct SecondMonitorLap {
    pub lap_number: Option<u32>,
    pub lap_time: Option<String>,
    pub sector1: Option<String>,
    pub sector2: Option<String>,
    pub sector3: Option<String>,
    pub is_valid: Option<bool>,
    pub is_pit_lap: Option<bool>,
}

fn time(raw: Option<&str>) -> Option<f64> {
    seconds_from_formatted_time(raw?.trim(), false).ok().filter(|seconds| *seconds > 0.0)
}

fn finish_status(raw: Option<&str>) -> FinishStatus {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        Some("finished") => FinishStatus::Normal,
        Some("dnf") | Some("dns") => FinishStatus::Dnf,
        Some("dq") => FinishStatus::Dq,
        _ => FinishStatus::None,
    }
}

/// Reader for Second Monitor JSON
#[derive(Debug)]
pub struct SecondMonitorReader {
    summary: SecondMonitorSession,
    options: ReaderOptions,
}

impl ReaderFormat for SecondMonitorReader {
    const NAME: &'static str = "second_monitor";

    fn can_read(data: &[u8]) -> bool {
        json_has_keys(data, &["SessionRunTime", "Drivers", "TrackInfo"])
    }

    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
        Ok(Self { summary: parse_json(Self::NAME, &decode_bytes(data))?, options })
    }
}

impl SecondMonitorReader {
    fn read_driver(session: &mut Session, raw: &SecondMonitorDriver) -> Participant {
        let mut driver = Driver::new(raw.driver_name.as_deref().unwrap_or_default().trim());
        if let Some(id) = non_empty(raw.driver_id.as_deref()) {
            driver = driver.with_id(id);
        }
        let mut participant = session.create_participant();
        participant.drivers.push(driver);
        participant.vehicle = Vehicle {
            name: raw.car_name.clone().unwrap_or_default(),
            class: non_empty(raw.class_name.as_deref()),
            ..Default::default()
        };
        participant.grid_position = raw.initial_position.filter(|grid| *grid > 0);
        participant.finish_status = finish_status(raw.finish_status.as_deref());

        for (index, lap) in raw.laps.iter().enumerate() {
            let number = lap.lap_number.filter(|number| *number > 0).unwrap_or(index as u32 + 1);
            let valid = lap.is_valid.unwrap_or(true);
            let mut record = Lap::with_time(number, time(lap.lap_time.as_deref()).filter(|_| valid));
            let sectors: Option<Vec<f64>> =
                [&lap.sector1, &lap.sector2, &lap.sector3].iter().map(|sector| time(sector.as_deref())).collect();
            record.sector_times = sectors.unwrap_or_default();
            record.is_pit_lap = lap.is_pit_lap.unwrap_or(false);
            participant.laps.push(record);
        }
        participant
    }
}

impl FormatReader for SecondMonitorReader {
    fn format_name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_sessions(&self) -> Result<Vec<Session>> {
        let summary = &self.summary;
        let (session_type, name) = detect_session(summary.session_type.as_deref().unwrap_or("practice"), None);
        let mut session = Session::new(session_type);
        session.name = name;
        session.game = Game { name: non_empty(summary.simulator.as_deref()), version: None };
        session.track = Track {
            venue: non_empty(summary.track_info.track_name.as_deref()),
            course: non_empty(summary.track_info.track_layout_name.as_deref()),
            length: summary.track_info.layout_length.filter(|length| *length > 0.0),
            ..Default::default()
        };
        session.date = summary.date_time.as_deref().and_then(|date| self.options.parse_date(date));
        session.max_laps = summary.total_number_of_laps.filter(|laps| *laps > 0);
        if let Some(run_time) = time(summary.session_run_time.as_deref()) {
            session.max_minutes = Some((run_time / 60.0).round() as u32).filter(|minutes| *minutes > 0);
        }

        let mut drivers: Vec<&SecondMonitorDriver> = summary.drivers.iter().collect();
        drivers.sort_by_key(|driver| driver.finishing_position.filter(|position| *position > 0).unwrap_or(u32::MAX));
        for raw in drivers {
            let participant = Self::read_driver(&mut session, raw);
            session.push_participant(participant);
        }
        fix_participant_positions(&mut session);

        debug!(simulator = ?summary.simulator, participants = session.participants.len(), "Read Second Monitor summary");
        Ok(vec![session])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SessionType;

    const SUMMARY: &str = r#"{
        "SessionRunTime": "00:20:00.0000000",
        "SessionType": "Qualification",
        "Simulator": "Automobilista 2",
        "TrackInfo": {"TrackName": "Interlagos", "TrackLayoutName": "GP", "LayoutLength": 4309.0},
        "DateTime": "2021-07-10T18:45:00",
        "TotalNumberOfLaps": 0,
        "Drivers": [
            {"DriverId": "b", "DriverName": "Bravo", "CarName": "Ultima GTR", "ClassName": "GTR", "FinishingPosition": 2,
             "InitialPosition": 0, "TotalLaps": 1, "Finished": true, "FinishStatus": "Finished", "IsPlayer": false,
             "Laps": [{"LapNumber": 1, "LapTime": "00:01:12.5000000", "Sector1": "00:00:24.0000000", "Sector2": "00:00:24.0000000", "Sector3": "00:00:24.5000000", "IsValid": true, "IsPitLap": false}]},
            {"DriverId": "a", "DriverName": "Alpha", "CarName": "Ultima GTR", "ClassName": "GTR", "FinishingPosition": 1,
             "InitialPosition": 0, "TotalLaps": 2, "Finished": true, "FinishStatus": "Finished", "IsPlayer": true,
             "Laps": [{"LapNumber": 1, "LapTime": "00:01:11.0000000", "IsValid": true, "IsPitLap": false},
                      {"LapNumber": 2, "LapTime": "00:01:10.0000000", "IsValid": false, "IsPitLap": true}]}
        ]
    }"#;

    #[test]
    fn sniffs_summary_keys() {
        assert!(SecondMonitorReader::can_read(SUMMARY.as_bytes()));
        assert!(!SecondMonitorReader::can_read(br#"{"Drivers": []}"#));
    }

    #[test]
    fn reads_summary() -> anyhow::Result<()> {
        let sessions = SecondMonitorReader::from_bytes(SUMMARY.as_bytes())?.read_sessions()?;
        let session = &sessions[0];
        assert_eq!(session.session_type, SessionType::Qualify);
        assert_eq!(session.name.as_deref(), Some("Qualification"));
        assert_eq!(session.game.name.as_deref(), Some("Automobilista 2"));
        assert_eq!(session.max_minutes, Some(20));
        assert_eq!(session.max_laps, None);

        let alpha = &session.participants[0];
        assert_eq!(alpha.driver_name(), "Alpha");
        assert_eq!(alpha.position, Some(1));
        assert_eq!(alpha.laps[0].time, Some(71.0));
        assert_eq!(alpha.laps[1].time, None);
        assert!(alpha.laps[1].is_pit_lap);

        let bravo = &session.participants[1];
        assert_eq!(bravo.laps[0].sector_times, [24.0, 24.0, 24.5]);
        assert_eq!(bravo.grid_position, None);
        Ok(())
    }
}
