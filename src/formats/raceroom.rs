//! RaceRoom Racing Experience dedicated server results

use serde::Deserialize;
use tracing::debug;

use crate::config::ReaderOptions;
use crate::formats::{json_has_keys, non_empty, parse_json, positive_ms};
use crate::helper::detect_session;
use crate::model::{
    Driver, FinishStatus, Game, Incident, Lap, Participant, Server, Session, Track, Vehicle,
};
use crate::reader::{FormatReader, ReaderFormat, fix_participant_positions};
use crate::text::decode_bytes;
use crate::Result;

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct RaceRoomResults {
    pub server: Option<String>,
    /// Unix time
    pub start_time: Option<i64>,
    pub time: Option<i64>,
    pub experience: Option<String>,
    pub track: Option<String>,
    pub track_layout: Option<String>,
    pub difficulty: Option<String>,
    pub fuel_usage: Option<String>,
    pub mechanical_damage: Option<String>,
    pub flag_rules: Option<String>,
    pub cut_rules: Option<String>,
    pub mandatory_pitstop: Option<String>,
    pub sessions: Vec<RaceRoomSession>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct RaceRoomSession {
    #[serde(rename = "Type")]
    pub session_type: Option<String>,
    pub players: Vec<RaceRoomPlayer>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct RaceRoomPlayer {
    pub user_id: Option<i64>,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub car_id: Option<i64>,
    pub car: Option<String>,
    pub position: Option<u32>,
    pub position_in_class: Option<u32>,
    pub start_position: Option<u32>,
    pub start_position_in_class: Option<u32>,
    /// ms, -1 unknown
    pub best_lap_time: Option<f64>,
    /// ms, -1 unknown
    pub total_time: Option<f64>,
    /// `Finished`, `DidNotFinish`, `Disqualified`, `DidNotStart`
    pub finish_status: Option<String>,
    pub race_session_laps: Vec<RaceRoomLap>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct RaceRoomLap {
    pub time: Option<f64>,
    pub sector_times: Vec<f64>,
    pub position_in_race: Option<u32>,
    pub valid: Option<bool>,
    pub pit_stop_occured: Option<bool>,
    pub incidents: Vec<RaceRoomIncident>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct RaceRoomIncident {
    #[serde(rename = "Type")]
    pub incident_type: Option<i64>,
    pub points: Option<i64>,
}

/// Reader for RaceRoom server results
#[derive(Debug)]
pub struct RaceRoomReader {
    results: RaceRoomResults,
    options: ReaderOptions,
}

impl ReaderFormat for RaceRoomReader {
    const NAME: &'static str = "raceroom";

    fn can_read(data: &[u8]) -> bool {
        json_has_keys(data, &["Server", "Experience", "Sessions"])
    }

    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
        Ok(Self { results: parse_json(Self::NAME, &decode_bytes(data))?, options })
    }
}

fn finish_status(raw: Option<&str>) -> FinishStatus {
    match raw {
        Some("DidNotFinish") | Some("DidNotStart") => FinishStatus::Dnf,
        Some("Disqualified") => FinishStatus::Dq,
        Some("Finished") => FinishStatus::Normal,
        _ => FinishStatus::None,
    }
}

impl RaceRoomReader {
    fn read_player(session: &mut Session, player: &RaceRoomPlayer) -> Participant {
        let name = non_empty(player.full_name.as_deref()).or_else(|| non_empty(player.username.as_deref()));
        let mut driver = Driver::new(name.unwrap_or_default());
        if let Some(user_id) = player.user_id.filter(|id| *id > 0) {
            driver = driver.with_id(user_id.to_string());
        }
        let mut participant = session.create_participant();
        participant.drivers.push(driver);
        participant.vehicle = Vehicle {
            name: player.car.clone().unwrap_or_default(),
            vehicle_type: player.car_id.map(|id| id.to_string()),
            ..Default::default()
        };
        participant.position = player.position.filter(|position| *position > 0);
        participant.class_position = player.position_in_class.filter(|position| *position > 0);
        participant.grid_position = player.start_position.filter(|position| *position > 0);
        participant.class_grid_position = player.start_position_in_class.filter(|position| *position > 0);
        participant.explicit_total_time = positive_ms(player.total_time);
        participant.finish_status = finish_status(player.finish_status.as_deref());

        for (index, raw) in player.race_session_laps.iter().enumerate() {
            let valid = raw.valid.unwrap_or(true);
            let mut lap = Lap::with_time(index as u32 + 1, positive_ms(raw.time).filter(|_| valid));
            let sectors: Option<Vec<f64>> = raw.sector_times.iter().map(|sector| positive_ms(Some(*sector))).collect();
            lap.sector_times = sectors.unwrap_or_default();
            lap.position = raw.position_in_race.filter(|position| *position > 0);
            lap.is_pit_lap = raw.pit_stop_occured.unwrap_or(false);
            participant.laps.push(lap);

            for incident in &raw.incidents {
                let mut record = Incident::new(format!(
                    "{} incident on lap {} ({} points)",
                    participant.driver_name(),
                    index + 1,
                    incident.points.unwrap_or(0)
                ));
                record.participant = Some(participant.id);
                record.impact = incident.points.map(|points| points as f64);
                session.incidents.push(record);
            }
        }
        participant
    }
}

impl FormatReader for RaceRoomReader {
    fn format_name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_sessions(&self) -> Result<Vec<Session>> {
        let results = &self.results;
        let mut sessions = Vec::new();
        for raw in &results.sessions {
            let (session_type, name) = detect_session(raw.session_type.as_deref().unwrap_or("practice"), None);
            let mut session = Session::new(session_type);
            session.name = name;
            session.game = Game::named("RaceRoom Racing Experience");
            session.server = Server { name: non_empty(results.server.as_deref()), motd: None, dedicated: true };
            session.track = Track {
                venue: non_empty(results.track.as_deref()),
                course: non_empty(results.track_layout.as_deref()),
                ..Default::default()
            };
            session.date = results.start_time.and_then(|time| self.options.from_timestamp(time));
            session.mod_name = non_empty(results.experience.as_deref());
            for (key, value) in [
                ("Difficulty", &results.difficulty),
                ("FuelUsage", &results.fuel_usage),
                ("MechanicalDamage", &results.mechanical_damage),
                ("FlagRules", &results.flag_rules),
                ("CutRules", &results.cut_rules),
                ("MandatoryPitstop", &results.mandatory_pitstop),
            ] {
                if let Some(value) = non_empty(value.as_deref()) {
                    session.other_settings.insert(key.to_string(), value);
                }
            }

            let mut players: Vec<&RaceRoomPlayer> = raw.players.iter().collect();
            players.sort_by_key(|player| player.position.filter(|position| *position > 0).unwrap_or(u32::MAX));
            for player in players {
                let participant = Self::read_player(&mut session, player);
                session.push_participant(participant);
            }
            fix_participant_positions(&mut session);
            sessions.push(session);
        }
        debug!(sessions = sessions.len(), "Read RaceRoom results");
        Ok(sessions)
    }
}
