//! Assetto Corsa Competizione results
//!
//! Two variants share one shape:
//! - server: `sessionType`, `trackName`, `serverName` and `sessionResult` at the root
//! - client: the same data below `sessionDef` and `snapShot`, laps at the root
//!
//! Files are written as UTF-16 by most builds; [`decode_bytes`] takes care of
//! that before parsing.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ReaderOptions;
use crate::formats::{json_has_keys, non_empty, parse_json};
use crate::helper::detect_session;
use crate::model::{
    Driver, Game, Lap, Participant, ParticipantId, Penalty, Server, Session, SessionType, Track, Vehicle,
    ms_to_seconds, round_to,
};
use crate::reader::{FormatReader, ReaderFormat, fix_participant_positions};
use crate::text::decode_bytes;
use crate::{Result, ResultsError};

/// Value ACC writes for a time that was never set
const UNSET_MS: i64 = 2_147_483_647;

/// Time between the session clock starting and the green flag on lap 1
const GRID_START_OFFSET: f64 = 5.0;

/// Added per grid position so repaired lap 1 times keep the start order
const GRID_POSITION_STEP: f64 = 0.001;

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AccResults {
    /// `FP`, `Q`, `R`, optionally with a digit
    pub session_type: Option<Value>,
    pub track_name: Option<String>,
    pub server_name: Option<String>,
    pub session_index: Option<u32>,
    pub race_weekend_index: Option<u32>,
    pub meta_data: Option<String>,
    pub session_result: Option<AccSessionResult>,
    pub laps: Vec<AccLap>,
    pub penalties: Vec<AccPenalty>,
    #[serde(rename = "post_race_penalties")]
    pub post_race_penalties: Vec<AccPenalty>,
    /// Client variant header
    pub session_def: Option<AccSessionDef>,
    /// Client variant results
    pub snap_shot: Option<AccSessionResult>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AccSessionDef {
    /// Token or the numeric client code (0 practice, 4 qualify, 10 race)
    pub session_type: Option<Value>,
    pub track_name: Option<String>,
    pub server_name: Option<String>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AccSessionResult {
    pub bestlap: Option<i64>,
    pub best_splits: Vec<i64>,
    pub is_wet_session: Option<i64>,
    pub leader_board_lines: Vec<AccLeaderBoardLine>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AccLeaderBoardLine {
    pub car: AccCar,
    pub current_driver_index: Option<usize>,
    pub timing: AccTiming,
    pub missing_mandatory_pitstop: Option<i64>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AccCar {
    pub car_id: Option<u32>,
    pub race_number: Option<i64>,
    pub car_model: Option<u32>,
    /// 0 Pro, 1 Pro-Am, 2 Am, 3 Silver, 4 National
    pub cup_category: Option<u32>,
    /// `GT3`, `GT4`, `CUP`, ...
    pub car_group: Option<String>,
    pub team_name: Option<String>,
    pub drivers: Vec<AccDriver>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AccDriver {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub short_name: Option<String>,
    pub player_id: Option<String>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AccTiming {
    pub last_lap: Option<i64>,
    pub best_lap: Option<i64>,
    pub total_time: Option<i64>,
    pub lap_count: Option<u32>,
    pub best_splits: Vec<i64>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AccLap {
    pub car_id: Option<u32>,
    pub driver_index: Option<usize>,
    pub laptime: Option<i64>,
    pub is_valid_for_best: Option<bool>,
    pub splits: Vec<i64>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AccPenalty {
    pub car_id: Option<u32>,
    pub driver_index: Option<usize>,
    pub reason: Option<String>,
    pub penalty: Option<String>,
    pub penalty_value: Option<f64>,
    pub violation_in_lap: Option<u32>,
    pub cleared_in_lap: Option<u32>,
}

/// PC car model ids
const CAR_MODELS: &[(u32, &str)] = &[
    (0, "Porsche 991 GT3 R"),
    (1, "Mercedes-AMG GT3"),
    (2, "Ferrari 488 GT3"),
    (3, "Audi R8 LMS"),
    (4, "Lamborghini Huracan GT3"),
    (5, "McLaren 650S GT3"),
    (6, "Nissan GT-R Nismo GT3 2018"),
    (7, "BMW M6 GT3"),
    (8, "Bentley Continental GT3 2018"),
    (9, "Porsche 991 II GT3 Cup"),
    (10, "Nissan GT-R Nismo GT3 2017"),
    (11, "Bentley Continental GT3 2016"),
    (12, "Aston Martin V12 Vantage GT3"),
    (13, "Lamborghini Gallardo R-EX"),
    (14, "Jaguar G3"),
    (15, "Lexus RC F GT3"),
    (16, "Lamborghini Huracan Evo (2019)"),
    (17, "Honda NSX GT3"),
    (18, "Lamborghini Huracan SuperTrofeo"),
    (19, "Audi R8 LMS Evo (2019)"),
    (20, "AMR V8 Vantage (2019)"),
    (21, "Honda NSX Evo (2019)"),
    (22, "McLaren 720S GT3 (2019)"),
    (23, "Porsche 911 II GT3 R (2019)"),
    (24, "Ferrari 488 GT3 Evo 2020"),
    (25, "Mercedes-AMG GT3 2020"),
    (26, "Ferrari 488 Challenge Evo"),
    (27, "BMW M2 CS Racing"),
    (28, "Porsche 911 GT3 Cup (Type 992)"),
    (29, "Lamborghini Huracan Super Trofeo EVO2"),
    (30, "BMW M4 GT3"),
    (31, "Audi R8 LMS GT3 evo II"),
    (32, "Ferrari 296 GT3"),
    (33, "Lamborghini Huracan Evo2"),
    (34, "Porsche 992 GT3 R"),
    (35, "McLaren 720S GT3 Evo 2023"),
    (36, "Ford Mustang GT3"),
    (50, "Alpine A110 GT4"),
    (51, "AMR V8 Vantage GT4"),
    (52, "Audi R8 LMS GT4"),
    (53, "BMW M4 GT4"),
    (55, "Chevrolet Camaro GT4"),
    (56, "Ginetta G55 GT4"),
    (57, "KTM X-Bow GT4"),
    (58, "Maserati MC GT4"),
    (59, "McLaren 570S GT4"),
    (60, "Mercedes-AMG GT4"),
    (61, "Porsche 718 Cayman GT4"),
    (80, "Audi R8 LMS GT2"),
    (82, "KTM X-Bow GT2"),
    (83, "Maserati MC20 GT2"),
    (84, "Mercedes-AMG GT2"),
    (85, "Porsche 911 GT2 RS CS Evo"),
    (86, "Porsche 935"),
];

/// Console builds number the challenge pack cars after the GT World Challenge packs
const CONSOLE_MODEL_REMAP: &[(u32, u32)] = &[(26, 30), (27, 31), (28, 26), (29, 27), (30, 28), (31, 29)];

const CUP_CATEGORIES: &[&str] = &["Pro", "Pro-Am", "Am", "Silver", "National"];

/// Name of a car model id, remapped for console servers
pub fn car_model_name(model: u32, console: bool) -> Option<&'static str> {
    let model = if console {
        CONSOLE_MODEL_REMAP.iter().find(|(from, _)| *from == model).map_or(model, |(_, to)| *to)
    } else {
        model
    };
    CAR_MODELS.iter().find(|(id, _)| *id == model).map(|(_, name)| *name)
}

fn is_console_server(server_name: &str) -> bool {
    let server_name = server_name.to_lowercase();
    ["xbox", "ps5", "crossplay"].iter().any(|marker| server_name.contains(marker))
}

/// Milliseconds to seconds; zero, negative and the unset marker mean unknown
fn acc_seconds(ms: Option<i64>) -> Option<f64> {
    ms.filter(|ms| *ms > 0 && *ms != UNSET_MS).map(|ms| ms_to_seconds(ms as f64))
}

fn session_type_from(value: Option<&Value>) -> (SessionType, Option<String>) {
    match value {
        Some(Value::String(token)) => detect_session(token, None),
        Some(Value::Number(code)) => match code.as_i64() {
            Some(4) => (SessionType::Qualify, None),
            Some(10) => (SessionType::Race, None),
            _ => (SessionType::Practice, None),
        },
        _ => (SessionType::Practice, None),
    }
}

/// Reader for ACC server and client results
#[derive(Debug)]
pub struct AccReader {
    results: AccResults,
    options: ReaderOptions,
}

impl ReaderFormat for AccReader {
    const NAME: &'static str = "acc";

    fn can_read(data: &[u8]) -> bool {
        json_has_keys(data, &["sessionType", "sessionResult"]) || json_has_keys(data, &["sessionDef", "snapShot"])
    }

    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
        Ok(Self { results: parse_json(Self::NAME, &decode_bytes(data))?, options })
    }
}

fn driver_from(raw: &AccDriver) -> Driver {
    let name = [raw.first_name.as_deref(), raw.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let name = if name.is_empty() { raw.short_name.clone().unwrap_or_default() } else { name };
    let driver = Driver::new(name);
    match &raw.player_id {
        Some(id) => driver.with_id(id.trim()),
        None => driver,
    }
}

impl AccReader {
    fn participant_from(line: &AccLeaderBoardLine, race: bool, console: bool) -> Option<Participant> {
        let car = &line.car;
        let mut participant = Participant::new(ParticipantId(car.car_id?));
        participant.drivers = car.drivers.iter().map(driver_from).collect();
        participant.team = non_empty(car.team_name.as_deref());
        participant.vehicle = Vehicle {
            name: car
                .car_model
                .and_then(|model| car_model_name(model, console))
                .map(str::to_string)
                .or_else(|| car.car_model.map(|model| format!("Car model {model}")))
                .unwrap_or_default(),
            vehicle_type: car.car_model.map(|model| model.to_string()),
            class: non_empty(car.car_group.as_deref()),
            cup: car.cup_category.and_then(|cup| CUP_CATEGORIES.get(cup as usize)).map(|cup| cup.to_string()),
            number: car.race_number.map(|number| number.to_string()),
            ..Default::default()
        };
        if race {
            participant.explicit_total_time = acc_seconds(line.timing.total_time);
            if line.missing_mandatory_pitstop.is_some_and(|missing| missing > 0) {
                participant.finish_comment = Some("Missing mandatory pitstop".to_string());
            }
        }
        Some(participant)
    }

    fn read_laps(&self, session: &mut Session) {
        for raw in &self.results.laps {
            let Some(participant) = raw.car_id.and_then(|id| session.participant_mut(ParticipantId(id))) else {
                continue;
            };
            let mut lap = Lap::with_time(participant.laps.len() as u32 + 1, acc_seconds(raw.laptime));
            let sectors: Option<Vec<f64>> = raw.splits.iter().map(|split| acc_seconds(Some(*split))).collect();
            lap.sector_times = sectors.unwrap_or_default();
            lap.driver = raw.driver_index.filter(|index| *index > 0 && *index < participant.drivers.len());
            participant.laps.push(lap);
        }
    }

    fn read_penalties(&self, session: &mut Session) {
        let penalties = self.results.penalties.iter().map(|penalty| (penalty, false));
        let post_race = self.results.post_race_penalties.iter().map(|penalty| (penalty, true));
        for (raw, post_race) in penalties.chain(post_race) {
            let kind = raw.penalty.as_deref().unwrap_or("None");
            if kind == "None" {
                continue;
            }
            let reason = raw.reason.as_deref().unwrap_or("Unknown");
            let mut penalty = Penalty::new(format!("{kind}: {reason}"));
            penalty.participant = raw.car_id.map(ParticipantId).filter(|id| session.participant(*id).is_some());
            penalty.penalty_type = Some(kind.to_string());
            penalty.value = raw.penalty_value;
            penalty.lap = raw.violation_in_lap;
            penalty.served = raw.cleared_in_lap.is_some_and(|lap| lap > 0);
            penalty.post_race = post_race;
            session.penalties.push(penalty);
        }
    }
}

/// Rebuild lap 1 sector 1 of every participant in a race.
///
/// The session clock runs before the green flag, so lap 1 sector 1 holds the
/// formation time. It becomes the average lap 2+ sector 1 of everyone else,
/// plus the grid start offset and a step per position.
pub fn fix_first_lap_times(session: &mut Session) {
    let first_sectors: Vec<Vec<f64>> = session
        .participants
        .iter()
        .map(|participant| {
            participant
                .laps
                .iter()
                .filter(|lap| lap.number.is_some_and(|number| number >= 2))
                .filter_map(|lap| lap.sector_time(1))
                .collect()
        })
        .collect();

    for position in 0..session.participants.len() {
        let others: Vec<f64> = first_sectors
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != position)
            .flat_map(|(_, sectors)| sectors.iter().copied())
            .collect();
        if others.is_empty() {
            continue;
        }
        let average = others.iter().sum::<f64>() / others.len() as f64;
        let Some(lap) = session.participants[position].laps.iter_mut().find(|lap| lap.number == Some(1)) else {
            continue;
        };
        if lap.sector_times.is_empty() {
            continue;
        }
        let sector = round_to(average + GRID_START_OFFSET + position as f64 * GRID_POSITION_STEP, 4);
        lap.sector_times[0] = sector;
        lap.time = Some(round_to(lap.sector_times.iter().sum(), 4));
        debug!(position = position + 1, sector, time = ?lap.time, "Repaired ACC lap 1");
    }
}

impl FormatReader for AccReader {
    fn format_name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_sessions(&self) -> Result<Vec<Session>> {
        let results = &self.results;
        let definition = results.session_def.as_ref();
        let (session_type, name) =
            session_type_from(results.session_type.as_ref().or(definition.and_then(|def| def.session_type.as_ref())));
        let track_name = results.track_name.as_deref().or(definition.and_then(|def| def.track_name.as_deref()));
        let server_name = results.server_name.as_deref().or(definition.and_then(|def| def.server_name.as_deref()));
        let Some(standings) = results.session_result.as_ref().or(results.snap_shot.as_ref()) else {
            return Err(ResultsError::cannot_read_session(Self::NAME, "no session result"));
        };
        let console = server_name.is_some_and(is_console_server);

        let mut session = Session::new(session_type);
        session.name = name;
        session.game = Game::named("Assetto Corsa Competizione");
        session.track = Track { venue: non_empty(track_name), ..Default::default() };
        session.server = Server { name: non_empty(server_name), motd: None, dedicated: results.session_def.is_none() };
        if let Some(meta) = non_empty(results.meta_data.as_deref()) {
            session.other_settings.insert("MetaData".to_string(), meta);
        }
        if standings.is_wet_session.is_some_and(|wet| wet > 0) {
            session.other_settings.insert("WetSession".to_string(), "1".to_string());
        }

        let race = session_type == SessionType::Race;
        for line in &standings.leader_board_lines {
            if let Some(participant) = Self::participant_from(line, race, console) {
                session.push_participant(participant);
            }
        }
        self.read_laps(&mut session);
        self.read_penalties(&mut session);
        if race {
            fix_first_lap_times(&mut session);
        }
        fix_participant_positions(&mut session);

        debug!(
            session_type = %session.session_type,
            participants = session.participants.len(),
            console,
            "Read ACC results"
        );
        Ok(vec![session])
    }
}
