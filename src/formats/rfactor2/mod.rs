//! rFactor and rFactor 2 XML results
//!
//! Both games (and the GSC/Automobilista family built on them) write an
//! `rFactorXML` document with one element per session below `RaceResults`.
//! Besides field extraction this reader repairs what the games get wrong:
//!
//! - **Driver swaps**: `Swap` ranges attribute laps to co-drivers
//! - **Human detection**: `ControlAndAids` overrides a missing or wrong `isPlayer`
//! - **Position corruption**: finishing order contradicting the timing data
//! - **Lap position corruption**: impossible jumps in per lap positions
//! - **Incident flood**: more than [`MAX_INCIDENTS`] incidents collapse into a warning

mod xml;

use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, warn};

use self::xml::{Element, parse_document};
use crate::config::ReaderOptions;
use crate::formats::{compile, non_empty};
use crate::helper::{detect_session, sort_participants_by_best_lap, sort_participants_by_total_time};
use crate::model::{
    AidFlags, Chat, Cut, Driver, DriverSwap, FinishStatus, Game, Incident, IncidentType, Lap,
    Participant, Penalty, RFACTOR_REVIEW_IMPACT, Server, Session, SessionType, Track, Vehicle,
    round_to,
};
use crate::reader::{FormatReader, ReaderFormat, fix_lap_positions, fix_participant_positions};
use crate::text::decode_bytes;
use crate::{Result, ResultsError};

/// Above this many incidents a session only gets a single warning incident
pub const MAX_INCIDENTS: usize = 2000;

/// Lap position jump that marks a lap set as fully corrupted
const CORRUPT_LAP_POSITION_JUMP: u32 = 9;

/// `Laps` value rFactor writes for sessions without a lap limit
const UNLIMITED_LAPS: u32 = 2_147_483_647;

/// Result elements copied into `other_settings`
const SETTINGS: &[&str] = &[
    "MechFailRate",
    "DamageMult",
    "FuelMult",
    "TireMult",
    "ParcFerme",
    "FixedSetups",
    "FreeSettings",
    "FixedUpgrades",
    "TireWarmers",
];

const INCIDENT_PATTERN: &str = r"^(?P<driver>.+?)\(\d+\) reported contact \((?P<impact>[\d.]+)\) with (?:another vehicle (?P<other>.+?)\(\d+\)|(?P<object>.+?))\s*$";

/// Reader for `rFactorXML` documents
#[derive(Debug)]
pub struct RfactorReader {
    results: Element,
    options: ReaderOptions,
}

impl ReaderFormat for RfactorReader {
    const NAME: &'static str = "rfactor2";

    fn can_read(data: &[u8]) -> bool {
        let text = decode_bytes(data);
        if !text.contains("<rFactorXML") {
            return false;
        }
        parse_document(&text)
            .is_ok_and(|root| root.name == "rFactorXML" && root.child("RaceResults").is_some())
    }

    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
        let mut root = parse_document(&decode_bytes(data))?;
        let index = root
            .children
            .iter()
            .position(|child| child.name == "RaceResults")
            .ok_or_else(|| ResultsError::cannot_read_session(Self::NAME, "missing RaceResults"))?;
        Ok(Self { results: root.children.swap_remove(index), options })
    }
}

impl FormatReader for RfactorReader {
    fn format_name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_sessions(&self) -> Result<Vec<Session>> {
        let results = &self.results;
        let incident_pattern = compile(INCIDENT_PATTERN)?;

        let game = Game {
            name: Some(if results.contains("Stream") { "rFactor 2" } else { "rFactor" }.to_string()),
            version: non_empty(results.child_text("GameVersion")),
        };
        let track = Track {
            venue: non_empty(results.child_text("TrackVenue")),
            course: non_empty(results.child_text("TrackCourse")),
            event: non_empty(results.child_text("TrackEvent")),
            length: results.child_parse("TrackLength"),
        };
        let server = Server {
            name: non_empty(results.child_text("ServerName")),
            motd: None,
            dedicated: results.child_text("ServerName").is_some(),
        };
        let allowed_vehicles: Vec<Vehicle> = results
            .child_text("VehiclesAllowed")
            .map(|allowed| {
                allowed.split('|').map(str::trim).filter(|class| !class.is_empty()).map(Vehicle::new).collect()
            })
            .unwrap_or_default();
        let other_settings: BTreeMap<String, String> = SETTINGS
            .iter()
            .filter_map(|key| results.child_text(key).map(|value| (key.to_string(), value.to_string())))
            .collect();
        let file_date =
            results.child_parse::<i64>("DateTime").and_then(|stamp| self.options.from_timestamp(stamp));

        let mut sessions = Vec::new();
        for element in results
            .children
            .iter()
            .filter(|child| child.child("Driver").is_some() || child.child("Stream").is_some())
        {
            let (session_type, name) = detect_session(&element.name, None);
            let mut session = Session::new(session_type);
            session.name = name;
            session.game = game.clone();
            session.track = track.clone();
            session.server = server.clone();
            session.allowed_vehicles = allowed_vehicles.clone();
            session.other_settings = other_settings.clone();
            session.mod_name = non_empty(results.child_text("Mod"));
            session.date = element
                .child_parse::<i64>("DateTime")
                .and_then(|stamp| self.options.from_timestamp(stamp))
                .or(file_date);

            let race_limits = session_type == SessionType::Race;
            session.max_laps = element
                .child_parse::<u32>("Laps")
                .or_else(|| race_limits.then(|| results.child_parse("RaceLaps")).flatten())
                .filter(|laps| *laps > 0 && *laps < UNLIMITED_LAPS);
            session.max_minutes = element
                .child_parse::<u32>("Minutes")
                .or_else(|| race_limits.then(|| results.child_parse("RaceTime")).flatten())
                .filter(|minutes| *minutes > 0);

            for driver in element.children_named("Driver") {
                let participant = read_participant(&mut session, driver);
                session.push_participant(participant);
            }
            session.participants.sort_by_key(|participant| participant.position.unwrap_or(u32::MAX));

            if let Some(stream) = element.child("Stream") {
                read_stream(&mut session, stream, &incident_pattern);
            }

            fix_position_corruption(&mut session);
            fix_lap_position_corruption(&mut session);
            sessions.push(session);
        }

        if sessions.is_empty() {
            return Err(ResultsError::cannot_read_session(Self::NAME, "no session elements"));
        }
        Ok(sessions)
    }
}

fn finish_status(raw: Option<&str>) -> FinishStatus {
    match raw.map(|status| status.trim().to_ascii_lowercase()).as_deref() {
        Some("dnf") => FinishStatus::Dnf,
        Some("dq") => FinishStatus::Dq,
        Some("none") => FinishStatus::None,
        _ => FinishStatus::Normal,
    }
}

/// `PlayerControl,AutoShift=3,TC=1` into flags
fn parse_aids(raw: &str) -> AidFlags {
    raw.split(',')
        .map(str::trim)
        .filter(|aid| !aid.is_empty())
        .map(|aid| match aid.split_once('=') {
            Some((key, value)) => (key.trim().to_string(), Some(value.trim().to_string())),
            None => (aid.to_string(), None),
        })
        .collect()
}

/// Aids are the better signal: `isPlayer` is only set for the host's driver.
fn is_human(is_player: Option<&str>, aids: &[&Element]) -> bool {
    if aids.iter().any(|aid| aid.text.contains("PlayerControl")) {
        return true;
    }
    if !aids.is_empty() && aids.iter().all(|aid| aid.text.contains("AIControl")) {
        return false;
    }
    is_player.is_none_or(|flag| flag.trim() != "0")
}

/// `"1,Medium"` into `"Medium"`
fn compound(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    non_empty(Some(raw.split_once(',').map_or(raw, |(_, name)| name)))
}

fn lap_range(element: &Element) -> (u32, u32) {
    (element.attr_parse("startLap").unwrap_or(0), element.attr_parse("endLap").unwrap_or(u32::MAX))
}

fn read_participant(session: &mut Session, element: &Element) -> Participant {
    let mut participant = session.create_participant();

    let aids: Vec<&Element> = element.children_named("ControlAndAids").collect();
    let human = is_human(element.child_text("isPlayer"), &aids);
    let mut driver = Driver::new(element.child_text("Name").unwrap_or_default());
    driver.is_human = human;
    participant.drivers.push(driver);

    participant.vehicle = Vehicle {
        name: element.child_text("VehName").or(element.child_text("CarType")).unwrap_or_default().to_string(),
        vehicle_type: non_empty(element.child_text("CarType")),
        class: non_empty(element.child_text("CarClass")),
        number: non_empty(element.child_text("CarNumber")),
        skin: non_empty(element.child_text("VehFile")),
        ..Default::default()
    };
    participant.team = non_empty(element.child_text("TeamName"));
    participant.position = element.child_parse("Position").filter(|position| *position > 0);
    participant.class_position = element.child_parse("ClassPosition").filter(|position| *position > 0);
    participant.grid_position = element.child_parse("GridPos").filter(|position| *position > 0);
    participant.class_grid_position = element.child_parse("ClassGridPos").filter(|position| *position > 0);
    participant.explicit_pitstops = element.child_parse("Pitstops");
    participant.finish_status = finish_status(element.child_text("FinishStatus"));
    participant.finish_comment = non_empty(element.child_text("DNFReason"));
    participant.explicit_total_time = element.child_parse::<f64>("FinishTime").filter(|time| *time > 0.0);

    for swap in element.children_named("Swap") {
        if swap.text.is_empty() {
            continue;
        }
        let mut co_driver = Driver::new(swap.text.clone());
        co_driver.is_human = human;
        let driver_index = participant.ensure_driver(co_driver);
        let (start_lap, end_lap) = lap_range(swap);
        participant.driver_swaps.push(DriverSwap { start_lap, end_lap, driver_index });
    }

    for (index, lap_element) in element.children_named("Lap").enumerate() {
        let number = lap_element.attr_parse::<u32>("num").unwrap_or(index as u32 + 1);
        let mut lap = Lap::with_time(number, lap_element.text.parse::<f64>().ok().filter(|time| *time > 0.0));
        lap.position = lap_element.attr_parse("p").filter(|position| *position > 0);
        lap.elapsed_seconds = lap_element.attr_parse::<f64>("et").filter(|et| et.is_finite() && *et >= 0.0);
        lap.sector_times = ["s1", "s2", "s3"]
            .iter()
            .map_while(|key| lap_element.attr_parse::<f64>(key).filter(|sector| *sector > 0.0))
            .collect();
        lap.front_compound = compound(lap_element.attr("fcompound"));
        lap.rear_compound = compound(lap_element.attr("rcompound"));
        lap.is_pit_lap = lap_element.attr("pit") == Some("1");
        if let Some(aid) = aids.iter().find(|aid| {
            let (start, end) = lap_range(aid);
            start <= number && number <= end
        }) {
            lap.aids = parse_aids(&aid.text);
        }
        if !participant.driver_swaps.is_empty() {
            lap.driver = Some(participant.driver_index_for_lap(number));
        }
        participant.laps.push(lap);
    }

    participant
}

fn read_stream(session: &mut Session, stream: &Element, incident_pattern: &Regex) {
    let mut incidents = Vec::new();

    for event in &stream.children {
        let elapsed_seconds = event.attr_parse::<f64>("et");
        match event.name.as_str() {
            "Incident" => {
                let mut incident = Incident::new(event.text.clone());
                incident.elapsed_seconds = elapsed_seconds;
                if let Some(captures) = incident_pattern.captures(&event.text) {
                    let id_of = |name: &str| session.participant_by_driver_name(name.trim()).map(|participant| participant.id);
                    incident.participant = captures.name("driver").and_then(|driver| id_of(driver.as_str()));
                    match captures.name("other") {
                        Some(other) => {
                            incident.incident_type = IncidentType::Car;
                            incident.other_participant = id_of(other.as_str());
                        }
                        None => incident.incident_type = IncidentType::Env,
                    }
                    if let Some(impact) = captures.name("impact").and_then(|impact| impact.as_str().parse().ok()) {
                        incident.set_impact(impact, RFACTOR_REVIEW_IMPACT);
                    }
                }
                incidents.push(incident);
            }
            "Penalty" => {
                let driver = event.attr("driver");
                let message = match (event.text.is_empty(), driver, event.attr("penalty")) {
                    (false, _, _) => event.text.clone(),
                    (true, Some(driver), Some(kind)) => match event.attr("reason") {
                        Some(reason) => format!("{driver} received {kind}: {reason}"),
                        None => format!("{driver} received {kind}"),
                    },
                    _ => continue,
                };
                let mut penalty = Penalty::new(message);
                penalty.elapsed_seconds = elapsed_seconds;
                penalty.penalty_type = event.attr("penalty").map(str::to_string);
                penalty.participant = driver
                    .and_then(|driver| session.participant_by_driver_name(driver))
                    .or_else(|| {
                        session.participants.iter().find(|participant| {
                            !participant.driver_name().is_empty() && event.text.contains(participant.driver_name())
                        })
                    })
                    .map(|participant| participant.id);
                session.penalties.push(penalty);
            }
            "ChatMessage" => {
                let mut chat = Chat::new(event.text.clone());
                chat.elapsed_seconds = elapsed_seconds;
                session.chats.push(chat);
            }
            "TrackLimits" => read_cut(session, event, elapsed_seconds),
            _ => {}
        }
    }

    if incidents.len() > MAX_INCIDENTS {
        warn!(count = incidents.len(), "Too many incidents, replacing them with a warning");
        incidents = vec![Incident::new(format!(
            "Too many incidents ({}), incidents are not shown",
            incidents.len()
        ))];
    }
    session.incidents = incidents;
}

/// Track limits events count completed laps, so the cut belongs to the next lap.
fn read_cut(session: &mut Session, event: &Element, elapsed_seconds: Option<f64>) {
    let (Some(driver), Some(completed)) = (event.attr("driver"), event.attr_parse::<u32>("lap")) else {
        return;
    };
    let Some(participant) =
        session.participants.iter_mut().find(|participant| participant.driver_index(driver).is_some())
    else {
        return;
    };
    let Some(lap) = participant.laps.iter_mut().find(|lap| lap.number == Some(completed + 1)) else {
        return;
    };
    let elapsed_seconds_in_lap = match (elapsed_seconds, lap.elapsed_seconds) {
        (Some(event_time), Some(lap_start)) if event_time >= lap_start => {
            Some(round_to(event_time - lap_start, 4))
        }
        _ => None,
    };
    lap.cuts.push(Cut { elapsed_seconds, elapsed_seconds_in_lap, ..Default::default() });
}

fn best_time(participant: &Participant) -> Option<f64> {
    participant.best_lap().and_then(|lap| lap.time)
}

/// Whether the finishing order contradicts the timing data
///
/// Each participant is checked against the one directly ahead. Race: a lower
/// total time over exactly the same number of completed laps. Other
/// sessions: a faster best lap.
fn positions_corrupted(session: &Session) -> bool {
    session.participants.windows(2).any(|pair| {
        let (ahead, participant) = (&pair[0], &pair[1]);
        if session.session_type == SessionType::Race {
            let same_laps = ahead.number_of_completed_laps() == participant.number_of_completed_laps();
            match (ahead.total_time(), participant.total_time()) {
                (Some(ahead_time), Some(time)) => same_laps && time > 0.0 && time < ahead_time,
                _ => false,
            }
        } else {
            matches!((best_time(ahead), best_time(participant)), (Some(ahead_best), Some(best)) if best < ahead_best)
        }
    })
}

fn fix_position_corruption(session: &mut Session) {
    if !positions_corrupted(session) {
        return;
    }
    warn!(session = %session.display_name(), "Finishing order contradicts timing, re-sorting");
    if session.session_type == SessionType::Race {
        sort_participants_by_total_time(&mut session.participants);
    } else {
        sort_participants_by_best_lap(&mut session.participants);
    }
    fix_participant_positions(session);
}

fn fix_lap_position_corruption(session: &mut Session) {
    let mut observed: Vec<u32> = session
        .participants
        .iter()
        .flat_map(|participant| participant.laps.iter().filter_map(|lap| lap.position))
        .collect();
    observed.sort_unstable();
    observed.dedup();

    let mut previous = 0;
    let mut corrupt_from = None;
    let mut gaps = false;
    for position in observed {
        let jump = position - previous;
        if jump > CORRUPT_LAP_POSITION_JUMP {
            corrupt_from = Some(position);
            break;
        }
        gaps |= jump > 1;
        previous = position;
    }

    if let Some(threshold) = corrupt_from {
        for participant in &mut session.participants {
            let mut positions = participant.laps.iter().filter_map(|lap| lap.position).peekable();
            if positions.peek().is_some() && positions.all(|position| position >= threshold) {
                warn!(driver = participant.driver_name(), "Discarding laps with corrupted positions");
                participant.laps.clear();
            }
        }
    }

    if corrupt_from.is_some() || gaps {
        debug!(session = %session.display_name(), "Recomputing lap positions");
        repair_lap_positions(session);
    }
}

/// Rank every lap number by elapsed time, lap 1 by grid position.
fn repair_lap_positions(session: &mut Session) {
    for participant in &mut session.participants {
        for lap in &mut participant.laps {
            lap.position = None;
        }
    }
    fix_lap_positions(session);

    let mut starters: Vec<(Option<u32>, usize)> = session
        .participants
        .iter()
        .enumerate()
        .filter(|(_, participant)| participant.lap(1).is_some())
        .map(|(index, participant)| (participant.grid_position, index))
        .collect();
    starters.sort_by_key(|(grid, _)| grid.unwrap_or(u32::MAX));

    for (rank, (_, index)) in starters.into_iter().enumerate() {
        if let Some(lap) = session.participants[index].laps.iter_mut().find(|lap| lap.number == Some(1)) {
            lap.position = Some(rank as u32 + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(sessions: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<rFactorXML version="1.0">
<RaceResults>
  <GameVersion>1.1122</GameVersion>
  <DateTime>1405453853</DateTime>
  <TrackVenue>Spa-Francorchamps</TrackVenue>
  <TrackCourse>Grand Prix</TrackCourse>
  <TrackLength>7004.0</TrackLength>
  <ServerName>League Night</ServerName>
  <Mod>GT3 Series.rfm</Mod>
  <VehiclesAllowed>|GT3|GT4|</VehiclesAllowed>
  <FuelMult>2</FuelMult>
  {sessions}
</RaceResults>
</rFactorXML>"#
        )
    }

    fn read(xml: &str) -> Vec<Session> {
        RfactorReader::from_bytes(xml.as_bytes()).and_then(|reader| reader.read_sessions()).unwrap()
    }

    fn driver(name: &str, position: u32, laps: &[(f64, f64, u32)], extra: &str) -> String {
        let laps: String = laps
            .iter()
            .enumerate()
            .map(|(index, (et, time, p))| {
                format!(r#"<Lap num="{}" p="{p}" et="{et}" s1="30.0" s2="30.0">{time}</Lap>"#, index + 1)
            })
            .collect();
        format!(
            "<Driver><Name>{name}</Name><Position>{position}</Position><GridPos>{position}</GridPos>\
             <FinishStatus>Finished Normally</FinishStatus>{extra}{laps}</Driver>"
        )
    }

    #[test]
    fn sniffs_root_element() {
        assert!(RfactorReader::can_read(document("<Race></Race>").as_bytes()));
        assert!(!RfactorReader::can_read(b"<rFactorXML"));
        assert!(!RfactorReader::can_read(b"<root><RaceResults/></root>"));
        assert!(!RfactorReader::can_read(br#"{"sessions": []}"#));
    }

    #[test]
    fn reads_header_and_participants() {
        let xml = document(&format!(
            "<Race><Laps>2</Laps>{}{}</Race>",
            driver("Alpha", 2, &[(0.0, 95.0, 2), (95.0, 92.0, 2)], "<FinishTime>190.0</FinishTime>"),
            driver("Bravo", 1, &[(0.0, 94.0, 1), (94.0, 91.0, 1)], "<FinishTime>185.0</FinishTime>"),
        ));
        let sessions = read(&xml);
        assert_eq!(sessions.len(), 1);
        let race = &sessions[0];
        assert_eq!(race.session_type, SessionType::Race);
        assert_eq!(race.name, None);
        assert_eq!(race.max_laps, Some(2));
        assert_eq!(race.track.venue.as_deref(), Some("Spa-Francorchamps"));
        assert_eq!(race.game.name.as_deref(), Some("rFactor"));
        assert_eq!(race.other_settings.get("FuelMult").map(String::as_str), Some("2"));
        assert_eq!(race.allowed_vehicles.len(), 2);
        assert!(race.date.is_some());

        // sorted by the position element
        assert_eq!(race.participants[0].driver_name(), "Bravo");
        assert_eq!(race.participants[0].laps[1].sector_times, [30.0, 30.0]);
        assert_eq!(race.participants[0].laps[1].elapsed_seconds, Some(94.0));
    }

    #[test]
    fn race_positions_follow_total_time_when_corrupted() {
        let xml = document(&format!(
            "<Race>{}{}</Race>",
            driver("Slow", 1, &[(0.0, 95.0, 1), (95.0, 95.0, 1)], "<FinishTime>190.0</FinishTime>"),
            driver("Fast", 2, &[(0.0, 94.0, 2), (94.0, 94.0, 2)], "<FinishTime>188.0</FinishTime>"),
        ));
        let race = &read(&xml)[0];
        assert_eq!(race.participants[0].driver_name(), "Fast");
        assert_eq!(race.participants[0].position, Some(1));
        assert_eq!(race.participants[1].position, Some(2));
    }

    #[test]
    fn qualify_positions_follow_best_lap_when_corrupted() {
        let xml = document(&format!(
            "<Qualify>{}{}</Qualify>",
            driver("Slow", 1, &[(0.0, 95.0, 1)], ""),
            driver("Fast", 2, &[(0.0, 94.0, 2)], ""),
        ));
        let qualify = &read(&xml)[0];
        assert_eq!(qualify.session_type, SessionType::Qualify);
        assert_eq!(qualify.participants[0].driver_name(), "Fast");
    }

    #[test]
    fn lapped_finishers_are_not_corruption() {
        let xml = document(&format!(
            "<Race>{}{}</Race>",
            driver("Leader", 1, &[(0.0, 95.0, 1), (95.0, 95.0, 1)], "<FinishTime>190.0</FinishTime>"),
            driver("Lapped", 2, &[(0.0, 96.0, 2)], "<FinishTime>96.0</FinishTime>"),
        ));
        let race = &read(&xml)[0];
        assert_eq!(race.participants[0].driver_name(), "Leader");
    }

    #[test]
    fn retired_driver_listed_first_keeps_the_classification() {
        let retired = format!(
            "<Driver><Name>Retired</Name><Position>3</Position><GridPos>1</GridPos>\
             <FinishStatus>DNF</FinishStatus><DNFReason>Accident</DNFReason>{}</Driver>",
            r#"<Lap num="1" p="1" et="0.0" s1="30.0" s2="30.0">90.0</Lap>"#
        );
        let xml = document(&format!(
            "<Race>{retired}{}{}</Race>",
            driver("Second", 2, &[(0.0, 95.0, 2), (95.0, 96.0, 2)], "<FinishTime>191.0</FinishTime>"),
            driver("Winner", 1, &[(0.0, 94.0, 3), (94.0, 94.0, 1)], "<FinishTime>188.0</FinishTime>"),
        ));
        let race = &read(&xml)[0];
        let names: Vec<&str> = race.participants.iter().map(Participant::driver_name).collect();
        assert_eq!(names, ["Winner", "Second", "Retired"]);
        assert_eq!(race.participants[2].finish_status, FinishStatus::Dnf);
        assert_eq!(race.participants[2].position, Some(3));
        assert_eq!(race.participants[2].grid_position, Some(1));
    }

    #[test]
    fn only_the_participant_directly_ahead_is_compared() {
        // Third beats First but not Second, which is directly ahead of it
        let xml = document(&format!(
            "<Race>{}{}{}</Race>",
            driver("First", 1, &[(0.0, 95.0, 1), (95.0, 95.0, 1)], "<FinishTime>190.0</FinishTime>"),
            driver("Second", 2, &[(0.0, 90.0, 2)], "<FinishTime>90.0</FinishTime>"),
            driver("Third", 3, &[(0.0, 94.0, 3), (94.0, 95.0, 3)], "<FinishTime>189.0</FinishTime>"),
        ));
        let race = &read(&xml)[0];
        let names: Vec<&str> = race.participants.iter().map(Participant::driver_name).collect();
        assert_eq!(names, ["First", "Second", "Third"]);
    }

    #[test]
    fn swaps_and_aids_attribute_laps() {
        let extra = r#"<Swap startLap="0" endLap="1">Alpha</Swap><Swap startLap="2" endLap="3">Charlie</Swap>
            <ControlAndAids startLap="0" endLap="3">PlayerControl,AutoShift=3,TC=1</ControlAndAids><isPlayer>0</isPlayer>"#;
        let xml = document(&format!(
            "<Race>{}{}</Race>",
            driver("Alpha", 1, &[(0.0, 95.0, 1), (95.0, 95.0, 1), (190.0, 95.0, 1)], extra),
            driver("Robot", 2, &[(0.0, 96.0, 2)], r#"<ControlAndAids startLap="0" endLap="3">AIControl</ControlAndAids>"#),
        ));
        let race = &read(&xml)[0];
        let alpha = &race.participants[0];
        assert_eq!(alpha.drivers.len(), 2);
        assert!(alpha.drivers.iter().all(|driver| driver.is_human));
        assert_eq!(alpha.laps[0].driver, Some(0));
        assert_eq!(alpha.laps[2].driver, Some(1));
        assert_eq!(alpha.driver_for_lap(3).map(|driver| driver.name.as_str()), Some("Charlie"));
        assert_eq!(alpha.laps[0].aids.get("AutoShift"), Some(&Some("3".to_string())));
        assert!(alpha.laps[0].aids.contains_key("PlayerControl"));

        assert!(!race.participants[1].drivers[0].is_human);
    }

    #[test]
    fn stream_events_link_participants() {
        let stream = r#"<Stream>
            <Incident et="100.5">Alpha(0) reported contact (0.75) with another vehicle Bravo(1)</Incident>
            <Incident et="120.0">Bravo(1) reported contact (0.20) with Wall</Incident>
            <Penalty et="130.0" driver="Bravo" penalty="Drive Thru" reason="Speeding in pitlane"/>
            <ChatMessage et="10.0">good luck all</ChatMessage>
            <TrackLimits et="100.0" driver="Alpha" id="0" lap="1" WarningPoints="1.0" resolution="1"/>
        </Stream>"#;
        let xml = document(&format!(
            "<Race>{stream}{}{}</Race>",
            driver("Alpha", 1, &[(0.0, 95.0, 1), (95.0, 95.0, 1)], ""),
            driver("Bravo", 2, &[(0.0, 96.0, 2), (96.0, 96.0, 2)], ""),
        ));
        let race = &read(&xml)[0];
        assert_eq!(race.game.name.as_deref(), Some("rFactor 2"));
        let alpha = race.participants[0].id;
        let bravo = race.participants[1].id;

        let contact = &race.incidents[0];
        assert_eq!(contact.incident_type, IncidentType::Car);
        assert_eq!(contact.participant, Some(alpha));
        assert_eq!(contact.other_participant, Some(bravo));
        assert!(contact.for_review);

        let wall = &race.incidents[1];
        assert_eq!(wall.incident_type, IncidentType::Env);
        assert!(!wall.for_review);

        assert_eq!(race.penalties[0].participant, Some(bravo));
        assert_eq!(race.penalties[0].message, "Bravo received Drive Thru: Speeding in pitlane");
        assert_eq!(race.chats[0].message, "good luck all");

        let cut = &race.participants[0].laps[1].cuts[0];
        assert_eq!(cut.elapsed_seconds_in_lap, Some(5.0));
    }

    #[test]
    fn incident_flood_is_replaced_by_a_warning() {
        let incidents: String = (0..=MAX_INCIDENTS)
            .map(|index| format!(r#"<Incident et="{index}.0">Alpha(0) reported contact (0.10) with Wall</Incident>"#))
            .collect();
        let xml = document(&format!(
            "<Race><Stream>{incidents}</Stream>{}</Race>",
            driver("Alpha", 1, &[(0.0, 95.0, 1)], "")
        ));
        let race = &read(&xml)[0];
        assert_eq!(race.incidents.len(), 1);
        assert!(race.incidents[0].message.contains("2001"));
    }

    #[test]
    fn small_lap_position_gaps_are_recomputed() {
        let xml = document(&format!(
            "<Race>{}{}</Race>",
            driver("Alpha", 1, &[(0.0, 95.0, 1), (95.0, 95.0, 3)], ""),
            driver("Bravo", 2, &[(0.0, 94.0, 3), (94.0, 96.0, 1)], ""),
        ));
        let race = &read(&xml)[0];
        let alpha = &race.participants[0];
        let bravo = &race.participants[1];
        // lap 1 from the grid, lap 2 by elapsed time
        assert_eq!(alpha.laps[0].position, Some(1));
        assert_eq!(bravo.laps[0].position, Some(2));
        assert_eq!(bravo.laps[1].position, Some(1));
        assert_eq!(alpha.laps[1].position, Some(2));
    }

    #[test]
    fn fully_corrupted_lap_sets_are_discarded() {
        let xml = document(&format!(
            "<Race>{}{}{}</Race>",
            driver("Alpha", 1, &[(0.0, 95.0, 1), (95.0, 95.0, 1)], ""),
            driver("Bravo", 2, &[(0.0, 96.0, 2), (96.0, 96.0, 2)], ""),
            driver("Ghost", 3, &[(0.0, 97.0, 25), (97.0, 97.0, 26)], ""),
        ));
        let race = &read(&xml)[0];
        let ghost = race.participant_by_driver_name("Ghost").unwrap();
        assert!(ghost.laps.is_empty());
        assert_eq!(race.participants[0].laps[1].position, Some(1));
    }
}
