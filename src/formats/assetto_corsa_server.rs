//! Assetto Corsa dedicated server text log
//!
//! The plain acServer console log. Drivers connect before the session in
//! which they drive, so connect records are collected from the whole log and
//! then matched to lap lines by name and line order. The connect record
//! layout changed several times across server versions; each layout has its
//! own extractor and the first one that finds anything wins.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use tracing::{debug, trace};

use crate::config::ReaderOptions;
use crate::formats::compile;
use crate::helper::{detect_session, seconds_from_formatted_time};
use crate::model::{
    Chat, Driver, FinishStatus, Game, IMPACT_SPEED_REVIEW_KMH, Incident, IncidentType, Lap, Server,
    Session, SessionType, Track, Vehicle,
};
use crate::reader::{FormatReader, ReaderFormat, sort_participants_and_fix_positions};
use crate::text::decode_bytes;
use crate::{Result, ResultsError};

/// Leaderboard time meaning "no time"
const UNSET_TIME: &str = "16666:39:999";

/// Lap count lead over a stalled driver before the driver is called DNF
const FORCED_DNF_LAP_LEAD: u32 = 2;

/// A driver connecting with a car
#[derive(Debug, Clone, PartialEq)]
struct ConnectRecord {
    /// Line the connect record completed on
    line: usize,
    name: String,
    car: String,
    skin: Option<String>,
    guid: Option<String>,
    team: Option<String>,
}

impl ConnectRecord {
    fn new(line: usize, name: &str, car: &str) -> Self {
        Self { line, name: name.trim().to_string(), car: car.trim().to_string(), skin: None, guid: None, team: None }
    }

    fn vehicle(&self) -> Vehicle {
        Vehicle { name: self.car.clone(), skin: self.skin.clone(), ..Default::default() }
    }
}

type Extractor = fn(&[&str]) -> Result<Vec<ConnectRecord>>;

/// Connect record layouts, newest first
const EXTRACTORS: [(&str, Extractor); 4] = [
    ("accepted pickup", accepted_pickups),
    ("pickup", plain_pickups),
    ("driver line", driver_lines),
    ("adding car", added_cars),
];

fn pickups(lines: &[&str], accepted: bool) -> Vec<ConnectRecord> {
    let mut records = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if !line.starts_with("NEW PICKUP CONNECTION from ") {
            continue;
        }
        let (Some(version), Some(name), Some(request)) = (lines.get(index + 1), lines.get(index + 2), lines.get(index + 3))
        else {
            continue;
        };
        let Some(car) = request.strip_prefix("REQUESTED CAR: ") else {
            continue;
        };
        if !version.starts_with("VERSION ") || name.trim().is_empty() {
            continue;
        }
        match (accepted, car.trim().strip_suffix('*')) {
            (true, Some(car)) => {
                let accept = lines
                    .iter()
                    .enumerate()
                    .skip(index + 4)
                    .take_while(|(_, line)| !line.starts_with("NEW PICKUP CONNECTION"))
                    .find(|(_, line)| line.starts_with("DRIVER ACCEPTED FOR CAR "));
                if let Some((line, _)) = accept {
                    records.push(ConnectRecord::new(line, name, car));
                }
            }
            (false, None) => records.push(ConnectRecord::new(index + 3, name, car)),
            _ => {}
        }
    }
    records
}

fn accepted_pickups(lines: &[&str]) -> Result<Vec<ConnectRecord>> {
    Ok(pickups(lines, true))
}

fn plain_pickups(lines: &[&str]) -> Result<Vec<ConnectRecord>> {
    Ok(pickups(lines, false))
}

fn driver_lines(lines: &[&str]) -> Result<Vec<ConnectRecord>> {
    let driver = compile(r"^DRIVER: (.+?)(?: \[(.*)\])?\s*$")?;
    let mut records = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let Some(captures) = driver.captures(line) else { continue };
        let car = lines[index.saturating_sub(5)..index]
            .iter()
            .rev()
            .find_map(|line| line.strip_prefix("REQUESTED CAR: "));
        let Some(car) = car else { continue };
        let mut record = ConnectRecord::new(index, &captures[1], car.trim_end_matches('*'));
        record.team = captures.get(2).map(|team| team.as_str().trim().to_string()).filter(|team| !team.is_empty());
        records.push(record);
    }
    Ok(records)
}

fn added_cars(lines: &[&str]) -> Result<Vec<ConnectRecord>> {
    let adding = compile(r"^Adding car: SID:(\d+) name=(.*?) model=(\S*) skin=(\S*) guid=(\S*)")?;
    let mut records = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let Some(captures) = adding.captures(line) else { continue };
        if captures[2].trim().is_empty() {
            continue;
        }
        let mut record = ConnectRecord::new(index, &captures[2], &captures[3]);
        record.skin = Some(captures[4].to_string()).filter(|skin| !skin.is_empty());
        record.guid = Some(captures[5].to_string()).filter(|guid| !guid.is_empty());
        records.push(record);
    }
    Ok(records)
}

fn connect_records(lines: &[&str]) -> Result<Vec<ConnectRecord>> {
    for (variant, extract) in EXTRACTORS {
        let records = extract(lines)?;
        if !records.is_empty() {
            debug!(variant, records = records.len(), "Found acServer connect records");
            return Ok(records);
        }
    }
    Ok(Vec::new())
}

/// Line patterns within a session
struct Patterns {
    lap: Regex,
    tyres: Regex,
    leaderboard: Regex,
    car_collision: Regex,
    env_collision: Regex,
    chat: Regex,
}

impl Patterns {
    fn new() -> Result<Self> {
        Ok(Self {
            lap: compile(r"^LAP (.+) (\d+:\d+:\d+)")?,
            tyres: compile(r"^(.+) changed tyres to (\S+)")?,
            leaderboard: compile(r"^(\d+)\) (.+) BEST: \S+ TOTAL: (\S+) Laps:(\d+) SesID:(\d+)")?,
            car_collision: compile(r"^Car (.+) collided with car (.+) at ([\d.]+) km/h")?,
            env_collision: compile(r"^Car (.+) collided with environment at ([\d.]+) km/h")?,
            chat: compile(r"^CHAT \[(.+?)\]: (.*)$")?,
        })
    }
}

/// Session header shared by the sub-sessions of a restart
#[derive(Debug, Clone, Default)]
struct Header {
    name: String,
    session_type: Option<String>,
    minutes: Option<u32>,
    laps: Option<u32>,
}

/// A tyre change seen anywhere in the log
#[derive(Debug, Clone)]
struct TyreChange {
    line: usize,
    name: String,
    compound: String,
}

/// Leaderboard state of one driver within a session
#[derive(Debug, Default)]
struct Standing {
    lap_counts: Vec<u32>,
    total: Option<f64>,
}

/// Reader for the acServer text log
#[derive(Debug)]
pub struct AssettoCorsaServerReader {
    text: String,
    options: ReaderOptions,
}

impl ReaderFormat for AssettoCorsaServerReader {
    const NAME: &'static str = "assetto_corsa_server";

    fn can_read(data: &[u8]) -> bool {
        decode_bytes(data).contains("Server CFG Path")
    }

    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
        Ok(Self { text: decode_bytes(data).into_owned(), options })
    }
}

/// Session header starting at `index`, when the line opens one
fn read_header(lines: &[&str], index: usize) -> Option<Header> {
    let name = lines[index].strip_prefix("SESSION: ")?;
    let mut header = Header { name: name.trim().to_string(), ..Default::default() };
    for line in lines.iter().skip(index + 1).take(4) {
        let Some((key, value)) = line.split_once('=') else { break };
        let value = value.trim();
        match key.trim() {
            "TYPE" => header.session_type = Some(value.to_string()),
            "TIME" => header.minutes = value.parse().ok(),
            "LAPS" => header.laps = value.parse().ok(),
            _ => break,
        }
    }
    Some(header)
}

fn leaderboard_time(raw: &str) -> Option<f64> {
    if raw == UNSET_TIME {
        return None;
    }
    seconds_from_formatted_time(raw, true).ok().filter(|seconds| *seconds > 0.0)
}

/// Everything that a session needs from the rest of the log
struct LogContext<'a> {
    lines: &'a [&'a str],
    records: Vec<ConnectRecord>,
    tyres: Vec<TyreChange>,
    patterns: Patterns,
    base: Session,
}

impl LogContext<'_> {
    /// Car requested by a driver most recently before `line`
    fn vehicle_for(&self, name: &str, line: usize) -> Option<Vehicle> {
        let records = || self.records.iter().filter(|record| record.name == name);
        records()
            .filter(|record| record.line < line)
            .last()
            .or_else(|| records().next())
            .map(ConnectRecord::vehicle)
    }

    fn record_for(&self, name: &str) -> Option<&ConnectRecord> {
        self.records.iter().find(|record| record.name == name)
    }

    /// Compound of a lap driven by `name` on `line` of the session `range`
    ///
    /// A driver with one compound in the whole log always gets it. Otherwise
    /// the latest change before the lap in the session wins, then any change
    /// in the session, then the latest change before the lap anywhere, then
    /// the last change in the log.
    fn compound_for(&self, name: &str, line: usize, range: (usize, usize)) -> Option<String> {
        let changes: Vec<&TyreChange> = self.tyres.iter().filter(|change| change.name == name).collect();
        let distinct: HashSet<&str> = changes.iter().map(|change| change.compound.as_str()).collect();
        if distinct.len() == 1 {
            return changes.first().map(|change| change.compound.clone());
        }
        let in_session = || changes.iter().filter(|change| change.line >= range.0 && change.line < range.1);
        in_session()
            .filter(|change| change.line < line)
            .last()
            .or_else(|| in_session().next())
            .or_else(|| changes.iter().filter(|change| change.line < line).last())
            .or_else(|| changes.last())
            .map(|change| change.compound.clone())
    }

    fn participant_index(&self, session: &mut Session, name: &str) -> usize {
        if let Some(index) = session.participants.iter().position(|participant| participant.driver_name() == name) {
            return index;
        }
        let mut driver = Driver::new(name);
        let mut participant = session.create_participant();
        if let Some(record) = self.record_for(name) {
            if let Some(guid) = &record.guid {
                driver = driver.with_id(guid.clone());
            }
            participant.team = record.team.clone();
        }
        participant.drivers.push(driver);
        session.push_participant(participant);
        session.participants.len() - 1
    }

    /// Build one sub-session from lines `range.0..range.1`
    fn read_session(&self, header: &Header, range: (usize, usize)) -> Option<Session> {
        let patterns = &self.patterns;
        let mut session = self.base.clone();
        let raw_type = header.session_type.as_deref().unwrap_or(&header.name);
        let (session_type, _) = detect_session(raw_type, None);
        let (named_type, name) = detect_session(&header.name, None);
        session.session_type = session_type;
        session.name = if named_type == session_type { name } else { Some(header.name.clone()) };
        session.max_minutes = header.minutes.filter(|minutes| *minutes > 0);
        session.max_laps = header.laps.filter(|laps| *laps > 0);

        let mut standings: HashMap<String, Standing> = HashMap::new();
        let mut lap_lines = 0;

        for index in range.0..range.1 {
            let line = self.lines[index];
            if let Some(captures) = patterns.lap.captures(line) {
                let discarded = |line: &str| line.contains("LAPTIME DISCARDED") || line.contains("LAP REFUSED");
                if discarded(line) || self.lines.get(index + 1).is_some_and(|next| discarded(*next)) {
                    trace!(line = index + 1, "Skipping discarded lap");
                    continue;
                }
                lap_lines += 1;
                let name = captures[1].trim();
                let time = seconds_from_formatted_time(&captures[2], true).ok().filter(|time| *time > 0.0);
                let vehicle = self.vehicle_for(name, index);
                let compound = self.compound_for(name, index, range);

                let participant_index = self.participant_index(&mut session, name);
                let participant = &mut session.participants[participant_index];
                if participant.laps.is_empty() {
                    if let Some(vehicle) = &vehicle {
                        participant.vehicle = vehicle.clone();
                    }
                }
                let mut lap = Lap::with_time(participant.laps.len() as u32 + 1, time);
                if let Some(compound) = compound {
                    lap.set_compound(compound);
                }
                lap.vehicle = vehicle.filter(|vehicle| vehicle.name != participant.vehicle.name);
                participant.laps.push(lap);
            } else if let Some(captures) = patterns.leaderboard.captures(line) {
                let standing = standings.entry(captures[2].trim().to_string()).or_default();
                standing.total = leaderboard_time(&captures[3]);
                if let Ok(laps) = captures[4].parse() {
                    standing.lap_counts.push(laps);
                }
            } else if let Some(captures) = patterns.car_collision.captures(line) {
                let mut incident = Incident::new(line.trim());
                incident.incident_type = IncidentType::Car;
                incident.participant = session.participant_by_driver_name(captures[1].trim()).map(|p| p.id);
                incident.other_participant = session.participant_by_driver_name(captures[2].trim()).map(|p| p.id);
                if let Ok(speed) = captures[3].parse() {
                    incident.set_impact(speed, IMPACT_SPEED_REVIEW_KMH);
                }
                session.incidents.push(incident);
            } else if let Some(captures) = patterns.env_collision.captures(line) {
                let mut incident = Incident::new(line.trim());
                incident.incident_type = IncidentType::Env;
                incident.participant = session.participant_by_driver_name(captures[1].trim()).map(|p| p.id);
                if let Ok(speed) = captures[2].parse() {
                    incident.set_impact(speed, IMPACT_SPEED_REVIEW_KMH);
                }
                session.incidents.push(incident);
            } else if let Some(captures) = patterns.chat.captures(line) {
                let mut chat = Chat::new(captures[2].trim());
                chat.participant = session.participant_by_driver_name(captures[1].trim()).map(|p| p.id);
                session.chats.push(chat);
            }
        }

        if lap_lines == 0 && standings.is_empty() {
            return None;
        }
        self.apply_standings(&mut session, &standings);
        sort_participants_and_fix_positions(&mut session);
        Some(session)
    }

    fn apply_standings(&self, session: &mut Session, standings: &HashMap<String, Standing>) {
        for name in standings.keys() {
            self.participant_index(session, name);
        }
        if session.session_type != SessionType::Race {
            return;
        }
        let leader_laps = standings.values().filter_map(|standing| standing.lap_counts.last()).max().copied();
        for participant in &mut session.participants {
            let Some(standing) = standings.get(participant.driver_name()) else { continue };
            participant.explicit_total_time = standing.total;
            let last_three = standing.lap_counts.len().checked_sub(3).map(|start| &standing.lap_counts[start..]);
            let stalled = last_three.and_then(|counts| counts.iter().all(|count| *count == counts[0]).then_some(counts[0]));
            if let (Some(stalled), Some(leader)) = (stalled, leader_laps) {
                if leader >= stalled + FORCED_DNF_LAP_LEAD {
                    debug!(driver = participant.driver_name(), laps = stalled, leader, "Forcing DNF for stalled driver");
                    participant.finish_status = FinishStatus::Dnf;
                }
            }
        }
    }
}

impl FormatReader for AssettoCorsaServerReader {
    fn format_name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_sessions(&self) -> Result<Vec<Session>> {
        let lines: Vec<&str> = self.text.lines().map(|line| line.trim_end()).collect();
        let records = connect_records(&lines)?;
        let patterns = Patterns::new()?;

        let tyres = lines
            .iter()
            .enumerate()
            .filter_map(|(line, text)| {
                let captures = patterns.tyres.captures(text)?;
                Some(TyreChange { line, name: captures[1].trim().to_string(), compound: captures[2].to_string() })
            })
            .collect();

        let setting = |key: &str| {
            lines.iter().find_map(|line| line.strip_prefix(key)).map(str::trim).filter(|value| !value.is_empty())
        };
        let mut base = Session::default();
        base.game = Game {
            name: Some("Assetto Corsa".to_string()),
            version: lines
                .iter()
                .find_map(|line| line.strip_prefix("Assetto Corsa Dedicated Server "))
                .map(|version| version.trim().to_string()),
        };
        base.track = Track {
            venue: setting("TRACK=").map(str::to_string),
            course: setting("CONFIG_TRACK=").map(str::to_string),
            ..Default::default()
        };
        base.server = Server { name: setting("NAME=").map(str::to_string), motd: None, dedicated: true };
        base.allowed_vehicles = {
            let mut seen = HashSet::new();
            records
                .iter()
                .filter(|record| seen.insert(record.car.clone()))
                .map(|record| Vehicle::new(record.car.clone()))
                .collect()
        };

        let context = LogContext { lines: &lines, records, tyres, patterns, base };

        let headers: Vec<(usize, Header)> =
            (0..lines.len()).filter_map(|index| read_header(&lines, index).map(|header| (index, header))).collect();

        let mut sessions = Vec::new();
        for (position, (start, header)) in headers.iter().enumerate() {
            let end = headers.get(position + 1).map_or(lines.len(), |(next, _)| *next);
            let mut sub_start = *start;
            for index in *start..=end {
                let restart = index < end && lines[index].contains("RESTARTING SESSION");
                if restart || index == end {
                    if let Some(session) = context.read_session(header, (sub_start, index)) {
                        sessions.push(session);
                    }
                    sub_start = index;
                }
            }
        }

        if sessions.is_empty() {
            return Err(ResultsError::cannot_read_session(Self::NAME, "no session with laps in log"));
        }
        debug!(sessions = sessions.len(), "Read acServer log");
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOG: &str = "\
Assetto Corsa Dedicated Server v1.15
Server CFG Path: cfg/server_cfg.ini
TRACK=ks_vallelunga
CONFIG_TRACK=extended_circuit
NAME=Friday Night Racing
Adding car: SID:0 name=Alpha Driver model=ks_mazda_mx5_cup skin=red guid=7656001
Adding car: SID:1 name=Bravo Driver model=ks_mazda_mx5_cup skin=blue guid=7656002
NextSession
SESSION: Qualify
TYPE=QUALIFY
TIME=10
LAPS=0
Alpha Driver changed tyres to SM
LAP Alpha Driver 1:40:500
LAP Bravo Driver 1:41:000
LAP Bravo Driver 1:39:000
LAPTIME DISCARDED
LAP Alpha Driver 1:41:250
NextSession
SESSION: Race
TYPE=RACE
TIME=0
LAPS=5
LAP Alpha Driver 1:50:000
RESTARTING SESSION
LAP Alpha Driver 1:45:000
LAP Bravo Driver 1:46:000
1) Alpha Driver BEST: 1:45:000 TOTAL: 1:45:000 Laps:1 SesID:0
2) Bravo Driver BEST: 1:46:000 TOTAL: 1:46:000 Laps:1 SesID:1
Car Alpha Driver collided with car Bravo Driver at 52.30 km/h
CHAT [Bravo Driver]: sorry
";

    fn sessions() -> anyhow::Result<Vec<Session>> {
        Ok(AssettoCorsaServerReader::from_bytes(LOG.as_bytes())?.read_sessions()?)
    }

    #[test]
    fn sniffs_config_path_marker() {
        assert!(AssettoCorsaServerReader::can_read(LOG.as_bytes()));
        assert!(!AssettoCorsaServerReader::can_read(b"LAP Alpha 1:40:500"));
    }

    #[test]
    fn reads_header_and_skips_discarded_laps() -> anyhow::Result<()> {
        let sessions = sessions()?;
        let qualify = &sessions[0];
        assert_eq!(qualify.session_type, SessionType::Qualify);
        assert_eq!(qualify.name, None);
        assert_eq!(qualify.game.version.as_deref(), Some("v1.15"));
        assert_eq!(qualify.track.course.as_deref(), Some("extended_circuit"));
        assert_eq!(qualify.server.name.as_deref(), Some("Friday Night Racing"));
        assert_eq!(qualify.max_minutes, Some(10));

        let alpha = qualify.participant_by_driver_name("Alpha Driver").unwrap();
        let bravo = qualify.participant_by_driver_name("Bravo Driver").unwrap();
        assert_eq!(alpha.laps.len(), 2);
        assert_eq!(bravo.laps.len(), 1);
        assert_eq!(bravo.laps[0].time, Some(101.0));
        assert_eq!(qualify.participants[0].driver_name(), "Alpha Driver");
        assert_eq!(alpha.vehicle.name, "ks_mazda_mx5_cup");
        assert_eq!(alpha.driver().and_then(|driver| driver.driver_id.as_deref()), Some("7656001"));
        Ok(())
    }

    #[test]
    fn restart_splits_race_and_keeps_header() -> anyhow::Result<()> {
        let sessions = sessions()?;
        assert_eq!(sessions.len(), 3);
        for race in &sessions[1..] {
            assert_eq!(race.session_type, SessionType::Race);
            assert_eq!(race.max_laps, Some(5));
            assert_eq!(race.track.venue.as_deref(), Some("ks_vallelunga"));
        }
        assert_eq!(sessions[1].participants.len(), 1);

        let restarted = &sessions[2];
        assert_eq!(restarted.participants.len(), 2);
        assert_eq!(restarted.participants[0].explicit_total_time, Some(105.0));
        assert_eq!(restarted.incidents.len(), 1);
        assert!(restarted.incidents[0].for_review);
        assert_eq!(restarted.incidents[0].other_participant, Some(restarted.participants[1].id));
        assert_eq!(restarted.chats[0].message, "sorry");
        Ok(())
    }

    #[test]
    fn single_tyre_compound_applies_everywhere() -> anyhow::Result<()> {
        let sessions = sessions()?;
        let race_lap = &sessions[2].participant_by_driver_name("Alpha Driver").unwrap().laps[0];
        assert_eq!(race_lap.front_compound.as_deref(), Some("SM"));
        Ok(())
    }

    #[test]
    fn tyre_changes_after_the_lap_are_still_used() -> anyhow::Result<()> {
        let log = format!("{LOG}Bravo Driver changed tyres to SM\nBravo Driver changed tyres to HM\n");
        let sessions = AssettoCorsaServerReader::from_bytes(log.as_bytes())?.read_sessions()?;

        // no change in the qualifying session, the log's last one applies
        let qualify_lap = &sessions[0].participant_by_driver_name("Bravo Driver").unwrap().laps[0];
        assert_eq!(qualify_lap.front_compound.as_deref(), Some("HM"));

        // the race has changes, only after the lap line
        let race_lap = &sessions[2].participant_by_driver_name("Bravo Driver").unwrap().laps[0];
        assert_eq!(race_lap.front_compound.as_deref(), Some("SM"));
        Ok(())
    }

    #[test]
    fn pickup_records_need_accept_line_when_starred() {
        let lines = [
            "NEW PICKUP CONNECTION from 10.0.0.1:1234",
            "VERSION 202",
            "Charlie",
            "REQUESTED CAR: ks_audi_r8*",
            "DRIVER ACCEPTED FOR CAR 3",
            "NEW PICKUP CONNECTION from 10.0.0.2:1234",
            "VERSION 202",
            "Delta",
            "REQUESTED CAR: ks_bmw_m3*",
        ];
        let records = pickups(&lines, true);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Charlie");
        assert_eq!(records[0].car, "ks_audi_r8");
        assert_eq!(records[0].line, 4);
        assert!(pickups(&lines, false).is_empty());
    }

    #[test]
    fn driver_line_records_carry_team() -> anyhow::Result<()> {
        let lines = ["REQUESTED CAR: ks_porsche_911_gt3_r", "DRIVER: Echo Driver [Team E]"];
        let records = driver_lines(&lines)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].team.as_deref(), Some("Team E"));
        assert_eq!(records[0].car, "ks_porsche_911_gt3_r");
        Ok(())
    }

    #[test]
    fn stalled_driver_becomes_dnf() -> anyhow::Result<()> {
        let log = "\
Server CFG Path: cfg/server_cfg.ini
SESSION: Race
TYPE=RACE
LAP Alpha 1:40:000
LAP Bravo 1:41:000
1) Alpha BEST: 1:40:000 TOTAL: 1:40:000 Laps:1 SesID:0
2) Bravo BEST: 1:41:000 TOTAL: 1:41:000 Laps:1 SesID:1
LAP Alpha 1:40:000
1) Alpha BEST: 1:40:000 TOTAL: 3:20:000 Laps:2 SesID:0
2) Bravo BEST: 1:41:000 TOTAL: 1:41:000 Laps:1 SesID:1
LAP Alpha 1:40:000
1) Alpha BEST: 1:40:000 TOTAL: 5:00:000 Laps:3 SesID:0
2) Bravo BEST: 1:41:000 TOTAL: 16666:39:999 Laps:1 SesID:1
";
        let sessions = AssettoCorsaServerReader::from_bytes(log.as_bytes())?.read_sessions()?;
        let race = &sessions[0];
        let bravo = race.participant_by_driver_name("Bravo").unwrap();
        assert_eq!(bravo.finish_status, FinishStatus::Dnf);
        assert_eq!(bravo.explicit_total_time, None);
        assert_eq!(race.participants[0].driver_name(), "Alpha");
        assert_eq!(race.participants[0].finish_status, FinishStatus::Normal);
        Ok(())
    }
}
