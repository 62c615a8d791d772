//! Project CARS dedicated server stats
//!
//! `sms_stats_data.json` keeps a history of server sessions. Each history
//! entry has one participant roster and a stage per session (`practice1`,
//! `qualifying1`, `race1`, ...). Lap data comes from the stage events; the
//! stage results only carry final positions and totals, and are not always
//! consistent with the events.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ReaderOptions;
use crate::formats::{json_object, non_empty, parse_json, positive_ms};
use crate::helper::detect_session;
use crate::model::{
    Cut, Driver, FinishStatus, Game, Incident, IncidentType, Lap, Participant, ParticipantId, Server, Session,
    SessionType, ms_to_seconds, round_to,
};
use crate::reader::{FormatReader, ReaderFormat, fix_participant_positions, sort_participants_and_fix_positions};
use crate::text::{decode_bytes, strip_line_comments};
use crate::{Result, ResultsError};

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PcarsDocument {
    pub stats: PcarsStats,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PcarsStats {
    pub server: PcarsServer,
    pub history: Vec<PcarsHistory>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PcarsServer {
    pub name: Option<String>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PcarsHistory {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    /// Server setup (`TrackId`, `GridSize`, flags), kept verbatim
    pub setup: Map<String, Value>,
    /// Keyed by Steam id
    pub members: BTreeMap<String, PcarsMember>,
    /// Keyed by participant id
    pub participants: BTreeMap<String, PcarsParticipant>,
    pub stages: BTreeMap<String, PcarsStage>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PcarsMember {
    pub name: Option<String>,
    pub steamid: Option<Value>,
    pub setup: PcarsMemberSetup,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct PcarsMemberSetup {
    pub vehicle_id: Option<i64>,
    pub livery_id: Option<i64>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct PcarsParticipant {
    pub ref_id: Option<i64>,
    pub name: Option<String>,
    pub is_player: Option<i64>,
    pub grid_position: Option<u32>,
    pub vehicle_id: Option<i64>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PcarsStage {
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub events: Vec<PcarsEvent>,
    pub results: Vec<PcarsResult>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PcarsEvent {
    /// Unix time
    pub time: Option<i64>,
    pub name: Option<String>,
    pub refid: Option<i64>,
    pub participantid: Option<u32>,
    pub attributes: Map<String, Value>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PcarsResult {
    pub participantid: Option<u32>,
    pub refid: Option<i64>,
    pub name: Option<String>,
    pub is_player: Option<i64>,
    pub attributes: PcarsResultAttributes,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct PcarsResultAttributes {
    pub race_position: Option<u32>,
    /// ms
    pub fastest_lap_time: Option<f64>,
    /// ms
    pub total_time: Option<f64>,
    pub lap: Option<u32>,
    pub state: Option<String>,
    pub vehicle_id: Option<i64>,
}

/// Number attribute of an event
fn attribute(event: &PcarsEvent, key: &str) -> Option<f64> {
    match event.attributes.get(key)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn finish_status(state: &str) -> Option<FinishStatus> {
    match state {
        "Finished" => Some(FinishStatus::Normal),
        "Retired" | "DNF" => Some(FinishStatus::Dnf),
        "Disqualified" => Some(FinishStatus::Dq),
        _ => None,
    }
}

/// Stage order within a history entry: practice, qualify, warmup, race
fn stage_rank(name: &str) -> u8 {
    match detect_session(name, None).0 {
        SessionType::Practice => 0,
        SessionType::Qualify => 1,
        SessionType::Warmup => 2,
        SessionType::Race => 3,
    }
}

/// Reader for Project CARS server stats
#[derive(Debug)]
pub struct ProjectCarsReader {
    document: PcarsDocument,
    options: ReaderOptions,
}

impl ReaderFormat for ProjectCarsReader {
    const NAME: &'static str = "project_cars";

    fn can_read(data: &[u8]) -> bool {
        json_object(&strip_line_comments(&decode_bytes(data)))
            .and_then(|root| root.get("stats").and_then(Value::as_object).map(|stats| stats.contains_key("history")))
            .unwrap_or(false)
    }

    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
        let text = strip_line_comments(&decode_bytes(data));
        Ok(Self { document: parse_json(Self::NAME, &text)?, options })
    }
}

/// Cuts of one participant not yet attached to a lap
#[derive(Debug, Default)]
struct PendingCuts {
    started: Option<f64>,
    finished: Vec<Cut>,
}

impl ProjectCarsReader {
    fn roster(history: &PcarsHistory) -> Vec<Participant> {
        let steam_ids: HashMap<&str, String> = history
            .members
            .iter()
            .filter_map(|(key, member)| {
                let id = match &member.steamid {
                    Some(Value::Number(number)) => number.to_string(),
                    Some(Value::String(text)) => text.clone(),
                    _ => key.clone(),
                };
                Some((member.name.as_deref()?, id))
            })
            .collect();

        history
            .participants
            .iter()
            .filter_map(|(key, raw)| {
                let id: u32 = key.trim().parse().ok()?;
                let name = non_empty(raw.name.as_deref())?;
                let mut driver = Driver::new(name.clone());
                driver.is_human = raw.is_player.is_some_and(|player| player != 0);
                if let Some(steam_id) = steam_ids.get(name.as_str()) {
                    driver = driver.with_id(steam_id.clone());
                }
                let mut participant = Participant::with_driver(ParticipantId(id), driver);
                participant.grid_position = raw.grid_position.filter(|grid| *grid > 0);
                if let Some(vehicle_id) = raw.vehicle_id {
                    participant.vehicle.name = vehicle_id.to_string();
                    participant.vehicle.vehicle_type = Some(vehicle_id.to_string());
                }
                Some(participant)
            })
            .collect()
    }

    fn read_events(session: &mut Session, stage: &PcarsStage) {
        let start = stage.start_time.unwrap_or(0);
        let elapsed = |event: &PcarsEvent| event.time.map(|time| (time - start) as f64);
        let mut cuts: HashMap<ParticipantId, PendingCuts> = HashMap::new();

        for event in &stage.events {
            let Some(id) = event.participantid.map(ParticipantId) else { continue };
            if session.participant(id).is_none() {
                continue;
            }
            match event.name.as_deref() {
                Some("Lap") => {
                    let raw_time = attribute(event, "LapTime");
                    let counted = attribute(event, "CountThisLapTimes").is_none_or(|count| count != 0.0);
                    let finished_cuts = cuts.get_mut(&id).map(|pending| std::mem::take(&mut pending.finished));
                    let Some(participant) = session.participant_mut(id) else { continue };
                    let mut lap = Lap::with_time(
                        participant.laps.len() as u32 + 1,
                        positive_ms(raw_time).filter(|_| counted),
                    );
                    let sectors: Option<Vec<f64>> = ["Sector1Time", "Sector2Time", "Sector3Time"]
                        .iter()
                        .map(|key| positive_ms(attribute(event, key)))
                        .collect();
                    lap.sector_times = sectors.unwrap_or_default();
                    lap.position = attribute(event, "RacePosition").filter(|position| *position > 0.0).map(|p| p as u32);
                    if let (Some(end), Some(time)) = (elapsed(event), positive_ms(raw_time)) {
                        lap.elapsed_seconds = Some(round_to(end - time, 4));
                    }
                    lap.cuts = finished_cuts.unwrap_or_default();
                    participant.laps.push(lap);
                }
                Some("Impact") => {
                    let other = attribute(event, "OtherParticipantId")
                        .filter(|other| *other >= 0.0)
                        .map(|other| ParticipantId(other as u32))
                        .filter(|other| session.participant(*other).is_some());
                    let name = |id: ParticipantId| session.participant(id).map_or("unknown", Participant::driver_name);
                    let message = match other {
                        Some(other) => format!("{} reported contact with {}", name(id), name(other)),
                        None => format!("{} reported contact with the environment", name(id)),
                    };
                    let mut incident = Incident::new(message);
                    incident.incident_type = if other.is_some() { IncidentType::Car } else { IncidentType::Env };
                    incident.participant = Some(id);
                    incident.other_participant = other;
                    incident.impact = attribute(event, "CollisionMagnitude");
                    incident.elapsed_seconds = elapsed(event);
                    session.incidents.push(incident);
                }
                Some("CutTrackStart") => {
                    cuts.entry(id).or_default().started = elapsed(event).or(Some(0.0));
                }
                Some("CutTrackEnd") => {
                    let pending = cuts.entry(id).or_default();
                    if let Some(started) = pending.started.take() {
                        pending.finished.push(Cut {
                            cut_time: attribute(event, "ElapsedTime").map(ms_to_seconds),
                            time_skipped: attribute(event, "SkippedTime").map(ms_to_seconds),
                            elapsed_seconds: Some(started),
                            ..Default::default()
                        });
                    }
                }
                Some("State") => {
                    let status = event.attributes.get("NewState").and_then(Value::as_str).and_then(finish_status);
                    if let (Some(status @ (FinishStatus::Dnf | FinishStatus::Dq)), Some(participant)) =
                        (status, session.participant_mut(id))
                    {
                        participant.finish_status = status;
                    }
                }
                _ => {}
            }
        }
    }

    /// Use the results array when its winner matches the event data, else
    /// sort on the event data alone.
    fn apply_results(session: &mut Session, results: &[PcarsResult]) {
        let mut derived = session.clone();
        sort_participants_and_fix_positions(&mut derived);
        let derived_leader = derived.leader().map(|leader| leader.id);

        let mut ranked: Vec<&PcarsResult> =
            results.iter().filter(|result| result.attributes.race_position.is_some_and(|p| p > 0)).collect();
        ranked.sort_by_key(|result| result.attributes.race_position);
        let results_leader = ranked.first().and_then(|result| result.participantid).map(ParticipantId);

        if ranked.is_empty() || results_leader != derived_leader {
            if !ranked.is_empty() {
                debug!(?results_leader, ?derived_leader, "Project CARS results disagree with events");
            }
            *session = derived;
            return;
        }

        let mut remaining = std::mem::take(&mut session.participants);
        let mut ordered = Vec::with_capacity(remaining.len());
        for result in ranked {
            let Some(id) = result.participantid.map(ParticipantId) else { continue };
            let Some(index) = remaining.iter().position(|participant| participant.id == id) else { continue };
            let mut participant = remaining.remove(index);
            if session.session_type == SessionType::Race {
                participant.explicit_total_time = positive_ms(result.attributes.total_time);
            }
            if let Some(status) = result.attributes.state.as_deref().and_then(finish_status) {
                participant.finish_status = status;
            }
            ordered.push(participant);
        }
        ordered.extend(remaining);
        session.participants = ordered;
        fix_participant_positions(session);
    }

    fn read_history(&self, history: &PcarsHistory, sessions: &mut Vec<Session>) {
        let roster = Self::roster(history);
        let mut stages: Vec<(&String, &PcarsStage)> = history.stages.iter().collect();
        stages.sort_by_key(|(name, _)| (stage_rank(name), name.to_string()));

        for (name, stage) in stages {
            let (session_type, display) = detect_session(name, None);
            let mut session = Session::new(session_type);
            // first stage of a type is just the type
            session.name = display.filter(|display| !display.ends_with('1'));
            session.game = Game::named("Project CARS");
            session.server =
                Server { name: non_empty(self.document.stats.server.name.as_deref()), motd: None, dedicated: true };
            session.date = stage.start_time.or(history.start_time).and_then(|time| self.options.from_timestamp(time));
            for (key, value) in &history.setup {
                let value = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                if key == "TrackId" {
                    session.track.venue = Some(value.clone());
                }
                session.other_settings.insert(key.clone(), value);
            }

            for participant in &roster {
                session.push_participant(participant.clone_with_empty_laps());
            }
            Self::read_events(&mut session, stage);

            // roster members that never drove nor appear in the results
            let in_results: Vec<ParticipantId> =
                stage.results.iter().filter_map(|result| result.participantid).map(ParticipantId).collect();
            session
                .participants
                .retain(|participant| !participant.laps.is_empty() || in_results.contains(&participant.id));
            if session.participants.is_empty() {
                continue;
            }
            Self::apply_results(&mut session, &stage.results);
            sessions.push(session);
        }
    }
}

impl FormatReader for ProjectCarsReader {
    fn format_name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_sessions(&self) -> Result<Vec<Session>> {
        let mut sessions = Vec::new();
        for history in &self.document.stats.history {
            self.read_history(history, &mut sessions);
        }
        if sessions.is_empty() {
            return Err(ResultsError::cannot_read_session(Self::NAME, "no stage with participants"));
        }
        debug!(sessions = sessions.len(), "Read Project CARS stats");
        Ok(sessions)
    }
}
