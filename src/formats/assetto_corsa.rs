//! Assetto Corsa offline results (`race_out.json`)
//!
//! The file holds one roster (`players`) shared by every session; laps refer
//! to players by car index. Each session gets its own copy of the roster so
//! laps never leak between sessions.

use serde::Deserialize;
use tracing::debug;

use crate::config::ReaderOptions;
use crate::formats::{json_has_keys, non_empty, parse_json, positive_ms};
use crate::helper::compare_laps_by_elapsed_time;
use crate::model::{Cut, Driver, Game, Lap, Participant, ParticipantId, Session, SessionType, Track, Vehicle, ms_to_seconds};
use crate::reader::{FormatReader, ReaderFormat, fix_participant_positions, sort_participants_and_fix_positions};
use crate::text::decode_bytes;
use crate::{Result, ResultsError};

/// Root document
#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AcOfflineResults {
    pub track: Option<String>,
    pub players: Vec<AcPlayer>,
    pub sessions: Vec<AcSession>,
    pub extras: Option<serde_json::Value>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AcPlayer {
    pub name: Option<String>,
    pub car: Option<String>,
    pub skin: Option<String>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AcSession {
    pub event: Option<i64>,
    pub name: Option<String>,
    /// 1 practice, 2 qualify, 3 race
    #[serde(rename = "type")]
    pub session_type: Option<i64>,
    pub laps_count: Option<u32>,
    /// Minutes
    pub duration: Option<u32>,
    pub laps: Vec<AcLap>,
    pub race_result: Vec<usize>,
    pub best_laps: Vec<AcBestLap>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AcLap {
    /// 0-based lap index
    pub lap: Option<u32>,
    pub car: Option<usize>,
    /// Sector times in ms
    pub sectors: Vec<f64>,
    /// Lap time in ms
    pub time: Option<f64>,
    pub cuts: Option<u32>,
    pub tyre: Option<String>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct AcBestLap {
    pub car: Option<usize>,
    pub time: Option<f64>,
    pub lap: Option<u32>,
}

/// Reader for Assetto Corsa offline JSON
#[derive(Debug)]
pub struct AssettoCorsaReader {
    results: AcOfflineResults,
    options: ReaderOptions,
}

impl ReaderFormat for AssettoCorsaReader {
    const NAME: &'static str = "assetto_corsa";

    fn can_read(data: &[u8]) -> bool {
        json_has_keys(data, &["sessions", "players"])
    }

    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
        Ok(Self { results: parse_json(Self::NAME, &decode_bytes(data))?, options })
    }
}

fn session_type(raw: Option<i64>) -> SessionType {
    match raw {
        Some(2) => SessionType::Qualify,
        Some(3) => SessionType::Race,
        _ => SessionType::Practice,
    }
}

impl AssettoCorsaReader {
    /// One participant per player; the car index is the participant id
    fn roster(&self) -> Vec<Participant> {
        self.results
            .players
            .iter()
            .enumerate()
            .map(|(index, player)| {
                let mut participant = Participant::with_driver(
                    ParticipantId(index as u32),
                    Driver::new(player.name.as_deref().unwrap_or_default().trim()),
                );
                participant.vehicle = Vehicle {
                    name: player.car.clone().unwrap_or_default(),
                    skin: non_empty(player.skin.as_deref()),
                    ..Default::default()
                };
                participant
            })
            .collect()
    }
}

impl FormatReader for AssettoCorsaReader {
    fn format_name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_sessions(&self) -> Result<Vec<Session>> {
        if self.results.players.is_empty() {
            return Err(ResultsError::cannot_read_session(Self::NAME, "no players"));
        }
        let roster = self.roster();
        let track = Track { venue: non_empty(self.results.track.as_deref()), ..Default::default() };

        let mut sessions = Vec::new();
        for raw in &self.results.sessions {
            let session_type = session_type(raw.session_type);
            let mut session = Session::new(session_type);
            session.name =
                non_empty(raw.name.as_deref()).filter(|name| !name.eq_ignore_ascii_case(session_type.as_str()));
            session.game = Game::named("Assetto Corsa");
            session.track = track.clone();
            session.max_laps = raw.laps_count.filter(|laps| *laps > 0);
            session.max_minutes = raw.duration.filter(|minutes| *minutes > 0);

            let mut participants: Vec<Participant> = roster.iter().map(Participant::clone_with_empty_laps).collect();
            for raw_lap in &raw.laps {
                let Some(participant) = raw_lap.car.and_then(|car| participants.get_mut(car)) else {
                    continue;
                };
                let number = raw_lap.lap.map_or(participant.laps.len() as u32 + 1, |lap| lap + 1);
                let mut lap = Lap::with_time(number, positive_ms(raw_lap.time));
                lap.sector_times = raw_lap.sectors.iter().map(|sector| ms_to_seconds(*sector)).collect();
                if let Some(tyre) = non_empty(raw_lap.tyre.as_deref()) {
                    lap.set_compound(tyre);
                }
                lap.cuts = (0..raw_lap.cuts.unwrap_or(0)).map(|_| Cut::default()).collect();
                participant.laps.push(lap);
            }
            accumulate_elapsed(&mut participants);
            rank_laps_from_second(&mut participants);

            for participant in participants {
                session.push_participant(participant);
            }

            if session_type == SessionType::Race && !raw.race_result.is_empty() {
                order_by_race_result(&mut session, &raw.race_result);
                fix_participant_positions(&mut session);
            } else {
                sort_participants_and_fix_positions(&mut session);
            }
            sessions.push(session);
        }

        debug!(sessions = sessions.len(), players = roster.len(), "Read Assetto Corsa results");
        Ok(sessions)
    }
}

fn accumulate_elapsed(participants: &mut [Participant]) {
    for participant in participants {
        let mut elapsed = 0.0;
        for lap in &mut participant.laps {
            lap.elapsed_seconds = Some(crate::model::round_to(elapsed, 4));
            elapsed += lap.time.unwrap_or(0.0);
        }
    }
}

/// Lap 1 has no usable start order, so ranking starts at lap 2.
fn rank_laps_from_second(participants: &mut [Participant]) {
    let max_lap = participants
        .iter()
        .flat_map(|participant| participant.laps.iter().filter_map(|lap| lap.number))
        .max()
        .unwrap_or(0);

    for number in 2..=max_lap {
        let mut laps: Vec<(usize, usize)> = Vec::new();
        for (participant_index, participant) in participants.iter().enumerate() {
            for (lap_index, lap) in participant.laps.iter().enumerate() {
                if lap.number == Some(number) && lap.is_completed() {
                    laps.push((participant_index, lap_index));
                }
            }
        }
        laps.sort_by(|a, b| {
            compare_laps_by_elapsed_time(&participants[a.0].laps[a.1], &participants[b.0].laps[b.1])
        });
        for (rank, (participant_index, lap_index)) in laps.into_iter().enumerate() {
            participants[participant_index].laps[lap_index].position = Some(rank as u32 + 1);
        }
    }
}

/// Car indices of the result first, everyone else after in roster order
fn order_by_race_result(session: &mut Session, race_result: &[usize]) {
    let mut remaining = std::mem::take(&mut session.participants);
    let mut ordered = Vec::with_capacity(remaining.len());
    for car in race_result {
        if let Some(index) = remaining.iter().position(|participant| participant.id == ParticipantId(*car as u32)) {
            ordered.push(remaining.remove(index));
        }
    }
    ordered.append(&mut remaining);
    session.participants = ordered;
}
