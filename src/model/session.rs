//! Sessions

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::{
    Chat, Game, Incident, Lap, Participant, ParticipantId, Penalty, Server, Track, Vehicle,
};

/// Kind of session
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SessionType {
    #[default]
    Practice,
    Qualify,
    Warmup,
    Race,
}

impl SessionType {
    /// Canonical display name
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Practice => "Practice",
            SessionType::Qualify => "Qualify",
            SessionType::Warmup => "Warmup",
            SessionType::Race => "Race",
        }
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One practice, qualify, warmup or race segment
///
/// The order of `participants` is the finishing (or qualifying) order.
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct Session {
    pub session_type: SessionType,
    /// Display name when it differs from the type (`Race 2`, `Qualify or practice session`)
    pub name: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub game: Game,
    pub track: Track,
    pub server: Server,
    pub max_laps: Option<u32>,
    pub max_minutes: Option<u32>,
    pub participants: Vec<Participant>,
    pub incidents: Vec<Incident>,
    pub penalties: Vec<Penalty>,
    pub chats: Vec<Chat>,
    pub other_settings: BTreeMap<String, String>,
    pub allowed_vehicles: Vec<Vehicle>,
    /// Racing rules / mod name
    pub mod_name: Option<String>,
    next_participant_id: u32,
}

impl Session {
    pub fn new(session_type: SessionType) -> Self {
        Self { session_type, ..Default::default() }
    }

    /// Name to display: explicit name, else the type
    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.session_type.to_string())
    }

    /// New participant with a fresh id (not yet added)
    pub fn create_participant(&mut self) -> Participant {
        let id = ParticipantId(self.next_participant_id);
        self.next_participant_id += 1;
        Participant::new(id)
    }

    /// Add a participant, keeping id allocation ahead of its id
    pub fn push_participant(&mut self, participant: Participant) -> ParticipantId {
        let id = participant.id;
        self.next_participant_id = self.next_participant_id.max(id.0.saturating_add(1));
        self.participants.push(participant);
        id
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|participant| participant.id == id)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|participant| participant.id == id)
    }

    /// Participant whose drivers include `name`
    pub fn participant_by_driver_name(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|participant| participant.driver_index(name).is_some())
    }

    /// Winner or pole sitter
    pub fn leader(&self) -> Option<&Participant> {
        self.participants.first()
    }

    /// Highest number of completed laps of any participant
    pub fn lasted_laps(&self) -> usize {
        self.participants
            .iter()
            .map(Participant::number_of_completed_laps)
            .max()
            .unwrap_or(0)
    }

    /// Fastest lap of the session with its participant
    pub fn best_lap(&self) -> Option<(&Participant, &Lap)> {
        self.participants
            .iter()
            .filter_map(|participant| participant.best_lap().map(|lap| (participant, lap)))
            .fold(None, |best: Option<(&Participant, &Lap)>, candidate| match best {
                Some(current)
                    if crate::helper::compare_laps_by_time(current.1, candidate.1).is_le() =>
                {
                    Some(current)
                }
                _ => Some(candidate),
            })
    }

    /// Every lap of a 1-based sector with a time, fastest first
    pub fn best_laps_by_sector(&self, sector: usize) -> Vec<(&Participant, &Lap)> {
        let mut laps: Vec<(&Participant, &Lap)> = self
            .participants
            .iter()
            .flat_map(|participant| participant.laps.iter().map(move |lap| (participant, lap)))
            .filter(|(_, lap)| lap.sector_time(sector).is_some())
            .collect();
        laps.sort_by(|a, b| crate::helper::compare_laps_by_sector(a.1, b.1, sector));
        laps
    }
}
