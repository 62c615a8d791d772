//! # Normalized Result Model
//!
//! Every reader produces the same tree of plain value objects:
//!
//! ```text
//! Session
//!  ├── Game / Track / Server
//!  ├── Participant (list order = position)
//!  │    ├── Driver (index 0 is the default driver, more on swaps)
//!  │    ├── Vehicle
//!  │    └── Lap (insertion order = chronology)
//!  │         └── Cut
//!  └── Incident / Penalty / Chat
//! ```
//!
//! Incidents, penalties and chats link participants through a stable
//! [`ParticipantId`] so that reordering the participant list never breaks
//! the link.
//!
//! The model is passive. Repairs and ordering live in [`crate::reader`] and
//! [`crate::helper`].

pub mod driver;
pub mod event;
pub mod lap;
pub mod participant;
pub mod session;
pub mod venue;

pub use driver::{Driver, Vehicle};
pub use event::{Chat, Cut, IMPACT_SPEED_REVIEW_KMH, Incident, IncidentType, Penalty, RFACTOR_REVIEW_IMPACT};
pub use lap::Lap;
pub use participant::{DriverSwap, FinishStatus, Participant, ParticipantId};
pub use session::{Session, SessionType};
pub use venue::{Game, Server, Track};

/// Round to a number of decimals, the way every reader stores seconds.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Milliseconds to seconds with 4 decimals.
pub fn ms_to_seconds(ms: f64) -> f64 {
    round_to(ms / 1000.0, 4)
}

/// Aid flags of a lap (`AutoShift=3`, `TC=1`, `PlayerControl`)
pub type AidFlags = std::collections::BTreeMap<String, Option<String>>;
