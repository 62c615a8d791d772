//! Session events: incidents, penalties, chats and track cuts

use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use super::ParticipantId;

/// Impact above which an rFactor car-to-car contact is flagged for review
pub const RFACTOR_REVIEW_IMPACT: f64 = 0.6;

/// Impact speed (km/h) above which a car-to-car collision is flagged for review
pub const IMPACT_SPEED_REVIEW_KMH: f64 = 40.0;

/// Kind of incident
#[derive(Default, Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum IncidentType {
    /// Car to car contact
    Car,
    /// Contact with the environment
    Env,
    #[default]
    Other,
}

/// A timestamped incident
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct Incident {
    pub message: String,
    pub elapsed_seconds: Option<f64>,
    pub date: Option<DateTime<FixedOffset>>,
    pub incident_type: IncidentType,
    pub participant: Option<ParticipantId>,
    pub other_participant: Option<ParticipantId>,
    /// Raw impact value in the unit of the source format
    pub impact: Option<f64>,
    pub for_review: bool,
}

impl Incident {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Default::default() }
    }

    /// Store the impact and flag car contacts at or above `threshold` for review.
    pub fn set_impact(&mut self, impact: f64, threshold: f64) {
        self.impact = Some(impact);
        self.for_review = self.incident_type == IncidentType::Car && impact >= threshold;
    }
}

/// A penalty given during or after a session
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct Penalty {
    pub message: String,
    pub elapsed_seconds: Option<f64>,
    pub date: Option<DateTime<FixedOffset>>,
    pub participant: Option<ParticipantId>,
    /// Kind as named by the simulator (`DriveThrough`, `StopAndGo_10`)
    pub penalty_type: Option<String>,
    pub value: Option<f64>,
    pub lap: Option<u32>,
    pub served: bool,
    /// Applied after the session ended
    pub post_race: bool,
}

impl Penalty {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Default::default() }
    }
}

/// A chat message
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct Chat {
    pub message: String,
    pub elapsed_seconds: Option<f64>,
    pub date: Option<DateTime<FixedOffset>>,
    pub participant: Option<ParticipantId>,
}

impl Chat {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Default::default() }
    }
}

/// A track limits cut on a lap
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct Cut {
    /// Duration of the cut
    pub cut_time: Option<f64>,
    /// Time gained by the cut
    pub time_skipped: Option<f64>,
    /// Session time of the cut
    pub elapsed_seconds: Option<f64>,
    /// Time into the lap of the cut
    pub elapsed_seconds_in_lap: Option<f64>,
    pub date: Option<DateTime<FixedOffset>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_car_contacts_are_reviewed() {
        let mut incident = Incident::new("contact");
        incident.incident_type = IncidentType::Car;
        incident.set_impact(0.59, RFACTOR_REVIEW_IMPACT);
        assert!(!incident.for_review);
        incident.set_impact(0.6, RFACTOR_REVIEW_IMPACT);
        assert!(incident.for_review);

        let mut wall = Incident::new("wall");
        wall.incident_type = IncidentType::Env;
        wall.set_impact(12.0, RFACTOR_REVIEW_IMPACT);
        assert!(!wall.for_review);
        assert_eq!(wall.impact, Some(12.0));
    }
}
