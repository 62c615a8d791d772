//! Assetto Corsa dedicated server JSON results
//!
//! Written by acServer after each session. The `Result` array is already in
//! finishing order; laps reference cars by `CarId`.

use serde::Deserialize;
use tracing::debug;

use crate::config::ReaderOptions;
use crate::formats::{json_has_keys, non_empty, parse_json, positive_ms};
use crate::helper::detect_session;
use crate::model::{
    Cut, Driver, FinishStatus, Game, IMPACT_SPEED_REVIEW_KMH, Incident, IncidentType, Lap, Participant,
    ParticipantId, Session, SessionType, Track, Vehicle, ms_to_seconds,
};
use crate::reader::{FormatReader, ReaderFormat, fix_participant_positions};
use crate::text::decode_bytes;
use crate::Result;

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct AcServerResults {
    pub track_name: Option<String>,
    pub track_config: Option<String>,
    /// `PRACTICE`, `QUALIFY` or `RACE`
    #[serde(rename = "Type")]
    pub session_type: Option<String>,
    pub duration_secs: Option<u32>,
    pub race_laps: Option<u32>,
    pub date: Option<String>,
    pub cars: Vec<AcServerCar>,
    pub result: Vec<AcServerResult>,
    pub laps: Vec<AcServerLap>,
    pub events: Vec<AcServerEvent>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct AcServerDriver {
    pub name: Option<String>,
    pub team: Option<String>,
    pub guid: Option<String>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct AcServerCar {
    pub car_id: Option<u32>,
    pub driver: AcServerDriver,
    pub model: Option<String>,
    pub skin: Option<String>,
    #[serde(rename = "BallastKG")]
    pub ballast_kg: Option<f64>,
    pub restrictor: Option<f64>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct AcServerResult {
    pub driver_name: Option<String>,
    pub driver_guid: Option<String>,
    pub car_id: Option<u32>,
    pub car_model: Option<String>,
    /// Best lap in ms
    pub best_lap: Option<f64>,
    /// Total time in ms, 0 when the car did not finish
    pub total_time: Option<f64>,
    #[serde(rename = "BallastKG")]
    pub ballast_kg: Option<f64>,
    pub restrictor: Option<f64>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct AcServerLap {
    pub driver_name: Option<String>,
    pub driver_guid: Option<String>,
    pub car_id: Option<u32>,
    pub car_model: Option<String>,
    pub timestamp: Option<i64>,
    pub lap_time: Option<f64>,
    pub sectors: Vec<f64>,
    pub cuts: Option<u32>,
    pub tyre: Option<String>,
}

#[derive(Default, Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct AcServerEvent {
    /// `COLLISION_WITH_CAR` or `COLLISION_WITH_ENV`
    #[serde(rename = "Type")]
    pub event_type: Option<String>,
    pub car_id: Option<u32>,
    pub driver: AcServerDriver,
    /// -1 for environment contacts
    pub other_car_id: Option<i64>,
    pub other_driver: AcServerDriver,
    /// km/h
    pub impact_speed: Option<f64>,
}

/// Reader for acServer JSON results
#[derive(Debug)]
pub struct AssettoCorsaServerJsonReader {
    results: AcServerResults,
    options: ReaderOptions,
}

impl ReaderFormat for AssettoCorsaServerJsonReader {
    const NAME: &'static str = "assetto_corsa_server_json";

    fn can_read(data: &[u8]) -> bool {
        json_has_keys(data, &["TrackName", "Result", "Laps"])
    }

    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
        Ok(Self { results: parse_json(Self::NAME, &decode_bytes(data))?, options })
    }
}

impl AssettoCorsaServerJsonReader {
    fn participant_for_car<'a>(
        session: &'a mut Session,
        car_id: u32,
        driver_name: Option<&str>,
        model: Option<&str>,
    ) -> &'a mut Participant {
        let id = ParticipantId(car_id);
        let index = match session.participants.iter().position(|participant| participant.id == id) {
            Some(index) => index,
            None => {
                let mut participant =
                    Participant::with_driver(id, Driver::new(driver_name.unwrap_or_default().trim()));
                participant.vehicle = Vehicle::new(model.unwrap_or_default());
                session.push_participant(participant);
                session.participants.len() - 1
            }
        };
        &mut session.participants[index]
    }

    fn read_cars(&self, session: &mut Session) {
        for car in &self.results.cars {
            let (Some(car_id), Some(name)) = (car.car_id, non_empty(car.driver.name.as_deref())) else {
                continue;
            };
            let mut driver = Driver::new(name);
            if let Some(guid) = non_empty(car.driver.guid.as_deref()) {
                driver = driver.with_id(guid);
            }
            let mut participant = Participant::with_driver(ParticipantId(car_id), driver);
            participant.team = non_empty(car.driver.team.as_deref());
            participant.vehicle = Vehicle {
                name: car.model.clone().unwrap_or_default(),
                skin: non_empty(car.skin.as_deref()),
                ballast: car.ballast_kg.filter(|kg| *kg > 0.0),
                restrictor: car.restrictor.filter(|restrictor| *restrictor > 0.0),
                ..Default::default()
            };
            session.push_participant(participant);
        }
    }

    fn read_laps(&self, session: &mut Session) {
        for raw in &self.results.laps {
            let Some(car_id) = raw.car_id else { continue };
            let driver_name = non_empty(raw.driver_name.as_deref());
            let participant =
                Self::participant_for_car(session, car_id, driver_name.as_deref(), raw.car_model.as_deref());

            let mut lap = Lap::with_time(participant.laps.len() as u32 + 1, positive_ms(raw.lap_time));
            lap.sector_times = raw.sectors.iter().map(|sector| ms_to_seconds(*sector)).collect();
            lap.cuts = (0..raw.cuts.unwrap_or(0)).map(|_| Cut::default()).collect();
            if let Some(tyre) = non_empty(raw.tyre.as_deref()) {
                lap.set_compound(tyre);
            }
            if let Some(name) = driver_name {
                let mut driver = Driver::new(name);
                if let Some(guid) = non_empty(raw.driver_guid.as_deref()) {
                    driver = driver.with_id(guid);
                }
                let index = participant.ensure_driver(driver);
                if index > 0 {
                    lap.driver = Some(index);
                }
            }
            participant.laps.push(lap);
        }
    }

    fn read_events(&self, session: &mut Session) {
        for event in &self.results.events {
            let incident_type = match event.event_type.as_deref() {
                Some("COLLISION_WITH_CAR") => IncidentType::Car,
                Some("COLLISION_WITH_ENV") => IncidentType::Env,
                _ => IncidentType::Other,
            };
            let driver = event.driver.name.as_deref().unwrap_or("unknown");
            let speed = event.impact_speed.unwrap_or(0.0);
            let message = match incident_type {
                IncidentType::Car => format!(
                    "{driver} collided with {} at {speed:.2} km/h",
                    event.other_driver.name.as_deref().unwrap_or("unknown")
                ),
                _ => format!("{driver} collided with the environment at {speed:.2} km/h"),
            };
            let mut incident = Incident::new(message);
            incident.incident_type = incident_type;
            incident.participant = event.car_id.map(ParticipantId).filter(|id| session.participant(*id).is_some());
            if incident_type == IncidentType::Car {
                incident.other_participant = event
                    .other_car_id
                    .and_then(|id| u32::try_from(id).ok())
                    .map(ParticipantId)
                    .filter(|id| session.participant(*id).is_some());
            }
            if let Some(speed) = event.impact_speed {
                incident.set_impact(speed, IMPACT_SPEED_REVIEW_KMH);
            }
            session.incidents.push(incident);
        }
    }

    /// Result order first, cars without a result entry after
    fn apply_results(&self, session: &mut Session) {
        let mut remaining = std::mem::take(&mut session.participants);
        let mut ordered = Vec::with_capacity(remaining.len());
        for result in &self.results.result {
            let Some(car_id) = result.car_id else { continue };
            let Some(index) = remaining.iter().position(|participant| participant.id == ParticipantId(car_id))
            else {
                continue;
            };
            let mut participant = remaining.remove(index);
            if participant.drivers.is_empty() {
                if let Some(name) = non_empty(result.driver_name.as_deref()) {
                    participant.drivers.push(Driver::new(name));
                }
            }
            let total = positive_ms(result.total_time);
            if session.session_type == SessionType::Race {
                participant.explicit_total_time = total;
                if total.is_none() {
                    participant.finish_status = FinishStatus::Dnf;
                }
            }
            ordered.push(participant);
        }
        // cars that never drove have no place in the result
        ordered.extend(remaining.into_iter().filter(|participant| !participant.laps.is_empty()));
        session.participants = ordered;
    }
}

impl FormatReader for AssettoCorsaServerJsonReader {
    fn format_name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_sessions(&self) -> Result<Vec<Session>> {
        let results = &self.results;
        let (session_type, name) = detect_session(results.session_type.as_deref().unwrap_or("practice"), None);
        let mut session = Session::new(session_type);
        session.name = name;
        session.game = Game::named("Assetto Corsa");
        session.track = Track {
            venue: non_empty(results.track_name.as_deref()),
            course: non_empty(results.track_config.as_deref()),
            ..Default::default()
        };
        session.server.dedicated = true;
        session.date = results.date.as_deref().and_then(|date| self.options.parse_date(date));
        session.max_laps = results.race_laps.filter(|laps| *laps > 0);
        session.max_minutes = results.duration_secs.filter(|secs| *secs > 0).map(|secs| secs / 60);

        self.read_cars(&mut session);
        self.read_laps(&mut session);
        self.read_events(&mut session);
        self.apply_results(&mut session);
        fix_participant_positions(&mut session);

        debug!(
            session_type = %session.session_type,
            participants = session.participants.len(),
            "Read acServer JSON results"
        );
        Ok(vec![session])
    }
}
