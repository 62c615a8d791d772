//! Lap records

use serde::Serialize;

use super::{AidFlags, Cut, Vehicle, round_to};

/// One lap of a participant
///
/// `time` of `None` means the lap is unknown or incomplete. `elapsed_seconds`
/// is the session time at which the lap started.
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct Lap {
    /// 1-based lap number
    pub number: Option<u32>,
    /// Lap time in seconds
    pub time: Option<f64>,
    /// Session time at the start of this lap
    pub elapsed_seconds: Option<f64>,
    /// Running position at this lap
    pub position: Option<u32>,
    /// Sector times, index 0 is sector 1
    pub sector_times: Vec<f64>,
    pub is_pit_lap: bool,
    /// Time spent in the pits when the log reports it
    pub pit_time: Option<f64>,
    pub front_compound: Option<String>,
    pub rear_compound: Option<String>,
    pub aids: AidFlags,
    pub cuts: Vec<Cut>,
    /// Index into the owning participant's drivers when driven by a swap driver
    pub driver: Option<usize>,
    /// Vehicle when it differs from the participant's vehicle
    pub vehicle: Option<Vehicle>,
}

impl Lap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lap with a number and time
    pub fn with_time(number: u32, time: Option<f64>) -> Self {
        Self { number: Some(number), time, ..Default::default() }
    }

    /// A lap counts as completed when its time is known.
    pub fn is_completed(&self) -> bool {
        self.time.is_some()
    }

    /// Time of a 1-based sector
    pub fn sector_time(&self, sector: usize) -> Option<f64> {
        sector.checked_sub(1).and_then(|index| self.sector_times.get(index).copied())
    }

    /// Session time at which this lap ended
    pub fn elapsed_seconds_with_time(&self) -> Option<f64> {
        Some(round_to(self.elapsed_seconds? + self.time?, 4))
    }

    /// Set both tyre compounds
    pub fn set_compound(&mut self, compound: impl Into<String>) {
        let compound = compound.into();
        self.front_compound = Some(compound.clone());
        self.rear_compound = Some(compound);
    }

    /// Gap to another lap in seconds, positive when this lap is slower
    pub fn gap_to(&self, other: &Lap) -> Option<f64> {
        Some(round_to(self.time? - other.time?, 4))
    }
}
