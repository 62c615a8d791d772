//! Participants (car entries) and their derived timing values

use serde::Serialize;

use super::{Driver, Lap, Vehicle, round_to};

/// Stable identifier of a participant within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ParticipantId(pub u32);

/// How a participant finished
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FinishStatus {
    /// Finished normally
    #[default]
    Normal,
    /// Did not finish
    Dnf,
    /// Disqualified
    Dq,
    /// Unknown or not enough data
    None,
}

/// Lap range driven by one of a participant's drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DriverSwap {
    /// First lap (inclusive)
    pub start_lap: u32,
    /// Last lap (inclusive)
    pub end_lap: u32,
    /// Index into [`Participant::drivers`]
    pub driver_index: usize,
}

/// One car entry of a session
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    /// Drivers, index 0 is the default driver
    pub drivers: Vec<Driver>,
    pub driver_swaps: Vec<DriverSwap>,
    pub vehicle: Vehicle,
    pub team: Option<String>,
    /// Laps in driven order
    pub laps: Vec<Lap>,
    pub position: Option<u32>,
    pub grid_position: Option<u32>,
    pub class_position: Option<u32>,
    pub class_grid_position: Option<u32>,
    pub finish_status: FinishStatus,
    pub finish_comment: Option<String>,
    /// Total time when the log reports one; otherwise derived from laps
    pub explicit_total_time: Option<f64>,
    /// Pitstop count when the log reports one; otherwise derived from laps
    pub explicit_pitstops: Option<u32>,
}

impl Participant {
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            drivers: Vec::new(),
            driver_swaps: Vec::new(),
            vehicle: Vehicle::default(),
            team: None,
            laps: Vec::new(),
            position: None,
            grid_position: None,
            class_position: None,
            class_grid_position: None,
            finish_status: FinishStatus::Normal,
            finish_comment: None,
            explicit_total_time: None,
            explicit_pitstops: None,
        }
    }

    /// Participant with a single driver
    pub fn with_driver(id: ParticipantId, driver: Driver) -> Self {
        let mut participant = Self::new(id);
        participant.drivers.push(driver);
        participant
    }

    /// Default driver
    pub fn driver(&self) -> Option<&Driver> {
        self.drivers.first()
    }

    /// Name of the default driver, empty when unknown
    pub fn driver_name(&self) -> &str {
        self.driver().map_or("", |driver| driver.name.as_str())
    }

    /// Index of a driver by name
    pub fn driver_index(&self, name: &str) -> Option<usize> {
        self.drivers.iter().position(|driver| driver.name == name)
    }

    /// Index of a driver by name, adding the driver when missing
    pub fn ensure_driver(&mut self, driver: Driver) -> usize {
        match self.driver_index(&driver.name) {
            Some(index) => index,
            None => {
                self.drivers.push(driver);
                self.drivers.len() - 1
            }
        }
    }

    /// Driver of a lap number according to the swap intervals
    pub fn driver_index_for_lap(&self, lap_number: u32) -> usize {
        self.driver_swaps
            .iter()
            .find(|swap| swap.start_lap <= lap_number && lap_number <= swap.end_lap)
            .map_or(0, |swap| swap.driver_index)
    }

    /// Driver of a lap number, defaulting to the first driver
    pub fn driver_for_lap(&self, lap_number: u32) -> Option<&Driver> {
        self.drivers.get(self.driver_index_for_lap(lap_number)).or_else(|| self.driver())
    }

    /// Lap by its 1-based number
    pub fn lap(&self, number: u32) -> Option<&Lap> {
        self.laps.iter().find(|lap| lap.number == Some(number))
    }

    pub fn last_lap(&self) -> Option<&Lap> {
        self.laps.last()
    }

    pub fn number_of_laps(&self) -> usize {
        self.laps.len()
    }

    pub fn number_of_completed_laps(&self) -> usize {
        self.laps.iter().filter(|lap| lap.is_completed()).count()
    }

    /// Fastest completed lap; the earliest one wins ties
    pub fn best_lap(&self) -> Option<&Lap> {
        self.laps.iter().filter(|lap| lap.is_completed()).fold(None, |best: Option<&Lap>, lap| {
            match (best, lap.time) {
                (Some(current), Some(time)) if current.time.is_some_and(|t| t <= time) => {
                    Some(current)
                }
                _ => Some(lap),
            }
        })
    }

    /// Fastest time of a 1-based sector over all laps
    pub fn best_sector(&self, sector: usize) -> Option<f64> {
        self.laps.iter().filter_map(|lap| lap.sector_time(sector)).min_by(|a, b| a.total_cmp(b))
    }

    /// Explicit total time, or the sum of completed lap times
    pub fn total_time(&self) -> Option<f64> {
        if self.explicit_total_time.is_some() {
            return self.explicit_total_time;
        }
        let mut completed = self.laps.iter().filter_map(|lap| lap.time).peekable();
        completed.peek()?;
        Some(round_to(completed.sum(), 4))
    }

    /// Explicit pitstop count, or the number of pit laps
    pub fn pitstops(&self) -> u32 {
        self.explicit_pitstops.unwrap_or_else(|| {
            u32::try_from(self.laps.iter().filter(|lap| lap.is_pit_lap).count()).unwrap_or(u32::MAX)
        })
    }

    /// Average gap to the best lap over representative laps
    ///
    /// Excludes lap 1, pit laps, incomplete laps and laps slower than 121% of
    /// the best lap. Lower is more consistent.
    pub fn consistency(&self) -> Option<f64> {
        let best = self.best_lap()?.time?;
        let limit = best * 1.21;

        let mut times: Vec<f64> = self
            .laps
            .iter()
            .filter(|lap| lap.number != Some(1) && !lap.is_pit_lap)
            .filter_map(|lap| lap.time)
            .filter(|time| *time <= limit)
            .collect();

        if let Some(index) = times.iter().position(|time| (*time - best).abs() < f64::EPSILON) {
            times.remove(index);
        }
        if times.len() < 2 {
            return None;
        }

        let count = times.len() as f64;
        Some(round_to(times.iter().map(|time| time - best).sum::<f64>() / count, 4))
    }

    /// Copy of this participant without any laps
    ///
    /// Used when one roster feeds several sessions so that laps never leak
    /// between sessions.
    pub fn clone_with_empty_laps(&self) -> Self {
        Self {
            laps: Vec::new(),
            position: None,
            class_position: None,
            explicit_total_time: None,
            explicit_pitstops: None,
            finish_status: FinishStatus::Normal,
            finish_comment: None,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant_with_times(times: &[Option<f64>]) -> Participant {
        let mut participant = Participant::with_driver(ParticipantId(1), Driver::new("Dirk"));
        for (index, time) in times.iter().enumerate() {
            participant.laps.push(Lap::with_time(index as u32 + 1, *time));
        }
        participant
    }

    #[test]
    fn best_lap_ignores_incomplete_laps_and_keeps_first_on_tie() {
        let participant = participant_with_times(&[None, Some(91.0), Some(90.5), Some(90.5)]);
        let best = participant.best_lap().unwrap();
        assert_eq!(best.number, Some(3));
        assert_eq!(participant_with_times(&[None]).best_lap(), None);
    }

    #[test]
    fn total_time_prefers_explicit_value() {
        let mut participant = participant_with_times(&[Some(90.0), None, Some(91.5)]);
        assert_eq!(participant.total_time(), Some(181.5));
        participant.explicit_total_time = Some(200.0);
        assert_eq!(participant.total_time(), Some(200.0));
        assert_eq!(participant_with_times(&[None, None]).total_time(), None);
    }

    #[test]
    fn driver_swaps_select_driver_per_lap() {
        let mut participant = participant_with_times(&[Some(90.0); 6]);
        let second = participant.ensure_driver(Driver::new("Clive"));
        assert_eq!(second, 1);
        assert_eq!(participant.ensure_driver(Driver::new("Clive")), 1);
        participant.driver_swaps.push(DriverSwap { start_lap: 4, end_lap: 6, driver_index: 1 });

        assert_eq!(participant.driver_for_lap(3).unwrap().name, "Dirk");
        assert_eq!(participant.driver_for_lap(4).unwrap().name, "Clive");
        assert_eq!(participant.driver_for_lap(7).unwrap().name, "Dirk");
    }

    #[test]
    fn consistency_skips_first_pit_and_outlier_laps() {
        let mut participant =
            participant_with_times(&[Some(120.0), Some(90.0), Some(91.0), Some(92.0), Some(200.0)]);
        // avg gap of 91.0 and 92.0 to the best lap
        assert_eq!(participant.consistency(), Some(1.5));

        participant.laps[3].is_pit_lap = true;
        assert_eq!(participant.consistency(), None);
    }

    #[test]
    fn pitstops_fall_back_to_pit_laps() {
        let mut participant = participant_with_times(&[Some(90.0), Some(91.0)]);
        participant.laps[1].is_pit_lap = true;
        assert_eq!(participant.pitstops(), 1);
        participant.explicit_pitstops = Some(3);
        assert_eq!(participant.pitstops(), 3);
    }

    #[test]
    fn clone_with_empty_laps_keeps_identity_only() {
        let mut participant = participant_with_times(&[Some(90.0)]);
        participant.grid_position = Some(4);
        participant.position = Some(2);
        participant.finish_status = FinishStatus::Dnf;

        let clone = participant.clone_with_empty_laps();
        assert!(clone.laps.is_empty());
        assert_eq!(clone.id, participant.id);
        assert_eq!(clone.grid_position, Some(4));
        assert_eq!(clone.position, None);
        assert_eq!(clone.finish_status, FinishStatus::Normal);
        assert_eq!(participant.laps.len(), 1);
    }
}
