//! Lap and participant orderings
//!
//! Every ordering is total: unknown values (`None`) sort after known ones and
//! floats compare with [`f64::total_cmp`]. All sorts are stable, so equal keys
//! keep their input order.
//!
//! The sort functions accept anything that borrows the model type, so they
//! work on owned lists (`Vec<Lap>`) as well as on collected references
//! (`Vec<&Lap>`).

use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::model::{FinishStatus, Lap, Participant};

/// Compare optional values with `None` last.
fn nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compare_laps_by_time(a: &Lap, b: &Lap) -> Ordering {
    nulls_last(a.time, b.time)
}

/// Elapsed time ascending, ties broken by lap time
pub fn compare_laps_by_elapsed_time(a: &Lap, b: &Lap) -> Ordering {
    nulls_last(a.elapsed_seconds, b.elapsed_seconds).then_with(|| nulls_last(a.time, b.time))
}

pub fn compare_laps_by_sector(a: &Lap, b: &Lap, sector: usize) -> Ordering {
    nulls_last(a.sector_time(sector), b.sector_time(sector))
}

pub fn sort_laps_by_time<L: Borrow<Lap>>(laps: &mut [L]) {
    laps.sort_by(|a, b| compare_laps_by_time(a.borrow(), b.borrow()));
}

pub fn sort_laps_by_elapsed_time<L: Borrow<Lap>>(laps: &mut [L]) {
    laps.sort_by(|a, b| compare_laps_by_elapsed_time(a.borrow(), b.borrow()));
}

/// Sort by a 1-based sector; laps without that sector go last
pub fn sort_laps_by_sector<L: Borrow<Lap>>(laps: &mut [L], sector: usize) {
    laps.sort_by(|a, b| compare_laps_by_sector(a.borrow(), b.borrow(), sector));
}

pub fn compare_participants_by_best_lap(a: &Participant, b: &Participant) -> Ordering {
    nulls_last(a.best_lap().and_then(|lap| lap.time), b.best_lap().and_then(|lap| lap.time))
}

/// Positive total time of a participant that did not retire
fn classified_time(participant: &Participant) -> Option<f64> {
    if participant.finish_status == FinishStatus::Dnf {
        return None;
    }
    participant.total_time().filter(|time| *time > 0.0)
}

/// Race order by total time
///
/// Ascending total time. DNF participants and participants with a zero or
/// missing total time go last. Two DNF participants rank by completed laps,
/// more laps ahead. Remaining ties keep their input order, except that among
/// the unclassified more completed laps and then a lower total time go first.
pub fn compare_participants_by_total_time(a: &Participant, b: &Participant) -> Ordering {
    match (classified_time(a), classified_time(b)) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b
            .number_of_completed_laps()
            .cmp(&a.number_of_completed_laps())
            .then_with(|| {
                let positive = |time: Option<f64>| time.filter(|time| *time > 0.0);
                nulls_last(positive(a.total_time()), positive(b.total_time()))
            }),
    }
}

/// Order by the position recorded on each participant's last lap
pub fn compare_participants_by_last_lap_position(a: &Participant, b: &Participant) -> Ordering {
    let key = |participant: &Participant| {
        participant.last_lap().map(|lap| lap.position.map(f64::from))
    };
    match (key(a), key(b)) {
        (Some(a), Some(b)) => nulls_last(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn compare_participants_by_consistency(a: &Participant, b: &Participant) -> Ordering {
    nulls_last(a.consistency(), b.consistency())
}

pub fn sort_participants_by_best_lap<P: Borrow<Participant>>(participants: &mut [P]) {
    participants.sort_by(|a, b| compare_participants_by_best_lap(a.borrow(), b.borrow()));
}

pub fn sort_participants_by_total_time<P: Borrow<Participant>>(participants: &mut [P]) {
    participants.sort_by(|a, b| compare_participants_by_total_time(a.borrow(), b.borrow()));
}

pub fn sort_participants_by_last_lap_position<P: Borrow<Participant>>(participants: &mut [P]) {
    participants
        .sort_by(|a, b| compare_participants_by_last_lap_position(a.borrow(), b.borrow()));
}

pub fn sort_participants_by_consistency<P: Borrow<Participant>>(participants: &mut [P]) {
    participants.sort_by(|a, b| compare_participants_by_consistency(a.borrow(), b.borrow()));
}
