//! Format independent repair passes
//!
//! [`fix_sessions`] runs after every format reader, in this order:
//!
//! 1. [`fix_grid_positions`]: race grid positions from the latest qualifying
//! 2. [`fix_finish_statuses`]: DNF for zero laps, NONE under half distance
//! 3. [`fix_lap_data`]: lap numbers, elapsed times and lap positions
//! 4. [`fix_participant_positions`]: positions follow list order
//!
//! Each pass only fills in what is missing, so running the pipeline a second
//! time changes nothing.

use std::collections::HashMap;

use tracing::trace;

use crate::config::ReaderOptions;
use crate::helper::{
    compare_laps_by_elapsed_time, sort_participants_by_best_lap,
    sort_participants_by_last_lap_position, sort_participants_by_total_time,
};
use crate::model::{FinishStatus, Session, SessionType, round_to};

/// Run every shared pass over the sessions of one file.
pub fn fix_sessions(sessions: &mut [Session], options: &ReaderOptions) {
    fix_grid_positions(sessions);
    for session in sessions.iter_mut() {
        fix_finish_statuses(session, options.finish_status_by_laps);
        fix_lap_data(session);
        fix_participant_positions(session);
    }
}

/// Fill missing race grid positions from the most recent qualifying session.
///
/// Participants are matched by default driver name. Only a qualifying session
/// replaces the remembered positions; grid positions set by the reader are
/// never overwritten.
pub fn fix_grid_positions(sessions: &mut [Session]) {
    let mut qualify_positions: Option<HashMap<String, u32>> = None;

    for session in sessions.iter_mut() {
        match session.session_type {
            SessionType::Qualify => {
                let positions = session
                    .participants
                    .iter()
                    .enumerate()
                    .filter(|(_, participant)| !participant.driver_name().is_empty())
                    .map(|(index, participant)| {
                        let position = participant.position.unwrap_or(index as u32 + 1);
                        (participant.driver_name().to_string(), position)
                    })
                    .collect();
                qualify_positions = Some(positions);
            }
            SessionType::Race => {
                let Some(positions) = &qualify_positions else {
                    continue;
                };
                for participant in &mut session.participants {
                    if participant.grid_position.is_none() {
                        participant.grid_position = positions.get(participant.driver_name()).copied();
                    }
                }
            }
            SessionType::Practice | SessionType::Warmup => {}
        }
    }
}

/// Infer race finish statuses from completed laps.
///
/// Zero completed laps means DNF (a DQ stays DQ). With `by_laps` set, a
/// NORMAL participant that completed under half of the lasted laps gets
/// NONE. Exactly half stays NORMAL.
pub fn fix_finish_statuses(session: &mut Session, by_laps: bool) {
    if session.session_type != SessionType::Race {
        return;
    }
    let lasted_laps = session.lasted_laps() as f64;

    for participant in &mut session.participants {
        let completed = participant.number_of_completed_laps();
        if completed == 0 {
            if participant.finish_status != FinishStatus::Dq {
                participant.finish_status = FinishStatus::Dnf;
            }
        } else if by_laps
            && participant.finish_status == FinishStatus::Normal
            && (completed as f64) < lasted_laps * 0.5
        {
            trace!(driver = participant.driver_name(), completed, "Under half distance, status NONE");
            participant.finish_status = FinishStatus::None;
        }
    }
}

/// Fill lap numbers and elapsed times, then lap positions when missing.
///
/// Elapsed time is the running total of the participant's earlier lap
/// times. Elapsed times read from the log are kept as they are and do not
/// move the running total. Lap
/// positions are only computed when the first participant's second lap has
/// none, which means the format never provides them.
pub fn fix_lap_data(session: &mut Session) {
    for participant in &mut session.participants {
        let mut elapsed = 0.0;
        for (index, lap) in participant.laps.iter_mut().enumerate() {
            if lap.number.is_none() {
                lap.number = Some(index as u32 + 1);
            }
            if let Some(time) = lap.time {
                if lap.elapsed_seconds.is_none() {
                    lap.elapsed_seconds = Some(round_to(elapsed, 4));
                }
                elapsed += time;
            }
        }
    }

    let positions_missing = session
        .participants
        .first()
        .and_then(|participant| participant.lap(2))
        .is_some_and(|lap| lap.position.is_none());
    if positions_missing {
        fix_lap_positions(session);
    }
}

/// Rank laps of the same number across participants by elapsed time.
///
/// Laps without both a time and an elapsed time keep their position empty.
pub fn fix_lap_positions(session: &mut Session) {
    let lasted_laps = session.lasted_laps() as u32;

    for number in 1..=lasted_laps {
        let mut laps: Vec<(usize, usize)> = session
            .participants
            .iter()
            .enumerate()
            .flat_map(|(participant_index, participant)| {
                participant
                    .laps
                    .iter()
                    .enumerate()
                    .filter(move |(_, lap)| lap.number == Some(number))
                    .map(move |(lap_index, _)| (participant_index, lap_index))
            })
            .collect();

        let participants = &session.participants;
        laps.sort_by(|a, b| {
            compare_laps_by_elapsed_time(
                &participants[a.0].laps[a.1],
                &participants[b.0].laps[b.1],
            )
        });

        let mut position = 0;
        for (participant_index, lap_index) in laps {
            let lap = &mut session.participants[participant_index].laps[lap_index];
            if lap.time.is_some() || lap.elapsed_seconds.is_some() {
                position += 1;
                lap.position = Some(position);
            }
        }
    }
}

/// Positions 1..N in list order.
pub fn fix_participant_positions(session: &mut Session) {
    for (index, participant) in session.participants.iter_mut().enumerate() {
        participant.position = Some(index as u32 + 1);
    }
}

/// Sort a session by its natural order and renumber.
///
/// Races sort by total time, unless every participant has status NONE (logs
/// without any total time data), in which case the last lap position
/// decides. Other sessions sort by best lap.
pub fn sort_participants_and_fix_positions(session: &mut Session) {
    if session.session_type == SessionType::Race {
        let all_none = !session.participants.is_empty()
            && session
                .participants
                .iter()
                .all(|participant| participant.finish_status == FinishStatus::None);
        if all_none {
            sort_participants_by_last_lap_position(&mut session.participants);
        } else {
            sort_participants_by_total_time(&mut session.participants);
        }
    } else {
        sort_participants_by_best_lap(&mut session.participants);
    }
    fix_participant_positions(session);
}
