//! Test utilities for fixture lookup and model builders
//!
//! Fixtures live under `test-data/<format>/` next to the crate manifest, so
//! paths resolve the same regardless of the working directory tests run in.

use std::path::{Path, PathBuf};

use crate::model::{Driver, Lap, Session, SessionType};

/// The `test-data` directory of this crate
pub fn test_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

/// All fixture files of one format directory, sorted by file name
///
/// Returns an empty vector when the directory does not exist.
pub fn fixture_files(format: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(test_data_dir().join(format)) else {
        return vec![];
    };
    let mut files: Vec<PathBuf> =
        entries.flatten().map(|entry| entry.path()).filter(|path| path.is_file()).collect();
    files.sort();
    files
}

/// Append a participant driven by `name` with one lap per entry of `times`.
pub fn push_driver_with_laps(session: &mut Session, name: &str, times: &[Option<f64>]) {
    let mut participant = session.create_participant();
    participant.drivers.push(Driver::new(name));
    participant.laps = times.iter().map(|time| Lap { time: *time, ..Default::default() }).collect();
    session.push_participant(participant);
}

/// Session with one participant per `(driver, lap times)` entry, in list order.
pub fn session_with_laps(session_type: SessionType, entries: &[(&str, &[Option<f64>])]) -> Session {
    let mut session = Session::new(session_type);
    for (name, times) in entries {
        push_driver_with_laps(&mut session, name, times);
    }
    session
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_dir_is_next_to_manifest() {
        let dir = test_data_dir();
        assert!(dir.ends_with("test-data"));
        assert!(dir.parent().is_some_and(|root| root.join("Cargo.toml").exists()));
    }

    #[test]
    fn fixture_files_of_known_format() {
        let files = fixture_files("race07");
        assert!(!files.is_empty(), "race07 fixtures missing from test-data/race07/");
        assert!(files.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(fixture_files("__no_such_format").is_empty());
    }

    #[test]
    fn builder_assigns_ids_in_order() {
        let session = session_with_laps(SessionType::Race, &[("A", &[Some(90.0)]), ("B", &[])]);
        assert_eq!(session.participants.len(), 2);
        assert_eq!(session.participants[0].driver_name(), "A");
        assert_ne!(session.participants[0].id, session.participants[1].id);
        assert_eq!(session.participants[1].laps.len(), 0);
    }
}
