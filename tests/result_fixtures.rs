//! End-to-end reads of the fixtures in test-data/ through the factory
//!
//! Every test goes through `ResultsReader`, so sniffing, the format reader
//! and the shared fix-up passes all run.

use std::path::PathBuf;

use anyhow::Context;
use racelog::{FinishStatus, IncidentType, ResultsReader, Session, SessionType};

fn fixture(format: &str, file_name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data").join(format).join(file_name)
}

fn read(format: &str, file_name: &str) -> anyhow::Result<Vec<Session>> {
    let path = fixture(format, file_name);
    let reader = ResultsReader::open(&path).with_context(|| format!("opening {}", path.display()))?;
    assert_eq!(reader.format_name(), format);
    Ok(reader.into_sessions()?)
}

fn names(session: &Session) -> Vec<&str> {
    session.participants.iter().map(|participant| participant.driver_name()).collect()
}

#[test]
fn rfactor2_corrupted_positions_are_resorted() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let sessions = read("rfactor2", "2014_07_15_race_positions.xml")?;
    assert_eq!(sessions.len(), 2);

    let qualify = &sessions[0];
    assert_eq!(qualify.session_type, SessionType::Qualify);
    assert_eq!(qualify.game.name.as_deref(), Some("rFactor 2"));
    assert_eq!(qualify.chats.len(), 1);

    let race = &sessions[1];
    assert_eq!(race.session_type, SessionType::Race);
    assert_eq!(race.max_laps, Some(3));
    assert_eq!(names(race), ["Fast Driver", "Slow Driver", "Charlie Driver"]);
    let positions: Vec<Option<u32>> = race.participants.iter().map(|participant| participant.position).collect();
    assert_eq!(positions, [Some(1), Some(2), Some(3)]);

    // the race carries no grid, it comes from qualifying
    let grid: Vec<Option<u32>> = race.participants.iter().map(|participant| participant.grid_position).collect();
    assert_eq!(grid, [Some(1), Some(2), Some(3)]);

    let charlie = &race.participants[2];
    assert_eq!(charlie.finish_status, FinishStatus::Dnf);
    assert_eq!(charlie.finish_comment.as_deref(), Some("Accident"));

    assert_eq!(race.incidents.len(), 2);
    assert!(race.incidents[0].for_review);
    assert_eq!(race.incidents[1].incident_type, IncidentType::Env);
    assert_eq!(race.penalties.len(), 1);
    Ok(())
}

#[test]
fn race07_dnf_leader_is_read_as_qualify_or_practice() -> anyhow::Result<()> {
    let sessions = read("race07", "2013_09_14_qualify.txt")?;
    let session = &sessions[0];
    assert_eq!(session.session_type, SessionType::Qualify);
    assert_eq!(session.name.as_deref(), Some(racelog::formats::race07::QUALIFY_OR_PRACTICE));
    assert_eq!(names(session), ["Bravo Driver", "Alpha Driver", "Charlie Driver"]);
    assert!(session.participants.iter().all(|participant| participant.finish_status == FinishStatus::Normal));
    assert!(session.participants.iter().all(|participant| participant.explicit_total_time.is_none()));
    Ok(())
}

#[test]
fn race07_race_keeps_race_times() -> anyhow::Result<()> {
    let sessions = read("race07", "2013_09_14_race.txt")?;
    let race = &sessions[0];
    assert_eq!(race.session_type, SessionType::Race);
    assert_eq!(names(race), ["Dirk Pitt", "Clive Cussler", "Al Giordino"]);
    assert_eq!(race.participants[0].total_time(), Some(212.415));
    let dnf = &race.participants[2];
    assert_eq!(dnf.finish_status, FinishStatus::Dnf);
    assert_eq!(dnf.finish_comment.as_deref(), Some("Mechanical failure"));
    Ok(())
}

#[test]
fn race07_retired_first_slot_is_still_a_race() -> anyhow::Result<()> {
    let sessions = read("race07", "2013_09_14_race_retired_first.txt")?;
    let race = &sessions[0];
    assert_eq!(race.session_type, SessionType::Race);
    assert_eq!(race.name, None);
    assert_eq!(names(race), ["Dirk Pitt", "Clive Cussler", "Al Giordino"]);
    assert_eq!(race.participants[0].total_time(), Some(212.415));
    assert_eq!(race.participants[1].finish_status, FinishStatus::Normal);
    let retired = &race.participants[2];
    assert_eq!(retired.finish_status, FinishStatus::Dnf);
    assert_eq!(retired.finish_comment.as_deref(), Some("Accident"));
    Ok(())
}

#[test]
fn acc_first_lap_is_rebuilt() -> anyhow::Result<()> {
    let sessions = read("acc", "211107_203014_R.json")?;
    let race = &sessions[0];
    let winner = &race.participants[0];
    assert_eq!(winner.driver_name(), "Anna Alpha");
    assert_eq!(winner.laps.len(), 3);
    // other car's lap 2 and 3 first sectors (30.0, 31.0) averaged plus the grid offset
    assert_eq!(winner.laps[0].sector_times, [35.5, 40.0, 40.0]);
    assert_eq!(winner.laps[0].time, Some(115.5));
    assert_eq!(winner.laps[1].time, Some(108.0));
    assert_eq!(race.server.name.as_deref(), Some("Sunday League | GT3 Sprint"));
    Ok(())
}

#[test]
fn acserver_log_skips_discarded_and_refused_laps() -> anyhow::Result<()> {
    let sessions = read("assetto_corsa_server", "acserver_2021_05_01.log")?;
    assert_eq!(sessions.len(), 3);

    let qualify = &sessions[0];
    assert_eq!(qualify.session_type, SessionType::Qualify);
    let laps: usize = qualify.participants.iter().map(|participant| participant.laps.len()).sum();
    assert_eq!(laps, 3);
    let alpha = qualify.participant_by_driver_name("Alpha Driver").context("Alpha in qualify")?;
    let times: Vec<Option<f64>> = alpha.laps.iter().map(|lap| lap.time).collect();
    assert_eq!(times, [Some(100.5), Some(101.25)]);

    let restarted = &sessions[2];
    assert_eq!(restarted.chats.len(), 1);
    assert_eq!(restarted.participants[0].driver_name(), "Alpha Driver");
    Ok(())
}

#[test]
fn acserver_json_result_order() -> anyhow::Result<()> {
    let sessions = read("assetto_corsa_server_json", "2021_5_1_20_0_RACE.json")?;
    let race = &sessions[0];
    assert_eq!(names(race), ["Bravo", "Alpha"]);
    assert_eq!(race.participants[1].finish_status, FinishStatus::Dnf);
    assert_eq!(race.incidents.len(), 2);
    assert_eq!(race.incidents[1].other_participant, None);
    Ok(())
}

#[test]
fn assetto_corsa_offline_sessions() -> anyhow::Result<()> {
    let sessions = read("assetto_corsa", "offline_race.json")?;
    assert_eq!(sessions.len(), 2);
    assert_eq!(names(&sessions[1]), ["Bravo", "Alpha"]);
    // grid positions are set from the qualifying result
    assert_eq!(sessions[1].participants[0].grid_position, Some(1));
    Ok(())
}

#[test]
fn project_cars_stages() -> anyhow::Result<()> {
    let sessions = read("project_cars", "sms_stats_data.json")?;
    assert_eq!(sessions.len(), 2);
    let race = &sessions[1];
    assert_eq!(names(race), ["Alpha", "Bravo"]);
    assert_eq!(race.participants[1].finish_status, FinishStatus::Dnf);
    assert_eq!(race.server.name.as_deref(), Some("PCars Club"));
    Ok(())
}

#[test]
fn raceroom_sessions() -> anyhow::Result<()> {
    let sessions = read("raceroom", "r3e_results_2020_09_13.json")?;
    assert_eq!(sessions.len(), 2);
    let race = &sessions[1];
    assert_eq!(names(race), ["Bravo Driver", "Alpha Driver"]);
    assert_eq!(race.participants[1].finish_status, FinishStatus::Dnf);
    assert_eq!(race.participants[0].grid_position, Some(2));
    Ok(())
}

#[test]
fn iracing_keeps_lap_count_statuses() -> anyhow::Result<()> {
    let sessions = read("iracing", "subsession_45000001.json")?;
    assert_eq!(sessions.len(), 2);
    let race = &sessions[1];
    assert_eq!(names(race), ["Alpha Driver", "Bravo Driver", "Charlie Driver"]);
    // one of three laps would be NONE under the half distance rule, which is off here
    assert_eq!(race.participants[1].finish_status, FinishStatus::Normal);
    assert_eq!(race.participants[2].finish_status, FinishStatus::Dnf);
    Ok(())
}

#[test]
fn second_monitor_summary() -> anyhow::Result<()> {
    let sessions = read("second_monitor", "2021_07_10_interlagos_race.json")?;
    let race = &sessions[0];
    assert_eq!(race.session_type, SessionType::Race);
    assert_eq!(names(race), ["Alpha Driver", "Bravo Driver", "Charlie Driver"]);
    assert_eq!(race.participants[0].total_time(), Some(145.0));
    assert_eq!(race.participants[2].finish_status, FinishStatus::Dnf);
    assert_eq!(race.track.length, Some(4309.0));
    Ok(())
}
