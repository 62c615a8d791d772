//! Race07 / GTR / GTR2 / F1 Challenge results
//!
//! INI-like text with a `[Header]`, a `[Race]` section and one `[SlotNNN]`
//! section per car. Laps are repeated `Lap=(index, elapsed, time)` keys;
//! older games count the index from 1, newer ones from 0.
//!
//! Qualifying and practice logs reuse the race layout. Every slot is marked
//! DNF there, so a field whose classified leader did not finish is read as
//! one of those sessions.

use tracing::debug;

use crate::config::ReaderOptions;
use crate::formats::compile;
use crate::helper::{seconds_from_formatted_time, sort_participants_by_total_time};
use crate::model::{Driver, FinishStatus, Game, Lap, Participant, Session, SessionType, Track, Vehicle, round_to};
use crate::reader::{FormatReader, ReaderFormat, sort_participants_and_fix_positions};
use crate::text::{IniSection, decode_bytes, parse_ini};
use crate::{Result, ResultsError};

/// Display name of sessions that cannot be told apart
pub const QUALIFY_OR_PRACTICE: &str = "Qualify or practice session";

/// Reader for Race07 family text results
#[derive(Debug)]
pub struct Race07Reader {
    sections: Vec<IniSection>,
    zero_based_laps: bool,
    options: ReaderOptions,
}

impl ReaderFormat for Race07Reader {
    const NAME: &'static str = "race07";

    fn can_read(data: &[u8]) -> bool {
        let text = decode_bytes(data);
        text.contains("[Header]") && text.contains("[Slot")
    }

    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
        let text = decode_bytes(data);
        Ok(Self { sections: parse_ini(&text), zero_based_laps: text.contains("Lap=(0,"), options })
    }
}

fn parse_time(raw: &str) -> Option<f64> {
    seconds_from_formatted_time(raw.trim(), false).ok().filter(|seconds| *seconds > 0.0)
}

impl Race07Reader {
    fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|section| section.name.eq_ignore_ascii_case(name))
    }

    fn read_slot(&self, session: &mut Session, slot: &IniSection) -> Result<Option<Participant>> {
        let Some(name) = slot.get_non_empty("Driver") else {
            return Ok(None);
        };
        let lap_pattern = compile(r"^\(\s*(-?\d+)\s*,\s*(-?[\d.]+)\s*,\s*([^)]*)\)$")?;

        let mut driver = Driver::new(name);
        if let Some(steam_id) = slot.get_non_empty("SteamId") {
            driver = driver.with_id(steam_id);
        }
        let mut participant = session.create_participant();
        participant.drivers.push(driver);
        participant.team = slot.get_non_empty("Team").map(str::to_string);
        participant.vehicle = Vehicle {
            name: slot.get_non_empty("Vehicle").unwrap_or_default().to_string(),
            vehicle_type: slot.get_non_empty("VehicleFile").map(str::to_string),
            ..Default::default()
        };

        for raw in slot.get_all("Lap") {
            let Some(captures) = lap_pattern.captures(raw) else { continue };
            let Ok(index) = captures[1].parse::<u32>() else { continue };
            let number = if self.zero_based_laps { index + 1 } else { index };
            let mut lap = Lap::with_time(number, parse_time(&captures[3]));
            lap.elapsed_seconds = captures[2].parse::<f64>().ok().map(|elapsed| round_to(elapsed.max(0.0), 4));
            participant.laps.push(lap);
        }

        match slot.get_non_empty("RaceTime") {
            Some(raw) if raw.eq_ignore_ascii_case("DNF") => participant.finish_status = FinishStatus::Dnf,
            Some(raw) if raw.eq_ignore_ascii_case("DQ") => participant.finish_status = FinishStatus::Dq,
            Some(raw) => participant.explicit_total_time = parse_time(raw),
            None => participant.finish_status = FinishStatus::None,
        }
        participant.finish_comment = slot.get_non_empty("Reason").filter(|reason| *reason != "0").map(str::to_string);
        Ok(Some(participant))
    }
}

impl FormatReader for Race07Reader {
    fn format_name(&self) -> &'static str {
        Self::NAME
    }

    fn options(&self) -> &ReaderOptions {
        &self.options
    }

    fn read_sessions(&self) -> Result<Vec<Session>> {
        let header = self
            .section("Header")
            .ok_or_else(|| ResultsError::cannot_read_session(Self::NAME, "missing [Header] section"))?;
        let race = self.section("Race");

        let mut session = Session::new(SessionType::Race);
        session.game = Game {
            name: header.get_non_empty("Game").map(str::to_string),
            version: header.get_non_empty("Version").map(str::to_string),
        };
        session.date = header.get_non_empty("TimeString").and_then(|raw| {
            self.options.parse_local(raw, &["%Y/%m/%d %H:%M:%S", "%Y-%m-%d %H:%M:%S"])
        });
        if let Some(race) = race {
            session.track = Track {
                venue: race.get_non_empty("Scene").and_then(|scene| {
                    scene.rsplit(['\\', '/']).next().map(|file| file.split('.').next().unwrap_or(file).to_string())
                }),
                length: race.get_non_empty("Track Length").and_then(|length| length.parse().ok()),
                ..Default::default()
            };
            session.max_laps = race.get_non_empty("RaceLaps").and_then(|laps| laps.parse().ok()).filter(|laps| *laps > 0);
            session.max_minutes =
                race.get_non_empty("RaceTime").and_then(|minutes| minutes.parse().ok()).filter(|minutes| *minutes > 0);
        }

        let slots = self.sections.iter().filter(|section| section.name.to_ascii_lowercase().starts_with("slot"));
        for slot in slots {
            if let Some(participant) = self.read_slot(&mut session, slot)? {
                session.push_participant(participant);
            }
        }
        if session.participants.is_empty() {
            return Err(ResultsError::cannot_read_session(Self::NAME, "no driver slots"));
        }

        sort_participants_by_total_time(&mut session.participants);
        if session.leader().is_some_and(|leader| leader.finish_status == FinishStatus::Dnf) {
            debug!("Race07 classified leader did not finish, reading as qualify or practice");
            session.session_type = SessionType::Qualify;
            session.name = Some(QUALIFY_OR_PRACTICE.to_string());
            for participant in &mut session.participants {
                participant.finish_status = FinishStatus::Normal;
                participant.explicit_total_time = None;
            }
        }
        sort_participants_and_fix_positions(&mut session);
        Ok(vec![session])
    }
}
