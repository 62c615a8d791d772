//! Reader contract and the shared fix-up engine
//!
//! Every supported format implements [`FormatReader`] (object safe, used
//! behind `Box<dyn FormatReader>`) and [`ReaderFormat`] (static sniffing and
//! construction). A [`Reader`] wraps a constructed format reader and runs the
//! fix-up passes from [`fixup`] once, the first time sessions are requested.
//!
//! ```text
//! bytes -> ReaderFormat::can_read -> ReaderFormat::parse -> Reader
//!       -> FormatReader::read_sessions -> fix_sessions -> Vec<Session>
//! ```

pub mod fixup;

pub use fixup::{
    fix_finish_statuses, fix_grid_positions, fix_lap_data, fix_lap_positions,
    fix_participant_positions, fix_sessions, sort_participants_and_fix_positions,
};

use tracing::debug;

use crate::config::ReaderOptions;
use crate::model::Session;
use crate::{Result, ResultsError};

/// A constructed reader for one result file
pub trait FormatReader {
    /// Stable format name, e.g. `rfactor2`
    fn format_name(&self) -> &'static str;

    /// Options this reader was constructed with
    fn options(&self) -> &ReaderOptions;

    /// Extract raw sessions in file order
    ///
    /// Only format specific repairs happen here; the shared passes run
    /// afterwards in [`Reader::sessions`].
    fn read_sessions(&self) -> Result<Vec<Session>>;
}

/// Static side of a format: sniffing and construction
pub trait ReaderFormat: FormatReader + Sized + 'static {
    const NAME: &'static str;

    /// Whether `data` looks like this format. Never fails; malformed input is `false`.
    fn can_read(data: &[u8]) -> bool;

    /// Build the reader from data already accepted by [`ReaderFormat::can_read`].
    fn parse(data: &[u8], options: ReaderOptions) -> Result<Self>;

    /// Options used by [`ReaderFormat::from_bytes`]
    fn default_options() -> ReaderOptions {
        ReaderOptions::default()
    }

    fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, Self::default_options())
    }

    /// Construct with explicit options; rejects data this format cannot read.
    fn from_bytes_with_options(data: &[u8], options: ReaderOptions) -> Result<Self> {
        if !Self::can_read(data) {
            return Err(ResultsError::cannot_read_data(Self::NAME, "data is not in this format"));
        }
        Self::parse(data, options)
    }
}

/// Reader in one of two states: constructed, or sessions read and fixed
pub struct Reader {
    inner: Box<dyn FormatReader>,
    sessions: Option<Vec<Session>>,
}

impl std::fmt::Debug for Reader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reader")
            .field("format", &self.inner.format_name())
            .field("sessions_read", &self.sessions.is_some())
            .finish()
    }
}

impl Reader {
    pub fn new(inner: Box<dyn FormatReader>) -> Self {
        Self { inner, sessions: None }
    }

    pub fn from_format<F: ReaderFormat>(format: F) -> Self {
        Self::new(Box::new(format))
    }

    pub fn format_name(&self) -> &'static str {
        self.inner.format_name()
    }

    fn load(&self) -> Result<Vec<Session>> {
        let mut sessions = self.inner.read_sessions()?;
        if sessions.is_empty() {
            return Err(ResultsError::cannot_read_session(
                self.inner.format_name(),
                "no sessions found",
            ));
        }
        fix_sessions(&mut sessions, self.inner.options());
        debug!(format = self.inner.format_name(), sessions = sessions.len(), "Sessions read");
        Ok(sessions)
    }

    /// All sessions in file order, read and fixed on first call
    pub fn sessions(&mut self) -> Result<&[Session]> {
        let sessions = match self.sessions.take() {
            Some(sessions) => sessions,
            None => self.load()?,
        };
        Ok(self.sessions.insert(sessions).as_slice())
    }

    /// Session by 1-based number
    pub fn session(&mut self, number: usize) -> Result<&Session> {
        let sessions = self.sessions()?;
        let available = sessions.len();
        number
            .checked_sub(1)
            .and_then(|index| sessions.get(index))
            .ok_or(ResultsError::NoSession { index: number, available })
    }

    /// Consume the reader and return its sessions.
    pub fn into_sessions(mut self) -> Result<Vec<Session>> {
        match self.sessions.take() {
            Some(sessions) => Ok(sessions),
            None => self.load(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Driver, Lap, SessionType};
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct StubReader {
        options: ReaderOptions,
        sessions: Vec<Session>,
        reads: Rc<Cell<usize>>,
    }

    impl FormatReader for StubReader {
        fn format_name(&self) -> &'static str {
            Self::NAME
        }

        fn options(&self) -> &ReaderOptions {
            &self.options
        }

        fn read_sessions(&self) -> Result<Vec<Session>> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.sessions.clone())
        }
    }

    impl ReaderFormat for StubReader {
        const NAME: &'static str = "stub";

        fn can_read(data: &[u8]) -> bool {
            data.starts_with(b"STUB")
        }

        fn parse(data: &[u8], options: ReaderOptions) -> Result<Self> {
            let mut sessions = Vec::new();
            for token in String::from_utf8_lossy(&data[4..]).split_whitespace() {
                let mut session = Session::new(crate::helper::detect_session(token, None).0);
                let mut participant = session.create_participant();
                participant.drivers.push(Driver::new("Solo"));
                participant.laps.push(Lap { time: Some(90.0), ..Default::default() });
                session.push_participant(participant);
                sessions.push(session);
            }
            Ok(Self { options, sessions, reads: Rc::default() })
        }
    }

    #[test]
    fn construction_rejects_foreign_data() {
        let error = StubReader::from_bytes(b"<xml/>").unwrap_err();
        assert!(matches!(error, ResultsError::CannotReadData { format: "stub", .. }));
    }

    #[test]
    fn sessions_are_fixed_once_and_indexed_from_one() -> anyhow::Result<()> {
        let mut reader = Reader::from_format(StubReader::from_bytes(b"STUB Q R")?);
        assert_eq!(reader.format_name(), "stub");

        let sessions = reader.sessions()?;
        assert_eq!(sessions.len(), 2);
        let race = &sessions[1];
        assert_eq!(race.session_type, SessionType::Race);
        assert_eq!(race.participants[0].position, Some(1));
        assert_eq!(race.participants[0].grid_position, Some(1));
        assert_eq!(race.participants[0].laps[0].number, Some(1));

        assert_eq!(reader.session(1)?.session_type, SessionType::Qualify);
        assert!(matches!(reader.session(0), Err(ResultsError::NoSession { index: 0, available: 2 })));
        assert!(matches!(reader.session(3), Err(ResultsError::NoSession { index: 3, available: 2 })));
        Ok(())
    }

    #[test]
    fn empty_result_is_a_session_error() -> anyhow::Result<()> {
        let mut reader = Reader::from_format(StubReader::from_bytes(b"STUB")?);
        assert!(matches!(reader.sessions(), Err(ResultsError::CannotReadSession { .. })));
        Ok(())
    }

    #[test]
    fn read_sessions_runs_once() -> anyhow::Result<()> {
        let stub = StubReader::from_bytes(b"STUB R")?;
        let reads = Rc::clone(&stub.reads);
        let mut reader = Reader::new(Box::new(stub));
        reader.sessions()?;
        reader.sessions()?;
        reader.session(1)?;
        let sessions = reader.into_sessions()?;
        assert_eq!(sessions.len(), 1);
        assert_eq!(reads.get(), 1);
        Ok(())
    }
}
