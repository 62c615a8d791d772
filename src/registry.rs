//! Format dispatch
//!
//! Formats are tried in a fixed order. Some sniffers are deliberately loose
//! (Race07 only looks for `[Header]` and `[Slot`) so they come after the
//! stricter ones.

use std::path::Path;

use chrono_tz::Tz;
use tracing::debug;

use crate::config::ReaderOptions;
use crate::formats::{
    AccReader, AssettoCorsaReader, AssettoCorsaServerJsonReader, AssettoCorsaServerReader,
    IracingReader, ProjectCarsReader, Race07Reader, RaceRoomReader, RfactorReader,
    SecondMonitorReader,
};
use crate::reader::{FormatReader, Reader, ReaderFormat};
use crate::{Result, ResultsError};

type Construct = fn(&[u8], Option<Tz>) -> Result<Box<dyn FormatReader>>;

/// One entry of the dispatch table
#[derive(Clone, Copy)]
pub struct RegisteredFormat {
    pub name: &'static str,
    pub can_read: fn(&[u8]) -> bool,
    construct: Construct,
}

impl std::fmt::Debug for RegisteredFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredFormat").field("name", &self.name).finish()
    }
}

fn construct_boxed<F: ReaderFormat>(data: &[u8], timezone: Option<Tz>) -> Result<Box<dyn FormatReader>> {
    let mut options: ReaderOptions = F::default_options();
    if timezone.is_some() {
        options.timezone = timezone;
    }
    Ok(Box::new(F::parse(data, options)?))
}

const fn entry<F: ReaderFormat>() -> RegisteredFormat {
    RegisteredFormat { name: F::NAME, can_read: F::can_read, construct: construct_boxed::<F> }
}

static FORMATS: [RegisteredFormat; 10] = [
    entry::<RfactorReader>(),
    entry::<AssettoCorsaServerReader>(),
    entry::<AssettoCorsaServerJsonReader>(),
    entry::<AssettoCorsaReader>(),
    entry::<AccReader>(),
    entry::<ProjectCarsReader>(),
    entry::<RaceRoomReader>(),
    entry::<IracingReader>(),
    entry::<SecondMonitorReader>(),
    entry::<Race07Reader>(),
];

/// All supported formats in dispatch order
pub fn formats() -> &'static [RegisteredFormat] {
    &FORMATS
}

fn select(data: &[u8]) -> Option<&'static RegisteredFormat> {
    FORMATS.iter().find(|format| (format.can_read)(data))
}

/// Name of the first format that accepts `data`
pub fn detect_format(data: &[u8]) -> Option<&'static str> {
    select(data).map(|format| format.name)
}

/// Factory choosing the reader for a result file
///
/// ```rust,no_run
/// use racelog::ResultsReader;
///
/// # fn main() -> racelog::Result<()> {
/// let mut reader = ResultsReader::open("results/2024_03_02_race.xml")?;
/// for session in reader.sessions()? {
///     println!("{} with {} participants", session.display_name(), session.participants.len());
/// }
/// # Ok(())
/// # }
/// ```
pub struct ResultsReader;

impl ResultsReader {
    /// Pick the first format accepting `data` and construct its reader.
    ///
    /// # Errors
    ///
    /// [`ResultsError::NoData`] for empty input, [`ResultsError::CannotFindReader`]
    /// when no format accepts it.
    pub fn from_bytes(data: &[u8]) -> Result<Reader> {
        Self::build(data, None)
    }

    /// Like [`ResultsReader::from_bytes`] with dates without offset read in `timezone`
    pub fn from_bytes_in_timezone(data: &[u8], timezone: Tz) -> Result<Reader> {
        Self::build(data, Some(timezone))
    }

    pub fn from_text(text: &str) -> Result<Reader> {
        Self::from_bytes(text.as_bytes())
    }

    /// Read a result file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Reader> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| ResultsError::file_error(path.to_path_buf(), e))?;
        Self::from_bytes(&data)
    }

    fn build(data: &[u8], timezone: Option<Tz>) -> Result<Reader> {
        if data.iter().all(u8::is_ascii_whitespace) {
            return Err(ResultsError::NoData);
        }
        let format = select(data).ok_or(ResultsError::CannotFindReader)?;
        debug!(format = format.name, bytes = data.len(), "Selected result reader");
        Ok(Reader::new((format.construct)(data, timezone)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_order_ends_with_loosest_sniffer() {
        let names: Vec<&str> = formats().iter().map(|format| format.name).collect();
        assert_eq!(names.first(), Some(&"rfactor2"));
        assert_eq!(names.last(), Some(&"race07"));
        assert_eq!(names.len(), 10);
    }

    #[test]
    fn empty_input_is_no_data() {
        assert!(matches!(ResultsReader::from_bytes(b""), Err(ResultsError::NoData)));
        assert!(matches!(ResultsReader::from_text("  \n\t"), Err(ResultsError::NoData)));
    }

    #[test]
    fn unknown_input_finds_no_reader() {
        assert!(matches!(ResultsReader::from_text("lorem ipsum"), Err(ResultsError::CannotFindReader)));
        assert!(matches!(ResultsReader::from_text(r#"{"hello": 1}"#), Err(ResultsError::CannotFindReader)));
        assert_eq!(detect_format(b"lorem ipsum"), None);
    }

    #[test]
    fn detects_formats_by_content() {
        assert_eq!(detect_format(b"[Header]\nGame=GTR2\n[Slot000]\nDriver=A\n"), Some("race07"));
        assert_eq!(
            detect_format(br#"{"Server": "x", "Experience": "y", "Sessions": []}"#),
            Some("raceroom")
        );
    }

    #[test]
    fn missing_file_is_file_error() {
        let result = ResultsReader::open("test-data/__missing_result_file.xml");
        assert!(matches!(result, Err(ResultsError::File { .. })));
    }

    #[test]
    fn timezone_reaches_reader_options() -> anyhow::Result<()> {
        let text = "[Header]\nGame=GTR2\nTimeString=2013/09/14 12:55:27\n[Slot000]\nDriver=A\nRaceTime=0:01:00.000\n";
        let mut reader = ResultsReader::from_bytes_in_timezone(text.as_bytes(), chrono_tz::Europe::Amsterdam)?;
        let date = reader.session(1)?.date.map(|date| date.to_rfc3339());
        assert_eq!(date.as_deref(), Some("2013-09-14T12:55:27+02:00"));
        Ok(())
    }
}
