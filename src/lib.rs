//! Normalizes racing simulator result logs into one session model.
//!
//! Every simulator writes its own result format. racelog sniffs the format,
//! parses it into [`Session`]s with [`Participant`]s and [`Lap`]s, then
//! repairs what the games get wrong: missing grid positions, corrupted
//! position data, missing finish statuses, lap positions and elapsed times.
//!
//! # Supported formats
//!
//! - rFactor / rFactor 2 XML (also Automobilista, GSC, Stock Car Extreme)
//! - Assetto Corsa offline JSON, acServer JSON and acServer text logs
//! - Assetto Corsa Competizione server and client JSON
//! - Project CARS dedicated server stats
//! - RaceRoom dedicated server JSON
//! - Race07 / GTR / GTR2 / F1 Challenge text results
//! - iRacing results JSON
//! - Second Monitor JSON
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use racelog::ResultsReader;
//!
//! # fn main() -> racelog::Result<()> {
//! let mut reader = ResultsReader::open("2024_03_02_race.xml")?;
//! let race = reader.session(1)?;
//! for participant in &race.participants {
//!     println!(
//!         "{:>2}. {} ({} laps)",
//!         participant.position.unwrap_or(0),
//!         participant.driver_name(),
//!         participant.number_of_completed_laps(),
//!     );
//! }
//! # Ok(())
//! # }
//! ```
//!
//! A concrete format can be used directly when the input is known:
//!
//! ```rust,no_run
//! use racelog::formats::Race07Reader;
//! use racelog::reader::{Reader, ReaderFormat};
//!
//! # fn main() -> racelog::Result<()> {
//! let data = std::fs::read("Race.txt")?;
//! let mut reader = Reader::from_format(Race07Reader::from_bytes(&data)?);
//! println!("{} sessions", reader.sessions()?.len());
//! # Ok(())
//! # }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod model;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;

// Shared parsing helpers
pub mod helper;
pub mod text;

// Reader contract, fix-ups and dispatch
pub mod formats;
pub mod reader;
pub mod registry;

// Core exports
pub use error::*;
pub use model::*;

// Main API exports
pub use config::{ReaderOptions, default_timezone, set_default_timezone};
pub use reader::{FormatReader, Reader, ReaderFormat};
pub use registry::{ResultsReader, detect_format};
