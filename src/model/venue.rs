//! Track, game and server descriptions

use serde::Serialize;

/// Track information
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct Track {
    /// Venue (`Spa-Francorchamps`)
    pub venue: Option<String>,
    /// Course or layout (`Grand Prix`)
    pub course: Option<String>,
    /// Event name
    pub event: Option<String>,
    /// Length in meters
    pub length: Option<f64>,
}

impl Track {
    /// Venue and course joined, skipping the course when it repeats the venue.
    pub fn friendly_name(&self) -> String {
        match (self.venue.as_deref(), self.course.as_deref()) {
            (Some(venue), Some(course)) if !course.is_empty() && course != venue => {
                format!("{venue} ({course})")
            }
            (Some(venue), _) => venue.to_string(),
            (None, Some(course)) => course.to_string(),
            (None, None) => self.event.clone().unwrap_or_default(),
        }
    }
}

/// Simulator information
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct Game {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl Game {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), version: None }
    }
}

/// Server information
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct Server {
    pub name: Option<String>,
    pub motd: Option<String>,
    pub dedicated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_friendly_name() {
        let mut track = Track {
            venue: Some("Spa".to_string()),
            course: Some("GP".to_string()),
            ..Default::default()
        };
        assert_eq!(track.friendly_name(), "Spa (GP)");

        track.course = Some("Spa".to_string());
        assert_eq!(track.friendly_name(), "Spa");

        track.venue = None;
        assert_eq!(track.friendly_name(), "Spa");
    }
}
