//! Driver and vehicle records

use serde::Serialize;

/// A driver of a participant
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Driver {
    /// Display name as written by the simulator
    pub name: String,
    /// Human or AI controlled
    pub is_human: bool,
    /// Stable identifier when the log has one (Steam GUID, customer id)
    pub driver_id: Option<String>,
}

impl Default for Driver {
    fn default() -> Self {
        Self { name: String::new(), is_human: true, driver_id: None }
    }
}

impl Driver {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Builder-style stable id
    pub fn with_id(mut self, driver_id: impl Into<String>) -> Self {
        let driver_id = driver_id.into();
        if !driver_id.is_empty() {
            self.driver_id = Some(driver_id);
        }
        self
    }

    /// Short name: `"Dirk Pitt"` becomes `"D. Pitt"`
    pub fn short_name(&self) -> String {
        let mut parts = self.name.split_whitespace();
        match (parts.next(), parts.next_back()) {
            (Some(first), Some(last)) => match first.chars().next() {
                Some(initial) => format!("{initial}. {last}"),
                None => self.name.clone(),
            },
            _ => self.name.clone(),
        }
    }
}

/// A vehicle entry
#[derive(Default, Debug, Clone, Serialize, PartialEq)]
pub struct Vehicle {
    /// Vehicle name (model)
    pub name: String,
    /// Vehicle file or type identifier
    pub vehicle_type: Option<String>,
    /// Class (GT3, GT4, ...)
    pub class: Option<String>,
    /// Cup category (Pro, Pro-Am, ...)
    pub cup: Option<String>,
    /// Race number
    pub number: Option<String>,
    /// Ballast in kg
    pub ballast: Option<f64>,
    /// Restrictor percentage
    pub restrictor: Option<f64>,
    /// Livery/skin
    pub skin: Option<String>,
}

impl Vehicle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Name including the class when known: `"BMW M6 GT3 (GT3)"`
    pub fn friendly_name(&self) -> String {
        match &self.class {
            Some(class) if !class.is_empty() && !self.name.contains(class.as_str()) => {
                format!("{} ({})", self.name, class)
            }
            _ => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_uses_initial_and_last_name() {
        assert_eq!(Driver::new("Dirk Pitt").short_name(), "D. Pitt");
        assert_eq!(Driver::new("Mauricio van der Berg").short_name(), "M. Berg");
        assert_eq!(Driver::new("Solo").short_name(), "Solo");
    }

    #[test]
    fn empty_ids_are_ignored() {
        assert_eq!(Driver::new("x").with_id("").driver_id, None);
        assert_eq!(Driver::new("x").with_id("7656").driver_id.as_deref(), Some("7656"));
    }

    #[test]
    fn friendly_name_adds_class_once() {
        let mut vehicle = Vehicle::new("BMW M6");
        vehicle.class = Some("GT3".to_string());
        assert_eq!(vehicle.friendly_name(), "BMW M6 (GT3)");

        vehicle.name = "BMW M6 GT3".to_string();
        assert_eq!(vehicle.friendly_name(), "BMW M6 GT3");
    }
}
