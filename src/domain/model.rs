use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One status line in a shipment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    datetime: NaiveDateTime,
    location: String,
    description: String,
}

impl Location {
    pub fn new(
        datetime: NaiveDateTime,
        location: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            datetime,
            location: location.into(),
            description: description.into(),
        }
    }

    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Normalized tracking result produced by every courier adapter.
///
/// A package that was not found (or whose courier could not be reached) has
/// `found == false`, no locations and `delivered == false`. Locations are kept
/// in the order the courier sent them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub courier_name: String,
    found: bool,
    delivered: bool,
    locations: Vec<Location>,
}

impl Package {
    pub fn new(courier_name: impl Into<String>) -> Self {
        Self {
            courier_name: courier_name.into(),
            found: false,
            delivered: false,
            locations: Vec::new(),
        }
    }

    pub fn found(&self) -> bool {
        self.found
    }

    pub fn delivered(&self) -> bool {
        self.delivered
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn last_location(&self) -> Option<&Location> {
        self.locations.last()
    }

    pub fn mark_found(&mut self) {
        self.found = true;
    }

    /// 只有已找到的包裹才接受狀態紀錄
    pub fn push_location(&mut self, location: Location) {
        if self.found {
            self.locations.push(location);
        }
    }

    pub fn set_delivered(&mut self, delivered: bool) {
        self.delivered = self.found && delivered;
    }

    /// 以最後一筆狀態描述比對各家的「已送達」字樣
    pub fn mark_delivered_by_marker(&mut self, marker: &str) {
        let delivered = self
            .last_location()
            .map(|last| last.description().trim() == marker)
            .unwrap_or(false);
        self.set_delivered(delivered);
    }
}
