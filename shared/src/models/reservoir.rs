//! Reservoir models

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::Coordinates;

/// Level (percent) at or above which a reservoir is in good shape
pub const GOOD_LEVEL_THRESHOLD: f64 = 70.0;

/// Level (percent) at or above which a reservoir is only a warning
pub const WARNING_LEVEL_THRESHOLD: f64 = 40.0;

/// Percentage points drawn per day when estimating the runout date
pub const RUNOUT_DAILY_CONSUMPTION: f64 = 0.5;

/// A monitored water reservoir
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reservoir {
    pub id: u64,
    pub name: String,
    pub location: String,
    /// Percent of the design maximum the reservoir can hold
    pub capacity: f64,
    /// Current fill level in percent. Not checked against `capacity`.
    pub current_level: f64,
    pub last_updated: NaiveDate,
    pub coordinates: Coordinates,
    pub estimated_runout: NaiveDate,
    pub status: ReservoirStatus,
}

impl Reservoir {
    /// Re-derive status and runout after the level changed
    pub fn refresh_derived(&mut self, today: NaiveDate) {
        self.status = ReservoirStatus::from_level(self.current_level);
        self.estimated_runout = estimate_runout(self.current_level, today);
    }
}

/// Coarse reservoir condition, always derived from the current level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReservoirStatus {
    Good,
    Warning,
    Critical,
}

impl ReservoirStatus {
    pub fn from_level(current_level: f64) -> Self {
        if current_level >= GOOD_LEVEL_THRESHOLD {
            ReservoirStatus::Good
        } else if current_level >= WARNING_LEVEL_THRESHOLD {
            ReservoirStatus::Warning
        } else {
            ReservoirStatus::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReservoirStatus::Good => "good",
            ReservoirStatus::Warning => "warning",
            ReservoirStatus::Critical => "critical",
        }
    }
}

impl std::fmt::Display for ReservoirStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReservoirStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(ReservoirStatus::Good),
            "warning" => Ok(ReservoirStatus::Warning),
            "critical" => Ok(ReservoirStatus::Critical),
            _ => Err(()),
        }
    }
}

/// Date the reservoir runs dry at a constant draw of
/// [`RUNOUT_DAILY_CONSUMPTION`] points per day
pub fn estimate_runout(current_level: f64, today: NaiveDate) -> NaiveDate {
    let days_remaining = (current_level / RUNOUT_DAILY_CONSUMPTION).floor().max(0.0) as u64;
    today
        .checked_add_days(Days::new(days_remaining))
        .unwrap_or(NaiveDate::MAX)
}

/// Input for registering a reservoir
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservoirInput {
    pub name: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<f64>,
    pub current_level: Option<f64>,
    pub coordinates: Option<Coordinates>,
}

/// A validated reservoir registration
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservoir {
    pub name: String,
    pub location: String,
    pub capacity: f64,
    pub current_level: f64,
    pub coordinates: Coordinates,
}

impl NewReservoir {
    pub fn into_reservoir(self, id: u64, today: NaiveDate) -> Reservoir {
        Reservoir {
            id,
            name: self.name,
            location: self.location,
            capacity: self.capacity,
            current_level: self.current_level,
            last_updated: today,
            coordinates: self.coordinates,
            estimated_runout: estimate_runout(self.current_level, today),
            status: ReservoirStatus::from_level(self.current_level),
        }
    }
}

/// Partial reservoir update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservoirInput {
    pub name: Option<String>,
    pub location: Option<String>,
    pub capacity: Option<f64>,
    pub current_level: Option<f64>,
    pub coordinates: Option<Coordinates>,
}

impl UpdateReservoirInput {
    /// Apply the present fields to `reservoir`. Empty text and a zero
    /// capacity count as absent. Status and runout are re-derived only when
    /// the level is supplied.
    pub fn apply(self, reservoir: &mut Reservoir, today: NaiveDate) {
        if let Some(name) = self.name.filter(|n| !n.is_empty()) {
            reservoir.name = name;
        }
        if let Some(location) = self.location.filter(|l| !l.is_empty()) {
            reservoir.location = location;
        }
        if let Some(capacity) = self.capacity.filter(|c| *c != 0.0) {
            reservoir.capacity = capacity;
        }
        if let Some(coordinates) = self.coordinates {
            reservoir.coordinates = coordinates;
        }
        if let Some(current_level) = self.current_level {
            reservoir.current_level = current_level;
            reservoir.refresh_derived(today);
        }
        reservoir.last_updated = today;
    }
}

/// Query filters for listing reservoirs
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirFilter {
    pub location: Option<String>,
    pub status: Option<String>,
    pub min_level: Option<f64>,
}

impl ReservoirFilter {
    pub fn matches(&self, reservoir: &Reservoir) -> bool {
        if let Some(location) = &self.location {
            if !reservoir
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if status.parse::<ReservoirStatus>() != Ok(reservoir.status) {
                return false;
            }
        }
        if let Some(min_level) = self.min_level {
            if reservoir.current_level < min_level {
                return false;
            }
        }
        true
    }
}
