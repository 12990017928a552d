//! Per-cell state of a board snapshot
//!
//! Fire tier, fire speed and destruction are written by the external physics
//! step. The response pipeline only ever writes `being_extinguished` (plus the
//! sensor/testable markers during classification).

use serde::{Deserialize, Serialize};

/// Terrain kind of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Terrain {
    /// Dense forest
    #[default]
    Forest,
    /// Open grass or scrub
    Grassland,
    /// Bare sand, never ignites
    Sand,
    /// Open water, never ignites
    Water,
}

impl Terrain {
    /// Whether fire can exist on this terrain
    pub fn is_flammable(self) -> bool {
        !matches!(self, Terrain::Sand | Terrain::Water)
    }
}

/// Fire intensity tier of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FireTier {
    /// No fire
    #[default]
    None,
    /// Smouldering or low intensity
    Low,
    /// Medium intensity
    Medium,
    /// High intensity
    High,
    /// Extreme intensity
    Extreme,
    /// Fuel fully consumed
    Destroyed,
}

impl FireTier {
    /// Classify a fire speed into a tier
    ///
    /// Thresholds: 0 → `None`, ≤1.25 → `Low`, ≤2.5 → `Medium`, ≤5.0 → `High`,
    /// anything faster → `Extreme`.
    pub fn from_fire_speed(speed: f64) -> Self {
        if speed <= 0.0 {
            FireTier::None
        } else if speed <= 1.25 {
            FireTier::Low
        } else if speed <= 2.5 {
            FireTier::Medium
        } else if speed <= 5.0 {
            FireTier::High
        } else {
            FireTier::Extreme
        }
    }

    /// Firefighters a single cell of this tier needs
    pub fn firefighter_demand(self) -> u32 {
        match self {
            FireTier::None | FireTier::Destroyed => 0,
            FireTier::Low => 1,
            FireTier::Medium => 2,
            FireTier::High => 3,
            FireTier::Extreme => 4,
        }
    }

    /// Percentage of the cell assumed destroyed on entering this tier
    pub fn baseline_destruction(self) -> f64 {
        match self {
            FireTier::None => 0.0,
            FireTier::Low => 1.0,
            FireTier::Medium => 26.0,
            FireTier::High => 51.0,
            FireTier::Extreme => 76.0,
            FireTier::Destroyed => 100.0,
        }
    }

    /// Whether the tier describes an active fire
    pub fn is_active(self) -> bool {
        !matches!(self, FireTier::None | FireTier::Destroyed)
    }
}

/// Fire danger rating derived from the fire index value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FireDangerRating {
    /// Index exactly zero
    None,
    /// Below 5
    Low,
    /// Below 12
    Moderate,
    /// Below 25
    High,
    /// Below 50
    VeryHigh,
    /// 50 and above
    Extreme,
}

impl FireDangerRating {
    /// Rate a fire index value
    pub fn from_index(value: f64) -> Self {
        if value == 0.0 {
            FireDangerRating::None
        } else if value < 5.0 {
            FireDangerRating::Low
        } else if value < 12.0 {
            FireDangerRating::Moderate
        } else if value < 25.0 {
            FireDangerRating::High
        } else if value < 50.0 {
            FireDangerRating::VeryHigh
        } else {
            FireDangerRating::Extreme
        }
    }
}

/// Sensor and testing markers placed on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AgentMarkers {
    /// Inside at least one sensor's observation window
    pub visible: bool,
    /// Selected for closer testing by the anchor grouping
    pub testable: bool,
    /// Hosts a managing anchor
    pub center: bool,
    /// Hosts a sensor
    pub has_sensor: bool,
}

/// One cell of a board snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cell {
    /// Terrain kind
    pub terrain: Terrain,
    /// Current fire intensity tier
    pub fire_tier: FireTier,
    /// Fire spread speed (≥ 0)
    pub fire_speed: f64,
    /// Percentage of the cell destroyed (0-100)
    pub percent_destroyed: f64,
    /// Forest fire danger index value
    pub fire_index: f64,
    /// Currently on fire
    pub being_burned: bool,
    /// Firefighters are working this cell
    pub being_extinguished: bool,
    /// Sensor and testing markers
    pub markers: AgentMarkers,
}

impl Cell {
    /// Create an unburnt cell of the given terrain
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            ..Self::default()
        }
    }

    /// Set the cell on fire at the given speed
    ///
    /// The tier is derived from the speed. Sand and water ignore ignition.
    pub fn ignite(&mut self, fire_speed: f64) {
        if !self.terrain.is_flammable() {
            return;
        }
        let tier = FireTier::from_fire_speed(fire_speed);
        self.fire_tier = tier;
        self.fire_speed = fire_speed.max(0.0);
        self.percent_destroyed = tier.baseline_destruction();
        self.being_burned = tier.is_active();
    }

    /// Whether the cell takes part in zone adjacency
    pub fn is_burning_or_extinguishing(&self) -> bool {
        self.being_burned || self.being_extinguished
    }

    /// Danger rating of this cell's fire index
    pub fn danger_rating(&self) -> FireDangerRating {
        FireDangerRating::from_index(self.fire_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_from_fire_speed() {
        assert_eq!(FireTier::from_fire_speed(0.0), FireTier::None);
        assert_eq!(FireTier::from_fire_speed(0.51), FireTier::Low);
        assert_eq!(FireTier::from_fire_speed(1.25), FireTier::Low);
        assert_eq!(FireTier::from_fire_speed(1.6), FireTier::Medium);
        assert_eq!(FireTier::from_fire_speed(2.51), FireTier::High);
        assert_eq!(FireTier::from_fire_speed(5.0), FireTier::High);
        assert_eq!(FireTier::from_fire_speed(5.6), FireTier::Extreme);
    }

    #[test]
    fn test_firefighter_demand() {
        let demand: u32 = [
            FireTier::None,
            FireTier::Low,
            FireTier::Medium,
            FireTier::High,
            FireTier::Extreme,
            FireTier::Destroyed,
        ]
        .into_iter()
        .map(FireTier::firefighter_demand)
        .sum();
        assert_eq!(demand, 10);
    }

    #[test]
    fn test_ignite_respects_terrain() {
        let mut forest = Cell::new(Terrain::Forest);
        forest.ignite(5.6);
        assert!(forest.being_burned);
        assert_eq!(forest.fire_tier, FireTier::Extreme);
        assert_eq!(forest.percent_destroyed, 76.0);

        let mut water = Cell::new(Terrain::Water);
        water.ignite(5.6);
        assert!(!water.being_burned);
        assert_eq!(water.fire_tier, FireTier::None);
    }

    #[test]
    fn test_danger_rating_bands() {
        assert_eq!(FireDangerRating::from_index(0.0), FireDangerRating::None);
        assert_eq!(FireDangerRating::from_index(4.9), FireDangerRating::Low);
        assert_eq!(FireDangerRating::from_index(11.0), FireDangerRating::Moderate);
        assert_eq!(FireDangerRating::from_index(24.0), FireDangerRating::High);
        assert_eq!(FireDangerRating::from_index(49.0), FireDangerRating::VeryHigh);
        assert_eq!(FireDangerRating::from_index(50.0), FireDangerRating::Extreme);
    }
}
