//! Service configuration
//!
//! Board dimensions, window sizes, the hysteresis stability window and the
//! fixed agent pool capacities. Owned by the caller and validated once when
//! the orchestrator is built.

use serde::{Deserialize, Serialize};

use crate::error::ResponseError;

/// Fire index thresholds used by sensor classification and anchor grouping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationThresholds {
    /// A sensor reports a cell as dangerous above this index
    pub sensor_danger: f64,
    /// A candidate is dangerous on its own above this index
    pub dangerous: f64,
    /// Lower bound (exclusive) for dangerous-by-neighbours candidates
    pub neighbour_danger: f64,
    /// Dangerous-by-neighbours needs more than this many candidate neighbours
    pub neighbour_count: usize,
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            sensor_danger: 16.0,
            dangerous: 40.0,
            neighbour_danger: 22.0,
            neighbour_count: 2,
        }
    }
}

/// Configuration of the measurement and response service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    /// Board width in cells
    pub board_width: u32,
    /// Board height in cells
    pub board_height: u32,
    /// Wide window used for sensor surroundings and visibility
    pub surroundings_window: u32,
    /// Narrow window used for burning adjacency
    pub testing_window: u32,
    /// Snapshots required before a zone's need flag is re-evaluated
    pub stability_window: usize,
    /// Firefighter pool capacity
    pub firefighters: usize,
    /// Controller pool capacity
    pub controllers: usize,
    /// Classification thresholds
    pub classification: ClassificationThresholds,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            board_width: 30,
            board_height: 30,
            surroundings_window: 5,
            testing_window: 3,
            stability_window: 4,
            firefighters: 60,
            controllers: 5,
            classification: ClassificationThresholds::default(),
        }
    }
}

impl ResponseConfig {
    /// Default configuration for a board of the given size
    pub fn with_board(width: u32, height: u32) -> Self {
        Self {
            board_width: width,
            board_height: height,
            ..Self::default()
        }
    }

    /// Check every value is in its valid range
    ///
    /// # Errors
    /// Returns [`ResponseError::InvalidConfig`] naming the first offending value.
    pub fn validate(&self) -> Result<(), ResponseError> {
        if self.board_width == 0 || self.board_height == 0 {
            return Err(ResponseError::InvalidConfig(format!(
                "board must have at least one cell, got {}x{}",
                self.board_width, self.board_height
            )));
        }
        if self.surroundings_window == 0 {
            return Err(ResponseError::InvalidConfig(
                "surroundings_window must be positive".to_string(),
            ));
        }
        if self.testing_window == 0 {
            return Err(ResponseError::InvalidConfig(
                "testing_window must be positive".to_string(),
            ));
        }
        if self.stability_window == 0 {
            return Err(ResponseError::InvalidConfig(
                "stability_window must be positive".to_string(),
            ));
        }
        let t = &self.classification;
        if t.neighbour_danger >= t.dangerous {
            return Err(ResponseError::InvalidConfig(format!(
                "neighbour_danger ({}) must be below dangerous ({})",
                t.neighbour_danger, t.dangerous
            )));
        }
        Ok(())
    }
}
