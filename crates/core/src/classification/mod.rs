//! Danger classification
//!
//! Sensor anchors watch their surroundings and report cells that started
//! burning or became dangerous since the last tick. Managing anchors collect
//! those reports and sort their candidates into testable groups.
//!
//! Anchor ids name spatial-management anchors. They share the `row:col`
//! notation with zone ids but never identify a zone.

pub mod grouping;
pub mod sensors;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core_types::{AnchorId, GridCoord};
use crate::grid::{Board, SpatialIndex};

pub use grouping::{AnchorGrouping, DangerGroups, ManagingAnchor};
pub use sensors::{locate_anchors, AnchorLayout, SensorAnalyst};

/// Cells newly reported by each sensor anchor since the previous tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationDelta {
    /// Cells that started burning
    pub newly_burned: BTreeMap<AnchorId, Vec<GridCoord>>,
    /// Cells whose fire index crossed the sensor danger threshold
    pub newly_dangerous: BTreeMap<AnchorId, Vec<GridCoord>>,
}

impl ClassificationDelta {
    /// Whether nothing changed since the previous tick
    pub fn is_empty(&self) -> bool {
        self.newly_burned.is_empty() && self.newly_dangerous.is_empty()
    }

    /// Number of cells reported across both maps
    pub fn len(&self) -> usize {
        self.newly_burned
            .values()
            .chain(self.newly_dangerous.values())
            .map(Vec::len)
            .sum()
    }
}

/// Source of per-tick classification deltas
///
/// Implementations keep whatever state they need to diff one snapshot
/// against the previous one.
pub trait DangerClassifier {
    /// Classify a refreshed snapshot
    fn classify(&mut self, board: &Board, spatial: &SpatialIndex) -> ClassificationDelta;
}
