//! Sensor placement and the default classifier

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use crate::classification::{ClassificationDelta, DangerClassifier};
use crate::core_types::{AnchorId, GridCoord};
use crate::error::ResponseError;
use crate::grid::{Board, SpatialIndex};

/// Anchors found on a board
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnchorLayout {
    /// Cells hosting a sensor
    pub sensors: Vec<AnchorId>,
    /// Cells hosting a managing anchor
    pub managing: Vec<AnchorId>,
}

/// Find sensor and managing anchors and mark what the sensors can see
///
/// Every cell in a sensor's surroundings window becomes visible. Cells in
/// the testing window of a visible cell become testable when their fire index
/// exceeds `testable_index`.
///
/// # Errors
/// Returns [`ResponseError::DimensionMismatch`] if the board does not match
/// the spatial index.
pub fn locate_anchors(
    board: &mut Board,
    spatial: &SpatialIndex,
    testable_index: f64,
) -> Result<AnchorLayout, ResponseError> {
    spatial.check_dimensions(board)?;
    let coords = spatial.coords();
    let mut layout = AnchorLayout::default();
    let mut visible = FxHashSet::default();

    for index in 0..coords.len() {
        let Some(cell) = board.cell(index) else {
            continue;
        };
        let markers = cell.markers;
        if markers.has_sensor {
            layout.sensors.push(AnchorId(coords.coord(index)));
            visible.extend(spatial.surroundings(index));
        }
        if markers.center {
            layout.managing.push(AnchorId(coords.coord(index)));
        }
    }

    let mut testable = FxHashSet::default();
    for &index in &visible {
        for near in spatial.testing(index) {
            if board.cell(near).is_some_and(|c| c.fire_index > testable_index) {
                testable.insert(near);
            }
        }
    }
    for &index in &visible {
        if let Some(cell) = board.cell_mut(index) {
            cell.markers.visible = true;
        }
    }
    for &index in &testable {
        if let Some(cell) = board.cell_mut(index) {
            cell.markers.testable = true;
        }
    }

    info!(
        "Located {} sensors and {} managing anchors, {} cells visible, {} testable",
        layout.sensors.len(),
        layout.managing.len(),
        visible.len(),
        testable.len()
    );
    Ok(layout)
}

/// Default classifier: every sensor observes its surroundings window
///
/// Cells above the sensor danger threshold are dangerous and burning cells
/// are burning. Each call reports only cells that were not reported by the
/// previous call, then remembers the current observation.
#[derive(Debug, Clone)]
pub struct SensorAnalyst {
    sensors: Vec<AnchorId>,
    danger_threshold: f64,
    previous_burning: FxHashSet<usize>,
    previous_dangerous: FxHashSet<usize>,
}

impl SensorAnalyst {
    /// Create an analyst over the given sensor anchors
    pub fn new(sensors: Vec<AnchorId>, danger_threshold: f64) -> Self {
        Self {
            sensors,
            danger_threshold,
            previous_burning: FxHashSet::default(),
            previous_dangerous: FxHashSet::default(),
        }
    }

    /// Sensor anchors being observed
    pub fn sensors(&self) -> &[AnchorId] {
        &self.sensors
    }

    fn diff(
        observed: &BTreeMap<AnchorId, Vec<usize>>,
        previous: &FxHashSet<usize>,
        spatial: &SpatialIndex,
    ) -> BTreeMap<AnchorId, Vec<GridCoord>> {
        let coords = spatial.coords();
        observed
            .iter()
            .filter_map(|(&anchor, cells)| {
                let fresh: Vec<GridCoord> = cells
                    .iter()
                    .filter(|&&i| !previous.contains(&i))
                    .map(|&i| coords.coord(i))
                    .collect();
                (!fresh.is_empty()).then_some((anchor, fresh))
            })
            .collect()
    }
}

impl DangerClassifier for SensorAnalyst {
    fn classify(&mut self, board: &Board, spatial: &SpatialIndex) -> ClassificationDelta {
        let coords = spatial.coords();
        let mut burning: BTreeMap<AnchorId, Vec<usize>> = BTreeMap::new();
        let mut dangerous: BTreeMap<AnchorId, Vec<usize>> = BTreeMap::new();

        for &sensor in &self.sensors {
            let Some(center) = coords.index(sensor.cell()) else {
                warn!("Sensor {} lies outside the board, skipped", sensor);
                continue;
            };
            for index in spatial.surroundings(center) {
                let Some(cell) = board.cell(index) else {
                    continue;
                };
                if cell.fire_index > self.danger_threshold {
                    dangerous.entry(sensor).or_default().push(index);
                }
                if cell.being_burned {
                    burning.entry(sensor).or_default().push(index);
                }
            }
        }

        let delta = ClassificationDelta {
            newly_burned: Self::diff(&burning, &self.previous_burning, spatial),
            newly_dangerous: Self::diff(&dangerous, &self.previous_dangerous, spatial),
        };
        self.previous_burning = burning.into_values().flatten().collect();
        self.previous_dangerous = dangerous.into_values().flatten().collect();

        debug!(
            "Sensors reported {} new cells ({} burning anchors, {} dangerous anchors)",
            delta.len(),
            delta.newly_burned.len(),
            delta.newly_dangerous.len()
        );
        delta
    }
}
