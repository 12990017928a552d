//! One tick of the measurement and response pipeline

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{debug, info};

use crate::classification::{AnchorGrouping, AnchorLayout, DangerClassifier, SensorAnalyst};
use crate::config::ResponseConfig;
use crate::core_types::{AnchorId, GridCoord, ZoneId};
use crate::detection::{RetiredZone, ZoneDetector, ZoneMerge};
use crate::error::ResponseError;
use crate::grid::{Board, SpatialIndex};
use crate::simulation::{ExtinguishedCellReset, ResetCollaborator};
use crate::suppression::{ResourceAllocator, ResourceMetadata, ResourcePool, ZoneSupervisor};

/// What one tick did
#[derive(Debug, Clone, Default, Serialize)]
pub struct TickReport {
    /// Tick number, starting at 1
    pub tick: u64,
    /// Whether classification changed and anchors were regrouped
    pub regrouped: bool,
    /// Latest allocation of every resourced zone
    pub allocations: BTreeMap<ZoneId, ResourceMetadata>,
    /// Zones merged this tick
    pub merges: Vec<ZoneMerge>,
    /// Zones retired this tick
    pub retired: Vec<RetiredZone>,
    /// Testable groups after the last regrouping
    pub testable_groups: usize,
    /// Zones whose processing failed this tick
    pub failures: Vec<(ZoneId, ResponseError)>,
}

impl TickReport {
    /// Firefighters allocated across every zone
    pub fn firefighters_allocated(&self) -> usize {
        self.allocations.values().map(|m| m.firefighters_count).sum()
    }
}

/// Runs detect, allocate and place for every board snapshot
///
/// Owns every piece of cross-tick state: the zone table, the allocation
/// histories and both agent pools. Ticks must be applied in order; see
/// [`SerializedResponse`](crate::simulation::SerializedResponse) for
/// concurrent callers.
pub struct IterationOrchestrator<C = SensorAnalyst, R = ExtinguishedCellReset> {
    config: ResponseConfig,
    spatial: SpatialIndex,
    classifier: C,
    grouping: AnchorGrouping,
    detector: ZoneDetector,
    allocator: ResourceAllocator,
    pool: ResourcePool,
    reset: R,
    tick: u64,
    testable_groups: usize,
}

impl IterationOrchestrator {
    /// Create an orchestrator with no anchors
    ///
    /// Classification then reports nothing and zones come straight from the
    /// board's burning cells.
    ///
    /// # Errors
    /// Returns [`ResponseError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: ResponseConfig) -> Result<Self, ResponseError> {
        Self::with_anchors(config, AnchorLayout::default())
    }

    /// Create an orchestrator using the default sensor classifier over the
    /// given anchors
    ///
    /// # Errors
    /// Returns [`ResponseError::InvalidConfig`] if the configuration is invalid.
    pub fn with_anchors(config: ResponseConfig, layout: AnchorLayout) -> Result<Self, ResponseError> {
        let classifier = SensorAnalyst::new(layout.sensors, config.classification.sensor_danger);
        Self::with_collaborators(config, classifier, layout.managing, ExtinguishedCellReset)
    }
}

impl<C: DangerClassifier, R: ResetCollaborator> IterationOrchestrator<C, R> {
    /// Create an orchestrator with custom collaborators
    ///
    /// # Errors
    /// Returns [`ResponseError::InvalidConfig`] if the configuration is invalid.
    pub fn with_collaborators(
        config: ResponseConfig,
        classifier: C,
        managing: Vec<AnchorId>,
        reset: R,
    ) -> Result<Self, ResponseError> {
        config.validate()?;
        info!(
            "Response pipeline ready: {}x{} board, {} firefighters, {} controllers, {} managing anchors",
            config.board_width,
            config.board_height,
            config.firefighters,
            config.controllers,
            managing.len()
        );
        Ok(Self {
            spatial: SpatialIndex::new(&config),
            classifier,
            grouping: AnchorGrouping::new(managing, config.classification),
            detector: ZoneDetector::new(),
            allocator: ResourceAllocator::new(config.stability_window),
            pool: ResourcePool::new(config.firefighters, config.controllers),
            reset,
            tick: 0,
            testable_groups: 0,
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &ResponseConfig {
        &self.config
    }

    /// Agent pools
    pub fn pool(&self) -> &ResourcePool {
        &self.pool
    }

    /// Allocation histories
    pub fn allocator(&self) -> &ResourceAllocator {
        &self.allocator
    }

    /// Zone table
    pub fn detector(&self) -> &ZoneDetector {
        &self.detector
    }

    /// Managing anchors and testable groups
    pub fn grouping(&self) -> &AnchorGrouping {
        &self.grouping
    }

    /// Spatial index of the last snapshot
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Ticks completed so far
    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// Run one tick over `board`
    ///
    /// Marks worked cells `being_extinguished` and resets the cells of
    /// retired zones in place. Failures scoped to one zone are collected in
    /// the report and never stop the others.
    ///
    /// # Errors
    /// Returns [`ResponseError::DimensionMismatch`] before touching any state
    /// if the board does not match the configuration.
    pub fn tick(&mut self, board: &mut Board) -> Result<TickReport, ResponseError> {
        self.spatial.refresh(board)?;
        let coords = self.spatial.coords();

        let delta = self.classifier.classify(board, &self.spatial);
        let regrouped = !delta.is_empty();
        if regrouped {
            self.grouping.absorb(&delta, coords);
            self.testable_groups = self.grouping.regroup(board, &self.spatial);
        } else {
            debug!("Classification unchanged, regrouping skipped");
        }

        let detection = self.detector.detect(&self.spatial);
        for merge in &detection.merges {
            self.allocator.absorb(merge.absorbed, merge.survivor);
            self.pool.transfer_zone(merge.absorbed, merge.survivor);
        }

        let live: FxHashSet<usize> = detection
            .zones
            .values()
            .flat_map(|zone| zone.members().iter().copied())
            .collect();
        for retired in &detection.retired {
            let freed = self.pool.release_zone(retired.id);
            let cells: Vec<GridCoord> = retired
                .cells
                .iter()
                .copied()
                .filter(|&c| coords.index(c).is_some_and(|i| !live.contains(&i)))
                .collect();
            self.reset.reset_cells(board, &cells);
            self.allocator.forget(retired.id);
            info!(
                "Zone {} retired: {} firefighters freed, {} cells reset",
                retired.id,
                freed,
                cells.len()
            );
        }

        let outcome = self
            .allocator
            .allocate(&detection.zones, board, &mut self.pool);
        // Histories only exist for zones that were bound a controller, and
        // merges hand the controller over with the history.
        for &id in outcome.allocations.keys() {
            let Some(zone) = detection.zones.get(&id) else {
                continue;
            };
            debug_assert!(
                self.pool.controller_of(id).is_some(),
                "zone {id} has an allocation but no controller"
            );
            ZoneSupervisor::place(zone, board, &mut self.pool);
        }

        self.tick += 1;
        let report = TickReport {
            tick: self.tick,
            regrouped,
            allocations: outcome.allocations,
            merges: detection.merges,
            retired: detection.retired,
            testable_groups: self.testable_groups,
            failures: outcome.failures,
        };
        info!(
            "Tick {}: {} zones, {} firefighters busy, {} free, {} controllers free",
            report.tick,
            report.allocations.len(),
            self.pool.busy_firefighters(),
            self.pool.free_firefighters(),
            self.pool.free_controllers()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Terrain;

    #[test]
    fn test_invalid_config_rejected() {
        let config = ResponseConfig {
            stability_window: 0,
            ..ResponseConfig::default()
        };
        assert!(matches!(
            IterationOrchestrator::new(config),
            Err(ResponseError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_single_zone_tick() {
        let mut orchestrator = IterationOrchestrator::new(ResponseConfig::with_board(30, 30)).unwrap();
        let mut board = Board::new(30, 30, Terrain::Forest);
        board.ignite(GridCoord::new(4, 4), 0.51).unwrap();
        board.ignite(GridCoord::new(4, 5), 1.6).unwrap();
        board.ignite(GridCoord::new(4, 6), 5.6).unwrap();

        let report = orchestrator.tick(&mut board).unwrap();
        let zone = ZoneId(GridCoord::new(4, 4));
        assert_eq!(report.tick, 1);
        assert!(!report.regrouped);
        assert_eq!(report.allocations[&zone].firefighters_count, 7);
        assert_eq!(orchestrator.pool().assigned_to_cell(GridCoord::new(4, 6)), 6);
        assert!(report.failures.is_empty());
    }
}
