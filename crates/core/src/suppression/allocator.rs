//! Multi-pass firefighter allocation across competing zones
//!
//! Each tick the allocator builds a fresh snapshot for every zone with
//! burning cells, decides each zone's need flag through hysteresis, then:
//!
//! 1. Tops up extinguishing zones flagged `Yes`, weighted by danger
//! 2. Sweeps every free firefighter left to the most dangerous `Yes` zone
//! 3. Records the snapshots of extinguishing zones
//! 4. Resources new zones, one free controller each, weighted by danger
//! 5. Sweeps again over every resourced zone
//!
//! A pass's share base is the free firefighter count when the pass starts.
//! Allotments are capped by what is still free, so the sum over zones never
//! exceeds the pool.

use std::collections::BTreeMap;

use tracing::{debug, error, info};

use crate::core_types::ZoneId;
use crate::detection::Zone;
use crate::error::ResponseError;
use crate::grid::Board;
use crate::suppression::{
    PriorityCalculator, ResourceMetadata, ResourceNeed, ResourcePool, ZoneHistory,
};

/// Result of one allocation
#[derive(Debug, Clone, Default)]
pub struct AllocationOutcome {
    /// Latest snapshot of every zone with history
    pub allocations: BTreeMap<ZoneId, ResourceMetadata>,
    /// Zones whose allocation failed this tick
    pub failures: Vec<(ZoneId, ResponseError)>,
}

/// Stateful allocator holding every zone's history
#[derive(Debug, Clone)]
pub struct ResourceAllocator {
    histories: BTreeMap<ZoneId, ZoneHistory>,
    stability_window: usize,
}

impl ResourceAllocator {
    /// Create an allocator with no history
    pub fn new(stability_window: usize) -> Self {
        Self {
            histories: BTreeMap::new(),
            stability_window,
        }
    }

    /// History of one zone
    pub fn history(&self, zone: ZoneId) -> Option<&ZoneHistory> {
        self.histories.get(&zone)
    }

    /// Latest snapshot of every zone with history
    pub fn latest(&self) -> BTreeMap<ZoneId, ResourceMetadata> {
        self.histories
            .iter()
            .map(|(&id, history)| (id, history.latest().clone()))
            .collect()
    }

    /// Fold the history of a merged zone into its survivor
    ///
    /// A survivor with history gets the absorbed firefighter count added to
    /// its latest snapshot. A survivor without history adopts the absorbed
    /// one.
    pub fn absorb(&mut self, absorbed: ZoneId, survivor: ZoneId) {
        let Some(taken) = self.histories.remove(&absorbed) else {
            return;
        };
        if let Some(history) = self.histories.get_mut(&survivor) {
            history.absorb(taken.latest());
        } else {
            let mut adopted = taken;
            let mut latest = adopted.latest().clone();
            latest.zone_id = survivor;
            adopted.amend_latest(latest);
            self.histories.insert(survivor, adopted);
        }
    }

    /// Drop the history of a retired zone
    pub fn forget(&mut self, zone: ZoneId) {
        self.histories.remove(&zone);
    }

    /// Allocate firefighters and controllers for this tick's zones
    pub fn allocate(
        &mut self,
        zones: &BTreeMap<ZoneId, Zone>,
        board: &Board,
        pool: &mut ResourcePool,
    ) -> AllocationOutcome {
        let free_controllers = pool.free_controllers();
        self.allocate_with_controllers(zones, board, pool, free_controllers)
    }

    /// Allocate with pass 2 trying at most `free_controllers` new zones
    fn allocate_with_controllers(
        &mut self,
        zones: &BTreeMap<ZoneId, Zone>,
        board: &Board,
        pool: &mut ResourcePool,
        free_controllers: usize,
    ) -> AllocationOutcome {
        self.histories
            .retain(|id, _| zones.get(id).is_some_and(|zone| !zone.burning().is_empty()));

        let mut batch: BTreeMap<ZoneId, ResourceMetadata> = zones
            .iter()
            .filter(|(_, zone)| !zone.burning().is_empty())
            .map(|(&id, zone)| (id, self.snapshot(id, zone, board)))
            .collect();

        if batch
            .values()
            .any(|m| m.additional_resource_needed == ResourceNeed::Yes)
        {
            Self::top_up(&mut batch, pool);
            Self::sweep_remaining(&mut batch, pool);
        }

        for (id, snapshot) in &batch {
            if snapshot.additional_resource_needed != ResourceNeed::Start {
                if let Some(history) = self.histories.get_mut(id) {
                    history.push(snapshot.clone());
                }
            }
        }

        let mut failures = Vec::new();
        let has_new = batch
            .values()
            .any(|m| m.additional_resource_needed == ResourceNeed::Start);
        if free_controllers > 0 && has_new {
            self.resource_new_zones(&mut batch, pool, free_controllers, &mut failures);
        }

        if let Some(id) = Self::sweep_remaining(&mut batch, pool) {
            if let (Some(history), Some(snapshot)) = (self.histories.get_mut(&id), batch.get(&id)) {
                history.amend_latest(snapshot.clone());
            }
        }

        debug!(
            "Allocation done: {} zones resourced, {} firefighters free, {} controllers free",
            self.histories.len(),
            pool.free_firefighters(),
            pool.free_controllers()
        );

        AllocationOutcome {
            allocations: self.latest(),
            failures,
        }
    }

    fn snapshot(&self, id: ZoneId, zone: &Zone, board: &Board) -> ResourceMetadata {
        let optimal = zone.optimal_firefighter_count(board);
        let history = self.histories.get(&id);
        ResourceMetadata {
            zone_id: id,
            firefighters_count: history.map_or(0, |h| h.latest().firefighters_count),
            optimal_firefighter_count: optimal,
            danger_value: zone.danger_value(board),
            additional_resource_needed: ZoneHistory::assess(history, optimal),
        }
    }

    /// Pass 1: top up extinguishing zones still asking for firefighters
    ///
    /// Shares are taken from the free count when the pass starts, which for
    /// pass 1 is the free count of the whole tick. Three escalating zones
    /// over a pool of 20 end up 8/6/6 this way.
    fn top_up(batch: &mut BTreeMap<ZoneId, ResourceMetadata>, pool: &mut ResourcePool) {
        let priorities = PriorityCalculator::for_batch(
            batch
                .values()
                .filter(|m| m.additional_resource_needed == ResourceNeed::Yes),
        );
        let base = pool.free_firefighters();
        for zone in priorities.ranked() {
            let allotment = zone.allotment(base, pool.free_firefighters());
            let bound = pool.bind_firefighters(allotment, zone.zone_id);
            if let Some(snapshot) = batch.get_mut(&zone.zone_id) {
                snapshot.add_firefighters(bound);
                debug!(
                    "Zone {} topped up by {} (priority {:.3}), now {}/{}",
                    zone.zone_id,
                    bound,
                    zone.priority,
                    snapshot.firefighters_count,
                    snapshot.optimal_firefighter_count
                );
            }
        }
    }

    /// Pass 2: bind a controller and a first allotment to new zones
    ///
    /// Shares are taken from what pass 1 and its sweep left free.
    fn resource_new_zones(
        &mut self,
        batch: &mut BTreeMap<ZoneId, ResourceMetadata>,
        pool: &mut ResourcePool,
        free_controllers: usize,
        failures: &mut Vec<(ZoneId, ResponseError)>,
    ) {
        let priorities = PriorityCalculator::for_batch(
            batch
                .values()
                .filter(|m| m.additional_resource_needed == ResourceNeed::Start),
        );
        let base = pool.free_firefighters();
        for zone in priorities.ranked().iter().take(free_controllers) {
            if let Err(err) = pool.bind_controller(zone.zone_id) {
                error!("Zone {} left unresourced: {}", zone.zone_id, err);
                failures.push((zone.zone_id, err));
                continue;
            }
            let allotment = zone.allotment(base, pool.free_firefighters());
            let bound = pool.bind_firefighters(allotment, zone.zone_id);
            if let Some(snapshot) = batch.get_mut(&zone.zone_id) {
                snapshot.add_firefighters(bound);
                info!(
                    "Zone {} resourced: controller bound, {} of {} firefighters",
                    zone.zone_id, snapshot.firefighters_count, snapshot.optimal_firefighter_count
                );
                self.histories.insert(
                    zone.zone_id,
                    ZoneHistory::new(snapshot.clone(), self.stability_window),
                );
            }
        }
    }

    /// Give every free firefighter to the most dangerous zone still flagged
    /// `Yes`. First zone in id order wins ties. Returns the zone served.
    fn sweep_remaining(
        batch: &mut BTreeMap<ZoneId, ResourceMetadata>,
        pool: &mut ResourcePool,
    ) -> Option<ZoneId> {
        let free = pool.free_firefighters();
        if free == 0 {
            return None;
        }
        let mut target: Option<&mut ResourceMetadata> = None;
        for snapshot in batch.values_mut() {
            if snapshot.additional_resource_needed != ResourceNeed::Yes {
                continue;
            }
            let more_dangerous = match &target {
                Some(best) => snapshot.danger_value > best.danger_value,
                None => true,
            };
            if more_dangerous {
                target = Some(snapshot);
            }
        }
        let target = target?;
        let bound = pool.bind_firefighters(free, target.zone_id);
        target.add_firefighters(bound);
        debug!(
            "Remaining {} firefighters swept to zone {}",
            bound, target.zone_id
        );
        Some(target.zone_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{GridCoord, Terrain};

    fn id(row: u32, col: u32) -> ZoneId {
        ZoneId(GridCoord::new(row, col))
    }

    fn single_cell_zones(
        board: &mut Board,
        fires: &[(u32, u32, f64)],
    ) -> BTreeMap<ZoneId, Zone> {
        let coords = board.coords();
        fires
            .iter()
            .map(|&(row, col, speed)| {
                let at = GridCoord::new(row, col);
                board.ignite(at, speed).unwrap();
                let zone = ZoneId(at);
                (zone, Zone::burning_only(zone, vec![coords.index(at).unwrap()]))
            })
            .collect()
    }

    #[test]
    fn test_failed_controller_bind_leaves_other_zones_resourced() {
        let mut board = Board::new(30, 30, Terrain::Forest);
        let zones = single_cell_zones(&mut board, &[(4, 4, 5.6), (10, 10, 3.0), (20, 20, 1.0)]);
        let mut pool = ResourcePool::new(60, 2);
        let mut allocator = ResourceAllocator::new(4);

        // Offer one controller more than the pool holds
        let outcome = allocator.allocate_with_controllers(&zones, &board, &mut pool, 3);

        assert_eq!(
            outcome.failures,
            vec![(id(20, 20), ResponseError::NoFreeController(id(20, 20)))]
        );
        assert_eq!(outcome.allocations.len(), 2);
        assert_eq!(outcome.allocations[&id(4, 4)].firefighters_count, 4);
        assert_eq!(outcome.allocations[&id(10, 10)].firefighters_count, 3);
        assert_eq!(
            outcome.allocations[&id(10, 10)].additional_resource_needed,
            ResourceNeed::No
        );
        assert_eq!(allocator.history(id(4, 4)).unwrap().recorded(), 1);
        assert_eq!(allocator.history(id(10, 10)).unwrap().recorded(), 1);
        assert!(allocator.history(id(20, 20)).is_none());
        assert_eq!(pool.firefighter_count(id(20, 20)), 0);
        assert_eq!(pool.free_firefighters(), 53);
        assert_eq!(pool.free_controllers(), 0);

        // A controller frees up and the failed zone is picked up next tick
        pool.release_zone(id(10, 10));
        allocator.forget(id(10, 10));
        let remaining: BTreeMap<ZoneId, Zone> = zones
            .into_iter()
            .filter(|(zone, _)| *zone != id(10, 10))
            .collect();
        let outcome = allocator.allocate(&remaining, &board, &mut pool);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.allocations[&id(20, 20)].firefighters_count, 1);
        assert_eq!(allocator.history(id(4, 4)).unwrap().recorded(), 2);
    }
}
