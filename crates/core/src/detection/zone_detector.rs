//! Fire zone detection with identity tracking across ticks
//!
//! Every tick the active cells (burning or being extinguished) are grouped
//! into connected components under testing window adjacency. Components
//! inherit the id of a zone they overlap from the previous tick, so a zone
//! keeps its id while it burns.
//!
//! # Identity rules
//!
//! - Components are visited in ascending order of their lowest cell. Each
//!   claims the lowest-id previous zone it overlaps that no earlier component
//!   has claimed.
//! - A component that claims nothing mints a new id from its first cell
//!   (row-major) whose id is not already in use.
//! - A previous zone nobody claimed, whose cells live on inside some
//!   component, is merged into the lowest-id zone holding those cells.
//! - A previous zone with no live cells, or a zone with no burning cells
//!   left, is retired and its full footprint handed back for reset.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core_types::{CoordIndex, GridCoord, ZoneId};
use crate::detection::Zone;
use crate::grid::SpatialIndex;

/// One zone absorbed into another during detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneMerge {
    /// Zone that disappears
    pub absorbed: ZoneId,
    /// Zone that keeps its id and inherits the absorbed allocation
    pub survivor: ZoneId,
}

/// A zone removed from tracking, with every cell it ever covered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetiredZone {
    /// Retired zone id
    pub id: ZoneId,
    /// Every cell the zone (and anything merged into it) covered, row-major
    pub cells: Vec<GridCoord>,
}

/// Outcome of one detection pass
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// Zones with at least one burning cell, by id
    pub zones: BTreeMap<ZoneId, Zone>,
    /// Ids minted this tick
    pub created: Vec<ZoneId>,
    /// Merges resolved this tick
    pub merges: Vec<ZoneMerge>,
    /// Zones retired this tick
    pub retired: Vec<RetiredZone>,
}

#[derive(Debug, Clone, Default)]
struct TrackedZone {
    members: FxHashSet<usize>,
    footprint: FxHashSet<usize>,
}

/// Tracks fire zones across ticks
#[derive(Debug, Clone, Default)]
pub struct ZoneDetector {
    tracked: BTreeMap<ZoneId, TrackedZone>,
}

impl ZoneDetector {
    /// Create a detector with no zones
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of the zones currently tracked
    pub fn zone_ids(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.tracked.keys().copied()
    }

    /// Whether a zone is currently tracked
    pub fn is_tracked(&self, id: ZoneId) -> bool {
        self.tracked.contains_key(&id)
    }

    /// Number of tracked zones
    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    /// Whether no zone is tracked
    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// Recompute zones from the latest snapshot held by `spatial`
    pub fn detect(&mut self, spatial: &SpatialIndex) -> Detection {
        let coords = spatial.coords();
        let components = Self::components(spatial);

        let previous_owner: FxHashMap<usize, ZoneId> = self
            .tracked
            .iter()
            .flat_map(|(&id, zone)| zone.members.iter().map(move |&cell| (cell, id)))
            .collect();

        let mut created = Vec::new();
        let mut next: BTreeMap<ZoneId, Vec<usize>> = BTreeMap::new();
        for component in components {
            let touching: BTreeSet<ZoneId> = component
                .iter()
                .filter_map(|cell| previous_owner.get(cell).copied())
                .collect();
            let id = match touching.into_iter().find(|id| !next.contains_key(id)) {
                Some(id) => id,
                None => match self.mint_id(&component, &next, coords) {
                    Some(id) => {
                        created.push(id);
                        id
                    }
                    None => {
                        warn!(
                            "No free zone id for component at {}, skipped this tick",
                            coords.coord(component[0])
                        );
                        continue;
                    }
                },
            };
            next.insert(id, component);
        }

        let next_owner: FxHashMap<usize, ZoneId> = next
            .iter()
            .flat_map(|(&id, cells)| cells.iter().map(move |&cell| (cell, id)))
            .collect();

        let mut merges = Vec::new();
        let mut retired = Vec::new();
        let mut footprints: FxHashMap<ZoneId, FxHashSet<usize>> = FxHashMap::default();
        for (id, zone) in std::mem::take(&mut self.tracked) {
            if next.contains_key(&id) {
                footprints.entry(id).or_default().extend(zone.footprint);
                continue;
            }
            let survivor = zone
                .members
                .iter()
                .filter_map(|cell| next_owner.get(cell))
                .min()
                .copied();
            if let Some(survivor) = survivor {
                info!("Zone {} merged into zone {}", id, survivor);
                merges.push(ZoneMerge {
                    absorbed: id,
                    survivor,
                });
                footprints.entry(survivor).or_default().extend(zone.footprint);
            } else {
                info!("Zone {} retired: no active cells left", id);
                retired.push(RetiredZone {
                    id,
                    cells: sorted_coords(zone.footprint, coords),
                });
            }
        }

        let mut zones = BTreeMap::new();
        for (id, members) in next {
            let mut footprint = footprints.remove(&id).unwrap_or_default();
            footprint.extend(members.iter().copied());
            let burning: Vec<usize> = members
                .iter()
                .copied()
                .filter(|&cell| spatial.is_burning(cell))
                .collect();

            if burning.is_empty() {
                info!("Zone {} retired: no burning cells left", id);
                created.retain(|&c| c != id);
                retired.push(RetiredZone {
                    id,
                    cells: sorted_coords(footprint, coords),
                });
                continue;
            }

            self.tracked.insert(
                id,
                TrackedZone {
                    members: members.iter().copied().collect(),
                    footprint,
                },
            );
            zones.insert(id, Zone::new(id, members, burning));
        }

        for id in &created {
            info!("New fire zone {} detected", id);
        }
        debug!(
            "Detection: {} zones, {} created, {} merged, {} retired",
            zones.len(),
            created.len(),
            merges.len(),
            retired.len()
        );

        Detection {
            zones,
            created,
            merges,
            retired,
        }
    }

    /// Connected components of the active cells, each sorted, in ascending
    /// order of their lowest cell
    fn components(spatial: &SpatialIndex) -> Vec<Vec<usize>> {
        let mut visited = FxHashSet::default();
        let mut components = Vec::new();
        for seed in spatial.active_cells() {
            if visited.contains(&seed) {
                continue;
            }
            let mut region = spatial.connected_region(seed, |i| spatial.is_active(i), &mut visited);
            region.sort_unstable();
            components.push(region);
        }
        components
    }

    fn mint_id(
        &self,
        component: &[usize],
        next: &BTreeMap<ZoneId, Vec<usize>>,
        coords: CoordIndex,
    ) -> Option<ZoneId> {
        component
            .iter()
            .map(|&cell| ZoneId(coords.coord(cell)))
            .find(|id| !self.tracked.contains_key(id) && !next.contains_key(id))
    }
}

fn sorted_coords(cells: FxHashSet<usize>, coords: CoordIndex) -> Vec<GridCoord> {
    let mut cells: Vec<usize> = cells.into_iter().collect();
    cells.sort_unstable();
    cells.into_iter().map(|cell| coords.coord(cell)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseConfig;
    use crate::core_types::Terrain;
    use crate::grid::Board;

    fn zone_id(row: u32, col: u32) -> ZoneId {
        ZoneId(GridCoord::new(row, col))
    }

    fn detect(detector: &mut ZoneDetector, board: &Board) -> Detection {
        let mut spatial =
            SpatialIndex::new(&ResponseConfig::with_board(board.width(), board.height()));
        spatial.refresh(board).unwrap();
        detector.detect(&spatial)
    }

    fn ignite(board: &mut Board, cells: &[(u32, u32)]) {
        for &(row, col) in cells {
            board.ignite(GridCoord::new(row, col), 2.0).unwrap();
        }
    }

    #[test]
    fn test_new_zone_named_after_first_cell() {
        let mut board = Board::new(10, 10, Terrain::Forest);
        ignite(&mut board, &[(4, 5), (4, 4), (5, 6)]);
        let mut detector = ZoneDetector::new();

        let detection = detect(&mut detector, &board);
        assert_eq!(detection.created, vec![zone_id(4, 4)]);
        let zone = &detection.zones[&zone_id(4, 4)];
        assert_eq!(zone.burning().len(), 3);
    }

    #[test]
    fn test_identity_stable_while_fire_grows() {
        let mut board = Board::new(10, 10, Terrain::Forest);
        ignite(&mut board, &[(4, 4), (4, 5)]);
        let mut detector = ZoneDetector::new();
        detect(&mut detector, &board);

        // Spreads up-left past the original seed
        ignite(&mut board, &[(3, 3), (2, 2)]);
        let detection = detect(&mut detector, &board);
        assert!(detection.created.is_empty());
        assert_eq!(detection.zones.keys().copied().collect::<Vec<_>>(), vec![zone_id(4, 4)]);
        assert_eq!(detection.zones[&zone_id(4, 4)].burning().len(), 4);
    }

    #[test]
    fn test_joined_zones_merge_into_lowest_id() {
        let mut board = Board::new(10, 10, Terrain::Forest);
        ignite(&mut board, &[(0, 0), (0, 1), (0, 2), (2, 0), (2, 1), (2, 2)]);
        let mut detector = ZoneDetector::new();
        let detection = detect(&mut detector, &board);
        assert_eq!(detection.zones.len(), 2);

        ignite(&mut board, &[(1, 1)]);
        let detection = detect(&mut detector, &board);
        assert_eq!(
            detection.merges,
            vec![ZoneMerge {
                absorbed: zone_id(2, 0),
                survivor: zone_id(0, 0),
            }]
        );
        assert_eq!(detection.zones.len(), 1);
        assert_eq!(detection.zones[&zone_id(0, 0)].burning().len(), 7);
        assert!(!detector.is_tracked(zone_id(2, 0)));
    }

    #[test]
    fn test_extinguishing_cells_keep_adjacency_but_not_size() {
        let mut board = Board::new(10, 10, Terrain::Forest);
        ignite(&mut board, &[(4, 4), (4, 5), (4, 6)]);
        let mut detector = ZoneDetector::new();
        detect(&mut detector, &board);

        let cell = board.cell_at_mut(GridCoord::new(4, 4)).unwrap();
        cell.being_burned = false;
        cell.being_extinguished = true;
        let detection = detect(&mut detector, &board);
        let zone = &detection.zones[&zone_id(4, 4)];
        assert_eq!(zone.members().len(), 3);
        assert_eq!(zone.burning().len(), 2);
    }

    #[test]
    fn test_zone_without_burning_cells_retires() {
        let mut board = Board::new(10, 10, Terrain::Forest);
        ignite(&mut board, &[(4, 4), (4, 5)]);
        let mut detector = ZoneDetector::new();
        detect(&mut detector, &board);

        for col in [4, 5] {
            let cell = board.cell_at_mut(GridCoord::new(4, col)).unwrap();
            cell.being_burned = false;
            cell.being_extinguished = true;
        }
        let detection = detect(&mut detector, &board);
        assert!(detection.zones.is_empty());
        assert_eq!(
            detection.retired,
            vec![RetiredZone {
                id: zone_id(4, 4),
                cells: vec![GridCoord::new(4, 4), GridCoord::new(4, 5)],
            }]
        );
        assert!(detector.is_empty());
    }

    #[test]
    fn test_split_mints_id_for_detached_part() {
        let mut board = Board::new(10, 10, Terrain::Forest);
        ignite(&mut board, &[(4, 4), (4, 5), (4, 6)]);
        let mut detector = ZoneDetector::new();
        detect(&mut detector, &board);

        let middle = board.cell_at_mut(GridCoord::new(4, 5)).unwrap();
        middle.being_burned = false;
        let detection = detect(&mut detector, &board);
        assert_eq!(detection.created, vec![zone_id(4, 6)]);
        assert_eq!(detection.zones.len(), 2);
        assert!(detection.zones.contains_key(&zone_id(4, 4)));
    }
}
