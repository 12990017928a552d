//! Managing anchors and testable groups

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::classification::ClassificationDelta;
use crate::config::ClassificationThresholds;
use crate::core_types::{AnchorId, CoordIndex, GridCoord, TestableGroupId};
use crate::grid::{Board, SpatialIndex};

/// Window used when counting a candidate's neighbours
const NEIGHBOURHOOD: u32 = 3;

/// Candidates of one managing anchor sorted by danger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DangerGroups {
    /// Dangerous on their own
    pub dangerous: Vec<usize>,
    /// Moderately dangerous with enough dangerous company around them
    pub by_neighbours: Vec<usize>,
    /// Everything else
    pub non_dangerous: Vec<usize>,
}

/// A managing anchor and the cells routed to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagingAnchor {
    id: AnchorId,
    candidates: Vec<usize>,
    groups: DangerGroups,
}

impl ManagingAnchor {
    fn new(id: AnchorId) -> Self {
        Self {
            id,
            candidates: Vec::new(),
            groups: DangerGroups::default(),
        }
    }

    /// Anchor id
    pub fn id(&self) -> AnchorId {
        self.id
    }

    /// Dangerous candidates reported to this anchor
    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    /// Last classification of the candidates
    pub fn groups(&self) -> &DangerGroups {
        &self.groups
    }

    fn extend(list: &mut Vec<usize>, cells: impl IntoIterator<Item = usize>) {
        list.extend(cells);
        list.sort_unstable();
        list.dedup();
    }

    fn classify(&mut self, board: &Board, coords: CoordIndex, t: &ClassificationThresholds) {
        let candidates: FxHashSet<usize> = self.candidates.iter().copied().collect();
        let index_of = |i: usize| board.cell(i).map_or(0.0, |c| c.fire_index);
        let mut groups = DangerGroups::default();

        for &cell in &self.candidates {
            let index = index_of(cell);
            if index > t.dangerous {
                groups.dangerous.push(cell);
                continue;
            }
            if index > t.neighbour_danger && index < t.dangerous {
                let company = coords
                    .window_indices(cell, NEIGHBOURHOOD)
                    .filter(|&n| n != cell && candidates.contains(&n))
                    .count();
                if company > t.neighbour_count {
                    groups.by_neighbours.push(cell);
                    continue;
                }
            }
            groups.non_dangerous.push(cell);
        }
        self.groups = groups;
    }
}

/// Routes classification deltas to managing anchors and keeps the testable
/// groups built from their dangerous cells
///
/// Testable groups keep their id across regroupings and only grow. A group's
/// id is the cell that seeded it, in a namespace separate from zone ids.
#[derive(Debug, Clone)]
pub struct AnchorGrouping {
    anchors: Vec<ManagingAnchor>,
    thresholds: ClassificationThresholds,
    groups: BTreeMap<TestableGroupId, Vec<usize>>,
    grouped: FxHashSet<usize>,
}

impl AnchorGrouping {
    /// Create a grouping over the given managing anchors
    pub fn new(mut managing: Vec<AnchorId>, thresholds: ClassificationThresholds) -> Self {
        managing.sort_unstable();
        managing.dedup();
        Self {
            anchors: managing.into_iter().map(ManagingAnchor::new).collect(),
            thresholds,
            groups: BTreeMap::new(),
            grouped: FxHashSet::default(),
        }
    }

    /// Managing anchors in ascending id order
    pub fn anchors(&self) -> &[ManagingAnchor] {
        &self.anchors
    }

    /// Testable groups by id
    pub fn testable_groups(&self) -> &BTreeMap<TestableGroupId, Vec<usize>> {
        &self.groups
    }

    /// Managing anchor closest to `from`; ties go to the lowest id
    fn nearest(&self, from: GridCoord) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (slot, anchor) in self.anchors.iter().enumerate() {
            let distance = anchor.id.cell().distance(from);
            let closer = match best {
                Some((_, nearest)) => distance < nearest,
                None => true,
            };
            if closer {
                best = Some((slot, distance));
            }
        }
        best.map(|(slot, _)| slot)
    }

    /// Hand every newly dangerous cell to the managing anchor nearest its
    /// sensor
    ///
    /// Newly burning cells are not kept: zones are built from the snapshot's
    /// burning cells directly. Returns the number of cells routed. With no
    /// managing anchors the delta is dropped.
    pub fn absorb(&mut self, delta: &ClassificationDelta, coords: CoordIndex) -> usize {
        if self.anchors.is_empty() {
            if !delta.is_empty() {
                warn!(
                    "No managing anchor to take {} reported cells, dropped",
                    delta.len()
                );
            }
            return 0;
        }

        let burning: usize = delta.newly_burned.values().map(Vec::len).sum();
        if burning > 0 {
            debug!("{} newly burning cells left to zone detection", burning);
        }

        let mut routed = 0;
        for (&sensor, cells) in &delta.newly_dangerous {
            let Some(slot) = self.nearest(sensor.cell()) else {
                continue;
            };
            let indices: Vec<usize> = cells
                .iter()
                .filter_map(|&coord| {
                    let index = coords.index(coord);
                    if index.is_none() {
                        warn!("Sensor {} reported {} outside the board, skipped", sensor, coord);
                    }
                    index
                })
                .collect();
            routed += indices.len();
            ManagingAnchor::extend(&mut self.anchors[slot].candidates, indices);
        }
        routed
    }

    /// Re-classify every anchor's candidates and rebuild the testable groups
    ///
    /// Dangerous cells of both kinds are marked testable on the board.
    /// Returns the number of testable groups.
    pub fn regroup(&mut self, board: &mut Board, spatial: &SpatialIndex) -> usize {
        let coords = spatial.coords();
        let thresholds = self.thresholds;
        for anchor in &mut self.anchors {
            anchor.classify(board, coords, &thresholds);
        }

        let mut testable: Vec<usize> = self
            .anchors
            .iter()
            .flat_map(|a| a.groups.dangerous.iter().chain(&a.groups.by_neighbours))
            .copied()
            .collect();
        testable.sort_unstable();
        testable.dedup();
        for &index in &testable {
            if let Some(cell) = board.cell_mut(index) {
                cell.markers.testable = true;
            }
        }

        let members: FxHashSet<usize> = testable.iter().copied().collect();
        let is_member = |n: usize| members.contains(&n);
        for cells in self.groups.values_mut() {
            let mut grown = cells.clone();
            for &cell in cells.iter() {
                grown.extend(spatial.connected_region(cell, is_member, &mut self.grouped));
            }
            grown.sort_unstable();
            grown.dedup();
            *cells = grown;
        }
        for &seed in &testable {
            if self.grouped.contains(&seed) {
                continue;
            }
            let region = spatial.connected_region(seed, is_member, &mut self.grouped);
            self.groups
                .insert(TestableGroupId(coords.coord(seed)), sorted(region));
        }

        debug!(
            "Regrouped {} anchors: {} testable cells in {} groups",
            self.anchors.len(),
            testable.len(),
            self.groups.len()
        );
        self.groups.len()
    }
}

fn sorted(mut cells: Vec<usize>) -> Vec<usize> {
    cells.sort_unstable();
    cells
}
