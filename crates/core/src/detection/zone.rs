//! A detected fire zone for one tick

use crate::core_types::{CoordIndex, GridCoord, ZoneId};
use crate::grid::Board;

/// Connected group of burning or extinguishing cells tracked as one
/// allocation unit
///
/// `members` holds every active cell of the connected component and drives
/// adjacency. `burning` is the subset still on fire and is what the allocator
/// sizes the zone by. Both are sorted packed indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    id: ZoneId,
    members: Vec<usize>,
    burning: Vec<usize>,
}

impl Zone {
    /// Create a zone from its membership and burning subset
    pub fn new(id: ZoneId, mut members: Vec<usize>, mut burning: Vec<usize>) -> Self {
        members.sort_unstable();
        members.dedup();
        burning.sort_unstable();
        burning.dedup();
        Self {
            id,
            members,
            burning,
        }
    }

    /// Create a zone whose every member is burning
    pub fn burning_only(id: ZoneId, cells: Vec<usize>) -> Self {
        Self::new(id, cells.clone(), cells)
    }

    /// Zone id
    pub fn id(&self) -> ZoneId {
        self.id
    }

    /// Every active cell of the zone
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Cells of the zone still on fire
    pub fn burning(&self) -> &[usize] {
        &self.burning
    }

    /// Whether `index` is an active member of the zone
    pub fn contains(&self, index: usize) -> bool {
        self.members.binary_search(&index).is_ok()
    }

    /// Burning cells as coordinates
    pub fn burning_coords(&self, coords: CoordIndex) -> Vec<GridCoord> {
        self.burning.iter().map(|&i| coords.coord(i)).collect()
    }

    /// Sum of fire speeds over the burning cells
    pub fn danger_value(&self, board: &Board) -> f64 {
        self.burning
            .iter()
            .filter_map(|&i| board.cell(i))
            .map(|cell| cell.fire_speed)
            .sum()
    }

    /// Firefighters needed to fully cover the burning cells
    pub fn optimal_firefighter_count(&self, board: &Board) -> usize {
        self.burning
            .iter()
            .filter_map(|&i| board.cell(i))
            .map(|cell| cell.fire_tier.firefighter_demand() as usize)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{FireTier, Terrain};

    #[test]
    fn test_zone_sizing_uses_burning_subset() {
        let mut board = Board::new(10, 10, Terrain::Forest);
        board.ignite(GridCoord::new(4, 4), 0.51).unwrap();
        board.ignite(GridCoord::new(4, 5), 1.6).unwrap();
        board.ignite(GridCoord::new(4, 6), 5.6).unwrap();
        // Extinguishing only, still a member
        let cell = board.cell_at_mut(GridCoord::new(4, 7)).unwrap();
        cell.being_extinguished = true;
        cell.fire_tier = FireTier::High;
        cell.fire_speed = 3.0;

        let zone = Zone::new(ZoneId(GridCoord::new(4, 4)), vec![47, 46, 45, 44], vec![46, 44, 45]);
        assert_eq!(zone.members(), &[44, 45, 46, 47]);
        assert_eq!(zone.burning(), &[44, 45, 46]);
        assert!(zone.contains(47));
        assert_eq!(zone.optimal_firefighter_count(&board), 7);
        assert!((zone.danger_value(&board) - 7.71).abs() < 1e-9);
    }
}
