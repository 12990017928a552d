//! Hand-off of retired zone cells

use crate::core_types::{FireTier, GridCoord};
use crate::grid::Board;

/// Collaborator that clears fire state on the cells of a retired zone
pub trait ResetCollaborator {
    /// Reset every listed cell; cells off the board are ignored
    fn reset_cells(&mut self, board: &mut Board, cells: &[GridCoord]);
}

/// Default reset: the cell stops burning and is no longer worked
///
/// Destruction and terrain are left as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtinguishedCellReset;

impl ResetCollaborator for ExtinguishedCellReset {
    fn reset_cells(&mut self, board: &mut Board, cells: &[GridCoord]) {
        for &coord in cells {
            if let Some(cell) = board.cell_at_mut(coord) {
                cell.being_burned = false;
                cell.being_extinguished = false;
                cell.fire_tier = FireTier::None;
                cell.fire_speed = 0.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::Terrain;

    #[test]
    fn test_reset_clears_fire_state() {
        let mut board = Board::new(5, 5, Terrain::Forest);
        board.ignite(GridCoord::new(2, 2), 3.0).unwrap();
        board.cell_at_mut(GridCoord::new(2, 2)).unwrap().being_extinguished = true;

        ExtinguishedCellReset.reset_cells(&mut board, &[GridCoord::new(2, 2), GridCoord::new(9, 9)]);
        let cell = board.cell_at(GridCoord::new(2, 2)).unwrap();
        assert!(!cell.is_burning_or_extinguishing());
        assert_eq!(cell.fire_tier, FireTier::None);
        assert_eq!(cell.fire_speed, 0.0);
        assert_eq!(cell.percent_destroyed, FireTier::High.baseline_destruction());
    }
}
