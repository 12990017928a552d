//! Windowed lookups over the latest board snapshot
//!
//! Two window sizes are configured: a wide surroundings window for sensor
//! visibility and a narrow testing window that defines burning adjacency.
//! The index keeps per-cell masks of the last snapshot so the detector and
//! classifiers can ask membership questions without touching the board.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use crate::config::ResponseConfig;
use crate::core_types::CoordIndex;
use crate::error::ResponseError;
use crate::grid::Board;

/// Spatial index over a board snapshot
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    coords: CoordIndex,
    surroundings_window: u32,
    testing_window: u32,
    /// Burning or being extinguished
    active: Vec<bool>,
    burning: Vec<bool>,
}

impl SpatialIndex {
    /// Create an empty index for the configured board
    pub fn new(config: &ResponseConfig) -> Self {
        let coords = CoordIndex::new(config.board_width, config.board_height);
        Self {
            coords,
            surroundings_window: config.surroundings_window,
            testing_window: config.testing_window,
            active: vec![false; coords.len()],
            burning: vec![false; coords.len()],
        }
    }

    /// Check a snapshot matches the configured board dimensions
    ///
    /// # Errors
    /// Returns [`ResponseError::DimensionMismatch`] when it does not.
    pub fn check_dimensions(&self, board: &Board) -> Result<(), ResponseError> {
        if board.width() == self.coords.width() && board.height() == self.coords.height() {
            Ok(())
        } else {
            Err(ResponseError::DimensionMismatch {
                expected_width: self.coords.width(),
                expected_height: self.coords.height(),
                actual_width: board.width(),
                actual_height: board.height(),
            })
        }
    }

    /// Rebuild the masks from a new snapshot
    ///
    /// # Errors
    /// Returns [`ResponseError::DimensionMismatch`] if the snapshot has the
    /// wrong size; the index is left unchanged.
    pub fn refresh(&mut self, board: &Board) -> Result<(), ResponseError> {
        self.check_dimensions(board)?;
        for (index, cell) in board.cells().iter().enumerate() {
            self.active[index] = cell.is_burning_or_extinguishing();
            self.burning[index] = cell.being_burned;
        }
        Ok(())
    }

    /// Packed-index arithmetic for the indexed board
    pub fn coords(&self) -> CoordIndex {
        self.coords
    }

    /// Cells in the wide surroundings window of `index`, center included
    pub fn surroundings(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.coords.window_indices(index, self.surroundings_window)
    }

    /// Cells in the narrow testing window of `index`, center included
    pub fn testing(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.coords.window_indices(index, self.testing_window)
    }

    /// Cells adjacent to `index` under the testing window, center excluded
    pub fn adjacent(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.testing(index).filter(move |&n| n != index)
    }

    /// Whether the cell was burning or being extinguished in the last snapshot
    pub fn is_active(&self, index: usize) -> bool {
        self.active.get(index).copied().unwrap_or(false)
    }

    /// Whether the cell was burning in the last snapshot
    pub fn is_burning(&self, index: usize) -> bool {
        self.burning.get(index).copied().unwrap_or(false)
    }

    /// Active cells in ascending index order
    pub fn active_cells(&self) -> impl Iterator<Item = usize> + '_ {
        self.active
            .iter()
            .enumerate()
            .filter_map(|(index, &active)| active.then_some(index))
    }

    /// Breadth-first walk of the cells connected to `seed` under testing
    /// window adjacency
    ///
    /// Only cells accepted by `is_member` and not yet in `visited` are
    /// added. The seed itself is always included and every cell returned is
    /// inserted into `visited`.
    pub fn connected_region<F>(
        &self,
        seed: usize,
        is_member: F,
        visited: &mut FxHashSet<usize>,
    ) -> Vec<usize>
    where
        F: Fn(usize) -> bool,
    {
        let mut region = Vec::new();
        let mut queue = VecDeque::new();
        visited.insert(seed);
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            region.push(current);
            for next in self.adjacent(current) {
                if !visited.contains(&next) && is_member(next) {
                    visited.insert(next);
                    queue.push_back(next);
                }
            }
        }
        region
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::{GridCoord, Terrain};

    fn config(width: u32, height: u32) -> ResponseConfig {
        ResponseConfig::with_board(width, height)
    }

    #[test]
    fn test_refresh_rejects_wrong_dimensions() {
        let mut spatial = SpatialIndex::new(&config(10, 10));
        let board = Board::new(10, 9, Terrain::Forest);
        assert_eq!(
            spatial.refresh(&board),
            Err(ResponseError::DimensionMismatch {
                expected_width: 10,
                expected_height: 10,
                actual_width: 10,
                actual_height: 9,
            })
        );
    }

    #[test]
    fn test_masks_follow_snapshot() {
        let mut spatial = SpatialIndex::new(&config(5, 5));
        let mut board = Board::new(5, 5, Terrain::Forest);
        board.ignite(GridCoord::new(1, 1), 2.0).unwrap();
        board.cell_at_mut(GridCoord::new(3, 3)).unwrap().being_extinguished = true;
        spatial.refresh(&board).unwrap();

        assert!(spatial.is_burning(6));
        assert!(spatial.is_active(6));
        assert!(!spatial.is_burning(18));
        assert!(spatial.is_active(18));
        assert_eq!(spatial.active_cells().collect::<Vec<_>>(), vec![6, 18]);
    }

    #[test]
    fn test_diagonal_cells_are_connected() {
        let mut spatial = SpatialIndex::new(&config(6, 6));
        let mut board = Board::new(6, 6, Terrain::Forest);
        for (row, col) in [(0, 0), (1, 1), (2, 2), (4, 4)] {
            board.ignite(GridCoord::new(row, col), 1.0).unwrap();
        }
        spatial.refresh(&board).unwrap();

        let mut visited = FxHashSet::default();
        let mut region = spatial.connected_region(0, |i| spatial.is_active(i), &mut visited);
        region.sort_unstable();
        assert_eq!(region, vec![0, 7, 14]);
        assert!(!visited.contains(&28));
    }

    #[test]
    fn test_surroundings_wider_than_testing() {
        let spatial = SpatialIndex::new(&config(10, 10));
        assert_eq!(spatial.surroundings(55).count(), 25);
        assert_eq!(spatial.testing(55).count(), 9);
        assert_eq!(spatial.adjacent(55).count(), 8);
    }
}
