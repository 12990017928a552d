//! Board snapshot: a row-major grid of cells
//!
//! The board is handed to the service by the external simulation each tick.
//! String `row:col` ids only appear at the snapshot boundary
//! ([`Board::from_snapshots`], [`Board::snapshots`]).

use serde::{Deserialize, Serialize};

use crate::core_types::{Cell, CoordIndex, GridCoord, Terrain};
use crate::error::ResponseError;

/// One cell of an external snapshot, keyed by its `row:col` id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Cell id, `row:col`
    pub id: String,
    /// Cell state
    #[serde(flatten)]
    pub cell: Cell,
}

/// Board snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Board {
    /// Create a board filled with unburnt cells of one terrain
    pub fn new(width: u32, height: u32, terrain: Terrain) -> Self {
        let len = CoordIndex::new(width, height).len();
        Self {
            width,
            height,
            cells: vec![Cell::new(terrain); len],
        }
    }

    /// Build a board from external snapshots
    ///
    /// Cells missing from the snapshot list stay default forest. Later
    /// entries for the same id replace earlier ones.
    ///
    /// # Errors
    /// Fails on the first malformed or out-of-bounds cell id.
    pub fn from_snapshots<I>(width: u32, height: u32, snapshots: I) -> Result<Self, ResponseError>
    where
        I: IntoIterator<Item = CellSnapshot>,
    {
        let mut board = Self::new(width, height, Terrain::default());
        let coords = board.coords();
        for snapshot in snapshots {
            let index = coords.parse(&snapshot.id)?;
            board.cells[index] = snapshot.cell;
        }
        Ok(board)
    }

    /// Export every cell with its `row:col` id, in row-major order
    pub fn snapshots(&self) -> Vec<CellSnapshot> {
        let coords = self.coords();
        self.cells
            .iter()
            .enumerate()
            .map(|(index, cell)| CellSnapshot {
                id: coords.coord(index).to_string(),
                cell: cell.clone(),
            })
            .collect()
    }

    /// Board width in cells
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Board height in cells
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed-index arithmetic for this board
    pub fn coords(&self) -> CoordIndex {
        CoordIndex::new(self.width, self.height)
    }

    /// Cell at a packed index
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// Mutable cell at a packed index
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.cells.get_mut(index)
    }

    /// Cell at a coordinate
    pub fn cell_at(&self, coord: GridCoord) -> Option<&Cell> {
        self.coords().index(coord).and_then(|i| self.cells.get(i))
    }

    /// Mutable cell at a coordinate
    pub fn cell_at_mut(&mut self, coord: GridCoord) -> Option<&mut Cell> {
        let index = self.coords().index(coord)?;
        self.cells.get_mut(index)
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// All cells in row-major order, mutably
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Ignite the cell at `coord` with the given fire speed
    ///
    /// # Errors
    /// Returns [`ResponseError::CellOutOfBounds`] for coordinates off the board.
    pub fn ignite(&mut self, coord: GridCoord, fire_speed: f64) -> Result<(), ResponseError> {
        let cell = self
            .cell_at_mut(coord)
            .ok_or(ResponseError::CellOutOfBounds(coord))?;
        cell.ignite(fire_speed);
        Ok(())
    }

    /// Number of cells currently burning
    pub fn burning_count(&self) -> usize {
        self.cells.iter().filter(|c| c.being_burned).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_ingress_and_egress() {
        let mut burning = Cell::new(Terrain::Grassland);
        burning.ignite(1.6);
        let board = Board::from_snapshots(
            4,
            3,
            vec![CellSnapshot {
                id: "2:1".to_string(),
                cell: burning.clone(),
            }],
        )
        .unwrap();

        assert_eq!(board.cell_at(GridCoord::new(2, 1)), Some(&burning));
        assert_eq!(board.burning_count(), 1);

        let snapshots = board.snapshots();
        assert_eq!(snapshots.len(), 12);
        assert_eq!(snapshots[9].id, "2:1");
        assert!(snapshots[9].cell.being_burned);
    }

    #[test]
    fn test_snapshot_rejects_bad_ids() {
        let bad = |id: &str| {
            Board::from_snapshots(
                4,
                3,
                vec![CellSnapshot {
                    id: id.to_string(),
                    cell: Cell::default(),
                }],
            )
        };
        assert!(matches!(bad("x"), Err(ResponseError::MalformedCellId(_))));
        assert!(matches!(bad("3:0"), Err(ResponseError::CellOutOfBounds(_))));
    }

    #[test]
    fn test_ignite_off_board() {
        let mut board = Board::new(2, 2, Terrain::Forest);
        assert!(board.ignite(GridCoord::new(5, 5), 1.0).is_err());
        board.ignite(GridCoord::new(1, 1), 1.0).unwrap();
        assert_eq!(board.burning_count(), 1);
    }
}
