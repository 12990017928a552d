//! Cell coordinates and windowed range math
//!
//! Cells are addressed externally by `row:col` ids. Inside the pipeline every
//! set and map is keyed by the packed index `row * width + col`; [`CoordIndex`]
//! converts between the two and answers the window, distance and border
//! questions the rest of the crate needs.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::ResponseError;

/// Row/column position of a cell on the board
///
/// Ordering is row-major, which matches the ordering of packed indices.
/// Serializes as its `row:col` id so it can key JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GridCoord {
    /// Row number (0 = top)
    pub row: u32,
    /// Column number (0 = left)
    pub col: u32,
}

impl GridCoord {
    /// Create a coordinate from row and column
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Euclidean distance between two cells, in cells
    pub fn distance(self, other: GridCoord) -> f64 {
        let dr = f64::from(self.row) - f64::from(other.row);
        let dc = f64::from(self.col) - f64::from(other.col);
        dr.hypot(dc)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.col)
    }
}

impl FromStr for GridCoord {
    type Err = ResponseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ResponseError::MalformedCellId(s.to_string());
        let (row, col) = s.split_once(':').ok_or_else(malformed)?;
        let row = row.trim().parse().map_err(|_| malformed())?;
        let col = col.trim().parse().map_err(|_| malformed())?;
        Ok(Self { row, col })
    }
}

impl From<GridCoord> for String {
    fn from(coord: GridCoord) -> Self {
        coord.to_string()
    }
}

impl TryFrom<String> for GridCoord {
    type Error = ResponseError;

    fn try_from(id: String) -> Result<Self, Self::Error> {
        id.parse()
    }
}

/// Number of steps a window of `size` cells reaches out from its center
///
/// A window of 3 covers one step each way, 5 covers two. Even sizes round the
/// half-size up before dropping the center (4 covers one step), and a size of
/// 0 or 1 covers the center only.
pub fn window_reach(size: u32) -> u32 {
    size.div_ceil(2).saturating_sub(1)
}

/// Packed-index arithmetic for a `width x height` board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordIndex {
    width: u32,
    height: u32,
}

impl CoordIndex {
    /// Create an index for a board of the given dimensions
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Board width in cells
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Board height in cells
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the board has no cells
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the coordinate lies on the board
    pub fn contains(&self, coord: GridCoord) -> bool {
        coord.row < self.height && coord.col < self.width
    }

    /// Packed index of a coordinate, or `None` if it lies outside the board
    pub fn index(&self, coord: GridCoord) -> Option<usize> {
        self.contains(coord)
            .then(|| coord.row as usize * self.width as usize + coord.col as usize)
    }

    /// Coordinate of a packed index
    pub fn coord(&self, index: usize) -> GridCoord {
        let width = self.width as usize;
        GridCoord {
            row: (index / width) as u32,
            col: (index % width) as u32,
        }
    }

    /// Parse a `row:col` id into a packed index, checking bounds
    ///
    /// # Errors
    /// Returns [`ResponseError::MalformedCellId`] for unparsable ids and
    /// [`ResponseError::CellOutOfBounds`] for ids off the board.
    pub fn parse(&self, id: &str) -> Result<usize, ResponseError> {
        let coord: GridCoord = id.parse()?;
        self.index(coord).ok_or(ResponseError::CellOutOfBounds(coord))
    }

    /// Row and column ranges of the window of `size` centred on `index`,
    /// clamped to the board
    pub fn window(&self, index: usize, size: u32) -> (RangeInclusive<u32>, RangeInclusive<u32>) {
        let center = self.coord(index);
        let reach = window_reach(size);
        let rows = center.row.saturating_sub(reach)
            ..=(center.row.saturating_add(reach)).min(self.height.saturating_sub(1));
        let cols = center.col.saturating_sub(reach)
            ..=(center.col.saturating_add(reach)).min(self.width.saturating_sub(1));
        (rows, cols)
    }

    /// Packed indices of every cell in the window, including the center
    pub fn window_indices(&self, index: usize, size: u32) -> impl Iterator<Item = usize> + '_ {
        let (rows, cols) = self.window(index, size);
        let width = self.width as usize;
        rows.flat_map(move |row| {
            cols.clone()
                .map(move |col| row as usize * width + col as usize)
        })
    }

    /// The four axis neighbours of a cell; `None` where the board ends
    pub fn axis_neighbours(&self, index: usize) -> [Option<usize>; 4] {
        let c = self.coord(index);
        let offset = |dr: i64, dc: i64| {
            let row = u32::try_from(i64::from(c.row) + dr).ok()?;
            let col = u32::try_from(i64::from(c.col) + dc).ok()?;
            self.index(GridCoord::new(row, col))
        };
        [offset(1, 0), offset(0, 1), offset(-1, 0), offset(0, -1)]
    }

    /// A cell is on the border of `members` unless all four axis neighbours
    /// are members. Neighbours off the board never count as members.
    pub fn is_border(&self, index: usize, members: &FxHashSet<usize>) -> bool {
        !self
            .axis_neighbours(index)
            .iter()
            .all(|n| n.is_some_and(|n| members.contains(&n)))
    }

    /// Euclidean distance between two packed indices, in cells
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        self.coord(a).distance(self.coord(b))
    }
}
