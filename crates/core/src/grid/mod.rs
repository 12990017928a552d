//! Board snapshot and spatial lookups

pub mod board;
pub mod spatial_index;

pub use board::{Board, CellSnapshot};
pub use spatial_index::SpatialIndex;
