//! Core types and utilities

pub mod cell;
pub mod coord;
pub mod ids;

pub use cell::{AgentMarkers, Cell, FireDangerRating, FireTier, Terrain};
pub use coord::{window_reach, CoordIndex, GridCoord};
pub use ids::{AnchorId, TestableGroupId, ZoneId};
