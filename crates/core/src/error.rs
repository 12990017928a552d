//! Error type shared by every stage of the response pipeline.

use serde::Serialize;

use crate::core_types::{GridCoord, ZoneId};

/// Errors raised by the measurement and response pipeline
///
/// Lookup misses that are allowed to fail (a sensor anchor outside the board,
/// a delta with nowhere to go) are logged and skipped instead of surfacing here.
/// Variants below are either configuration faults or mandatory lookups whose
/// failure means an internal invariant was broken for the affected zone.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum ResponseError {
    /// A configuration value is out of its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The board snapshot does not match the configured dimensions
    #[error("board is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    DimensionMismatch {
        /// Configured width
        expected_width: u32,
        /// Configured height
        expected_height: u32,
        /// Width of the supplied snapshot
        actual_width: u32,
        /// Height of the supplied snapshot
        actual_height: u32,
    },

    /// A cell id could not be parsed as `row:col`
    #[error("malformed cell id '{0}'")]
    MalformedCellId(String),

    /// A cell id parsed but lies outside the board
    #[error("cell {0} lies outside the board")]
    CellOutOfBounds(GridCoord),

    /// The allocator selected a zone but the controller pool is exhausted
    #[error("no free controller available for zone {0}")]
    NoFreeController(ZoneId),

    /// A lock guarding tick state was poisoned by a panic in another thread
    #[error("lock '{0}' was poisoned by a panic in another thread")]
    LockPoisoned(&'static str),
}
