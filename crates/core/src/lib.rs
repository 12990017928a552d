//! Wildfire Measurement and Response Core
//!
//! Detects fire zones on a grid snapshot and allocates two scarce agent pools
//! to contain them: controllers that supervise one zone each, and
//! firefighters placed on a zone's border cells.
//!
//! ## Pipeline
//!
//! Every tick the orchestrator:
//! - Classifies danger through sensor anchors and regroups testable cells
//! - Groups burning cells into zones whose ids stay stable across ticks
//! - Runs a multi-pass, danger-weighted allocator with hysteresis on each
//!   zone's need for more firefighters
//! - Spreads each zone's firefighters over its border cells
//!
//! Fire physics, terrain generation and transport are external
//! collaborators; the core only reads and annotates the board it is given.

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;

// Pipeline stages
pub mod classification;
pub mod detection;
pub mod grid;
pub mod simulation;
pub mod suppression;

// Re-export core types
pub use config::{ClassificationThresholds, ResponseConfig};
pub use core_types::{
    AgentMarkers, AnchorId, Cell, CoordIndex, FireDangerRating, FireTier, GridCoord, Terrain,
    TestableGroupId, ZoneId,
};
pub use error::ResponseError;

// Re-export pipeline types
pub use classification::{
    locate_anchors, AnchorGrouping, AnchorLayout, ClassificationDelta, DangerClassifier,
    SensorAnalyst,
};
pub use detection::{Detection, RetiredZone, Zone, ZoneDetector, ZoneMerge};
pub use grid::{Board, CellSnapshot, SpatialIndex};
pub use simulation::{
    ExtinguishedCellReset, IterationOrchestrator, ResetCollaborator, SerializedResponse,
    TickReport,
};
pub use suppression::{
    AllocationOutcome, ControllerAgent, FirefighterAgent, PriorityCalculator, ResourceAllocator,
    ResourceMetadata, ResourceNeed, ResourcePool, ZoneHistory, ZonePriority, ZoneSupervisor,
};
