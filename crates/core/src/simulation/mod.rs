//! Per-tick pipeline
//!
//! `IterationOrchestrator` ties the stages together for every snapshot:
//! - Refresh the spatial index and classify danger
//! - Regroup anchors when classification changed
//! - Detect zones, resolve merges, retire burnt-out zones
//! - Allocate firefighters and controllers
//! - Place each zone's firefighters on its border cells

pub mod orchestrator;
pub mod reset;
pub mod single_flight;

pub use orchestrator::{IterationOrchestrator, TickReport};
pub use reset::{ExtinguishedCellReset, ResetCollaborator};
pub use single_flight::SerializedResponse;
