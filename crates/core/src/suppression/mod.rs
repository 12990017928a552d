//! Fire suppression resources
//!
//! Owns the two agent pools and everything that decides where they go:
//! - Per-zone allocation snapshots with hysteresis on the need flag
//! - Danger-weighted priorities over a batch of zones
//! - The multi-pass allocator
//! - Placement of a zone's firefighters on its border cells

pub mod agent;
pub mod allocator;
pub mod metadata;
pub mod pool;
pub mod priority;
pub mod supervisor;

pub use agent::{ControllerAgent, FirefighterAgent};
pub use allocator::{AllocationOutcome, ResourceAllocator};
pub use metadata::{ResourceMetadata, ResourceNeed, ZoneHistory};
pub use pool::ResourcePool;
pub use priority::{PriorityCalculator, ZonePriority};
pub use supervisor::ZoneSupervisor;
