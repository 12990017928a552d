//! Fire zone detection
//!
//! Groups burning cells into zones and keeps their identity stable across
//! ticks, resolving merges and retiring zones that burnt out.

pub mod zone;
pub mod zone_detector;

pub use zone::Zone;
pub use zone_detector::{Detection, RetiredZone, ZoneDetector, ZoneMerge};
