//! Danger-weighted priority over a batch of competing zones

use std::cmp::Ordering;

use crate::core_types::ZoneId;
use crate::suppression::ResourceMetadata;

/// Priority of one zone within its batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZonePriority {
    /// Zone id
    pub zone_id: ZoneId,
    /// Share of the batch's total danger (0 when the batch total is 0)
    pub priority: f64,
    /// Optimal count minus the last allocated count (may be negative)
    pub needed_additional: i64,
}

impl ZonePriority {
    /// Firefighters this zone may take from a pass whose share base is
    /// `base`: the smaller of its need and its weighted share, never
    /// negative and never more than `free`
    pub fn allotment(&self, base: usize, free: usize) -> usize {
        let share = (base as f64 * self.priority).floor() as i64;
        let allotment = self.needed_additional.min(share).max(0) as usize;
        allotment.min(free)
    }
}

/// Priorities of a batch, ranked highest first
///
/// Ties rank by ascending zone id so the ranking is deterministic.
#[derive(Debug, Clone, Default)]
pub struct PriorityCalculator {
    ranked: Vec<ZonePriority>,
}

impl PriorityCalculator {
    /// Compute priorities over one batch of this tick's snapshots
    ///
    /// Each snapshot's `firefighters_count` is the count carried over from
    /// the zone's previous allocation.
    pub fn for_batch<'a, I>(batch: I) -> Self
    where
        I: IntoIterator<Item = &'a ResourceMetadata>,
    {
        let batch: Vec<&ResourceMetadata> = batch.into_iter().collect();
        let total: f64 = batch.iter().map(|m| m.danger_value).sum();

        let mut ranked: Vec<ZonePriority> = batch
            .iter()
            .map(|m| ZonePriority {
                zone_id: m.zone_id,
                priority: if total > 0.0 {
                    m.danger_value / total
                } else {
                    0.0
                },
                needed_additional: m.needed_additional(),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(Ordering::Equal)
                .then(a.zone_id.cmp(&b.zone_id))
        });
        Self { ranked }
    }

    /// Zones from highest to lowest priority
    pub fn ranked(&self) -> &[ZonePriority] {
        &self.ranked
    }

    /// Priority of one zone in the batch
    pub fn priority_of(&self, zone: ZoneId) -> Option<f64> {
        self.ranked
            .iter()
            .find(|p| p.zone_id == zone)
            .map(|p| p.priority)
    }
}
