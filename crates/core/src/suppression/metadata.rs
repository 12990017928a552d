//! Per-zone allocation snapshots and the hysteresis that reads them

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core_types::ZoneId;

/// Firefighter count above which a zone counts as large
const LARGE_ZONE_FIREFIGHTERS: usize = 20;

/// A large zone keeps asking while its optimal count is at least this share
/// of what it already has
const LARGE_ZONE_NEED_RATIO: f64 = 0.3;

/// Whether a zone wants more firefighters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceNeed {
    /// Never allocated yet
    Start,
    /// Under-resourced, top up when possible
    Yes,
    /// Satisfied
    No,
}

/// Allocation snapshot of one zone for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    /// Zone the snapshot describes
    pub zone_id: ZoneId,
    /// Firefighters allocated to the zone
    pub firefighters_count: usize,
    /// Firefighters needed to fully cover its burning cells
    pub optimal_firefighter_count: usize,
    /// Sum of fire speeds over its burning cells
    pub danger_value: f64,
    /// Need flag after this tick
    pub additional_resource_needed: ResourceNeed,
}

impl ResourceMetadata {
    /// Additional firefighters needed to reach the optimal count (may be
    /// negative)
    pub fn needed_additional(&self) -> i64 {
        self.optimal_firefighter_count as i64 - self.firefighters_count as i64
    }

    /// Add `added` firefighters and re-evaluate the need flag
    pub fn add_firefighters(&mut self, added: usize) {
        self.firefighters_count += added;
        self.additional_resource_needed =
            if self.firefighters_count >= self.optimal_firefighter_count {
                ResourceNeed::No
            } else {
                ResourceNeed::Yes
            };
    }
}

/// Bounded allocation history of one zone
///
/// Keeps the latest snapshot plus the optimal counts of the last
/// `window` snapshots, which is all the hysteresis reads.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneHistory {
    latest: ResourceMetadata,
    optimal_counts: VecDeque<usize>,
    window: usize,
    recorded: usize,
}

impl ZoneHistory {
    /// Start a history with its first snapshot
    pub fn new(first: ResourceMetadata, window: usize) -> Self {
        let mut optimal_counts = VecDeque::with_capacity(window);
        optimal_counts.push_back(first.optimal_firefighter_count);
        Self {
            latest: first,
            optimal_counts,
            window,
            recorded: 1,
        }
    }

    /// Most recent snapshot
    pub fn latest(&self) -> &ResourceMetadata {
        &self.latest
    }

    /// Number of snapshots ever recorded
    pub fn recorded(&self) -> usize {
        self.recorded
    }

    /// Optimal counts of the retained snapshots, oldest first
    pub fn optimal_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.optimal_counts.iter().copied()
    }

    /// Append a snapshot
    pub fn push(&mut self, snapshot: ResourceMetadata) {
        if self.optimal_counts.len() == self.window {
            self.optimal_counts.pop_front();
        }
        self.optimal_counts.push_back(snapshot.optimal_firefighter_count);
        self.latest = snapshot;
        self.recorded += 1;
    }

    /// Replace the latest snapshot in place
    ///
    /// Used when a later pass of the same tick changes the allocation.
    pub fn amend_latest(&mut self, snapshot: ResourceMetadata) {
        if let Some(last) = self.optimal_counts.back_mut() {
            *last = snapshot.optimal_firefighter_count;
        }
        self.latest = snapshot;
    }

    /// Fold a merged zone's latest allocation into this one
    ///
    /// The need flag goes to `Yes` so the next allocation re-evaluates it.
    pub fn absorb(&mut self, absorbed: &ResourceMetadata) {
        self.latest.firefighters_count += absorbed.firefighters_count;
        self.latest.additional_resource_needed = ResourceNeed::Yes;
    }

    /// Hysteresis decision for a zone whose optimal count is now `optimal`
    ///
    /// - `Start` without history
    /// - previous flag while fewer than `window` snapshots exist
    /// - `Yes` stays `Yes`
    /// - `Yes` for a large zone whose need is still high
    /// - `Yes` if the optimal count has risen strictly over the window
    /// - `No` otherwise
    pub fn assess(history: Option<&ZoneHistory>, optimal: usize) -> ResourceNeed {
        let Some(history) = history else {
            return ResourceNeed::Start;
        };
        let previous = history.latest.additional_resource_needed;
        if history.recorded < history.window || previous == ResourceNeed::Yes {
            return previous;
        }

        let last_count = history.latest.firefighters_count;
        if last_count > LARGE_ZONE_FIREFIGHTERS
            && last_count as f64 * LARGE_ZONE_NEED_RATIO <= optimal as f64
        {
            return ResourceNeed::Yes;
        }

        let escalating = history
            .optimal_counts
            .iter()
            .chain(std::iter::once(&optimal))
            .collect::<Vec<_>>()
            .windows(2)
            .all(|pair| pair[1] > pair[0]);
        if escalating {
            ResourceNeed::Yes
        } else {
            ResourceNeed::No
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::GridCoord;

    fn snapshot(count: usize, optimal: usize, need: ResourceNeed) -> ResourceMetadata {
        ResourceMetadata {
            zone_id: ZoneId(GridCoord::new(4, 4)),
            firefighters_count: count,
            optimal_firefighter_count: optimal,
            danger_value: 1.0,
            additional_resource_needed: need,
        }
    }

    fn history(entries: &[(usize, usize, ResourceNeed)]) -> ZoneHistory {
        let (first, rest) = entries.split_first().unwrap();
        let mut history = ZoneHistory::new(snapshot(first.0, first.1, first.2), 4);
        for &(count, optimal, need) in rest {
            history.push(snapshot(count, optimal, need));
        }
        history
    }

    #[test]
    fn test_no_history_starts() {
        assert_eq!(ZoneHistory::assess(None, 5), ResourceNeed::Start);
    }

    #[test]
    fn test_short_history_keeps_flag() {
        let h = history(&[(3, 3, ResourceNeed::No), (3, 9, ResourceNeed::No)]);
        assert_eq!(ZoneHistory::assess(Some(&h), 30), ResourceNeed::No);
    }

    #[test]
    fn test_yes_is_sticky() {
        let h = history(&[
            (3, 5, ResourceNeed::Yes),
            (3, 5, ResourceNeed::Yes),
            (3, 5, ResourceNeed::Yes),
            (3, 5, ResourceNeed::Yes),
        ]);
        // Optimal dips below the allocation, flag still holds
        assert_eq!(ZoneHistory::assess(Some(&h), 1), ResourceNeed::Yes);
    }

    #[test]
    fn test_escalating_fire_asks_for_more() {
        let h = history(&[
            (3, 3, ResourceNeed::No),
            (3, 4, ResourceNeed::No),
            (3, 5, ResourceNeed::No),
            (3, 6, ResourceNeed::No),
        ]);
        assert_eq!(ZoneHistory::assess(Some(&h), 7), ResourceNeed::Yes);
        assert_eq!(ZoneHistory::assess(Some(&h), 6), ResourceNeed::No);
    }

    #[test]
    fn test_large_zone_with_high_need() {
        let h = history(&[
            (22, 22, ResourceNeed::No),
            (22, 22, ResourceNeed::No),
            (22, 22, ResourceNeed::No),
            (22, 22, ResourceNeed::No),
        ]);
        // 22 * 0.3 = 6.6
        assert_eq!(ZoneHistory::assess(Some(&h), 7), ResourceNeed::Yes);
        assert_eq!(ZoneHistory::assess(Some(&h), 6), ResourceNeed::No);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut h = history(&[(1, 1, ResourceNeed::No)]);
        for optimal in 2..10 {
            h.push(snapshot(1, optimal, ResourceNeed::No));
        }
        assert_eq!(h.recorded(), 9);
        assert_eq!(h.optimal_counts().collect::<Vec<_>>(), vec![6, 7, 8, 9]);
        assert_eq!(h.latest().optimal_firefighter_count, 9);
    }

    #[test]
    fn test_add_firefighters_uses_at_least_optimal() {
        let mut m = snapshot(3, 7, ResourceNeed::Start);
        m.add_firefighters(3);
        assert_eq!(m.additional_resource_needed, ResourceNeed::Yes);
        m.add_firefighters(1);
        assert_eq!(m.additional_resource_needed, ResourceNeed::No);
        assert_eq!(m.needed_additional(), 0);
    }
}
