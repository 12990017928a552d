//! Placement of a zone's firefighters on its border cells

use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::core_types::GridCoord;
use crate::detection::Zone;
use crate::grid::Board;
use crate::suppression::ResourcePool;

/// Distributes the firefighters bound to one zone across its border cells
///
/// Border cells are burning cells with at least one axis neighbour that is
/// not burning. Each gets `floor(speed / total_speed * allotment)`
/// firefighters. The remainder goes out one firefighter per cell, fastest
/// cell first, until it runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZoneSupervisor;

impl ZoneSupervisor {
    /// Place the zone's firefighters and update the board's
    /// `being_extinguished` flags
    ///
    /// Returns the `(cell, firefighters)` placements, fastest cell first.
    pub fn place(
        zone: &Zone,
        board: &mut Board,
        pool: &mut ResourcePool,
    ) -> Vec<(GridCoord, usize)> {
        let coords = board.coords();
        let allotment = pool.firefighter_count(zone.id());
        let burning: FxHashSet<usize> = zone.burning().iter().copied().collect();

        let mut border: Vec<(usize, f64)> = zone
            .burning()
            .iter()
            .filter(|&&i| coords.is_border(i, &burning))
            .map(|&i| (i, board.cell(i).map_or(0.0, |cell| cell.fire_speed)))
            .collect();
        border.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(b.0.cmp(&a.0))
        });

        let total: f64 = border.iter().map(|&(_, speed)| speed).sum();
        let mut shares: Vec<usize> = border
            .iter()
            .map(|&(_, speed)| {
                if total > 0.0 {
                    (speed / total * allotment as f64).floor() as usize
                } else {
                    0
                }
            })
            .collect();

        let mut remaining = allotment.saturating_sub(shares.iter().sum());
        for share in &mut shares {
            if remaining == 0 {
                break;
            }
            *share += 1;
            remaining -= 1;
        }

        let mut placements = Vec::with_capacity(border.len());
        let mut covered = FxHashSet::default();
        for (&(index, _), &share) in border.iter().zip(&shares) {
            if share > 0 {
                covered.insert(index);
                placements.push((coords.coord(index), share));
            }
        }
        for &index in zone.burning() {
            if let Some(cell) = board.cell_mut(index) {
                cell.being_extinguished = covered.contains(&index);
            }
        }
        pool.assign_cells(zone.id(), &placements);

        debug!(
            "Zone {}: {} firefighters on {} of {} border cells",
            zone.id(),
            allotment,
            placements.len(),
            border.len()
        );
        placements
    }
}
