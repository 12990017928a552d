//! Agent pool bookkeeping
//!
//! The pool owns every controller and firefighter for the lifetime of the
//! service. Callers get read-only views and a narrow set of bind/release
//! operations; the agent lists themselves are never handed out mutably.

use tracing::debug;

use crate::core_types::{GridCoord, ZoneId};
use crate::error::ResponseError;
use crate::suppression::{ControllerAgent, FirefighterAgent};

/// Fixed-capacity pools of controllers and firefighters
#[derive(Debug, Clone)]
pub struct ResourcePool {
    firefighters: Vec<FirefighterAgent>,
    controllers: Vec<ControllerAgent>,
}

impl ResourcePool {
    /// Create a pool with the given capacities, every agent free
    pub fn new(firefighters: usize, controllers: usize) -> Self {
        Self {
            firefighters: (0..firefighters).map(FirefighterAgent::new).collect(),
            controllers: (0..controllers).map(ControllerAgent::new).collect(),
        }
    }

    /// Firefighter pool capacity
    pub fn firefighter_capacity(&self) -> usize {
        self.firefighters.len()
    }

    /// Controller pool capacity
    pub fn controller_capacity(&self) -> usize {
        self.controllers.len()
    }

    /// Firefighters not bound to any zone
    pub fn free_firefighters(&self) -> usize {
        self.firefighters.iter().filter(|a| !a.busy).count()
    }

    /// Firefighters bound to a zone
    pub fn busy_firefighters(&self) -> usize {
        self.firefighter_capacity() - self.free_firefighters()
    }

    /// Controllers not supervising any zone
    pub fn free_controllers(&self) -> usize {
        self.controllers.iter().filter(|a| !a.busy).count()
    }

    /// Controllers supervising a zone
    pub fn busy_controllers(&self) -> usize {
        self.controller_capacity() - self.free_controllers()
    }

    /// Every firefighter, free or busy
    pub fn firefighters(&self) -> impl Iterator<Item = &FirefighterAgent> {
        self.firefighters.iter()
    }

    /// Every controller, free or busy
    pub fn controllers(&self) -> impl Iterator<Item = &ControllerAgent> {
        self.controllers.iter()
    }

    /// Firefighters bound to `zone`
    pub fn firefighters_of(&self, zone: ZoneId) -> impl Iterator<Item = &FirefighterAgent> {
        self.firefighters
            .iter()
            .filter(move |a| a.busy && a.zone == Some(zone))
    }

    /// Number of firefighters bound to `zone`
    pub fn firefighter_count(&self, zone: ZoneId) -> usize {
        self.firefighters_of(zone).count()
    }

    /// Controller supervising `zone`, if any
    pub fn controller_of(&self, zone: ZoneId) -> Option<&ControllerAgent> {
        self.controllers
            .iter()
            .find(|a| a.busy && a.zone == Some(zone))
    }

    /// Firefighters currently placed on `cell`
    pub fn assigned_to_cell(&self, cell: GridCoord) -> usize {
        self.firefighters
            .iter()
            .filter(|a| a.busy && a.cell == Some(cell))
            .count()
    }

    /// Bind up to `count` free firefighters to `zone`
    ///
    /// Returns how many were bound, which is less than `count` when the pool
    /// runs dry. Newly bound agents carry no cell placement.
    pub fn bind_firefighters(&mut self, count: usize, zone: ZoneId) -> usize {
        let mut bound = 0;
        for agent in self.firefighters.iter_mut().filter(|a| !a.busy).take(count) {
            agent.bind(zone);
            bound += 1;
        }
        if bound > 0 {
            debug!("Bound {} firefighters to zone {}", bound, zone);
        }
        bound
    }

    /// Bind a free controller to `zone`
    ///
    /// A zone that already has a controller keeps it.
    ///
    /// # Errors
    /// Returns [`ResponseError::NoFreeController`] when every controller is busy.
    pub fn bind_controller(&mut self, zone: ZoneId) -> Result<usize, ResponseError> {
        if let Some(existing) = self.controller_of(zone) {
            return Ok(existing.id);
        }
        let agent = self
            .controllers
            .iter_mut()
            .find(|a| !a.busy)
            .ok_or(ResponseError::NoFreeController(zone))?;
        agent.bind(zone);
        debug!("Controller {} bound to zone {}", agent.id, zone);
        Ok(agent.id)
    }

    /// Free up to `count` firefighters of `zone`, highest agent id first
    ///
    /// Returns how many were freed.
    pub fn release_firefighters(&mut self, zone: ZoneId, count: usize) -> usize {
        let mut released = 0;
        for agent in self
            .firefighters
            .iter_mut()
            .rev()
            .filter(|a| a.busy && a.zone == Some(zone))
            .take(count)
        {
            agent.release();
            released += 1;
        }
        released
    }

    /// Free every agent bound to `zone`
    ///
    /// Returns the number of firefighters freed.
    pub fn release_zone(&mut self, zone: ZoneId) -> usize {
        let released = self.release_firefighters(zone, usize::MAX);
        for agent in self.controllers.iter_mut().filter(|a| a.zone == Some(zone)) {
            agent.release();
        }
        released
    }

    /// Rebind every agent of `from` to `to` without freeing firefighters
    ///
    /// The controller of `from` is released when `to` already has one,
    /// otherwise it moves over so the surviving zone stays supervised.
    pub fn transfer_zone(&mut self, from: ZoneId, to: ZoneId) {
        let mut moved = 0;
        for agent in self.firefighters.iter_mut().filter(|a| a.zone == Some(from)) {
            agent.zone = Some(to);
            agent.cell = None;
            moved += 1;
        }

        let survivor_supervised = self.controller_of(to).is_some();
        for agent in self.controllers.iter_mut().filter(|a| a.zone == Some(from)) {
            if survivor_supervised {
                agent.release();
            } else {
                agent.zone = Some(to);
            }
        }
        debug!("Moved {} firefighters from zone {} to zone {}", moved, from, to);
    }

    /// Place the firefighters of `zone` on cells
    ///
    /// Every previous placement for the zone is cleared first, then agents are
    /// handed out in `placements` order. Placements beyond the zone's
    /// firefighters are ignored.
    pub fn assign_cells(&mut self, zone: ZoneId, placements: &[(GridCoord, usize)]) {
        let mut agents: Vec<&mut FirefighterAgent> = self
            .firefighters
            .iter_mut()
            .filter(|a| a.busy && a.zone == Some(zone))
            .collect();
        for agent in &mut agents {
            agent.cell = None;
        }

        let mut slots = agents.into_iter();
        for &(cell, count) in placements {
            for agent in slots.by_ref().take(count) {
                agent.cell = Some(cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(row: u32, col: u32) -> ZoneId {
        ZoneId(GridCoord::new(row, col))
    }

    #[test]
    fn test_bind_is_bounded_by_free_agents() {
        let mut pool = ResourcePool::new(10, 2);
        assert_eq!(pool.bind_firefighters(6, zone(1, 1)), 6);
        assert_eq!(pool.bind_firefighters(6, zone(2, 2)), 4);
        assert_eq!(pool.free_firefighters(), 0);
        assert_eq!(pool.firefighter_count(zone(1, 1)), 6);
        assert_eq!(pool.firefighter_count(zone(2, 2)), 4);
    }

    #[test]
    fn test_controller_binding() {
        let mut pool = ResourcePool::new(0, 1);
        let id = pool.bind_controller(zone(1, 1)).unwrap();
        assert_eq!(pool.bind_controller(zone(1, 1)), Ok(id));
        assert_eq!(
            pool.bind_controller(zone(2, 2)),
            Err(ResponseError::NoFreeController(zone(2, 2)))
        );
        assert_eq!(pool.free_controllers(), 0);
    }

    #[test]
    fn test_release_zone_frees_everything() {
        let mut pool = ResourcePool::new(5, 2);
        pool.bind_firefighters(3, zone(1, 1));
        pool.bind_controller(zone(1, 1)).unwrap();
        pool.assign_cells(zone(1, 1), &[(GridCoord::new(1, 1), 3)]);

        assert_eq!(pool.release_zone(zone(1, 1)), 3);
        assert_eq!(pool.free_firefighters(), 5);
        assert_eq!(pool.free_controllers(), 2);
        assert_eq!(pool.assigned_to_cell(GridCoord::new(1, 1)), 0);
    }

    #[test]
    fn test_transfer_keeps_firefighters_busy() {
        let mut pool = ResourcePool::new(10, 3);
        pool.bind_firefighters(4, zone(0, 0));
        pool.bind_controller(zone(0, 0)).unwrap();
        pool.bind_firefighters(3, zone(2, 0));
        pool.bind_controller(zone(2, 0)).unwrap();

        pool.transfer_zone(zone(2, 0), zone(0, 0));
        assert_eq!(pool.firefighter_count(zone(0, 0)), 7);
        assert_eq!(pool.firefighter_count(zone(2, 0)), 0);
        assert_eq!(pool.busy_firefighters(), 7);
        assert_eq!(pool.busy_controllers(), 1);
        assert!(pool.controller_of(zone(0, 0)).is_some());
    }

    #[test]
    fn test_transfer_moves_controller_to_unsupervised_survivor() {
        let mut pool = ResourcePool::new(4, 2);
        pool.bind_firefighters(2, zone(3, 3));
        pool.bind_controller(zone(3, 3)).unwrap();

        pool.transfer_zone(zone(3, 3), zone(1, 1));
        assert!(pool.controller_of(zone(1, 1)).is_some());
        assert_eq!(pool.busy_controllers(), 1);
    }

    #[test]
    fn test_assign_cells_replaces_previous_placement() {
        let mut pool = ResourcePool::new(6, 1);
        pool.bind_firefighters(5, zone(4, 4));
        pool.assign_cells(zone(4, 4), &[(GridCoord::new(4, 4), 2), (GridCoord::new(4, 5), 3)]);
        assert_eq!(pool.assigned_to_cell(GridCoord::new(4, 5)), 3);

        pool.assign_cells(zone(4, 4), &[(GridCoord::new(4, 6), 4)]);
        assert_eq!(pool.assigned_to_cell(GridCoord::new(4, 4)), 0);
        assert_eq!(pool.assigned_to_cell(GridCoord::new(4, 5)), 0);
        assert_eq!(pool.assigned_to_cell(GridCoord::new(4, 6)), 4);
    }

    #[test]
    fn test_release_some_firefighters() {
        let mut pool = ResourcePool::new(8, 1);
        pool.bind_firefighters(8, zone(7, 7));
        assert_eq!(pool.release_firefighters(zone(7, 7), 7), 7);
        assert_eq!(pool.firefighter_count(zone(7, 7)), 1);
        assert_eq!(pool.free_firefighters(), 7);
    }
}
