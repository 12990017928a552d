//! Suppression agents
//!
//! Two kinds of agents work a fire:
//! - **Controllers** supervise one zone each
//! - **Firefighters** are bound to a zone and placed on one of its cells
//!
//! Agents are created once with the pool and only ever change binding.

use serde::{Deserialize, Serialize};

use crate::core_types::{GridCoord, ZoneId};

/// Worker agent bound to a zone and placed on one of its border cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirefighterAgent {
    pub(crate) id: usize,
    pub(crate) busy: bool,
    pub(crate) zone: Option<ZoneId>,
    pub(crate) cell: Option<GridCoord>,
}

impl FirefighterAgent {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            busy: false,
            zone: None,
            cell: None,
        }
    }

    /// Agent id
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether the agent is bound to a zone
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Zone the agent works for
    pub fn zone(&self) -> Option<ZoneId> {
        self.zone
    }

    /// Cell the agent is currently extinguishing
    pub fn cell(&self) -> Option<GridCoord> {
        self.cell
    }

    pub(crate) fn bind(&mut self, zone: ZoneId) {
        self.busy = true;
        self.zone = Some(zone);
        self.cell = None;
    }

    pub(crate) fn release(&mut self) {
        self.busy = false;
        self.zone = None;
        self.cell = None;
    }
}

/// Supervisor agent bound 1:1 to an actively managed zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerAgent {
    pub(crate) id: usize,
    pub(crate) busy: bool,
    pub(crate) zone: Option<ZoneId>,
}

impl ControllerAgent {
    pub(crate) fn new(id: usize) -> Self {
        Self {
            id,
            busy: false,
            zone: None,
        }
    }

    /// Agent id
    pub fn id(&self) -> usize {
        self.id
    }

    /// Whether the controller supervises a zone
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Zone the controller supervises
    pub fn zone(&self) -> Option<ZoneId> {
        self.zone
    }

    pub(crate) fn bind(&mut self, zone: ZoneId) {
        self.busy = true;
        self.zone = Some(zone);
    }

    pub(crate) fn release(&mut self) {
        self.busy = false;
        self.zone = None;
    }
}
