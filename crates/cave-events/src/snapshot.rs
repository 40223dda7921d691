//! Snapshot Types
//!
//! Read-only projection of a session for rendering hosts. Only what the
//! player has discovered is present; undiscovered cells carry no marker.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Cell, Marker, SessionState};

/// Explorer status snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerSnapshot {
    pub position: Cell,
    pub lives: u32,
    pub has_arrow: bool,
    pub has_treasure: bool,
}

/// Full player-facing view of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub turn: u64,
    pub grid_size: usize,
    /// Row-major markers; `None` for cells the player has not discovered.
    pub cells: Vec<Vec<Option<Marker>>>,
    pub explorer: ExplorerSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_notification: Option<String>,
    pub state: SessionState,
    #[serde(default)]
    pub heard_scream: bool,
}

impl SessionView {
    /// Marker visible at `cell`, if discovered.
    pub fn marker_at(&self, cell: Cell) -> Option<Marker> {
        self.cells
            .get(cell.row)
            .and_then(|row| row.get(cell.col))
            .copied()
            .flatten()
    }

    /// Returns true if the player has discovered `cell`.
    pub fn is_revealed(&self, cell: Cell) -> bool {
        self.marker_at(cell).is_some()
    }

    /// Number of discovered cells.
    pub fn revealed_count(&self) -> usize {
        self.cells.iter().flatten().filter(|m| m.is_some()).count()
    }
}
