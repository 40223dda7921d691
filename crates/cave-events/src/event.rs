//! Event Types
//!
//! One record per notable thing that happened during a turn, written as
//! JSON lines.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Action, Cell, Percepts};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnEventKind {
    /// The explorer stepped onto a new cell
    Moved,
    /// The explorer stepped into a pit and lost a life
    FellIntoPit,
    /// The live beast caught the explorer, who lost a life
    Devoured,
    /// The explorer was returned to the entrance after being hurt
    Respawned,
    /// The treasure was picked up
    TreasureTaken,
    /// The explorer reached the entrance with the treasure
    Escaped,
    /// The explorer lost the last life
    Died,
    /// The arrow killed the beast
    ArrowHit,
    /// The arrow left the grid without hitting anything
    ArrowMissed,
}

impl TurnEventKind {
    /// Returns true if the event ends the session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TurnEventKind::Escaped | TurnEventKind::Died)
    }
}

/// A logged turn event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEvent {
    pub event_id: String,
    pub session_id: Uuid,
    pub turn: u64,
    pub kind: TurnEventKind,
    pub action: Action,
    /// Explorer position once the event took effect
    pub cell: Cell,
    #[serde(default)]
    pub percepts: Percepts,
    /// Lives left once the event took effect
    pub lives: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
}

impl TurnEvent {
    /// Serializes the event as a single JSON line.
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates an event ID with the given sequence number.
pub fn generate_event_id(sequence: u64) -> String {
    format!("evt_{:08}", sequence)
}
