//! Shared types for the cave hunt game.
//!
//! This crate contains pure data structures with no game logic. Hosts that
//! render or replay a session depend on it without pulling in the core.

pub mod action;
pub mod event;
pub mod grid;
pub mod percept;
pub mod snapshot;

pub use action::{Action, Outcome, SessionState};
pub use event::{generate_event_id, TurnEvent, TurnEventKind};
pub use grid::{Cell, Direction, Marker, ParseDirectionError};
pub use percept::{Percept, Percepts};
pub use snapshot::{ExplorerSnapshot, SessionView};
