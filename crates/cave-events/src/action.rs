//! Action Types
//!
//! Commands a host or the exploration policy can submit for one turn.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Direction;

/// One turn's worth of intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "direction", rename_all = "snake_case")]
pub enum Action {
    /// Step one cell in a direction
    Move(Direction),
    /// Loose the single arrow in a direction
    Attack(Direction),
    /// Do nothing this turn
    Idle,
}

impl Action {
    pub fn is_idle(&self) -> bool {
        matches!(self, Action::Idle)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(direction) => write!(f, "move {}", direction),
            Action::Attack(direction) => write!(f, "shoot {}", direction),
            Action::Idle => f.write_str("idle"),
        }
    }
}

/// How a finished session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Left the cave carrying the treasure
    Victory,
    /// Lost the last life
    Defeat,
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Playing,
    GameOver(Outcome),
}

impl SessionState {
    pub fn is_over(&self) -> bool {
        matches!(self, SessionState::GameOver(_))
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            SessionState::Playing => None,
            SessionState::GameOver(outcome) => Some(*outcome),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Playing => f.write_str("playing"),
            SessionState::GameOver(Outcome::Victory) => f.write_str("game over (victory)"),
            SessionState::GameOver(Outcome::Defeat) => f.write_str("game over (defeat)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&Action::Attack(Direction::Left)).unwrap();
        assert_eq!(json, r#"{"type":"attack","direction":"left"}"#);

        let parsed: Action = serde_json::from_str(r#"{"type":"move","direction":"down"}"#).unwrap();
        assert_eq!(parsed, Action::Move(Direction::Down));

        let idle: Action = serde_json::from_str(r#"{"type":"idle"}"#).unwrap();
        assert!(idle.is_idle());
    }

    #[test]
    fn test_session_state() {
        assert!(!SessionState::Playing.is_over());
        assert_eq!(SessionState::Playing.outcome(), None);

        let won = SessionState::GameOver(Outcome::Victory);
        assert!(won.is_over());
        assert_eq!(won.outcome(), Some(Outcome::Victory));
        assert_eq!(won.to_string(), "game over (victory)");
    }
}
