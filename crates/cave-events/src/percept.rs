//! Percept Types
//!
//! Local sensory signals reported for a single cell.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single sensory signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Percept {
    /// A pit is orthogonally adjacent
    Breeze,
    /// The beast (alive or dead) is orthogonally adjacent
    Stench,
    /// The treasure lies on this cell
    Treasure,
    /// This cell is a pit
    Pit,
    /// The live beast occupies this cell
    Beast,
    /// The beast has been killed this session
    Scream,
}

impl Percept {
    /// Percepts that stop the explorer from declaring neighbours safe.
    pub fn is_danger_signal(self) -> bool {
        matches!(
            self,
            Percept::Breeze | Percept::Stench | Percept::Pit | Percept::Beast
        )
    }

    /// Percepts that are reported to the player without changing state.
    pub fn is_advisory(self) -> bool {
        matches!(self, Percept::Breeze | Percept::Stench | Percept::Scream)
    }

    /// Player-facing description of the percept.
    pub fn describe(self) -> &'static str {
        match self {
            Percept::Breeze => "You feel a breeze",
            Percept::Stench => "You smell a stench",
            Percept::Treasure => "Something glitters here",
            Percept::Pit => "You are standing in a pit",
            Percept::Beast => "The beast is here",
            Percept::Scream => "You hear a scream",
        }
    }
}

impl fmt::Display for Percept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Percept::Breeze => "breeze",
            Percept::Stench => "stench",
            Percept::Treasure => "treasure",
            Percept::Pit => "pit",
            Percept::Beast => "beast",
            Percept::Scream => "scream",
        };
        f.write_str(name)
    }
}

/// The set of percepts at one cell, in the order they were sensed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Percepts(Vec<Percept>);

impl Percepts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a percept; duplicates are ignored.
    pub fn insert(&mut self, percept: Percept) {
        if !self.0.contains(&percept) {
            self.0.push(percept);
        }
    }

    pub fn contains(&self, percept: Percept) -> bool {
        self.0.contains(&percept)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Percept> + '_ {
        self.0.iter().copied()
    }

    /// True if any breeze, stench, pit or beast signal is present.
    pub fn has_danger_signal(&self) -> bool {
        self.iter().any(Percept::is_danger_signal)
    }

    /// Joins the advisory percepts into a single notification line.
    pub fn advisory_message(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .iter()
            .filter(|p| p.is_advisory())
            .map(Percept::describe)
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

impl FromIterator<Percept> for Percepts {
    fn from_iter<I: IntoIterator<Item = Percept>>(iter: I) -> Self {
        let mut percepts = Percepts::new();
        for percept in iter {
            percepts.insert(percept);
        }
        percepts
    }
}

impl fmt::Display for Percepts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("nothing");
        }
        let names: Vec<String> = self.iter().map(|p| p.to_string()).collect();
        f.write_str(&names.join(", "))
    }
}
