//! Explorer Components
//!
//! The agent's mutable status: where it stands and what it carries.

use bevy_ecs::prelude::*;
use cave_events::{Cell, ExplorerSnapshot};

/// Resource: the explorer's status
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct Explorer {
    pub position: Cell,
    pub lives: u32,
    pub has_arrow: bool,
    pub has_treasure: bool,
}

impl Explorer {
    /// A fresh explorer at the entrance with one arrow.
    pub fn new(starting_lives: u32) -> Self {
        Self {
            position: Cell::ENTRANCE,
            lives: starting_lives,
            has_arrow: true,
            has_treasure: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    pub fn at_entrance(&self) -> bool {
        self.position == Cell::ENTRANCE
    }

    /// Removes one life. Returns the lives left.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    /// Teleports the explorer back to the entrance.
    pub fn respawn(&mut self) {
        self.position = Cell::ENTRANCE;
    }

    /// Spends the arrow. Returns false if it was already gone.
    pub fn take_arrow(&mut self) -> bool {
        std::mem::replace(&mut self.has_arrow, false)
    }

    pub fn snapshot(&self) -> ExplorerSnapshot {
        ExplorerSnapshot {
            position: self.position,
            lives: self.lives,
            has_arrow: self.has_arrow,
            has_treasure: self.has_treasure,
        }
    }
}

impl Default for Explorer {
    fn default() -> Self {
        Self::new(2)
    }
}
