//! Cave Components
//!
//! Ground truth of the grid: hazard placement, percepts and arrow flight.
//! Nothing here knows about the explorer's beliefs; the explorer only ever
//! learns about the cave through [`Cave::perceive`].

use bevy_ecs::prelude::*;
use cave_events::{Cell, Direction, Marker, Percept, Percepts};
use rand::Rng;

use crate::config::WorldConfig;
use crate::error::ConfigurationError;

/// Whether the beast still hunts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeastState {
    Alive,
    Dead,
}

/// Resource: the hidden grid
#[derive(Resource, Debug, Clone)]
pub struct Cave {
    size: usize,
    /// Row-major markers
    grid: Vec<Marker>,
    beast: BeastState,
}

impl Cave {
    /// Places the entrance at (0, 0), then draws the beast, the treasure
    /// and the pits without replacement from the remaining cells.
    pub fn generate<R: Rng>(
        config: &WorldConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let size = config.grid_size;

        let mut cave = Self::empty(size);
        cave.set(Cell::ENTRANCE, Marker::Entrance);

        let mut free: Vec<Cell> = (0..size * size)
            .map(|index| Cell::from_index(index, size))
            .filter(|cell| *cell != Cell::ENTRANCE)
            .collect();

        let mut draw = |free: &mut Vec<Cell>| free.remove(rng.gen_range(0..free.len()));

        let beast = draw(&mut free);
        cave.set(beast, Marker::Beast);

        let treasure = draw(&mut free);
        cave.set(treasure, Marker::Treasure);

        for _ in 0..config.pit_count {
            let pit = draw(&mut free);
            cave.set(pit, Marker::Pit);
        }

        tracing::debug!(size, pits = config.pit_count, "placed cave hazards");
        Ok(cave)
    }

    /// Builds a cave with a fixed layout.
    pub fn from_layout(
        size: usize,
        beast: Cell,
        treasure: Cell,
        pits: &[Cell],
    ) -> Result<Self, ConfigurationError> {
        WorldConfig {
            grid_size: size,
            pit_count: pits.len(),
        }
        .validate()?;

        let mut cave = Self::empty(size);
        cave.set(Cell::ENTRANCE, Marker::Entrance);

        let placements = std::iter::once((beast, Marker::Beast))
            .chain(std::iter::once((treasure, Marker::Treasure)))
            .chain(pits.iter().map(|pit| (*pit, Marker::Pit)));

        for (cell, marker) in placements {
            if !cell.in_bounds(size) {
                return Err(ConfigurationError::OutOfBounds {
                    cell,
                    grid_size: size,
                });
            }
            if cave.marker(cell) != Marker::Empty {
                return Err(ConfigurationError::Overlap(cell));
            }
            cave.set(cell, marker);
        }

        Ok(cave)
    }

    fn empty(size: usize) -> Self {
        Self {
            size,
            grid: vec![Marker::Empty; size * size],
            beast: BeastState::Alive,
        }
    }

    fn set(&mut self, cell: Cell, marker: Marker) {
        let index = cell.index(self.size);
        self.grid[index] = marker;
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Ground-truth marker at `cell`; out-of-bounds cells read as empty.
    pub fn marker(&self, cell: Cell) -> Marker {
        if !cell.in_bounds(self.size) {
            return Marker::Empty;
        }
        self.grid[cell.index(self.size)]
    }

    pub fn beast_state(&self) -> BeastState {
        self.beast
    }

    pub fn beast_alive(&self) -> bool {
        self.beast == BeastState::Alive
    }

    /// All cells currently holding `marker`, row-major.
    pub fn cells_with(&self, marker: Marker) -> impl Iterator<Item = Cell> + '_ {
        let size = self.size;
        self.grid
            .iter()
            .enumerate()
            .filter(move |(_, m)| **m == marker)
            .map(move |(index, _)| Cell::from_index(index, size))
    }

    /// Percepts at `cell`.
    ///
    /// Stench depends only on where the beast lies, not on whether it lives.
    /// `heard_scream` is supplied by the caller once the beast has been
    /// killed this session.
    pub fn perceive(&self, cell: Cell, heard_scream: bool) -> Percepts {
        let mut percepts = Percepts::new();

        for neighbor in cell.neighbors(self.size) {
            match self.marker(neighbor) {
                Marker::Pit => percepts.insert(Percept::Breeze),
                Marker::Beast => percepts.insert(Percept::Stench),
                _ => {}
            }
        }

        match self.marker(cell) {
            Marker::Treasure => percepts.insert(Percept::Treasure),
            Marker::Pit => percepts.insert(Percept::Pit),
            Marker::Beast if self.beast_alive() => percepts.insert(Percept::Beast),
            _ => {}
        }

        if heard_scream {
            percepts.insert(Percept::Scream);
        }

        percepts
    }

    /// Fires an arrow from `origin` in a straight line.
    ///
    /// The arrow passes over pits and every other marker; only the grid edge
    /// or a live beast stops it. Returns true if the beast was killed.
    pub fn shoot_arrow(&mut self, origin: Cell, direction: Direction) -> bool {
        let mut current = origin;
        while let Some(next) = current.step(direction, self.size) {
            if self.marker(next) == Marker::Beast && self.beast_alive() {
                self.beast = BeastState::Dead;
                tracing::info!(cell = %next, "arrow killed the beast");
                return true;
            }
            current = next;
        }
        false
    }

    /// Removes the treasure from `cell`. Returns false if it is not there.
    pub fn collect_treasure(&mut self, cell: Cell) -> bool {
        if self.marker(cell) != Marker::Treasure {
            return false;
        }
        self.set(cell, Marker::Empty);
        true
    }
}
