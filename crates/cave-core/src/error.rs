//! Error Types
//!
//! Session creation can fail; turns cannot. A rejected action leaves the
//! session exactly as it was.

use cave_events::{Cell, Direction};

/// Fatal problems detected while creating a session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("grid size must be at least 1")]
    EmptyGrid,
    #[error(
        "a {grid_size}x{grid_size} grid has {available} cells but {required} are needed \
         (entrance, beast, treasure and {pit_count} pits)"
    )]
    GridTooSmall {
        grid_size: usize,
        pit_count: usize,
        available: usize,
        required: usize,
    },
    #[error("grid size {grid_size} exceeds the maximum of {max}")]
    GridTooLarge { grid_size: usize, max: usize },
    #[error("starting lives must be at least 1")]
    NoLives,
    #[error("cell {cell} is outside a {grid_size}x{grid_size} grid")]
    OutOfBounds { cell: Cell, grid_size: usize },
    #[error("cell {0} is assigned more than one marker")]
    Overlap(Cell),
}

/// An action the resolver refused. Never ends the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidAction {
    #[error("cannot move {0}: that leads out of the cave")]
    OffGrid(Direction),
    #[error("no arrow left to shoot")]
    NoArrow,
    #[error("the session is over")]
    SessionOver,
}
