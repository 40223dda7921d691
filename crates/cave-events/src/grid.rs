//! Grid Types
//!
//! Cells, directions and cell markers for the square cave grid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A (row, col) coordinate on the cave grid.
///
/// Row 0 is the top edge and column 0 the left edge, so the entrance sits in
/// the top-left corner. Cells order row-major, which keeps belief sets keyed
/// by `Cell` iterating in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    /// The fixed entrance cell.
    pub const ENTRANCE: Cell = Cell { row: 0, col: 0 };

    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns true if the cell lies on a grid of `size` x `size`.
    pub fn in_bounds(self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    /// Returns the neighbouring cell in `direction`, or `None` if it would
    /// leave a grid of `size` x `size`.
    pub fn step(self, direction: Direction, size: usize) -> Option<Cell> {
        let (d_row, d_col) = direction.delta();
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        let next = Cell { row, col };
        next.in_bounds(size).then_some(next)
    }

    /// In-bounds orthogonal neighbours, in `Direction::ALL` order.
    pub fn neighbors(self, size: usize) -> impl Iterator<Item = Cell> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(direction, size))
    }

    /// In-bounds orthogonal neighbours paired with the direction leading to them.
    pub fn moves(self, size: usize) -> impl Iterator<Item = (Direction, Cell)> {
        Direction::ALL
            .into_iter()
            .filter_map(move |direction| self.step(direction, size).map(|cell| (direction, cell)))
    }

    /// Manhattan distance between two cells.
    pub fn manhattan(self, other: Cell) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Row-major index of this cell on a grid of width `size`.
    pub fn index(self, size: usize) -> usize {
        self.row * size + self.col
    }

    /// Inverse of [`Cell::index`].
    pub fn from_index(index: usize, size: usize) -> Self {
        Self {
            row: index / size,
            col: index % size,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Enumeration order, also used as the tie-break order for move choices.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// (row, col) offset of one step in this direction.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a Direction from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError(pub String);

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid direction: '{}', expected up, down, left or right",
            self.0
        )
    }
}

impl std::error::Error for ParseDirectionError {}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    /// Accepts full names and single-letter abbreviations, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "up" | "u" => Ok(Direction::Up),
            "down" | "d" => Ok(Direction::Down),
            "left" | "l" => Ok(Direction::Left),
            "right" | "r" => Ok(Direction::Right),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// Ground-truth contents of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    #[default]
    Empty,
    Entrance,
    Pit,
    Beast,
    Treasure,
}
