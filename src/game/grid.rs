//! Board geometry: cell positions, headings, and boundary policy.

use serde::{Deserialize, Serialize};

/// A cell on the board. Coordinates may briefly leave the board while a
/// step is being resolved; the boundary policy decides what happens then.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column, 0 at the left edge.
    pub x: i32,
    /// Row, 0 at the top edge.
    pub y: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `direction`, unbounded.
    pub fn stepped(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Fold the position back onto the board, torus-style.
    pub fn wrapped(self, board: BoardSize) -> Self {
        Self::new(
            self.x.rem_euclid(board.width),
            self.y.rem_euclid(board.height),
        )
    }
}

/// A snake heading. Screen coordinates: `Up` decreases `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward row 0.
    Up,
    /// Away from row 0.
    Down,
    /// Toward column 0.
    Left,
    /// Away from column 0.
    Right,
}

impl Direction {
    /// All four headings, useful for iteration in tests and bots.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset `(dx, dy)` of one step in this heading.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// The exact reverse of this heading.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Whether `other` is the exact reverse of this heading. A snake can
    /// never turn back on itself in a single step.
    pub const fn is_opposite(self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::Up, Direction::Down)
                | (Direction::Down, Direction::Up)
                | (Direction::Left, Direction::Right)
                | (Direction::Right, Direction::Left)
        )
    }
}

/// Board dimensions in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSize {
    /// Columns.
    pub width: i32,
    /// Rows.
    pub height: i32,
}

impl BoardSize {
    /// Create a board size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Whether `position` lies on the board.
    pub fn contains(self, position: Position) -> bool {
        position.x >= 0 && position.x < self.width && position.y >= 0 && position.y < self.height
    }

    /// Total number of cells.
    pub fn cell_count(self) -> u32 {
        (self.width * self.height) as u32
    }

    /// Centre cell, rounding down.
    pub fn center(self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }
}

/// What happens when the snake's head steps off the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// The head re-enters on the opposite edge.
    Wrap,
    /// Leaving the board is a fatal collision.
    Wall,
}

// =============================================================================
// TESTS
// =============================================================================
