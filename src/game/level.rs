//! Difficulty levels and their board configurations.
//!
//! All three levels share the same board and tick interval; they differ in
//! boundary policy and obstacles. `easy` wraps at the edges, `medium`
//! treats the edges as walls, `hard` adds fixed obstacles on top.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::grid::{BoardSize, BoundaryPolicy, Position};

/// Difficulty level. Serialized in lowercase on the wire and inside
/// score digests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Wrapping board, no obstacles.
    Easy,
    /// Solid walls, no obstacles.
    Medium,
    /// Solid walls plus fixed obstacles.
    Hard,
}

impl Level {
    /// Canonical identifier as it appears in digests and stored records.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Easy => "easy",
            Level::Medium => "medium",
            Level::Hard => "hard",
        }
    }

    /// Static configuration for this level.
    pub fn config(self) -> LevelConfig {
        let board = BoardSize::new(10, 20);
        let tick_interval = Duration::from_millis(200);
        match self {
            Level::Easy => LevelConfig {
                level: self,
                board,
                tick_interval,
                boundary: BoundaryPolicy::Wrap,
                has_obstacles: false,
            },
            Level::Medium => LevelConfig {
                level: self,
                board,
                tick_interval,
                boundary: BoundaryPolicy::Wall,
                has_obstacles: false,
            },
            Level::Hard => LevelConfig {
                level: self,
                board,
                tick_interval,
                boundary: BoundaryPolicy::Wall,
                has_obstacles: true,
            },
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static per-level parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelConfig {
    /// The level this configuration belongs to.
    pub level: Level,
    /// Board dimensions.
    pub board: BoardSize,
    /// Time between simulation ticks.
    pub tick_interval: Duration,
    /// Edge behaviour.
    pub boundary: BoundaryPolicy,
    /// Whether `obstacle_layout` applies.
    pub has_obstacles: bool,
}

impl LevelConfig {
    /// Obstacle cells for this configuration. Empty unless the level
    /// declares obstacles.
    pub fn obstacles(&self) -> HashSet<Position> {
        if self.has_obstacles {
            obstacle_layout(self.board)
        } else {
            HashSet::new()
        }
    }
}

/// Fixed obstacle layout: two three-cell horizontal walls at a quarter and
/// three quarters of the board height, offset left and right of the centre
/// column so they can never overlap the spawn position.
pub fn obstacle_layout(board: BoardSize) -> HashSet<Position> {
    let mut cells = HashSet::new();
    let upper_row = board.height / 4;
    let lower_row = 3 * board.height / 4;
    for x in 1..=3 {
        cells.insert(Position::new(x, upper_row));
    }
    for x in (board.width - 4)..=(board.width - 2) {
        cells.insert(Position::new(x, lower_row));
    }
    cells
}

// =============================================================================
// TESTS
// =============================================================================
