//! Snake Movement Engine
//!
//! One `advance` call is one simulation tick: resolve the latched heading,
//! step the head, apply the boundary policy, then settle collisions and
//! food. The engine is purely deterministic; all randomness (food
//! placement) comes from the caller-supplied [`GameRng`].

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::core::rng::GameRng;

use super::grid::{BoardSize, BoundaryPolicy, Direction, Position};
use super::level::LevelConfig;

/// Outcome of a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// The snake moved into an empty cell.
    Moved,
    /// The snake moved onto the food cell and grew by one segment.
    FoodEaten,
    /// The snake hit a wall, an obstacle, or itself. Fatal.
    Collision,
}

/// The snake: an ordered body plus an occupancy set for O(1) collision
/// checks. Head is at the front of the deque.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snake {
    /// Body segments, head first.
    pub body: VecDeque<Position>,
    /// Same cells as `body`, unordered.
    pub occupied: HashSet<Position>,
    /// Heading applied on the next tick.
    pub heading: Direction,
    /// Direction change latched since the last tick, if any.
    pub pending: Option<Direction>,
}

impl Snake {
    /// Spawn a three-segment snake at the board centre, heading up, with
    /// the body trailing downward.
    pub fn spawn(board: BoardSize) -> Self {
        let center = board.center();
        let body: VecDeque<Position> = (0..3)
            .map(|i| Position::new(center.x, center.y + i))
            .collect();
        let occupied = body.iter().copied().collect();
        Self {
            body,
            occupied,
            heading: Direction::Up,
            pending: None,
        }
    }

    /// Current head cell.
    ///
    /// The body is never empty, so this is total in practice.
    pub fn head(&self) -> Position {
        self.body.front().copied().unwrap_or(Position::new(0, 0))
    }

    /// Number of body segments.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// A spawned snake always has segments.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// The heading the next tick will use: the latched change if one is
    /// pending, otherwise the current heading.
    pub fn effective_heading(&self) -> Direction {
        self.pending.unwrap_or(self.heading)
    }

    fn grow_head(&mut self, head: Position) {
        self.body.push_front(head);
        self.occupied.insert(head);
    }

    fn drop_tail(&mut self) {
        if let Some(tail) = self.body.pop_back() {
            self.occupied.remove(&tail);
        }
    }
}

/// Board state for one session: snake, food, obstacles.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Engine {
    /// Board dimensions.
    pub board: BoardSize,
    /// Edge behaviour for this level.
    pub boundary: BoundaryPolicy,
    /// The player's snake.
    pub snake: Snake,
    /// Current food cell.
    pub food: Position,
    /// Fatal obstacle cells, fixed for the whole session.
    pub obstacles: HashSet<Position>,
}

impl Engine {
    /// Build the initial board for a level and place the first food.
    pub fn new(config: &LevelConfig, rng: &mut GameRng) -> Self {
        let mut engine = Self {
            board: config.board,
            boundary: config.boundary,
            snake: Snake::spawn(config.board),
            food: Position::new(-1, -1),
            obstacles: config.obstacles(),
        };
        engine.place_food(rng);
        engine
    }

    /// Latch a direction change for the next tick.
    ///
    /// Rejects the exact reverse of the heading the next tick will use;
    /// returns whether the change was accepted. A later accepted change
    /// before the tick replaces the earlier one.
    pub fn request_direction(&mut self, requested: Direction) -> bool {
        if requested.is_opposite(self.snake.effective_heading()) {
            return false;
        }
        self.snake.pending = Some(requested);
        true
    }

    /// Run one tick and report what happened.
    ///
    /// On `Collision` the board state is left exactly as it was before the
    /// tick, so the final snapshot is inspectable.
    pub fn advance(&mut self, rng: &mut GameRng) -> GameEvent {
        if let Some(next) = self.snake.pending.take() {
            self.snake.heading = next;
        }

        let mut head = self.snake.head().stepped(self.snake.heading);
        match self.boundary {
            BoundaryPolicy::Wrap => head = head.wrapped(self.board),
            BoundaryPolicy::Wall => {
                if !self.board.contains(head) {
                    return GameEvent::Collision;
                }
            }
        }

        // Any body segment counts, the tail cell included: the tail only
        // vacates after the head has settled.
        if self.snake.occupied.contains(&head) || self.obstacles.contains(&head) {
            return GameEvent::Collision;
        }

        self.snake.grow_head(head);
        if head == self.food {
            self.place_food(rng);
            GameEvent::FoodEaten
        } else {
            self.snake.drop_tail();
            GameEvent::Moved
        }
    }

    /// Current snake length.
    pub fn snake_length(&self) -> u32 {
        self.snake.len() as u32
    }

    /// Draw food cells until one lands on a free cell. If the board has
    /// no free cell left, the food is parked off-board and can never be
    /// eaten again.
    fn place_food(&mut self, rng: &mut GameRng) {
        let blocked = self.snake.occupied.len() + self.obstacles.len();
        if blocked >= self.board.cell_count() as usize {
            self.food = Position::new(-1, -1);
            return;
        }
        loop {
            let candidate = Position::new(
                rng.next_below(self.board.width as u32) as i32,
                rng.next_below(self.board.height as u32) as i32,
            );
            if !self.snake.occupied.contains(&candidate) && !self.obstacles.contains(&candidate) {
                self.food = candidate;
                return;
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
