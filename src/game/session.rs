//! Game Session
//!
//! The session is the state machine around the engine: it owns the PRNG,
//! enforces one direction change per tick, accumulates stats, and freezes
//! them into a [`SessionResult`] at game over. `tick()` is synchronous so
//! tests can drive it directly; [`drive`] runs it on the level's real tick
//! interval.

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::core::rng::GameRng;
use crate::INITIAL_SNAKE_LENGTH;

use super::clock::GameClock;
use super::engine::{Engine, GameEvent};
use super::grid::Direction;
use super::level::{Level, LevelConfig};

/// Session lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// No session started yet.
    Idle,
    /// Ticks are being applied.
    Running,
    /// Suspended; no tick mutates state until resumed.
    Paused,
    /// A collision ended the session. The final board is inspectable.
    GameOver,
}

/// Counters accumulated while a session runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// One point per food eaten.
    pub score: u32,
    /// Ticks elapsed, every tick counts.
    pub moves_count: u32,
    /// Food items eaten.
    pub food_eaten_count: u32,
    /// Longest the snake ever got.
    pub max_snake_length: u32,
}

/// Frozen outcome of a finished session, the input to score commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    /// Level the session was played on.
    pub level: Level,
    /// Final score.
    pub score: u32,
    /// Wall-clock start to game over, pauses included.
    pub game_duration_ms: u64,
    /// Longest the snake ever got.
    pub max_snake_length: u32,
    /// Food items eaten.
    pub food_eaten_count: u32,
    /// Total ticks.
    pub moves_count: u32,
    /// PRNG seed, kept so the food trace can be replayed.
    pub seed: u32,
}

/// One playthrough: engine + PRNG + stats + lifecycle.
#[derive(Debug)]
pub struct GameSession<C: GameClock> {
    /// Time source for duration measurement and seed derivation.
    pub clock: C,
    /// Current lifecycle state.
    pub status: GameStatus,
    /// Active level configuration.
    pub config: LevelConfig,
    /// Board state; `None` until the first start.
    pub engine: Option<Engine>,
    /// Session PRNG, reseeded on every start.
    pub rng: GameRng,
    /// Live counters.
    pub stats: SessionStats,
    /// Epoch-ms when the running session started.
    pub started_at_ms: i64,
    /// Whether a direction change was already accepted this tick.
    pub direction_changed: bool,
}

impl<C: GameClock> GameSession<C> {
    /// Create an idle session.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            status: GameStatus::Idle,
            config: Level::Easy.config(),
            engine: None,
            rng: GameRng::new(0),
            stats: SessionStats::default(),
            started_at_ms: 0,
            direction_changed: false,
        }
    }

    /// Start a session, deriving the seed from the clock.
    pub fn start(&mut self, level: Level) {
        let seed = self.clock.now_ms() as u32;
        self.start_seeded(level, seed);
    }

    /// Start a session with an explicit seed, for replay and audit.
    ///
    /// Discards any previous session, finished or not.
    pub fn start_seeded(&mut self, level: Level, seed: u32) {
        self.config = level.config();
        self.rng.reseed(seed);
        self.engine = Some(Engine::new(&self.config, &mut self.rng));
        self.stats = SessionStats {
            max_snake_length: INITIAL_SNAKE_LENGTH,
            ..SessionStats::default()
        };
        self.started_at_ms = self.clock.now_ms();
        self.direction_changed = false;
        self.status = GameStatus::Running;
        info!(level = %level, seed, "session started");
    }

    /// Suspend or resume ticking. No effect unless running or paused.
    pub fn toggle_pause(&mut self) {
        self.status = match self.status {
            GameStatus::Running => GameStatus::Paused,
            GameStatus::Paused => GameStatus::Running,
            other => other,
        };
    }

    /// Request a direction change for the next tick.
    ///
    /// At most one change is accepted per tick; further requests, and any
    /// request while not running, are dropped. Returns whether the change
    /// was latched.
    pub fn handle_direction(&mut self, requested: Direction) -> bool {
        if self.status != GameStatus::Running || self.direction_changed {
            return false;
        }
        let Some(engine) = self.engine.as_mut() else {
            return false;
        };
        if engine.request_direction(requested) {
            self.direction_changed = true;
            return true;
        }
        false
    }

    /// Run one simulation tick.
    ///
    /// No-op unless running. Returns the frozen result when this tick
    /// ended the session.
    pub fn tick(&mut self) -> Option<SessionResult> {
        if self.status != GameStatus::Running {
            return None;
        }
        let engine = self.engine.as_mut()?;

        // A new tick opens a new input window
        self.direction_changed = false;
        self.stats.moves_count += 1;

        match engine.advance(&mut self.rng) {
            GameEvent::Moved => None,
            GameEvent::FoodEaten => {
                self.stats.score += 1;
                self.stats.food_eaten_count += 1;
                self.stats.max_snake_length =
                    self.stats.max_snake_length.max(engine.snake_length());
                debug!(score = self.stats.score, "food eaten");
                None
            }
            GameEvent::Collision => {
                self.status = GameStatus::GameOver;
                engine.obstacles.clear();
                let duration_ms = (self.clock.now_ms() - self.started_at_ms).max(0) as u64;
                let result = SessionResult {
                    level: self.config.level,
                    score: self.stats.score,
                    game_duration_ms: duration_ms,
                    max_snake_length: self.stats.max_snake_length,
                    food_eaten_count: self.stats.food_eaten_count,
                    moves_count: self.stats.moves_count,
                    seed: self.rng.seed(),
                };
                info!(
                    score = result.score,
                    moves = result.moves_count,
                    duration_ms = result.game_duration_ms,
                    "game over"
                );
                Some(result)
            }
        }
    }
}

/// Drive a started session to completion on its level's tick interval.
///
/// While paused the timer keeps running but no state is mutated. Returns
/// `None` if the session is not started when called.
pub async fn drive<C: GameClock>(session: &Mutex<GameSession<C>>) -> Option<SessionResult> {
    let tick_interval = session.lock().await.config.tick_interval;
    let mut timer = interval(tick_interval);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        timer.tick().await;
        let mut session = session.lock().await;
        match session.status {
            GameStatus::Running => {
                if let Some(result) = session.tick() {
                    return Some(result);
                }
            }
            GameStatus::Paused => {}
            GameStatus::Idle | GameStatus::GameOver => return None,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::clock::ManualClock;
    use crate::game::grid::Position;

    const TICK_MS: i64 = 200;

    fn started(level: Level, seed: u32) -> (GameSession<ManualClock>, ManualClock) {
        let clock = ManualClock::at(1_700_000_000_000);
        let mut session = GameSession::new(clock.clone());
        session.start_seeded(level, seed);
        (session, clock)
    }

    /// Park the food off-board so straight runs stay deterministic.
    fn park_food(session: &mut GameSession<ManualClock>) {
        if let Some(engine) = session.engine.as_mut() {
            engine.food = Position::new(-1, -1);
        }
    }

    /// Move the food directly in front of the head.
    fn bait(session: &mut GameSession<ManualClock>) {
        if let Some(engine) = session.engine.as_mut() {
            let ahead = engine.snake.head().stepped(engine.snake.effective_heading());
            engine.food = ahead;
        }
    }

    fn step(session: &mut GameSession<ManualClock>, clock: &ManualClock) -> Option<SessionResult> {
        clock.advance_ms(TICK_MS);
        session.tick()
    }

    #[test]
    fn test_start_initializes_running_session() {
        let (session, _clock) = started(Level::Medium, 42);
        assert_eq!(session.status, GameStatus::Running);
        assert_eq!(session.stats.score, 0);
        assert_eq!(session.stats.moves_count, 0);
        assert_eq!(session.stats.max_snake_length, INITIAL_SNAKE_LENGTH);
        assert!(session.engine.is_some());
    }

    #[test]
    fn test_seed_derived_from_clock() {
        let clock = ManualClock::at(1_700_000_123_456);
        let mut session = GameSession::new(clock);
        session.start(Level::Easy);
        assert_eq!(session.rng.seed(), 1_700_000_123_456i64 as u32);
    }

    #[test]
    fn test_straight_run_into_wall() {
        // Medium walls: head starts at (5,10) going up, collides stepping
        // past row 0 on the 11th tick.
        let (mut session, clock) = started(Level::Medium, 42);
        park_food(&mut session);

        for _ in 0..10 {
            assert_eq!(step(&mut session, &clock), None);
        }
        let result = step(&mut session, &clock).expect("collision ends the session");

        assert_eq!(session.status, GameStatus::GameOver);
        assert_eq!(result.level, Level::Medium);
        assert_eq!(result.score, 0);
        assert_eq!(result.moves_count, 11);
        assert_eq!(result.food_eaten_count, 0);
        assert_eq!(result.max_snake_length, 3);
        assert_eq!(result.game_duration_ms, 11 * TICK_MS as u64);
        assert_eq!(result.seed, 42);
    }

    #[test]
    fn test_stats_invariants_hold_at_every_tick() {
        // Bait the food in front of the head for five ticks, then check
        // score == food eaten == growth beyond the spawn length after
        // every single tick.
        let (mut session, clock) = started(Level::Easy, 7);

        for _ in 0..5 {
            bait(&mut session);
            assert_eq!(step(&mut session, &clock), None);
            let stats = session.stats;
            assert_eq!(stats.score, stats.food_eaten_count);
            assert_eq!(stats.score, stats.max_snake_length - INITIAL_SNAKE_LENGTH);
        }
        assert_eq!(session.stats.score, 5);
        assert_eq!(session.stats.max_snake_length, 8);
        assert_eq!(session.stats.moves_count, 5);
    }

    #[test]
    fn test_moves_count_every_tick_including_last() {
        let (mut session, clock) = started(Level::Medium, 1);
        park_food(&mut session);
        let mut ticks = 0u32;
        loop {
            ticks += 1;
            if let Some(result) = step(&mut session, &clock) {
                assert_eq!(result.moves_count, ticks);
                break;
            }
        }
    }

    #[test]
    fn test_one_direction_change_per_tick() {
        let (mut session, clock) = started(Level::Easy, 42);
        park_food(&mut session);

        assert!(session.handle_direction(Direction::Left));
        // Second change in the same tick window is dropped
        assert!(!session.handle_direction(Direction::Up));

        step(&mut session, &clock);
        // New tick, new window
        assert!(session.handle_direction(Direction::Up));
    }

    #[test]
    fn test_rejected_reverse_does_not_consume_window() {
        let (mut session, _clock) = started(Level::Easy, 42);
        // Heading is up; down is its reverse
        assert!(!session.handle_direction(Direction::Down));
        assert!(session.handle_direction(Direction::Left));
    }

    #[test]
    fn test_pause_freezes_state_and_input() {
        let (mut session, clock) = started(Level::Easy, 42);
        park_food(&mut session);
        step(&mut session, &clock);

        session.toggle_pause();
        assert_eq!(session.status, GameStatus::Paused);

        let stats_before = session.stats;
        let head_before = session.engine.as_ref().map(|e| e.snake.head());
        assert_eq!(step(&mut session, &clock), None);
        assert_eq!(session.stats, stats_before);
        assert_eq!(
            session.engine.as_ref().map(|e| e.snake.head()),
            head_before
        );
        assert!(!session.handle_direction(Direction::Left));

        session.toggle_pause();
        assert_eq!(session.status, GameStatus::Running);
        assert_eq!(step(&mut session, &clock), None);
        assert_eq!(session.stats.moves_count, stats_before.moves_count + 1);
    }

    #[test]
    fn test_pause_included_in_duration() {
        let (mut session, clock) = started(Level::Medium, 42);
        park_food(&mut session);

        step(&mut session, &clock);
        session.toggle_pause();
        clock.advance_ms(5_000);
        session.toggle_pause();

        let mut result = None;
        while result.is_none() {
            result = step(&mut session, &clock);
        }
        let result = result.unwrap();
        assert_eq!(
            result.game_duration_ms,
            5_000 + result.moves_count as u64 * TICK_MS as u64
        );
    }

    #[test]
    fn test_tick_after_game_over_is_inert() {
        let (mut session, clock) = started(Level::Medium, 42);
        park_food(&mut session);
        while step(&mut session, &clock).is_none() {}

        let stats = session.stats;
        assert_eq!(session.tick(), None);
        assert_eq!(session.stats, stats);
        assert!(!session.handle_direction(Direction::Left));
    }

    #[test]
    fn test_game_over_clears_obstacles() {
        let (mut session, clock) = started(Level::Hard, 42);
        park_food(&mut session);
        assert!(!session.engine.as_ref().unwrap().obstacles.is_empty());

        while step(&mut session, &clock).is_none() {}
        assert!(session.engine.as_ref().unwrap().obstacles.is_empty());
    }

    #[test]
    fn test_restart_resets_everything() {
        let (mut session, clock) = started(Level::Medium, 42);
        park_food(&mut session);
        while step(&mut session, &clock).is_none() {}

        session.start_seeded(Level::Hard, 9);
        assert_eq!(session.status, GameStatus::Running);
        assert_eq!(session.stats.moves_count, 0);
        assert_eq!(session.stats.score, 0);
        assert_eq!(session.rng.seed(), 9);
        assert_eq!(session.config.level, Level::Hard);
    }

    #[test]
    fn test_same_seed_same_inputs_same_result() {
        let run = || {
            let (mut session, clock) = started(Level::Medium, 1234);
            let mut tick_no = 0u32;
            loop {
                tick_no += 1;
                if tick_no == 3 {
                    session.handle_direction(Direction::Left);
                }
                if let Some(result) = step(&mut session, &clock) {
                    return result;
                }
            }
        };
        assert_eq!(run(), run());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_runs_to_game_over() {
        let clock = ManualClock::at(0);
        let mut session = GameSession::new(clock);
        session.start_seeded(Level::Medium, 42);
        if let Some(engine) = session.engine.as_mut() {
            engine.food = Position::new(-1, -1);
        }
        let session = Mutex::new(session);

        let result = drive(&session).await.expect("session was started");
        assert_eq!(result.moves_count, 11);
        assert_eq!(session.lock().await.status, GameStatus::GameOver);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_on_idle_session_returns_none() {
        let session = Mutex::new(GameSession::new(ManualClock::at(0)));
        assert_eq!(drive(&session).await, None);
    }
}
