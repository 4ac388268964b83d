//! # Gridsnake
//!
//! Deterministic snake simulation with an offline-first, server-verified
//! score pipeline.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        GRIDSNAKE                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seeded SplitMix64 PRNG                    │
//! │  └── hash.rs     - Canonical score digests (SHA-256)         │
//! │                                                              │
//! │  game/           - Simulation (deterministic)                │
//! │  ├── grid.rs     - Positions, headings, boundary policy      │
//! │  ├── level.rs    - Difficulty levels and board configs       │
//! │  ├── engine.rs   - Snake movement, food, collisions          │
//! │  ├── session.rs  - Session state machine and tick loop       │
//! │  └── clock.rs    - Wall-clock abstraction                    │
//! │                                                              │
//! │  score/          - Client score pipeline                     │
//! │  ├── record.rs   - Score record types                        │
//! │  ├── ledger.rs   - Append-only local ledger                  │
//! │  ├── integrity.rs- Digest-at-commit                          │
//! │  └── sync.rs     - Batch sync to the remote authority        │
//! │                                                              │
//! │  server/         - Remote authority (trusted side)           │
//! │  ├── validate.rs - Per-record acceptance rule                │
//! │  └── authority.rs- Batch endpoint + leaderboard              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**: all
//! randomness comes from a seeded SplitMix64 PRNG, and the tick function
//! is a pure state transition. Given the same seed and the same sequence
//! of direction changes, a session produces identical food placements and
//! identical final stats on any platform.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod score;
pub mod server;

// Re-export commonly used types
pub use crate::core::rng::GameRng;
pub use crate::game::grid::{BoardSize, BoundaryPolicy, Direction, Position};
pub use crate::game::level::{Level, LevelConfig};
pub use crate::game::session::{GameSession, GameStatus, SessionResult};
pub use crate::score::record::ScoreRecord;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Segments a snake spawns with. Score invariants on the server side
/// are phrased relative to this.
pub const INITIAL_SNAKE_LENGTH: u32 = 3;
