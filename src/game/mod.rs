//! Deterministic snake simulation: board geometry, levels, the tick
//! engine, and the session state machine that drives it.

pub mod clock;
pub mod engine;
pub mod grid;
pub mod level;
pub mod session;
