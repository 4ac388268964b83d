//! Per-record acceptance rule.
//!
//! The authority never trusts a submitted record. It recomputes the
//! digest with its own secret, then re-derives what the simulation rules
//! say the numbers must look like: one point per food, growth of exactly
//! one segment per point, and a hard cap on points per second. A record
//! fails on the first broken check.

use thiserror::Error;

use crate::core::hash::score_digest;
use crate::score::record::WireScore;
use crate::INITIAL_SNAKE_LENGTH;

/// Hard cap on points per second of play. Anything faster than one food
/// per 200ms tick is impossible; 5/s leaves no slack above it.
pub const MAX_SCORE_RATE_PER_SEC: f64 = 5.0;

/// Why a submitted record was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// Recomputed digest differs from the submitted one.
    #[error("digest mismatch")]
    DigestMismatch,
    /// Score and food count disagree.
    #[error("score does not match food eaten")]
    ScoreFoodMismatch,
    /// Score and snake growth disagree.
    #[error("score does not match snake growth")]
    ScoreGrowthMismatch,
    /// Points accumulated faster than the rate cap allows.
    #[error("score rate exceeds the cap")]
    RateTooHigh,
}

/// Check one submitted record against the authority's secret and the
/// simulation invariants.
pub fn validate_score(record: &WireScore, secret: &str) -> Result<(), RejectReason> {
    let expected = score_digest(&record.fields(), secret);
    if expected != record.hash {
        return Err(RejectReason::DigestMismatch);
    }
    if record.score != record.food_eaten_count {
        return Err(RejectReason::ScoreFoodMismatch);
    }
    if record.max_snake_length != record.score + INITIAL_SNAKE_LENGTH {
        return Err(RejectReason::ScoreGrowthMismatch);
    }
    // A zero-score, zero-duration record divides to NaN, which does not
    // exceed the cap and is accepted.
    let rate = record.score as f64 / (record.game_duration_ms as f64 / 1000.0);
    if rate > MAX_SCORE_RATE_PER_SEC {
        return Err(RejectReason::RateTooHigh);
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
