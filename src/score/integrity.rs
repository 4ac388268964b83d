//! Digest-at-commit.
//!
//! When a session ends, the six gameplay fields are sealed under a
//! SHA-256 digest before the record ever touches storage. The client
//! secret is a compiled-in constant; it only raises the bar for casual
//! tampering. The real check is the authority recomputing the digest with
//! its own copy of the secret (see `server::validate`).

use crate::core::hash::{score_digest, ScoreFields};
use crate::game::session::SessionResult;

use super::record::ScoreDraft;

/// Secret mixed into client-side digests.
pub const CLIENT_SECRET: &str = "kigyok-kigyoznak";

/// Digest over a finished session's gameplay fields.
pub fn digest_for_result(result: &SessionResult, secret: &str) -> String {
    score_digest(
        &ScoreFields {
            score: result.score,
            level: result.level.as_str(),
            game_duration_ms: result.game_duration_ms,
            max_snake_length: result.max_snake_length,
            food_eaten_count: result.food_eaten_count,
            moves_count: result.moves_count,
        },
        secret,
    )
}

/// Build the ledger draft for a finished session, digest included.
pub fn draft_from_result(result: &SessionResult, date: i64, secret: &str) -> ScoreDraft {
    ScoreDraft {
        score: result.score,
        level: result.level,
        date,
        game_duration_ms: result.game_duration_ms,
        max_snake_length: result.max_snake_length,
        food_eaten_count: result.food_eaten_count,
        moves_count: result.moves_count,
        hash: digest_for_result(result, secret),
    }
}

// =============================================================================
// TESTS
// =============================================================================
