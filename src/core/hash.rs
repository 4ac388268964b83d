//! Canonical Score Digests
//!
//! A score digest is the SHA-256 of a canonical JSON encoding of the six
//! gameplay fields plus a secret. The client computes it at commit time;
//! the remote authority recomputes it with its own copy of the secret and
//! rejects records whose stored digest does not match. Field order is part
//! of the format: any reordering changes the digest.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// The six gameplay fields covered by a score digest.
///
/// Everything here is what the simulation measured; bookkeeping fields
/// (record id, sync flag, timestamps) are deliberately outside the
/// commitment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreFields<'a> {
    /// Food eaten, one point each.
    pub score: u32,
    /// Difficulty level identifier (`"easy"`, `"medium"`, `"hard"`).
    pub level: &'a str,
    /// Wall-clock session length in milliseconds.
    pub game_duration_ms: u64,
    /// Longest the snake ever got.
    pub max_snake_length: u32,
    /// Number of food items eaten.
    pub food_eaten_count: u32,
    /// Ticks elapsed over the whole session.
    pub moves_count: u32,
}

/// Canonical wire form of the committed payload.
///
/// Serialization order here IS the digest format. Do not reorder fields.
#[derive(Serialize)]
struct CanonicalPayload<'a> {
    score: u32,
    level: &'a str,
    #[serde(rename = "gameDurationMs")]
    game_duration_ms: u64,
    #[serde(rename = "maxSnakeLength")]
    max_snake_length: u32,
    #[serde(rename = "foodEatenCount")]
    food_eaten_count: u32,
    #[serde(rename = "movesCount")]
    moves_count: u32,
    secret: &'a str,
}

/// Compute the hex-encoded SHA-256 digest of the canonical payload.
pub fn score_digest(fields: &ScoreFields<'_>, secret: &str) -> String {
    let payload = CanonicalPayload {
        score: fields.score,
        level: fields.level,
        game_duration_ms: fields.game_duration_ms,
        max_snake_length: fields.max_snake_length,
        food_eaten_count: fields.food_eaten_count,
        moves_count: fields.moves_count,
        secret,
    };
    // Serializing a plain struct of numbers and strings cannot fail.
    let json = serde_json::to_string(&payload).unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    hex::encode(hasher.finalize())
}

// =============================================================================
// TESTS
// =============================================================================
