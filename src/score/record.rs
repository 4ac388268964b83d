//! Score record types.
//!
//! Three shapes of the same data: [`ScoreDraft`] is what a finished
//! session commits, [`ScoreRecord`] is what the local ledger stores, and
//! [`WireScore`] is what gets submitted to the remote authority. The wire
//! shape drops the purely-local bookkeeping (`isSynced`, `userId`).

use serde::{Deserialize, Serialize};

use crate::core::hash::ScoreFields;
use crate::game::level::Level;

/// A committed score as stored in the local ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    /// Ledger-assigned id, monotonically increasing.
    pub id: u64,
    /// Final score.
    pub score: u32,
    /// Level the session was played on.
    pub level: Level,
    /// Commit time, epoch milliseconds.
    pub date: i64,
    /// Wall-clock session length in milliseconds.
    pub game_duration_ms: u64,
    /// Longest the snake ever got.
    pub max_snake_length: u32,
    /// Food items eaten.
    pub food_eaten_count: u32,
    /// Total ticks.
    pub moves_count: u32,
    /// Hex SHA-256 digest committed at game over.
    pub hash: String,
    /// Whether the remote authority has accepted this record. Stored as
    /// 0/1 so the ledger can index on it.
    #[serde(with = "sync_flag")]
    pub is_synced: bool,
    /// Authenticated owner, if one was known at commit time.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,
}

impl ScoreRecord {
    /// The submit shape of this record.
    pub fn to_wire(&self) -> WireScore {
        WireScore {
            id: self.id,
            score: self.score,
            level: self.level,
            date: self.date,
            game_duration_ms: self.game_duration_ms,
            max_snake_length: self.max_snake_length,
            food_eaten_count: self.food_eaten_count,
            moves_count: self.moves_count,
            hash: self.hash.clone(),
        }
    }
}

/// A score about to be appended: everything except the fields the ledger
/// assigns (`id`, `isSynced`, owner).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDraft {
    /// Final score.
    pub score: u32,
    /// Level the session was played on.
    pub level: Level,
    /// Commit time, epoch milliseconds.
    pub date: i64,
    /// Wall-clock session length in milliseconds.
    pub game_duration_ms: u64,
    /// Longest the snake ever got.
    pub max_snake_length: u32,
    /// Food items eaten.
    pub food_eaten_count: u32,
    /// Total ticks.
    pub moves_count: u32,
    /// Hex SHA-256 digest committed at game over.
    pub hash: String,
}

/// Record shape submitted to the remote authority.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireScore {
    /// Client-local ledger id, echoed back in the accepted-id list.
    pub id: u64,
    /// Claimed score.
    pub score: u32,
    /// Claimed level.
    pub level: Level,
    /// Commit time, epoch milliseconds.
    pub date: i64,
    /// Claimed session length in milliseconds.
    pub game_duration_ms: u64,
    /// Claimed maximum snake length.
    pub max_snake_length: u32,
    /// Claimed food count.
    pub food_eaten_count: u32,
    /// Claimed tick count.
    pub moves_count: u32,
    /// Digest the client committed; the authority recomputes and compares.
    pub hash: String,
}

impl WireScore {
    /// The six gameplay fields a digest covers.
    pub fn fields(&self) -> ScoreFields<'_> {
        ScoreFields {
            score: self.score,
            level: self.level.as_str(),
            game_duration_ms: self.game_duration_ms,
            max_snake_length: self.max_snake_length,
            food_eaten_count: self.food_eaten_count,
            moves_count: self.moves_count,
        }
    }
}

/// `isSynced` is persisted as 0/1 rather than a JSON boolean.
mod sync_flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*value as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(u8::deserialize(deserializer)? != 0)
    }
}

// =============================================================================
// TESTS
// =============================================================================
