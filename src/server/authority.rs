//! Leaderboard Authority
//!
//! In-process implementation of the [`RemoteAuthority`] wire contract:
//! takes a batch submitted on behalf of an authenticated caller, runs
//! every record through [`validate_score`], stores the survivors, and
//! echoes back the accepted ids. The caller's identity comes from the
//! transport, never from the records themselves.

use std::collections::HashSet;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::game::level::Level;
use crate::score::record::WireScore;
use crate::score::sync::{AuthorityError, RemoteAuthority, SyncRequest, SyncResponse};

use super::validate::validate_score;

/// One accepted score on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// Authenticated owner, taken from the transport.
    pub user_id: String,
    /// The accepted record.
    #[serde(flatten)]
    pub score: WireScore,
}

/// Score authority holding its own secret and the accepted scores.
#[derive(Debug)]
pub struct LeaderboardAuthority {
    secret: String,
    board: Mutex<Vec<LeaderboardEntry>>,
}

impl LeaderboardAuthority {
    /// Create an authority with the given validation secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            board: Mutex::new(Vec::new()),
        }
    }

    /// Best accepted score per user on a level, highest first. A user who
    /// submitted many scores appears once.
    pub async fn leaderboard(&self, level: Level) -> Vec<LeaderboardEntry> {
        let board = self.board.lock().await;
        let mut entries: Vec<LeaderboardEntry> = board
            .iter()
            .filter(|entry| entry.score.level == level)
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            b.score
                .score
                .cmp(&a.score.score)
                .then(a.score.date.cmp(&b.score.date))
        });
        let mut seen = HashSet::new();
        entries.retain(|entry| seen.insert(entry.user_id.clone()));
        entries
    }

    /// Raw number of stored entries, across all levels.
    pub async fn entry_count(&self) -> usize {
        self.board.lock().await.len()
    }
}

impl RemoteAuthority for LeaderboardAuthority {
    async fn sync_scores(
        &self,
        caller_uid: &str,
        request: SyncRequest,
    ) -> Result<SyncResponse, AuthorityError> {
        if self.secret.is_empty() {
            error!("no validation secret configured");
            return Err(AuthorityError::Internal);
        }
        if request.scores.is_empty() {
            return Err(AuthorityError::InvalidArgument);
        }

        let mut synced_ids = Vec::new();
        let mut board = self.board.lock().await;
        let submitted = request.scores.len();
        for score in request.scores {
            match validate_score(&score, &self.secret) {
                Ok(()) => {
                    synced_ids.push(score.id);
                    board.push(LeaderboardEntry {
                        user_id: caller_uid.to_string(),
                        score,
                    });
                }
                Err(reason) => {
                    warn!(id = score.id, caller = caller_uid, %reason, "score rejected");
                }
            }
        }

        info!(
            caller = caller_uid,
            submitted,
            accepted = synced_ids.len(),
            "score batch processed"
        );
        Ok(SyncResponse {
            success: true,
            synced_ids,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
