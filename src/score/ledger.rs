//! Local Score Ledger
//!
//! Append-only store for committed scores. Every record carries an
//! `isSynced` flag; sync never deletes, it only flips the flag once the
//! remote authority has accepted the record. The file-backed ledger
//! rewrites its JSON file through a temp-file rename so a crash mid-write
//! cannot corrupt it.

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::record::{ScoreDraft, ScoreRecord};

/// Ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The backing store cannot be opened, read, or written.
    #[error("score storage unavailable: {0}")]
    StorageUnavailable(#[from] io::Error),
    /// The backing store exists but does not parse.
    #[error("score ledger is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Storage contract for committed scores.
///
/// Append-only: records are never removed, and `mark_synced` only ever
/// flips the flag from unsynced to synced.
pub trait ScoreLedger: Send + Sync {
    /// Append a committed score, assigning the next id. Returns the id.
    fn append(
        &self,
        draft: ScoreDraft,
        user_id: Option<String>,
    ) -> impl std::future::Future<Output = Result<u64, LedgerError>> + Send;

    /// Every record, oldest first.
    fn list_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ScoreRecord>, LedgerError>> + Send;

    /// Records the authority has not accepted yet, oldest first.
    fn list_unsynced(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ScoreRecord>, LedgerError>> + Send;

    /// Highest scores first, at most `limit`, ties broken newest first.
    fn top_scores(
        &self,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ScoreRecord>, LedgerError>> + Send;

    /// Newest records first, at most `limit`.
    fn list_recent(
        &self,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ScoreRecord>, LedgerError>> + Send;

    /// Flip the accepted flag for the given ids. Idempotent: ids already
    /// synced or unknown are skipped.
    fn mark_synced(
        &self,
        ids: &[u64],
    ) -> impl std::future::Future<Output = Result<(), LedgerError>> + Send;
}

/// On-disk / in-memory ledger contents.
#[derive(Debug, Serialize, Deserialize)]
struct LedgerState {
    next_id: u64,
    scores: Vec<ScoreRecord>,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            next_id: 1,
            scores: Vec::new(),
        }
    }
}

impl LedgerState {
    fn append(&mut self, draft: ScoreDraft, user_id: Option<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.scores.push(ScoreRecord {
            id,
            score: draft.score,
            level: draft.level,
            date: draft.date,
            game_duration_ms: draft.game_duration_ms,
            max_snake_length: draft.max_snake_length,
            food_eaten_count: draft.food_eaten_count,
            moves_count: draft.moves_count,
            hash: draft.hash,
            is_synced: false,
            user_id,
        });
        id
    }

    fn top_scores(&self, limit: usize) -> Vec<ScoreRecord> {
        let mut records = self.scores.clone();
        records.sort_by(|a, b| b.score.cmp(&a.score).then(b.date.cmp(&a.date)));
        records.truncate(limit);
        records
    }

    fn list_recent(&self, limit: usize) -> Vec<ScoreRecord> {
        let mut records = self.scores.clone();
        records.sort_by(|a, b| b.date.cmp(&a.date));
        records.truncate(limit);
        records
    }

    fn mark_synced(&mut self, ids: &[u64]) -> usize {
        let mut flipped = 0;
        for id in ids {
            match self.scores.iter_mut().find(|r| r.id == *id) {
                Some(record) if !record.is_synced => {
                    record.is_synced = true;
                    flipped += 1;
                }
                Some(_) => {}
                None => warn!(id = *id, "mark_synced: no such record"),
            }
        }
        flipped
    }
}

/// JSON-file-backed ledger.
#[derive(Debug)]
pub struct JsonFileLedger {
    path: PathBuf,
    state: Mutex<LedgerState>,
}

impl JsonFileLedger {
    /// Open (or create) a ledger at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let state = match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => LedgerState::default(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), "score ledger opened");
        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    async fn persist(&self, state: &LedgerState) -> Result<(), LedgerError> {
        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

impl ScoreLedger for JsonFileLedger {
    async fn append(&self, draft: ScoreDraft, user_id: Option<String>) -> Result<u64, LedgerError> {
        let mut state = self.state.lock().await;
        let id = state.append(draft, user_id);
        self.persist(&state).await?;
        debug!(id, "score appended");
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self.state.lock().await.scores.clone())
    }

    async fn list_unsynced(&self) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self
            .state
            .lock()
            .await
            .scores
            .iter()
            .filter(|r| !r.is_synced)
            .cloned()
            .collect())
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self.state.lock().await.top_scores(limit))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self.state.lock().await.list_recent(limit))
    }

    async fn mark_synced(&self, ids: &[u64]) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        let flipped = state.mark_synced(ids);
        if flipped > 0 {
            self.persist(&state).await?;
        }
        debug!(flipped, "records marked synced");
        Ok(())
    }
}

/// In-memory ledger for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreLedger for MemoryLedger {
    async fn append(&self, draft: ScoreDraft, user_id: Option<String>) -> Result<u64, LedgerError> {
        Ok(self.state.lock().await.append(draft, user_id))
    }

    async fn list_all(&self) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self.state.lock().await.scores.clone())
    }

    async fn list_unsynced(&self) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self
            .state
            .lock()
            .await
            .scores
            .iter()
            .filter(|r| !r.is_synced)
            .cloned()
            .collect())
    }

    async fn top_scores(&self, limit: usize) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self.state.lock().await.top_scores(limit))
    }

    async fn list_recent(&self, limit: usize) -> Result<Vec<ScoreRecord>, LedgerError> {
        Ok(self.state.lock().await.list_recent(limit))
    }

    async fn mark_synced(&self, ids: &[u64]) -> Result<(), LedgerError> {
        self.state.lock().await.mark_synced(ids);
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
