//! Gridsnake demo binary.
//!
//! Plays one bot-steered session end to end: simulate to game over,
//! commit the score locally, show the sync deferring while offline, then
//! flip readiness and push the batch to the in-process authority.

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use gridsnake::game::clock::{GameClock, ManualClock, SystemClock};
use gridsnake::game::grid::Direction;
use gridsnake::game::level::Level;
use gridsnake::game::session::{GameSession, SessionResult};
use gridsnake::score::integrity::CLIENT_SECRET;
use gridsnake::score::ledger::{JsonFileLedger, ScoreLedger};
use gridsnake::score::sync::{Readiness, ScoreService, SyncOutcome};
use gridsnake::server::authority::LeaderboardAuthority;
use gridsnake::VERSION;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Gridsnake v{}", VERSION);

    let ledger_path = std::env::temp_dir().join("gridsnake-scores.json");
    info!(path = %ledger_path.display(), "opening score ledger");
    let ledger = JsonFileLedger::open(&ledger_path).await?;

    let (readiness_tx, readiness_rx) = tokio::sync::watch::channel(Readiness::default());
    let authority = LeaderboardAuthority::new(CLIENT_SECRET);
    let service = ScoreService::new(ledger, authority, readiness_rx, SystemClock);

    // Play one session to game over
    let result = demo_session();
    info!(
        score = result.score,
        moves = result.moves_count,
        duration_ms = result.game_duration_ms,
        seed = result.seed,
        "session finished"
    );

    // Commit is local and always works, online or not
    let id = service.commit(&result).await?;
    info!(id, "score committed to the local ledger");

    // Still offline: the sync defers and the record stays queued
    report(service.attempt_sync().await?);
    let queued = service.ledger().list_unsynced().await?.len();
    info!(queued, "records waiting for sync");

    // Going online with a signed-in user unlocks the push
    readiness_tx.send(Readiness {
        online: true,
        user_id: Some("demo-player".to_string()),
    })?;
    report(service.attempt_sync().await?);

    let top = service.authority().leaderboard(result.level).await;
    info!("=== Leaderboard ({}) ===", result.level);
    for (rank, entry) in top.iter().enumerate() {
        info!(
            "#{}: {} - {} points in {} moves",
            rank + 1,
            entry.user_id,
            entry.score.score,
            entry.score.moves_count
        );
    }

    Ok(())
}

fn report(outcome: SyncOutcome) {
    match outcome {
        SyncOutcome::Deferred => info!("sync deferred: offline or not signed in"),
        SyncOutcome::UpToDate => info!("sync: nothing to do"),
        SyncOutcome::Completed {
            submitted,
            accepted,
        } => info!(submitted, accepted, "sync completed"),
        SyncOutcome::Failed => warn!("sync failed, records stay queued"),
    }
}

/// Run a bot-steered session on a manual clock: 200ms per tick without
/// sleeping, so the recorded duration is realistic.
fn demo_session() -> SessionResult {
    let clock = ManualClock::at(SystemClock.now_ms());
    let mut session = GameSession::new(clock.clone());
    session.start(Level::Medium);

    loop {
        // Greedy chase until the cap, then run straight into a wall
        if session.stats.moves_count < 2_000 {
            steer_toward_food(&mut session);
        }
        clock.advance_ms(200);
        if let Some(result) = session.tick() {
            return result;
        }
    }
}

/// Close the horizontal gap to the food first, then the vertical one.
/// Reverse requests are dropped by the session, which is good enough for
/// a demo bot.
fn steer_toward_food(session: &mut GameSession<ManualClock>) {
    let Some(engine) = session.engine.as_ref() else {
        return;
    };
    let head = engine.snake.head();
    let food = engine.food;

    let wanted = if food.x < head.x {
        Direction::Left
    } else if food.x > head.x {
        Direction::Right
    } else if food.y < head.y {
        Direction::Up
    } else if food.y > head.y {
        Direction::Down
    } else {
        return;
    };
    session.handle_direction(wanted);
}
