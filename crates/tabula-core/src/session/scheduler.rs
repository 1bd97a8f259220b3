//! Background snapshot and purge scheduling.
//!
//! `SessionScheduler` is owned by the application and passed the store it
//! drives; nothing runs until [`SessionScheduler::start`] and everything
//! stops at [`SessionScheduler::stop`]. Intervals use tokio time, so tests
//! can run the scheduler under a paused clock.

use super::model::{SessionSnapshot, SnapshotOutcome, SnapshotType};
use crate::error::{Result, TabulaError};
use crate::store::TabStore;
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

/// What the scheduler found when the session started.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupReport {
    /// The previous session never reported a clean close.
    pub previous_session_crashed: bool,
    /// Most recent snapshot of the crashed session, offered for recovery.
    pub recoverable_session: Option<SessionSnapshot>,
    pub initial_snapshot: SnapshotOutcome,
}

pub struct SessionScheduler {
    store: Arc<TabStore>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl SessionScheduler {
    pub fn new(store: Arc<TabStore>) -> Self {
        Self {
            store,
            cancel: CancellationToken::new(),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Opens the session and starts the background loop.
    ///
    /// The crash marker is read before it is overwritten, then an `auto`
    /// snapshot is taken immediately. Must be called inside a tokio runtime.
    pub async fn start(&mut self) -> Result<StartupReport> {
        if self.handle.is_some() {
            return Err(TabulaError::invalid_state("scheduler already started"));
        }

        let previous_session_crashed = self.store.check_previous_session_crashed().await?;
        let recoverable_session = if previous_session_crashed {
            self.store.get_last_session().await?
        } else {
            None
        };
        self.store.mark_session_active().await?;
        let initial_snapshot = self.store.create_session_snapshot(SnapshotType::Auto).await?;

        self.cancel = CancellationToken::new();
        self.handle = Some(tokio::spawn(run(self.store.clone(), self.cancel.clone())));

        tracing::info!(previous_session_crashed, "Session scheduler started");
        Ok(StartupReport {
            previous_session_crashed,
            recoverable_session,
            initial_snapshot,
        })
    }

    /// The UI was hidden and may be closing; take a `pre-close` snapshot.
    pub async fn notify_hidden(&self) -> Result<SnapshotOutcome> {
        self.store.create_session_snapshot(SnapshotType::PreClose).await
    }

    /// Stops the loop, waits for it to finish and marks the session closed.
    pub async fn stop(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        self.cancel.cancel();
        if let Err(e) = handle.await {
            tracing::warn!("Scheduler task ended abnormally: {}", e);
        }
        self.store.mark_session_closed().await?;

        tracing::info!("Session scheduler stopped");
        Ok(())
    }
}

impl Drop for SessionScheduler {
    fn drop(&mut self) {
        // The session stays marked active, which is what a crash looks like.
        self.cancel.cancel();
    }
}

async fn run(store: Arc<TabStore>, cancel: CancellationToken) {
    let snapshot_every = store.config().snapshot_interval();
    let cleanup_every = store.config().cleanup_interval();

    let mut snapshot_tick = interval_at(Instant::now() + snapshot_every, snapshot_every);
    snapshot_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cleanup_tick = interval_at(Instant::now() + cleanup_every, cleanup_every);
    cleanup_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = snapshot_tick.tick() => {
                if let Err(e) = store.create_session_snapshot(SnapshotType::Auto).await {
                    tracing::warn!("Automatic snapshot failed: {}", e);
                }
            }
            _ = cleanup_tick.tick() => {
                if let Err(e) = store.cleanup_removed_tabs().await {
                    tracing::warn!("Removed-tab cleanup failed: {}", e);
                }
            }
        }
    }
}
