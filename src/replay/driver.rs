//! Replay driver
//!
//! Owns the per-day session and the single background ticker that advances
//! it. Selecting a day bumps the epoch, aborts the running ticker and swaps in
//! a fresh session, all under one lock, so a tick belonging to an older epoch
//! can never touch the new day's state.

use super::grouper::DayBuckets;
use super::session::{ReplaySession, ReplayState, TickOutcome};
use super::view::ChartView;
use crate::config::ChartConfig;
use crate::error::ReplayError;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use std::sync::{Arc, Mutex as SyncMutex};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Replay position published after every state change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplayProgress {
    pub epoch: u64,
    pub day: Option<NaiveDate>,
    pub state: ReplayState,
    pub revealed: usize,
    pub total: usize,
}

impl ReplayProgress {
    fn idle(epoch: u64) -> Self {
        Self {
            epoch,
            day: None,
            state: ReplayState::Idle,
            revealed: 0,
            total: 0,
        }
    }

    fn of(session: &ReplaySession, epoch: u64) -> Self {
        Self {
            epoch,
            day: Some(session.day()),
            state: session.state(),
            revealed: session.index(),
            total: session.len(),
        }
    }
}

#[derive(Default)]
struct DriverState {
    epoch: u64,
    session: Option<ReplaySession>,
    ticker: Option<JoinHandle<()>>,
}

impl DriverState {
    /// Invalidate the current ticker. Must run before any state reset.
    fn cancel(&mut self) -> u64 {
        self.epoch += 1;
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
        self.epoch
    }
}

pub struct ReplayDriver {
    buckets: Arc<DayBuckets>,
    tz: Tz,
    cadence: Duration,
    state: Arc<Mutex<DriverState>>,
    /// Handle to the live ticker, reachable without the async lock so drop can always abort it
    abort: SyncMutex<Option<AbortHandle>>,
    progress: watch::Sender<ReplayProgress>,
}

impl ReplayDriver {
    pub fn new(buckets: DayBuckets, tz: Tz, cadence: Duration) -> Self {
        let (progress, _) = watch::channel(ReplayProgress::idle(0));
        Self {
            buckets: Arc::new(buckets),
            tz,
            cadence,
            state: Arc::new(Mutex::new(DriverState::default())),
            abort: SyncMutex::new(None),
            progress,
        }
    }

    pub fn days(&self) -> &DayBuckets {
        &self.buckets
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    pub fn subscribe(&self) -> watch::Receiver<ReplayProgress> {
        self.progress.subscribe()
    }

    pub fn progress(&self) -> ReplayProgress {
        *self.progress.borrow()
    }

    /// Switch to `day` and start replaying it from the first record.
    ///
    /// Returns the epoch of the new session.
    pub async fn select_day(&self, day: NaiveDate) -> Result<u64, ReplayError> {
        let records = self
            .buckets
            .get(day)
            .ok_or_else(|| ReplayError::UnknownDay(day.to_string()))?
            .to_vec();

        let mut state = self.state.lock().await;
        let epoch = state.cancel();

        let mut session = ReplaySession::new(day, records, self.tz);
        session.start();
        self.progress.send_replace(ReplayProgress::of(&session, epoch));

        info!(
            "Replaying {} ({} records, epoch {}, cadence {:?})",
            day,
            session.len(),
            epoch,
            self.cadence
        );

        let finished = session.state() == ReplayState::Finished;
        state.session = Some(session);

        if !finished {
            let ticker = tokio::spawn(run_ticker(
                Arc::clone(&self.state),
                epoch,
                self.cadence,
                self.progress.clone(),
            ));
            self.set_abort(Some(ticker.abort_handle()));
            state.ticker = Some(ticker);
        }

        Ok(epoch)
    }

    /// Stop ticking. The current session stays readable.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        let epoch = state.cancel();
        self.set_abort(None);
        debug!("Replay stopped at epoch {}", epoch);
    }

    fn set_abort(&self, handle: Option<AbortHandle>) {
        let mut abort = self.abort.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = std::mem::replace(&mut *abort, handle) {
            previous.abort();
        }
    }

    pub async fn selected_day(&self) -> Option<NaiveDate> {
        self.state.lock().await.session.as_ref().map(|s| s.day())
    }

    pub async fn view(&self, chart: &ChartConfig) -> Option<ChartView> {
        let state = self.state.lock().await;
        state.session.as_ref().map(|s| ChartView::build(s, chart))
    }

    /// Wait until the session started at `epoch` has revealed every record.
    ///
    /// Returns `false` if another selection or a stop superseded it first.
    pub async fn wait_finished(&self, epoch: u64) -> bool {
        let mut rx = self.subscribe();
        let Ok(progress) = rx
            .wait_for(|p| p.epoch != epoch || p.state == ReplayState::Finished)
            .await
        else {
            return false;
        };
        progress.epoch == epoch && progress.state == ReplayState::Finished
    }
}

impl Drop for ReplayDriver {
    fn drop(&mut self) {
        // A tick may hold the state lock on another worker; the abort handle
        // stops the ticker at its next await regardless
        self.set_abort(None);
        if let Ok(mut state) = self.state.try_lock() {
            state.cancel();
        }
    }
}

async fn run_ticker(
    state: Arc<Mutex<DriverState>>,
    epoch: u64,
    cadence: Duration,
    progress: watch::Sender<ReplayProgress>,
) {
    let mut interval = if cadence.is_zero() {
        None
    } else {
        let mut interval = tokio::time::interval(cadence);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; the first reveal waits one period
        interval.tick().await;
        Some(interval)
    };

    loop {
        match interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => tokio::task::yield_now().await,
        }

        let mut guard = state.lock().await;
        if guard.epoch != epoch {
            debug!("Dropping stale tick for epoch {}", epoch);
            return;
        }

        let Some(session) = guard.session.as_mut() else {
            return;
        };

        let outcome = session.tick();
        progress.send_replace(ReplayProgress::of(session, epoch));

        if let TickOutcome::Revealed(_) = outcome {
            continue;
        }

        info!(
            "Replay of {} finished: {} markers, {} closed trades",
            session.day(),
            session.markers().len(),
            session.trades().len()
        );
        guard.ticker = None;
        return;
    }
}
