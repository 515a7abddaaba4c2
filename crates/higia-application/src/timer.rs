//! Scoped elapsed-time ticker.

use chrono::{DateTime, Utc};
use higia_core::clock::Clock;
use higia_core::elapsed::elapsed_seconds;
use higia_core::{HigiaError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to a task that republishes the elapsed seconds of a running
/// session once per period.
///
/// The task lives exactly as long as the handle: dropping it aborts the task,
/// so no tick can land after the session it belongs to has been left.
#[derive(Debug)]
pub struct ElapsedTicker {
    handle: JoinHandle<()>,
}

impl ElapsedTicker {
    /// Spawns the ticker on the current tokio runtime.
    ///
    /// The first value is published immediately, then every `period`.
    pub fn spawn(
        started_at: DateTime<Utc>,
        clock: Arc<dyn Clock>,
        sink: Arc<watch::Sender<u64>>,
        period: Duration,
    ) -> Result<Self> {
        let runtime = Handle::try_current()
            .map_err(|_| HigiaError::internal("Elapsed timer requires a tokio runtime"))?;
        let period = period.max(Duration::from_millis(1));

        let handle = runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                sink.send_replace(elapsed_seconds(started_at, clock.now()));
            }
        });

        Ok(Self { handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
