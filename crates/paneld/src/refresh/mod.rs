//! Background refresh workers.
//!
//! Each data domain (calendar, weather) gets one long-lived worker task that
//! counts down its own refresh timer, runs a fetch cycle when the countdown
//! reaches zero and publishes the result into the domain's [`SnapshotCell`].
//! A failed cycle is logged and the timer is reset anyway, so a flaky network
//! can never wedge the loop. Workers react to two external stimuli: a forced
//! refresh (countdown is zeroed, fetch happens on the next tick) and a
//! cooperative stop, observed within one tick.

pub mod backoff;

use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::common::error::FetchError;
use crate::data::SnapshotCell;

/// One domain's fetch cycle. Implementations aggregate whatever sources the
/// domain has and return a fully-formed snapshot; partial-source failures are
/// their business, a returned `Err` means the whole cycle produced nothing.
pub trait Refresher: Send + 'static {
    type Snapshot: Send + Sync + 'static;

    fn label(&self) -> &'static str;
    fn run_cycle(&mut self) -> BoxFuture<'_, Result<Self::Snapshot, FetchError>>;
}

#[derive(Debug, Clone, Copy)]
enum WorkerMessage {
    ForceRefresh,
    Stop,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerParams {
    /// Countdown length, in ticks.
    pub interval_ticks: u64,
    /// Tick granularity. One second in production; tests shrink it.
    pub tick: Duration,
}

impl WorkerParams {
    pub fn production(interval: Duration) -> Self {
        WorkerParams {
            interval_ticks: interval.as_secs().max(1),
            tick: Duration::from_secs(1),
        }
    }
}

/// Handle of a spawned refresh worker.
pub struct RefreshWorker {
    label: &'static str,
    tx: UnboundedSender<WorkerMessage>,
    handle: JoinHandle<()>,
}

/// Clonable handle that lets screens request an out-of-schedule refresh.
#[derive(Clone)]
pub struct RefreshTrigger {
    tx: UnboundedSender<WorkerMessage>,
}

impl RefreshTrigger {
    pub fn force_refresh(&self) {
        if self.tx.send(WorkerMessage::ForceRefresh).is_err() {
            log::warn!("Refresh worker is gone, ignoring forced refresh");
        }
    }

    /// A trigger with no worker behind it; forced refreshes go nowhere.
    #[cfg(test)]
    pub(crate) fn disconnected() -> Self {
        let (tx, _) = mpsc::unbounded_channel();
        RefreshTrigger { tx }
    }
}

impl RefreshWorker {
    pub fn trigger(&self) -> RefreshTrigger {
        RefreshTrigger {
            tx: self.tx.clone(),
        }
    }

    pub fn force_refresh(&self) {
        self.trigger().force_refresh();
    }

    /// Signal the worker to exit and wait for the current cycle (if any) to
    /// finish.
    pub async fn stop(self) {
        let _ = self.tx.send(WorkerMessage::Stop);
        if let Err(error) = self.handle.await {
            log::error!("{} refresh worker did not shut down cleanly: {error}", self.label);
        }
    }
}

pub fn spawn_refresh_worker<R: Refresher>(
    refresher: R,
    params: WorkerParams,
    cell: SnapshotCell<R::Snapshot>,
) -> RefreshWorker {
    let (tx, rx) = mpsc::unbounded_channel();
    let label = refresher.label();
    let handle = tokio::spawn(worker_loop(refresher, params, cell, rx));
    RefreshWorker { label, tx, handle }
}

async fn worker_loop<R: Refresher>(
    mut refresher: R,
    params: WorkerParams,
    cell: SnapshotCell<R::Snapshot>,
    mut rx: UnboundedReceiver<WorkerMessage>,
) {
    let label = refresher.label();
    log::debug!("{label} refresh loop starting");

    let mut ticker = tokio::time::interval(params.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of an interval completes immediately.
    ticker.tick().await;

    let mut remaining = params.interval_ticks;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    match refresher.run_cycle().await {
                        Ok(snapshot) => {
                            cell.publish(snapshot);
                            log::debug!("{label}: published a fresh snapshot");
                        }
                        Err(error) => {
                            log::error!("{label} refresh cycle failed: {error}");
                        }
                    }
                    remaining = params.interval_ticks;
                }
            }
            message = rx.recv() => match message {
                Some(WorkerMessage::ForceRefresh) => {
                    log::debug!("{label}: refresh forced");
                    remaining = 0;
                }
                Some(WorkerMessage::Stop) | None => break,
            }
        }
    }
    log::debug!("{label} refresh loop stopped");
}
