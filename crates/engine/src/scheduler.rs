//! Periodic driver for [`Engine::tick`].
//!
//! The loop ticks on a fixed interval, ticks early whenever it is
//! triggered, and exits on shutdown. Ticks never overlap: the loop is one
//! task and a tick runs to completion before the next `select!`. Each
//! tick runs on the blocking pool, so a store doing file I/O never stalls
//! the runtime's workers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use remedy_storage::Store;

use crate::engine::Engine;

/// Control handle for a running scheduler.
pub struct SchedulerHandle {
    trigger: Arc<Notify>,
    shutdown_tx: watch::Sender<bool>,
    ticks_rx: watch::Receiver<u64>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Request a tick now, e.g. after a state mutation. Requests made while
    /// a tick is running coalesce into one follow-up tick.
    pub fn trigger(&self) {
        self.trigger.notify_one();
    }

    /// Number of completed ticks. Changes after every tick.
    pub fn ticks(&self) -> watch::Receiver<u64> {
        self.ticks_rx.clone()
    }

    /// Stop the loop and wait for it to exit. A tick in progress finishes
    /// first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Scheduler task ended abnormally");
        }
    }
}

/// Spawn the scheduler onto the current tokio runtime. The first tick runs
/// immediately.
pub fn spawn<S: Store>(engine: Arc<Engine<S>>, period: Duration) -> SchedulerHandle {
    let trigger = Arc::new(Notify::new());
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    let (ticks_tx, ticks_rx) = watch::channel(0u64);

    let notified = Arc::clone(&trigger);
    let task = tokio::spawn(async move {
        info!(interval_secs = period.as_secs(), "Scheduler started");
        let mut ticker = interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = notified.notified() => {}
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Scheduler shutting down");
                        break;
                    }
                    continue;
                }
            }

            let ticking = Arc::clone(&engine);
            match tokio::task::spawn_blocking(move || ticking.tick()).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => warn!(error = %e, "Scheduler tick failed"),
                Err(e) => error!(error = %e, "Scheduler tick panicked"),
            }
            ticks_tx.send_modify(|n| *n += 1);
        }
    });

    SchedulerHandle {
        trigger,
        shutdown_tx,
        ticks_rx,
        task,
    }
}
