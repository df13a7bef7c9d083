//! Periodic deletion of expired sessions.
//!
//! The sweeper is started and stopped explicitly by whoever owns the process
//! lifecycle. Nothing runs until [`SessionSweeper::start`] is called.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::services::session_manager::SessionManager;

pub struct SessionSweeper;

/// Handle to a running sweep loop.
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SessionSweeper {
    /// Spawns the sweep loop. The first sweep runs immediately.
    #[must_use]
    pub fn start(manager: SessionManager, every: Duration) -> SweeperHandle {
        let (shutdown, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = every.as_secs(), "Session sweeper started");

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match manager.sweep_expired().await {
                            Ok(0) => debug!("Session sweep found nothing to remove"),
                            Ok(removed) => info!(removed, "Swept expired sessions"),
                            Err(e) => error!(error = %e, "Session sweep failed"),
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Session sweeper stopped");
        });

        SweeperHandle { shutdown, task }
    }
}

impl SweeperHandle {
    /// Signals the loop and waits for it to exit. A sweep already in
    /// progress is allowed to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "Session sweeper task ended abnormally");
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
