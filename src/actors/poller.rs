//! PollerActor - Runs a poll cycle at the configured interval
//!
//! ## Message Flow
//!
//! ```text
//! Timer tick → Monitor::run_cycle → [probe_all → TrackerActor → AlertDispatcher]
//!     ↑
//!     └─── Commands (CheckNow, Shutdown)
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, instrument, warn};

use crate::monitor::Monitor;
use crate::streak::CycleReport;

use super::messages::PollerCommand;

pub struct PollerActor {
    monitor: Monitor,
    command_rx: mpsc::Receiver<PollerCommand>,
    interval_duration: Duration,
}

impl PollerActor {
    pub fn new(
        monitor: Monitor,
        command_rx: mpsc::Receiver<PollerCommand>,
        interval_duration: Duration,
    ) -> Self {
        Self {
            monitor,
            command_rx,
            interval_duration,
        }
    }

    /// Run until a Shutdown command arrives or every handle is dropped
    #[instrument(skip(self), fields(interval = ?self.interval_duration))]
    pub async fn run(mut self) {
        debug!("starting poller actor");

        let mut ticker = interval(self.interval_duration);
        // a slow cycle delays the next one instead of causing a burst
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.monitor.run_cycle().await {
                        error!("poll cycle failed: {:#}", e);
                    }
                }

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(PollerCommand::CheckNow { respond_to }) => {
                            debug!("received CheckNow command");
                            let result = self.monitor.run_cycle().await;
                            let _ = respond_to.send(result);
                        }

                        Some(PollerCommand::Shutdown) => {
                            debug!("received shutdown command");
                            break;
                        }

                        None => {
                            warn!("command channel closed, shutting down");
                            break;
                        }
                    }
                }
            }
        }

        debug!("poller actor stopped");
    }
}

/// Handle for controlling a PollerActor
#[derive(Clone)]
pub struct PollerHandle {
    sender: mpsc::Sender<PollerCommand>,
}

impl PollerHandle {
    /// Spawn a poller; the first cycle runs immediately
    pub fn spawn(monitor: Monitor, interval_duration: Duration) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = PollerActor::new(monitor, cmd_rx, interval_duration);
        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Trigger a cycle now and wait for its report
    pub async fn check_now(&self) -> Result<CycleReport> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(PollerCommand::CheckNow { respond_to: tx })
            .await
            .context("failed to send CheckNow command")?;

        rx.await.context("failed to receive response")?
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(PollerCommand::Shutdown)
            .await
            .context("failed to send Shutdown command")?;
        Ok(())
    }
}
