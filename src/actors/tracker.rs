//! TrackerActor - Owns the streak states of all endpoints
//!
//! Scheduled cycles and on-demand checks may run at the same time. Both send
//! their probe results here, so updates to a streak never interleave and a
//! snapshot always sees whole records.

use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

use crate::probe::ProbeResult;
use crate::query::OutstandingIncident;
use crate::streak::{CycleReport, StreakTracker};

use super::messages::TrackerCommand;

pub struct TrackerActor {
    tracker: StreakTracker,
    command_rx: mpsc::Receiver<TrackerCommand>,
}

impl TrackerActor {
    pub fn new(tracker: StreakTracker, command_rx: mpsc::Receiver<TrackerCommand>) -> Self {
        Self {
            tracker,
            command_rx,
        }
    }

    #[instrument(skip(self), fields(threshold = self.tracker.threshold()))]
    pub async fn run(mut self) {
        debug!("starting tracker actor");

        loop {
            let Some(cmd) = self.command_rx.recv().await else {
                warn!("command channel closed, shutting down");
                break;
            };

            match cmd {
                TrackerCommand::Record {
                    results,
                    respond_to,
                } => {
                    let report = self.tracker.record(&results);
                    let _ = respond_to.send(report);
                }

                TrackerCommand::Snapshot { respond_to } => {
                    let _ = respond_to.send(self.tracker.outstanding());
                }

                TrackerCommand::Shutdown => {
                    debug!("received shutdown command");
                    break;
                }
            }
        }

        debug!("tracker actor stopped");
    }
}

/// Handle for controlling the TrackerActor
#[derive(Clone)]
pub struct TrackerHandle {
    sender: mpsc::Sender<TrackerCommand>,
}

impl TrackerHandle {
    /// Spawn a tracker actor with a fresh state table
    pub fn spawn(error_threshold: u32) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);

        let actor = TrackerActor::new(StreakTracker::new(error_threshold), cmd_rx);
        tokio::spawn(actor.run());

        Self { sender: cmd_tx }
    }

    /// Apply one cycle of probe results
    pub async fn record(&self, results: Vec<ProbeResult>) -> Result<CycleReport> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TrackerCommand::Record {
                results,
                respond_to: tx,
            })
            .await
            .context("failed to send Record command")?;

        rx.await.context("failed to receive cycle report")
    }

    /// Current outstanding incidents, sorted by endpoint name
    pub async fn snapshot(&self) -> Result<Vec<OutstandingIncident>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(TrackerCommand::Snapshot { respond_to: tx })
            .await
            .context("failed to send Snapshot command")?;

        rx.await.context("failed to receive snapshot")
    }

    pub async fn shutdown(&self) {
        let _ = self.sender.send(TrackerCommand::Shutdown).await;
    }
}
