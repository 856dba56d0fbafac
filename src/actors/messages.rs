//! Message types for actor communication

use tokio::sync::oneshot;

use crate::probe::ProbeResult;
use crate::query::OutstandingIncident;
use crate::streak::CycleReport;

/// Commands that can be sent to the TrackerActor
#[derive(Debug)]
pub enum TrackerCommand {
    /// Apply the probe results of one poll cycle
    Record {
        results: Vec<ProbeResult>,
        respond_to: oneshot::Sender<CycleReport>,
    },

    /// Copy out every endpoint with a non-zero streak
    Snapshot {
        respond_to: oneshot::Sender<Vec<OutstandingIncident>>,
    },

    /// Gracefully shut down the tracker
    Shutdown,
}

/// Commands that can be sent to the PollerActor
#[derive(Debug)]
pub enum PollerCommand {
    /// Run a poll cycle immediately (bypassing the interval timer)
    CheckNow {
        respond_to: oneshot::Sender<anyhow::Result<CycleReport>>,
    },

    /// Gracefully shut down the poller
    ///
    /// An in-flight cycle is finished first.
    Shutdown,
}
