//! One poll cycle: fan-out, classify and track, then alert

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, instrument};

use crate::actors::tracker::TrackerHandle;
use crate::alerts::AlertDispatcher;
use crate::probe::{Probe, probe_all};
use crate::query::OutstandingIncident;
use crate::registry::Registry;
use crate::streak::CycleReport;

/// The monitoring core with all of its collaborators injected.
///
/// Cloning is cheap; clones share the registry, the probe and the tracker.
#[derive(Clone)]
pub struct Monitor {
    registry: Arc<Registry>,
    probe: Arc<dyn Probe>,
    tracker: TrackerHandle,
    dispatcher: AlertDispatcher,
}

impl Monitor {
    pub fn new(
        registry: Arc<Registry>,
        probe: Arc<dyn Probe>,
        tracker: TrackerHandle,
        dispatcher: AlertDispatcher,
    ) -> Self {
        Self {
            registry,
            probe,
            tracker,
            dispatcher,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn tracker(&self) -> &TrackerHandle {
        &self.tracker
    }

    /// Probe all endpoints, update their streaks and alert on new incidents
    #[instrument(skip(self), fields(endpoints = self.registry.endpoints().len()))]
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let results = probe_all(
            self.probe.as_ref(),
            self.registry.endpoints(),
            self.registry.settings().probe_budget(),
        )
        .await;

        let report = self.tracker.record(results).await?;
        debug!(
            "cycle done: {}/{} failing, {} incident(s), {} recovery(ies)",
            report.failing,
            report.probed,
            report.incidents.len(),
            report.recoveries.len()
        );

        if !report.incidents.is_empty() {
            self.dispatcher.dispatch(&report.incidents).await;
        }

        Ok(report)
    }

    /// Run a cycle right away and return the resulting snapshot
    pub async fn check_now(&self) -> Result<Vec<OutstandingIncident>> {
        self.run_cycle().await?;
        self.tracker.snapshot().await
    }

    /// Current snapshot, without touching the network
    pub async fn outstanding(&self) -> Result<Vec<OutstandingIncident>> {
        self.tracker.snapshot().await
    }
}
