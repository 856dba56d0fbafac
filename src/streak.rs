//! Per-endpoint consecutive-failure tracking
//!
//! ## Streak State Machine
//!
//! ```text
//! Healthy (count = 0)
//!   Failing(kind)                  → Unhealthy(kind, count = 1, reported = false)
//!
//! Unhealthy(kind, count, reported):
//!   Failing(same kind)             → count + 1, reason refreshed
//!   Failing(other kind)            → Unhealthy(other kind, count = 1, reported = false)
//!   Healthy                        → Healthy, emits Recovered
//!
//! After every failing update:
//!   count >= threshold && !reported → reported = true, emits Incident
//! ```
//!
//! A streak therefore produces at most one incident, no matter how long it
//! lasts, while single-cycle blips below the threshold produce nothing.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::classify::{ErrorKind, Verdict, classify};
use crate::probe::ProbeResult;
use crate::query::OutstandingIncident;

/// Streak record for one endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreakState {
    /// Active error kind, `None` while healthy
    pub kind: Option<ErrorKind>,

    /// Latest reason text for the active kind
    pub reason: String,

    /// Consecutive cycles with `kind`
    pub count: u32,

    /// Whether an incident has been emitted for this streak
    pub reported: bool,
}

impl StreakState {
    pub fn is_healthy(&self) -> bool {
        self.count == 0
    }
}

/// Something noteworthy produced by a single transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// The endpoint is healthy again after `count` failing cycles
    Recovered { kind: ErrorKind, count: u32 },

    /// The streak reached the threshold for the first time
    Incident {
        kind: ErrorKind,
        reason: String,
        count: u32,
    },
}

/// Advance one endpoint's streak by one poll cycle.
pub fn transition(
    state: &StreakState,
    verdict: &Verdict,
    threshold: u32,
) -> (StreakState, Option<Observation>) {
    match verdict {
        Verdict::Healthy => {
            let observation = match state.kind {
                Some(kind) if state.count > 0 => Some(Observation::Recovered {
                    kind,
                    count: state.count,
                }),
                _ => None,
            };
            (StreakState::default(), observation)
        }

        Verdict::Failing { kind, reason } => {
            let mut next = if state.kind == Some(*kind) {
                StreakState {
                    kind: Some(*kind),
                    reason: reason.clone(),
                    count: state.count.saturating_add(1),
                    reported: state.reported,
                }
            } else {
                StreakState {
                    kind: Some(*kind),
                    reason: reason.clone(),
                    count: 1,
                    reported: false,
                }
            };

            let observation = if next.count >= threshold && !next.reported {
                next.reported = true;
                Some(Observation::Incident {
                    kind: *kind,
                    reason: reason.clone(),
                    count: next.count,
                })
            } else {
                None
            };

            (next, observation)
        }
    }
}

/// An alertable event: a streak that just crossed the threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incident {
    pub name: String,
    pub address: String,
    pub kind: ErrorKind,
    pub reason: String,
    pub count: u32,
    pub detected_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recovery {
    pub name: String,
    pub address: String,
    pub kind: ErrorKind,
    pub count: u32,
}

/// What a single poll cycle changed
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    /// Number of probe results applied
    pub probed: usize,

    /// Number of endpoints failing in this cycle
    pub failing: usize,

    pub incidents: Vec<Incident>,
    pub recoveries: Vec<Recovery>,
}

/// Streak states of all endpoints, keyed by endpoint name
#[derive(Debug, Clone)]
pub struct StreakTracker {
    threshold: u32,
    states: HashMap<String, StreakState>,
}

impl StreakTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            states: HashMap::new(),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn state(&self, name: &str) -> Option<&StreakState> {
        self.states.get(name)
    }

    /// Classify and apply the results of one poll cycle
    #[instrument(skip_all, fields(results = results.len()))]
    pub fn record(&mut self, results: &[ProbeResult]) -> CycleReport {
        let mut report = CycleReport {
            probed: results.len(),
            ..CycleReport::default()
        };

        for result in results {
            let verdict = classify(result);
            let state = self.states.entry(result.name.clone()).or_default();

            let (next, observation) = transition(state, &verdict, self.threshold);
            *state = next;

            if let Verdict::Failing { kind, reason } = &verdict {
                report.failing += 1;
                warn!(
                    "[{}] {kind} - consecutive {} - {reason}",
                    result.name, state.count
                );
            }

            match observation {
                Some(Observation::Recovered { kind, count }) => {
                    info!("[{}] recovered after {count} x {kind}", result.name);
                    report.recoveries.push(Recovery {
                        name: result.name.clone(),
                        address: result.address.clone(),
                        kind,
                        count,
                    });
                }
                Some(Observation::Incident { kind, reason, count }) => {
                    error!(
                        "[{}] incident: {count} consecutive {kind}, reporting",
                        result.name
                    );
                    report.incidents.push(Incident {
                        name: result.name.clone(),
                        address: result.address.clone(),
                        kind,
                        reason,
                        count,
                        detected_at: Utc::now(),
                    });
                }
                None => {}
            }
        }

        report
    }

    /// Copy of every endpoint that currently has a non-zero streak
    pub fn outstanding(&self) -> Vec<OutstandingIncident> {
        let mut outstanding: Vec<_> = self
            .states
            .iter()
            .filter_map(|(name, state)| {
                let kind = state.kind.filter(|_| state.count > 0)?;
                Some(OutstandingIncident {
                    name: name.clone(),
                    kind,
                    reason: state.reason.clone(),
                    count: state.count,
                    reported: state.reported,
                })
            })
            .collect();

        outstanding.sort_by(|a, b| a.name.cmp(&b.name));
        outstanding
    }
}
