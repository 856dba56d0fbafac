//! Read-only view of endpoints that are currently failing

use serde::Serialize;

use crate::classify::ErrorKind;

/// Snapshot of one unhealthy endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutstandingIncident {
    pub name: String,
    pub kind: ErrorKind,
    pub reason: String,
    pub count: u32,
    pub reported: bool,
}

pub const NO_ANOMALIES: &str = "No anomalies found, all connections are healthy";

/// Render a snapshot as plain text for humans
pub fn render_report(incidents: &[OutstandingIncident]) -> String {
    if incidents.is_empty() {
        return NO_ANOMALIES.to_string();
    }

    incidents
        .iter()
        .map(|incident| {
            format!(
                "Name: {}\nKind: {}\nStatus: {}\nConsecutive: {}\nReported: {}",
                incident.name,
                incident.kind,
                incident.reason,
                incident.count,
                if incident.reported { "yes" } else { "no" }
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
