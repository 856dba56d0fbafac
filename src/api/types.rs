//! API response types

use serde::Serialize;

use crate::query::{OutstandingIncident, render_report};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub endpoints: usize,
    pub timestamp: String,
}

/// Outstanding incidents plus their human-readable rendering
#[derive(Debug, Clone, Serialize)]
pub struct IncidentsResponse {
    pub timestamp: String,
    pub count: usize,
    pub incidents: Vec<OutstandingIncident>,
    pub report: String,
}

impl From<Vec<OutstandingIncident>> for IncidentsResponse {
    fn from(incidents: Vec<OutstandingIncident>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            count: incidents.len(),
            report: render_report(&incidents),
            incidents,
        }
    }
}
