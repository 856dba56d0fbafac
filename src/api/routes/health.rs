//! Liveness endpoint

use axum::{Json, extract::State};

use crate::api::{state::ApiState, types::HealthResponse};

/// GET /api/v1/health
///
/// Reports that the monitor process is up and how many endpoints it watches
pub async fn health_check(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        endpoints: state.monitor.registry().endpoints().len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
