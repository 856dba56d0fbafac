//! Outstanding incident endpoints

use axum::{Json, extract::State};
use tracing::debug;

use crate::api::{error::ApiResult, state::ApiState, types::IncidentsResponse};

/// GET /api/v1/incidents
///
/// Current snapshot; does not probe anything
pub async fn list_incidents(State(state): State<ApiState>) -> ApiResult<Json<IncidentsResponse>> {
    let incidents = state.monitor.outstanding().await?;
    Ok(Json(incidents.into()))
}

/// POST /api/v1/check
///
/// Runs a full poll cycle (alerts included), then returns the snapshot
pub async fn check_now(State(state): State<ApiState>) -> ApiResult<Json<IncidentsResponse>> {
    debug!("on-demand check requested");
    let incidents = state.monitor.check_now().await?;
    Ok(Json(incidents.into()))
}
