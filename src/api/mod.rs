//! REST API for on-demand status queries
//!
//! ## Endpoints
//!
//! - `GET /api/v1/health` - Liveness of the monitor itself
//! - `GET /api/v1/incidents` - Current outstanding incidents (no network activity)
//! - `POST /api/v1/check` - Run a poll cycle now, then return the outstanding incidents
//!
//! All endpoints except `health` require `Authorization: Bearer <token>` when
//! a token is configured.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use state::ApiState;
pub use types::{HealthResponse, IncidentsResponse};

use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::info;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Bind address (e.g., "127.0.0.1:8080")
    pub bind_addr: SocketAddr,

    /// Optional authentication token
    pub auth_token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: crate::util::get_api_addr(),
            auth_token: crate::util::get_api_token(),
        }
    }
}

/// Build the router with all routes
pub fn router(state: ApiState, auth_token: Option<String>) -> Router {
    let mut protected = Router::new()
        .route("/api/v1/incidents", get(routes::incidents::list_incidents))
        .route("/api/v1/check", post(routes::incidents::check_now));

    if let Some(token) = auth_token {
        protected = protected.route_layer(axum::middleware::from_fn_with_state(
            token,
            middleware::auth::auth_middleware,
        ));
    }

    Router::new()
        .route("/api/v1/health", get(routes::health::health_check))
        .merge(protected)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Spawn the API server
///
/// This starts an Axum HTTP server in a background task.
/// Returns the server's local address.
pub async fn spawn_api_server(config: ApiConfig, state: ApiState) -> anyhow::Result<SocketAddr> {
    info!("starting API server on {}", config.bind_addr);

    let app = router(state, config.auth_token);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let addr = listener.local_addr()?;

    info!("API server listening on {}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(addr)
}
