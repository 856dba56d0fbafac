//! Health probes against endpoint `/get_status` routes
//!
//! A probe never fails: transport errors, timeouts and undecodable bodies are
//! all folded into the returned [`ProbeResult`].
//!
//! ```text
//! probe_all ──┬── probe(endpoint A) ──┐
//!             ├── probe(endpoint B) ──┼── join ── Vec<ProbeResult> (registry order)
//!             └── probe(endpoint N) ──┘
//! ```

use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{Map, Value};
use tracing::{debug, instrument, trace, warn};

use crate::registry::Endpoint;

/// Outcome of one probe
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    /// The endpoint answered; `payload` is empty if the body was not a JSON object
    Reached {
        status_code: u16,
        payload: Map<String, Value>,
    },

    /// The request never produced a response
    Unreachable { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeResult {
    pub name: String,
    pub address: String,
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    pub fn reached(endpoint: &Endpoint, status_code: u16, payload: Map<String, Value>) -> Self {
        Self {
            name: endpoint.name.clone(),
            address: endpoint.address.clone(),
            outcome: ProbeOutcome::Reached {
                status_code,
                payload,
            },
        }
    }

    pub fn unreachable(endpoint: &Endpoint, error: impl Into<String>) -> Self {
        Self {
            name: endpoint.name.clone(),
            address: endpoint.address.clone(),
            outcome: ProbeOutcome::Unreachable {
                error: error.into(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Reached { .. })
    }

    pub fn status_code(&self) -> Option<u16> {
        match self.outcome {
            ProbeOutcome::Reached { status_code, .. } => Some(status_code),
            ProbeOutcome::Unreachable { .. } => None,
        }
    }
}

/// Something that can check a single endpoint
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult;
}

/// Decode a body into a key/value mapping, falling back to an empty one
pub fn decode_payload(body: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            trace!("status body is not an object: {other}");
            Map::new()
        }
        Err(e) => {
            trace!("failed to decode status body: {e}");
            Map::new()
        }
    }
}

/// Probe backed by the process-wide HTTP client
///
/// The connection pool lives as long as this value; dropping it on shutdown
/// closes all idle connections.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    retry_count: u32,
}

impl HttpProbe {
    pub fn new(timeout: Duration, retry_count: u32) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, retry_count))
    }

    pub fn with_client(client: reqwest::Client, retry_count: u32) -> Self {
        Self {
            client,
            retry_count,
        }
    }

    async fn attempt(&self, endpoint: &Endpoint) -> Result<(u16, Map<String, Value>), String> {
        let response = self
            .client
            .get(endpoint.status_url())
            .bearer_auth(&endpoint.token)
            .send()
            .await
            .map_err(|e| format!("{:#}", anyhow::Error::from(e)))?;

        let status_code = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| format!("failed to read response body: {:#}", anyhow::Error::from(e)))?;

        Ok((status_code, decode_payload(&body)))
    }
}

#[async_trait]
impl Probe for HttpProbe {
    #[instrument(skip_all, fields(endpoint = %endpoint.name))]
    async fn probe(&self, endpoint: &Endpoint) -> ProbeResult {
        let mut attempt = 0;
        loop {
            match self.attempt(endpoint).await {
                Ok((status_code, payload)) => {
                    trace!("{}: HTTP {status_code}", endpoint.status_url());
                    return ProbeResult::reached(endpoint, status_code, payload);
                }
                Err(error) if attempt < self.retry_count => {
                    attempt += 1;
                    debug!("attempt {attempt} failed, retrying: {error}");
                }
                Err(error) => {
                    debug!("unreachable after {} attempt(s): {error}", attempt + 1);
                    return ProbeResult::unreachable(endpoint, error);
                }
            }
        }
    }
}

/// Probe every endpoint concurrently and wait for all of them.
///
/// Each probe is bounded by `budget` on its own; a probe that overruns it is
/// recorded as unreachable without holding up the others.
pub async fn probe_all(
    probe: &dyn Probe,
    endpoints: &[Endpoint],
    budget: Duration,
) -> Vec<ProbeResult> {
    let probes = endpoints.iter().map(|endpoint| async move {
        match tokio::time::timeout(budget, probe.probe(endpoint)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("{}: probe timed out after {}ms", endpoint.name, budget.as_millis());
                ProbeResult::unreachable(
                    endpoint,
                    format!("probe timed out after {}ms", budget.as_millis()),
                )
            }
        }
    });

    join_all(probes).await
}
