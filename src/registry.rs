//! Immutable set of monitored endpoints plus the resolved global settings

use std::time::Duration;

use crate::config::{Alert, Config, ConfigError};

/// A single monitored endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Unique name across the registry
    pub name: String,

    /// Base address, e.g. `http://127.0.0.1:8080`
    pub address: String,

    /// Bearer token sent with every probe
    pub token: String,
}

impl Endpoint {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            token: token.into(),
        }
    }

    pub fn status_url(&self) -> String {
        format!("{}/get_status", self.address.trim_end_matches('/'))
    }
}

/// Settings with units resolved
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub interval: Duration,
    pub timeout: Duration,
    pub error_threshold: u32,
    pub retry_count: u32,
    pub alert: Option<Alert>,
}

impl MonitorSettings {
    /// Upper bound for one probe including its retries, saturating at
    /// `Duration::MAX`
    pub fn probe_budget(&self) -> Duration {
        self.timeout
            .checked_mul(self.retry_count.saturating_add(1))
            .unwrap_or(Duration::MAX)
    }
}

#[derive(Debug, Clone)]
pub struct Registry {
    settings: MonitorSettings,
    endpoints: Vec<Endpoint>,
}

impl Registry {
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let settings = MonitorSettings {
            interval: Duration::from_secs(config.settings.interval),
            timeout: Duration::from_secs(config.settings.timeout),
            error_threshold: config.settings.error_threshold,
            retry_count: config.settings.retry_count,
            alert: config.settings.alert,
        };

        let endpoints = config
            .connections
            .into_iter()
            .map(|conn| {
                let address = conn.url();
                Endpoint::new(conn.name, address, conn.token)
            })
            .collect();

        Ok(Self {
            settings,
            endpoints,
        })
    }

    /// Build a registry directly, used by embedders and tests
    pub fn new(settings: MonitorSettings, endpoints: Vec<Endpoint>) -> Self {
        Self {
            settings,
            endpoints,
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn get(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|endpoint| endpoint.name == name)
    }
}
