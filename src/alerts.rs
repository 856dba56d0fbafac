use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::{error, info, instrument, warn};

use crate::config::{Alert, Webhook};
use crate::discord::{DiscordManager, build_incident_message};
use crate::streak::Incident;

/// Upper bound for a single delivery unless configured otherwise
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of one dispatch batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Messages accepted by the sink
    pub delivered: usize,

    /// `(endpoint name, error)` for every message that could not be delivered
    pub failures: Vec<(String, String)>,
}

/// Sends incidents to the configured alert sink
#[derive(Debug, Clone)]
pub struct AlertDispatcher {
    client: Client,
    sink: Option<Alert>,
    discord_manager: DiscordManager,
    send_timeout: Duration,
}

impl AlertDispatcher {
    pub fn new(sink: Option<Alert>) -> Self {
        Self::with_client(Client::new(), sink)
    }

    pub fn with_client(client: Client, sink: Option<Alert>) -> Self {
        Self {
            discord_manager: DiscordManager::new(client.clone()),
            client,
            sink,
            send_timeout: DEFAULT_SEND_TIMEOUT,
        }
    }

    /// Bound every delivery; a sink that does not answer in time counts as
    /// a failed send
    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Deliver every incident independently.
    ///
    /// A failed send is logged and recorded in the report; the remaining
    /// incidents are still delivered.
    #[instrument(skip_all, fields(incidents = incidents.len()))]
    pub async fn dispatch(&self, incidents: &[Incident]) -> DispatchReport {
        let mut report = DispatchReport::default();

        let Some(sink) = &self.sink else {
            warn!("no alert sink configured, skipping {} incident(s)", incidents.len());
            return report;
        };

        for incident in incidents {
            let result = tokio::time::timeout(self.send_timeout, self.send(sink, incident))
                .await
                .unwrap_or_else(|_| {
                    Err(anyhow::anyhow!(
                        "alert sink did not answer within {}ms",
                        self.send_timeout.as_millis()
                    ))
                });

            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!("failed to deliver alert for {}: {:#}", incident.name, e);
                    report.failures.push((incident.name.clone(), format!("{e:#}")));
                }
            }
        }

        report
    }

    async fn send(&self, sink: &Alert, incident: &Incident) -> Result<()> {
        match sink {
            Alert::Discord(discord) => {
                let message = build_incident_message(discord, incident);
                self.discord_manager.send_message(discord, &message).await
            }
            Alert::Webhook(webhook) => self.send_webhook_alert(webhook, incident).await,
        }
    }

    #[instrument(skip(self, webhook, incident), fields(endpoint = %incident.name))]
    async fn send_webhook_alert(&self, webhook: &Webhook, incident: &Incident) -> Result<()> {
        let payload = json!({
            "message": format_incident_message(incident),
            "endpoint": incident.name,
            "address": incident.address,
            "kind": incident.kind,
            "reason": incident.reason,
            "count": incident.count,
            "timestamp": Utc::now().to_rfc3339()
        });

        let response = self
            .client
            .post(&webhook.url)
            .json(&payload)
            .send()
            .await
            .context("failed to send webhook alert")?;

        if !response.status().is_success() {
            bail!("webhook alert failed with status: {}", response.status());
        }

        info!("successfully sent webhook alert");
        Ok(())
    }
}

pub fn format_incident_message(incident: &Incident) -> String {
    format!(
        "⚠️ Connection alert\nName: {}\nAddress: {}\nKind: {}\nReason: {}\nConsecutive: {}",
        incident.name, incident.address, incident.kind, incident.reason, incident.count
    )
}
