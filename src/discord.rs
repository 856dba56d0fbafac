use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::Serialize;
use tracing::{info, instrument};

use crate::config::Discord;
use crate::streak::Incident;

const COLOR_RED: u32 = 15158332;

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Default)]
pub struct MessageBuilder {
    content: Option<String>,
    embeds: Vec<Embed>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl ToString) -> Self {
        self.content = Some(content.to_string());
        self
    }

    pub fn add_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn build(self) -> Message {
        Message {
            content: self.content,
            embeds: self.embeds,
        }
    }
}

fn field(name: &str, value: impl ToString, inline: bool) -> EmbedField {
    EmbedField {
        name: name.to_string(),
        value: value.to_string(),
        inline,
    }
}

pub fn build_incident_embed(incident: &Incident) -> Embed {
    Embed {
        title: Some("⚠️ Connection Alert".to_string()),
        description: Some(format!(
            "Endpoint **{}** failed {} consecutive checks",
            incident.name, incident.count
        )),
        color: Some(COLOR_RED),
        fields: vec![
            field("Kind", incident.kind, true),
            field("Consecutive", incident.count, true),
            field("Reason", &incident.reason, false),
        ],
        footer: Some(EmbedFooter {
            text: format!("{} | {}", incident.name, incident.address),
        }),
        timestamp: Some(incident.detected_at.to_rfc3339()),
    }
}

pub fn build_incident_message(discord: &Discord, incident: &Incident) -> Message {
    let mut builder = MessageBuilder::new().add_embed(build_incident_embed(incident));
    if let Some(user_id) = &discord.user_id {
        builder = builder.content(format!(
            "🔴 `{}` ({}) <@{user_id}>",
            incident.name, incident.kind
        ));
    }
    builder.build()
}

#[derive(Debug, Clone)]
pub struct DiscordManager {
    client: Client,
}

impl DiscordManager {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    #[instrument(skip(self, discord, message))]
    pub async fn send_message(&self, discord: &Discord, message: &Message) -> Result<()> {
        let response = self
            .client
            .post(&discord.url)
            .json(message)
            .send()
            .await
            .context("failed to send Discord message")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Discord message failed with status {status}: {body}");
        }

        info!("successfully sent Discord message");
        Ok(())
    }
}
