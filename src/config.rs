use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::trace;

/// Template written when no configuration file exists yet
pub const DEFAULT_CONFIG: &str = r#"# status-watch connection configuration
# Generated on first start, edit it and restart.

[settings]
interval = 30           # seconds between poll cycles
timeout = 10            # per-attempt request timeout (seconds)
error_threshold = 6     # consecutive identical errors before an alert is sent
retry_count = 0         # extra attempts when an endpoint is unreachable

# Alert sink (optional, alerting is disabled without it)
# [settings.alert.discord]
# url = "https://discord.com/api/webhooks/..."
# user_id = "123456789"
#
# [settings.alert.webhook]
# url = "https://example.com/hook"

# One [[connections]] block per monitored endpoint
[[connections]]
name = "example"        # unique name
host = "127.0.0.1"
port = 8080
token = "your_token"

# [[connections]]
# name = "backup"
# host = "127.0.0.1"
# port = 8081
# token = "another_token"
"#;

#[derive(Debug)]
pub enum ConfigError {
    /// No configuration existed, a template has been written to the path
    TemplateCreated(PathBuf),

    /// Reading or writing the configuration file failed
    Io(std::io::Error),

    /// The file is not valid TOML for this layout
    Parse(toml::de::Error),

    /// The file parsed but violates a constraint
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TemplateCreated(path) => write!(
                f,
                "configuration file did not exist, created a template at {}; edit it and restart",
                path.display()
            ),
            ConfigError::Io(err) => write!(f, "I/O error: {}", err),
            ConfigError::Parse(err) => write!(f, "invalid configuration file: {}", err),
            ConfigError::Invalid(msg) => write!(f, "invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u32,
    #[serde(default)]
    pub retry_count: u32,
    pub alert: Option<Alert>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            timeout: default_timeout(),
            error_threshold: default_error_threshold(),
            retry_count: 0,
            alert: None,
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ConnectionConfig {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub token: String,
}

impl ConnectionConfig {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    Discord(Discord),
    Webhook(Webhook),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Webhook {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Discord {
    pub url: String,
    pub user_id: Option<String>,
}

/// Longest accepted per-attempt timeout, in seconds
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Most extra attempts accepted for an unreachable endpoint
pub const MAX_RETRY_COUNT: u32 = 10;

fn default_interval() -> u64 {
    30
}

fn default_timeout() -> u64 {
    10
}

fn default_error_threshold() -> u32 {
    6
}

impl Config {
    /// Check the constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.settings;
        if settings.error_threshold < 1 {
            return Err(ConfigError::Invalid(
                "error_threshold must be at least 1".to_string(),
            ));
        }
        if settings.interval < 1 {
            return Err(ConfigError::Invalid("interval must be at least 1s".to_string()));
        }
        if settings.timeout < 1 {
            return Err(ConfigError::Invalid("timeout must be at least 1s".to_string()));
        }
        if settings.timeout > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "timeout must be at most {MAX_TIMEOUT_SECS}s"
            )));
        }
        if settings.retry_count > MAX_RETRY_COUNT {
            return Err(ConfigError::Invalid(format!(
                "retry_count must be at most {MAX_RETRY_COUNT}"
            )));
        }

        if self.connections.is_empty() {
            return Err(ConfigError::Invalid("no connections configured".to_string()));
        }

        let mut seen = HashSet::new();
        for conn in &self.connections {
            if conn.name.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "connection name must not be empty".to_string(),
                ));
            }
            if !seen.insert(conn.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate connection name '{}'",
                    conn.name
                )));
            }
        }

        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration file, writing a template when it does not exist.
///
/// A freshly written template is reported as [`ConfigError::TemplateCreated`]
/// so startup aborts until the operator has filled it in.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        std::fs::write(path, DEFAULT_CONFIG)?;
        return Err(ConfigError::TemplateCreated(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    parse_config(&content).inspect(|config| trace!("loaded config: {config:?}"))
}
