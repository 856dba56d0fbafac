//! Maps a probe result onto the error taxonomy

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::probe::{ProbeOutcome, ProbeResult};

const HTTP_OK: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport failure: refused, timed out, DNS, ...
    Unreachable,
    /// The endpoint answered with a non-200 status
    ProtocolError,
    /// The endpoint answered 200 but reported a logical failure
    ApplicationError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unreachable => "unreachable",
            ErrorKind::ProtocolError => "protocol_error",
            ErrorKind::ApplicationError => "application_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Healthy,
    Failing { kind: ErrorKind, reason: String },
}

impl Verdict {
    fn failing(kind: ErrorKind, reason: impl Into<String>) -> Self {
        Verdict::Failing {
            kind,
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Verdict::Healthy => None,
            Verdict::Failing { kind, .. } => Some(*kind),
        }
    }
}

/// Classify one probe result, first matching rule wins:
/// unreachable, then non-200 status, then `status != "ok"` or `retcode != 0`.
pub fn classify(result: &ProbeResult) -> Verdict {
    match &result.outcome {
        ProbeOutcome::Unreachable { error } => {
            let reason = if error.is_empty() {
                "connection failed"
            } else {
                error.as_str()
            };
            Verdict::failing(ErrorKind::Unreachable, reason)
        }
        ProbeOutcome::Reached { status_code, .. } if *status_code != HTTP_OK => {
            Verdict::failing(ErrorKind::ProtocolError, format!("HTTP {status_code}"))
        }
        ProbeOutcome::Reached { payload, .. } => {
            let status = payload.get("status");
            let retcode = payload.get("retcode");

            let status_ok = matches!(status, Some(Value::String(s)) if s == "ok");
            let retcode_ok = retcode.and_then(Value::as_i64) == Some(0);

            if status_ok && retcode_ok {
                Verdict::Healthy
            } else {
                Verdict::failing(
                    ErrorKind::ApplicationError,
                    format!(
                        "status={}, retcode={}",
                        render_field(status),
                        render_field(retcode)
                    ),
                )
            }
        }
    }
}

/// Absent and null fields print as `None`, strings without quotes
fn render_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "None".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
