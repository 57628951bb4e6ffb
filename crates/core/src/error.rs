use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub type CampaignResult<T> = Result<T, CampaignError>;

#[derive(Error, Debug)]
pub enum CampaignError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Platform API error (HTTP {status}): {body}")]
    Platform { status: u16, body: PlatformErrorBody },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CampaignError {
    pub fn validation(message: impl Into<String>) -> Self {
        CampaignError::Validation(ValidationError::new(message))
    }

    /// Message suitable for showing to the operator. Prefers the platform's
    /// user-facing text over its developer message.
    pub fn user_message(&self) -> String {
        match self {
            CampaignError::Platform { body, .. } => body.user_message().to_string(),
            other => other.to_string(),
        }
    }

    pub fn platform_body(&self) -> Option<&PlatformErrorBody> {
        match self {
            CampaignError::Platform { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CampaignError::Validation(_))
    }
}

/// A local, user-displayable rejection raised before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Structured error object returned by the advertising platform under the
/// top-level `error` key.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlatformErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_subcode: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_user_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_user_msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fbtrace_id: Option<String>,
}

impl PlatformErrorBody {
    pub fn user_message(&self) -> &str {
        match self.error_user_msg.as_deref() {
            Some(msg) if !msg.is_empty() => msg,
            _ => &self.message,
        }
    }
}

impl fmt::Display for PlatformErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        match (self.code, self.error_subcode) {
            (Some(code), Some(sub)) => write!(f, " (code {code}, subcode {sub})"),
            (Some(code), None) => write!(f, " (code {code})"),
            _ => Ok(()),
        }
    }
}
