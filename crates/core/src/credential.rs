//! Platform access credential and the provider that hands out snapshots.
//!
//! Callers take one [`Credential`] snapshot per submission and pass it
//! explicitly to every resource call; the provider is only replaced by an
//! explicit [`CredentialProvider::update`].

use crate::config::CredentialConfig;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

pub const REDACTED: &str = "[REDACTED]";

/// Bearer token sent as the `access_token` form parameter.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Replace every occurrence of this token in `text`.
    pub fn redact(&self, text: &str) -> String {
        if self.is_empty() {
            return text.to_string();
        }
        text.replace(self.0.as_str(), REDACTED)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub token: AccessToken,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: AccessToken::new(token),
            expires_at: None,
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    pub fn redact(&self, text: &str) -> String {
        self.token.redact(text)
    }
}

/// Lifetime fields returned by the OAuth callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenTtl {
    /// Seconds from now.
    pub expires_in: Option<i64>,
    /// Absolute Unix timestamp; wins over `expires_in` when both are set.
    pub data_access_expiration_time: Option<i64>,
}

impl TokenTtl {
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if let Some(ts) = self.data_access_expiration_time {
            return Utc.timestamp_opt(ts, 0).single();
        }
        self.expires_in.map(|secs| now + Duration::seconds(secs))
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenState {
    Active,
    Expired,
    Missing,
}

/// Snapshot for the token-expiry banner.
#[derive(Debug, Clone, Serialize)]
pub struct TokenStatus {
    pub status: TokenState,
    pub remaining_seconds: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Read access to the current credential.
pub trait CredentialProvider: Send + Sync {
    /// Current credential snapshot, if one is configured.
    fn credential(&self) -> Option<Credential>;

    fn is_expired(&self) -> bool {
        self.credential()
            .map(|c| c.is_expired_at(Utc::now()))
            .unwrap_or(false)
    }

    /// Replace the credential. Snapshots already handed out are unaffected.
    fn update(&self, token: String, ttl: TokenTtl);

    fn status(&self) -> TokenStatus {
        let now = Utc::now();
        match self.credential() {
            None => TokenStatus {
                status: TokenState::Missing,
                remaining_seconds: None,
                expires_at: None,
            },
            Some(c) => {
                let remaining = c.expires_at.map(|at| (at - now).num_seconds().max(0));
                TokenStatus {
                    status: if c.is_expired_at(now) {
                        TokenState::Expired
                    } else {
                        TokenState::Active
                    },
                    remaining_seconds: remaining,
                    expires_at: c.expires_at,
                }
            }
        }
    }
}

/// Process-local provider seeded from configuration.
#[derive(Default)]
pub struct StaticCredentialProvider {
    current: RwLock<Option<Credential>>,
}

impl StaticCredentialProvider {
    pub fn new(credential: Option<Credential>) -> Self {
        Self {
            current: RwLock::new(credential.filter(|c| !c.token.is_empty())),
        }
    }

    pub fn shared(credential: Option<Credential>) -> Arc<dyn CredentialProvider> {
        Arc::new(Self::new(credential))
    }

    /// Seed from the `credential` config section; a blank token means none.
    pub fn from_config(config: &CredentialConfig) -> Arc<dyn CredentialProvider> {
        let expires_at = config
            .expires_at
            .and_then(|ts| Utc.timestamp_opt(ts, 0).single());
        let credential = Credential {
            token: AccessToken::new(config.access_token.trim()),
            expires_at,
        };
        Self::shared(Some(credential))
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credential(&self) -> Option<Credential> {
        self.current.read().clone()
    }

    fn update(&self, token: String, ttl: TokenTtl) {
        let credential = Credential {
            token: AccessToken::new(token),
            expires_at: ttl.expires_at(Utc::now()),
        };
        *self.current.write() = Some(credential);
    }
}
