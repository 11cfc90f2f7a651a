//! Persisted session state for the file-backed auth manager
//!
//! ```toml
//! [schemes.okta]
//! token = "Bearer eyJ..."
//! refresh = "eyJ..."
//! expires_in = 3600
//! expires_at = "2026-10-19T12:00:00Z"
//! user_id = "00u1"
//!
//! [universal]
//! "okta.state" = "V1StGXR8_Z5jdHi6B-myT"
//!
//! [local]
//! refresh_token_endpoint = "https://proxy.example.com/token"
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Credentials stored for one scheme
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SchemeCredentials {
    /// Token as sent to APIs, including its type prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
    /// Lifetime in seconds, as reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Absolute expiry derived from `expires_in` when it was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl SchemeCredentials {
    /// Record a provider-supplied lifetime, starting now
    pub fn set_expires_in(&mut self, secs: u64) {
        self.expires_in = Some(secs);
        self.expires_at = i64::try_from(secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|d| Utc::now().checked_add_signed(d));
    }

    /// Check if the token expires within 5 minutes
    pub fn needs_refresh(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at < Utc::now() + Duration::minutes(5),
            None => false,
        }
    }

    /// Check if the token is expired; unknown expiry never is
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at < Utc::now())
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Token with its type prefix removed, for display
    pub fn bare_token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(|t| t.split_once(' ').map(|(_, raw)| raw).unwrap_or(t))
    }
}

/// Structure of the auth.toml file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthFile {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemes: BTreeMap<String, SchemeCredentials>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub universal: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub local: BTreeMap<String, String>,
}

impl AuthFile {
    /// Mutable credentials for a scheme, created on first use
    pub fn scheme_mut(&mut self, scheme: &str) -> &mut SchemeCredentials {
        self.schemes.entry(scheme.to_string()).or_default()
    }

    /// Drop schemes left without any credential
    pub fn prune(&mut self) {
        self.schemes.retain(|_, creds| !creds.is_empty());
    }
}
