//! Token values produced by a completed flow

use super::config::SchemeConfig;
use super::query::QueryParams;
use serde_json::Value;

/// Tokens obtained from a callback or a code exchange
///
/// Handed to the auth manager as soon as it is complete; the scheme keeps
/// no copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Lifetime in seconds, as supplied by the provider
    pub expires_in: Option<u64>,
}

impl TokenSet {
    /// Access token as the host stores it: `"<token_type> <token>"` when a type is configured
    pub fn authorization_value(&self, config: &SchemeConfig) -> String {
        match config.token_prefix() {
            Some(prefix) => format!("{} {}", prefix, self.access_token),
            None => self.access_token.clone(),
        }
    }
}

/// Token fields found in callback parameters or a token-endpoint response
///
/// Every field is optional; empty strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: Option<u64>,
}

impl TokenResponse {
    /// Extract tokens from callback parameters using the configured key names
    pub fn from_params(params: &QueryParams, config: &SchemeConfig) -> Self {
        Self {
            access_token: params.get_non_empty(config.token_key()).map(str::to_string),
            refresh_token: params
                .get_non_empty(config.refresh_token_key())
                .map(str::to_string),
            expires_in: params
                .get_non_empty(config.expires_in_key())
                .and_then(parse_expires_in),
        }
    }

    /// Extract tokens from a token-endpoint JSON body
    ///
    /// The standard field names are used regardless of the callback key
    /// overrides.
    pub fn from_json(body: &Value) -> Self {
        Self {
            access_token: body.get("access_token").and_then(value_as_string),
            refresh_token: body.get("refresh_token").and_then(value_as_string),
            expires_in: body.get("expires_in").and_then(|v| match v {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => parse_expires_in(s),
                _ => None,
            }),
        }
    }

    /// Overlay the fields present in `other`
    pub fn override_with(&mut self, other: TokenResponse) {
        if other.access_token.is_some() {
            self.access_token = other.access_token;
        }
        if other.refresh_token.is_some() {
            self.refresh_token = other.refresh_token;
        }
        if other.expires_in.is_some() {
            self.expires_in = other.expires_in;
        }
    }

    /// A token set, if an access token was found
    pub fn into_token_set(self) -> Option<TokenSet> {
        Some(TokenSet {
            access_token: self.access_token?,
            refresh_token: self.refresh_token,
            expires_in: self.expires_in,
        })
    }
}

/// Non-empty string or number rendered as a string
pub fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_expires_in(raw: &str) -> Option<u64> {
    match raw.trim().parse::<u64>() {
        Ok(secs) => Some(secs),
        Err(_) => {
            tracing::debug!("ignoring non-numeric expires_in {:?}", raw);
            None
        }
    }
}
