//! OAuth configuration types

use super::error::{OAuthError, OAuthResult};
use super::pkce::PkceMethod;
use super::registry::ProviderRegistry;
use serde::{Deserialize, Deserializer, Serialize};

pub const DEFAULT_RESPONSE_TYPE: &str = "token";
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";
pub const DEFAULT_TOKEN_NAME: &str = "Authorization";

const DEFAULT_TOKEN_KEY: &str = "access_token";
const DEFAULT_REFRESH_TOKEN_KEY: &str = "refresh_token";
const DEFAULT_EXPIRES_IN_KEY: &str = "expires_in";

/// Resolved configuration of one authorization-code scheme
///
/// Built once when the scheme is constructed and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemeConfig {
    /// Authorization endpoint URL
    pub authorization_endpoint: String,
    /// Token endpoint used for the authorization-code exchange
    #[serde(default)]
    pub token_endpoint: Option<String>,
    /// User-info endpoint; without it the identity is token-only
    #[serde(default)]
    pub userinfo_endpoint: Option<String>,
    /// OAuth client ID
    pub client_id: String,
    /// Scopes to request, joined with a single space on the wire
    #[serde(default, deserialize_with = "deserialize_scope")]
    pub scope: Vec<String>,
    /// Space-separated grant markers, e.g. `token`, `code`, `id_token`
    #[serde(default = "default_response_type")]
    pub response_type: String,
    #[serde(default)]
    pub access_type: Option<String>,
    /// Prefix for stored tokens; an empty string disables prefixing
    #[serde(default = "default_token_type")]
    pub token_type: Option<String>,
    /// Header under which the token is attached to outgoing requests
    #[serde(default = "default_token_name")]
    pub token_name: String,
    /// Explicit redirect URI; derived from the execution context when absent
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub audience: Option<String>,
    #[serde(default)]
    pub login_hint: Option<String>,
    #[serde(default)]
    pub token_key: Option<String>,
    #[serde(default)]
    pub refresh_token_key: Option<String>,
    #[serde(default)]
    pub expires_in_key: Option<String>,
    /// Enables PKCE for `code` flows
    #[serde(default)]
    pub code_challenge_method: Option<PkceMethod>,
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
    #[serde(default)]
    pub post_logout_redirect_uri: Option<String>,
}

impl SchemeConfig {
    /// Create a configuration with defaults for everything but the endpoint and client
    pub fn new(authorization_endpoint: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            authorization_endpoint: authorization_endpoint.into(),
            token_endpoint: None,
            userinfo_endpoint: None,
            client_id: client_id.into(),
            scope: Vec::new(),
            response_type: default_response_type(),
            access_type: None,
            token_type: default_token_type(),
            token_name: default_token_name(),
            redirect_uri: None,
            audience: None,
            login_hint: None,
            token_key: None,
            refresh_token_key: None,
            expires_in_key: None,
            code_challenge_method: None,
            end_session_endpoint: None,
            post_logout_redirect_uri: None,
        }
    }

    /// Get the scopes as a space-separated string
    pub fn scope_string(&self) -> String {
        self.scope.join(" ")
    }

    /// Whether `response_type` mentions the given grant marker
    pub fn response_includes(&self, marker: &str) -> bool {
        self.response_type.contains(marker)
    }

    /// Token type to prefix stored tokens with, if any
    pub fn token_prefix(&self) -> Option<&str> {
        self.token_type.as_deref().filter(|t| !t.is_empty())
    }

    pub fn token_key(&self) -> &str {
        self.token_key.as_deref().unwrap_or(DEFAULT_TOKEN_KEY)
    }

    pub fn refresh_token_key(&self) -> &str {
        self.refresh_token_key
            .as_deref()
            .unwrap_or(DEFAULT_REFRESH_TOKEN_KEY)
    }

    pub fn expires_in_key(&self) -> &str {
        self.expires_in_key
            .as_deref()
            .unwrap_or(DEFAULT_EXPIRES_IN_KEY)
    }
}

/// Strategy as written in a config file, before provider presets are applied
///
/// Every field is optional here; `provider` names a preset that fills in
/// endpoints and scopes from `domain`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Okta custom authorization server id (`default` when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_session_endpoint: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_opt_scope",
        skip_serializing_if = "Option::is_none"
    )]
    pub scope: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri_after_logout: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<PkceMethod>,
}

impl StrategyConfig {
    /// Apply the provider preset (if any) and produce a scheme configuration
    pub fn resolve(mut self, registry: &ProviderRegistry) -> OAuthResult<SchemeConfig> {
        if let Some(provider_id) = self.provider.clone() {
            let provider = registry
                .get(&provider_id)
                .ok_or_else(|| OAuthError::provider_not_found(&provider_id))?;
            provider.apply_defaults(&mut self)?;
        }

        let authorization_endpoint = self
            .authorization_endpoint
            .filter(|e| !e.is_empty())
            .ok_or_else(|| OAuthError::invalid_config("authorization_endpoint is required"))?;
        let client_id = self
            .client_id
            .filter(|c| !c.is_empty())
            .ok_or_else(|| OAuthError::invalid_config("client_id is required"))?;

        Ok(SchemeConfig {
            authorization_endpoint,
            token_endpoint: self.token_endpoint,
            userinfo_endpoint: self.userinfo_endpoint,
            client_id,
            scope: self.scope.unwrap_or_default(),
            response_type: self.response_type.unwrap_or_else(default_response_type),
            access_type: self.access_type,
            token_type: self.token_type.or_else(default_token_type),
            token_name: self.token_name.unwrap_or_else(default_token_name),
            redirect_uri: self.redirect_uri,
            audience: self.audience,
            login_hint: self.login_hint,
            token_key: self.token_key,
            refresh_token_key: self.refresh_token_key,
            expires_in_key: self.expires_in_key,
            code_challenge_method: self.code_challenge_method,
            end_session_endpoint: self.end_session_endpoint,
            post_logout_redirect_uri: self.redirect_uri_after_logout,
        })
    }
}

fn default_response_type() -> String {
    DEFAULT_RESPONSE_TYPE.to_string()
}

fn default_token_type() -> Option<String> {
    Some(DEFAULT_TOKEN_TYPE.to_string())
}

fn default_token_name() -> String {
    DEFAULT_TOKEN_NAME.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScopeRepr {
    One(String),
    Many(Vec<String>),
}

impl From<ScopeRepr> for Vec<String> {
    fn from(repr: ScopeRepr) -> Self {
        match repr {
            ScopeRepr::One(s) => s.split_whitespace().map(str::to_string).collect(),
            ScopeRepr::Many(v) => v,
        }
    }
}

/// Split a space-separated scope string into its parts
pub fn parse_scope(scope: &str) -> Vec<String> {
    ScopeRepr::One(scope.to_string()).into()
}

fn deserialize_scope<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(ScopeRepr::deserialize(deserializer)?.into())
}

fn deserialize_opt_scope<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ScopeRepr>::deserialize(deserializer)?.map(Into::into))
}
