//! OAuth provider presets

use super::config::StrategyConfig;
use super::error::{OAuthError, OAuthResult};

/// A provider preset fills in endpoints and scopes a strategy leaves unset
pub trait OAuthProvider: Send + Sync {
    /// Provider identifier (e.g., "okta")
    fn id(&self) -> &'static str;

    /// Human-readable provider name
    fn name(&self) -> &'static str;

    /// Scopes requested when the strategy does not list any
    fn default_scope(&self) -> Vec<String> {
        vec!["openid".into(), "profile".into(), "email".into()]
    }

    /// Fill unset fields of `strategy` from the preset
    ///
    /// Values already present in the strategy always win.
    fn apply_defaults(&self, strategy: &mut StrategyConfig) -> OAuthResult<()>;
}

/// Set `slot` only when it is still empty
pub(crate) fn fill(slot: &mut Option<String>, value: impl Into<String>) {
    if slot.as_deref().is_none_or(str::is_empty) {
        *slot = Some(value.into());
    }
}

/// `https://<domain>` from a bare domain or a URL, without a trailing slash
pub(crate) fn domain_base_url(provider: &str, strategy: &StrategyConfig) -> OAuthResult<String> {
    let domain = strategy
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| {
            OAuthError::invalid_config(format!("{} strategy requires a domain", provider))
        })?;

    let domain = domain.trim_end_matches('/');
    if domain.starts_with("https://") || domain.starts_with("http://") {
        Ok(domain.to_string())
    } else {
        Ok(format!("https://{}", domain))
    }
}
