//! Okta provider preset
//!
//! Endpoints hang off an authorization server on the org domain:
//! `https://<domain>/oauth2/<server>/v1/...`, with `default` as the server
//! unless `authorization_server` names a custom one.

use crate::oauth::config::StrategyConfig;
use crate::oauth::error::OAuthResult;
use crate::oauth::provider::{OAuthProvider, domain_base_url, fill};

const PROVIDER_ID: &str = "okta";
const PROVIDER_NAME: &str = "Okta";
const DEFAULT_AUTHORIZATION_SERVER: &str = "default";

pub struct OktaProvider;

impl OktaProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OktaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OAuthProvider for OktaProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn apply_defaults(&self, strategy: &mut StrategyConfig) -> OAuthResult<()> {
        let base = domain_base_url(PROVIDER_ID, strategy)?;
        let server = strategy
            .authorization_server
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_AUTHORIZATION_SERVER);
        let root = format!("{}/oauth2/{}/v1", base, server);

        fill(
            &mut strategy.authorization_endpoint,
            format!("{}/authorize", root),
        );
        fill(&mut strategy.token_endpoint, format!("{}/token", root));
        fill(&mut strategy.userinfo_endpoint, format!("{}/userinfo", root));
        fill(&mut strategy.end_session_endpoint, format!("{}/logout", root));

        if strategy.scope.as_ref().is_none_or(Vec::is_empty) {
            strategy.scope = Some(self.default_scope());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> StrategyConfig {
        StrategyConfig {
            provider: Some("okta".into()),
            domain: Some("dev-123.okta.com".into()),
            client_id: Some("0oa-client".into()),
            ..StrategyConfig::default()
        }
    }

    #[test]
    fn test_default_server_endpoints() {
        let mut strategy = strategy();
        OktaProvider::new().apply_defaults(&mut strategy).unwrap();

        assert_eq!(
            strategy.authorization_endpoint.as_deref(),
            Some("https://dev-123.okta.com/oauth2/default/v1/authorize")
        );
        assert_eq!(
            strategy.token_endpoint.as_deref(),
            Some("https://dev-123.okta.com/oauth2/default/v1/token")
        );
        assert_eq!(
            strategy.userinfo_endpoint.as_deref(),
            Some("https://dev-123.okta.com/oauth2/default/v1/userinfo")
        );
        assert_eq!(
            strategy.end_session_endpoint.as_deref(),
            Some("https://dev-123.okta.com/oauth2/default/v1/logout")
        );
        assert_eq!(
            strategy.scope,
            Some(vec!["openid".into(), "profile".into(), "email".into()])
        );
    }

    #[test]
    fn test_custom_server_and_explicit_scope() {
        let mut strategy = StrategyConfig {
            authorization_server: Some("aus-custom".into()),
            scope: Some(vec!["openid".into(), "offline_access".into()]),
            ..strategy()
        };
        OktaProvider::new().apply_defaults(&mut strategy).unwrap();

        assert_eq!(
            strategy.authorization_endpoint.as_deref(),
            Some("https://dev-123.okta.com/oauth2/aus-custom/v1/authorize")
        );
        assert_eq!(
            strategy.scope,
            Some(vec!["openid".into(), "offline_access".into()])
        );
    }

    #[test]
    fn test_explicit_token_endpoint_is_kept() {
        let mut strategy = StrategyConfig {
            token_endpoint: Some("https://proxy.example.com/okta/token".into()),
            ..strategy()
        };
        OktaProvider::new().apply_defaults(&mut strategy).unwrap();

        assert_eq!(
            strategy.token_endpoint.as_deref(),
            Some("https://proxy.example.com/okta/token")
        );
    }

    #[test]
    fn test_missing_domain_is_an_error() {
        let mut strategy = StrategyConfig {
            domain: None,
            ..strategy()
        };
        assert!(OktaProvider::new().apply_defaults(&mut strategy).is_err());
    }
}
