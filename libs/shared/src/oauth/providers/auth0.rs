//! Auth0 provider preset

use crate::oauth::config::StrategyConfig;
use crate::oauth::error::OAuthResult;
use crate::oauth::provider::{OAuthProvider, domain_base_url, fill};

const PROVIDER_ID: &str = "auth0";
const PROVIDER_NAME: &str = "Auth0";

pub struct Auth0Provider;

impl Auth0Provider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Auth0Provider {
    fn default() -> Self {
        Self::new()
    }
}

impl OAuthProvider for Auth0Provider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn apply_defaults(&self, strategy: &mut StrategyConfig) -> OAuthResult<()> {
        let base = domain_base_url(PROVIDER_ID, strategy)?;

        fill(
            &mut strategy.authorization_endpoint,
            format!("{}/authorize", base),
        );
        fill(&mut strategy.token_endpoint, format!("{}/oauth/token", base));
        fill(&mut strategy.userinfo_endpoint, format!("{}/userinfo", base));
        fill(&mut strategy.end_session_endpoint, format!("{}/v2/logout", base));

        if strategy.scope.as_ref().is_none_or(Vec::is_empty) {
            strategy.scope = Some(self.default_scope());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_from_domain() {
        let mut strategy = StrategyConfig {
            domain: Some("nuxt-auth.auth0.com".into()),
            userinfo_endpoint: Some("https://custom.example.com/me".into()),
            ..StrategyConfig::default()
        };
        Auth0Provider::new().apply_defaults(&mut strategy).unwrap();

        assert_eq!(
            strategy.authorization_endpoint.as_deref(),
            Some("https://nuxt-auth.auth0.com/authorize")
        );
        assert_eq!(
            strategy.token_endpoint.as_deref(),
            Some("https://nuxt-auth.auth0.com/oauth/token")
        );
        // explicit values are kept
        assert_eq!(
            strategy.userinfo_endpoint.as_deref(),
            Some("https://custom.example.com/me")
        );
    }
}
