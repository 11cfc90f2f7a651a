//! Google provider preset

use crate::oauth::config::StrategyConfig;
use crate::oauth::error::OAuthResult;
use crate::oauth::provider::{OAuthProvider, fill};

const PROVIDER_ID: &str = "google";
const PROVIDER_NAME: &str = "Google";

const AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

pub struct GoogleProvider;

impl GoogleProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GoogleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl OAuthProvider for GoogleProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn apply_defaults(&self, strategy: &mut StrategyConfig) -> OAuthResult<()> {
        fill(&mut strategy.authorization_endpoint, AUTHORIZATION_ENDPOINT);
        fill(&mut strategy.token_endpoint, TOKEN_ENDPOINT);
        fill(&mut strategy.userinfo_endpoint, USERINFO_ENDPOINT);

        if strategy.scope.as_ref().is_none_or(Vec::is_empty) {
            strategy.scope = Some(self.default_scope());
        }

        Ok(())
    }
}
