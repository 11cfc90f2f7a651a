//! OAuth provider registry

use super::provider::OAuthProvider;
use super::providers::{Auth0Provider, GoogleProvider, OktaProvider};
use std::collections::HashMap;

/// Registry of OAuth provider presets
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Box<dyn OAuthProvider>>,
}

impl ProviderRegistry {
    /// Create a new provider registry with built-in providers
    pub fn new() -> Self {
        let mut registry = Self {
            providers: HashMap::new(),
        };

        registry.register(Box::new(OktaProvider::new()));
        registry.register(Box::new(Auth0Provider::new()));
        registry.register(Box::new(GoogleProvider::new()));

        registry
    }

    /// Register a new provider, replacing one with the same id
    pub fn register(&mut self, provider: Box<dyn OAuthProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    /// Get a provider by ID
    pub fn get(&self, id: &str) -> Option<&dyn OAuthProvider> {
        self.providers.get(id).map(|p| p.as_ref())
    }

    /// List all registered providers
    pub fn list(&self) -> Vec<&dyn OAuthProvider> {
        self.providers.values().map(|p| p.as_ref()).collect()
    }

    /// Get all provider IDs, sorted
    pub fn provider_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.providers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Check if a provider is registered
    pub fn has_provider(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::config::StrategyConfig;
    use crate::oauth::error::OAuthResult;

    #[test]
    fn test_registry_builtins() {
        let registry = ProviderRegistry::new();

        assert_eq!(registry.provider_ids(), vec!["auth0", "google", "okta"]);
        assert!(registry.has_provider("okta"));
        assert!(!registry.has_provider("unknown"));
    }

    #[test]
    fn test_registry_get() {
        let registry = ProviderRegistry::new();

        let provider = registry.get("okta");
        assert!(provider.is_some());
        assert_eq!(provider.unwrap().name(), "Okta");
        assert!(registry.get("unknown").is_none());
    }

    struct Corp;

    impl OAuthProvider for Corp {
        fn id(&self) -> &'static str {
            "corp"
        }

        fn name(&self) -> &'static str {
            "Corp SSO"
        }

        fn apply_defaults(&self, strategy: &mut StrategyConfig) -> OAuthResult<()> {
            strategy.authorization_endpoint = Some("https://sso.corp.example/authorize".into());
            Ok(())
        }
    }

    #[test]
    fn test_register_custom_provider() {
        let mut registry = ProviderRegistry::new();
        registry.register(Box::new(Corp));

        let strategy = StrategyConfig {
            provider: Some("corp".into()),
            client_id: Some("c".into()),
            ..StrategyConfig::default()
        };
        let config = strategy.resolve(&registry).unwrap();
        assert_eq!(
            config.authorization_endpoint,
            "https://sso.corp.example/authorize"
        );
        assert_eq!(registry.list().len(), 4);
    }
}
