//! Main application configuration.

use config::ConfigError;
use oktaplus_shared::auth_manager::RedirectPaths;
use oktaplus_shared::oauth::config::parse_scope;
use oktaplus_shared::oauth::{ProviderRegistry, SchemeConfig, StrategyConfig};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use super::file::ConfigFile;
use super::types::Settings;
use super::{DEFAULT_CALLBACK_PORT, ENV_PREFIX, OKTAPLUS_CONFIG_PATH};

/// The main application configuration, built from config file and environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Path to the config file (used for saving)
    pub config_path: PathBuf,
    /// Host routes
    pub redirect: RedirectPaths,
    /// Local port the login listener binds to
    pub callback_port: u16,
    /// Strategy used when none is named
    pub default_strategy: Option<String>,
    /// Whether login opens the system browser
    pub open_browser: bool,
    /// Strategies with environment overrides applied
    pub strategies: BTreeMap<String, StrategyConfig>,
}

impl AppConfig {
    /// Load configuration from file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(custom_config_path: Option<P>) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(custom_config_path);
        let config_file = Self::load_config_file(&config_path)?;

        let mut config = Self::build(config_path, config_file);
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Build an AppConfig from its components.
    pub(crate) fn build(config_path: PathBuf, config_file: ConfigFile) -> Self {
        let ConfigFile {
            redirect,
            settings:
                Settings {
                    callback_port,
                    default_strategy,
                    open_browser,
                },
            strategies,
        } = config_file;

        AppConfig {
            config_path,
            redirect,
            callback_port: callback_port.unwrap_or(DEFAULT_CALLBACK_PORT),
            default_strategy,
            open_browser: open_browser.unwrap_or(true),
            strategies,
        }
    }

    /// Get the config file path, defaulting to ~/.oktaplus/config.toml.
    pub fn get_config_path<P: AsRef<Path>>(path: Option<P>) -> PathBuf {
        match path {
            Some(p) => p.as_ref().to_path_buf(),
            None => dirs::home_dir()
                .unwrap_or_default()
                .join(OKTAPLUS_CONFIG_PATH),
        }
    }

    /// Read the config file; a missing file is an empty configuration.
    pub(crate) fn load_config_file<P: AsRef<Path>>(
        config_path: P,
    ) -> Result<ConfigFile, ConfigError> {
        match std::fs::read_to_string(config_path.as_ref()) {
            Ok(content) => toml::from_str::<ConfigFile>(&content).map_err(|e| {
                ConfigError::Message(format!(
                    "Failed to parse config file {}: {}",
                    config_path.as_ref().display(),
                    e
                ))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ConfigFile::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Failed to read config file: {}",
                e
            ))),
        }
    }

    /// Get the config directory from the config path.
    pub fn get_config_dir(&self) -> PathBuf {
        if let Some(parent) = self.config_path.parent()
            && !parent.as_os_str().is_empty()
        {
            return parent.to_path_buf();
        }
        // Default to ~/.oktaplus/
        dirs::home_dir().unwrap_or_default().join(".oktaplus")
    }

    /// Origin the local callback listener is reachable at.
    pub fn callback_origin(&self) -> String {
        format!("http://127.0.0.1:{}", self.callback_port)
    }

    /// Pick the strategy to use.
    ///
    /// Resolution order:
    /// 1. the explicitly requested name
    /// 2. `settings.default_strategy`
    /// 3. the only configured strategy
    pub fn strategy_name(&self, requested: Option<&str>) -> Result<String, ConfigError> {
        let name = match (requested, self.default_strategy.as_deref()) {
            (Some(name), _) | (None, Some(name)) => name.to_string(),
            (None, None) => {
                let mut names = self.strategies.keys();
                match (names.next(), names.next()) {
                    (Some(only), None) => only.clone(),
                    (None, _) => {
                        return Err(ConfigError::Message(
                            "No strategies configured. Run 'oktaplus config init' first.".into(),
                        ));
                    }
                    (Some(_), Some(_)) => {
                        return Err(ConfigError::Message(
                            "Several strategies configured; pick one with --strategy or set settings.default_strategy".into(),
                        ));
                    }
                }
            }
        };

        if !self.strategies.contains_key(&name) {
            return Err(ConfigError::NotFound(format!("strategies.{}", name)));
        }
        Ok(name)
    }

    /// Resolve a strategy into a scheme configuration.
    pub fn scheme_config(
        &self,
        name: &str,
        registry: &ProviderRegistry,
    ) -> Result<SchemeConfig, ConfigError> {
        let strategy = self
            .strategies
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::NotFound(format!("strategies.{}", name)))?;

        strategy
            .resolve(registry)
            .map_err(|e| ConfigError::Message(format!("Strategy '{}': {}", name, e)))
    }

    /// Apply `OKTAPLUS_<STRATEGY>_*` overrides to every configured strategy.
    pub(crate) fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for (name, strategy) in self.strategies.iter_mut() {
            let var = |suffix: &str| {
                lookup(&env_key(name, suffix)).filter(|v| !v.trim().is_empty())
            };

            if let Some(client_id) = var("CLIENT_ID") {
                strategy.client_id = Some(client_id);
            }
            if let Some(domain) = var("DOMAIN") {
                strategy.domain = Some(domain);
            }
            if let Some(redirect_uri) = var("REDIRECT_URI") {
                strategy.redirect_uri = Some(redirect_uri);
            }
            if let Some(scope) = var("SCOPE") {
                strategy.scope = Some(parse_scope(&scope));
            }
            if let Some(uri) = var("REDIRECT_URI_ON_LOGOUT") {
                strategy.redirect_uri_after_logout = Some(uri);
            }
        }
    }

    /// Add or replace a strategy and write the config file.
    pub fn save_strategy(
        &mut self,
        name: &str,
        strategy: StrategyConfig,
        make_default: bool,
    ) -> Result<(), ConfigError> {
        let mut config_file = Self::load_config_file(&self.config_path)?;
        config_file.insert_strategy(name, strategy.clone());
        if make_default {
            config_file.settings.default_strategy = Some(name.to_string());
            self.default_strategy = Some(name.to_string());
        }
        config_file.save_to(&self.config_path)?;

        self.strategies.insert(name.to_string(), strategy);
        Ok(())
    }

    /// Whether the config file defines a strategy, ignoring environment overrides.
    pub fn has_saved_strategy(&self, name: &str) -> bool {
        Self::load_config_file(&self.config_path)
            .map(|file| file.strategy(name).is_some())
            .unwrap_or(false)
    }
}

/// `OKTAPLUS_<STRATEGY>_<SUFFIX>`, with the strategy name upper-cased and `-` mapped to `_`
pub(crate) fn env_key(strategy: &str, suffix: &str) -> String {
    format!(
        "{}_{}_{}",
        ENV_PREFIX,
        strategy.to_uppercase().replace('-', "_"),
        suffix
    )
}
