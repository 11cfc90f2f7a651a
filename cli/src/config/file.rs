//! Configuration file structure and operations.

use config::ConfigError;
use oktaplus_shared::auth_manager::RedirectPaths;
use oktaplus_shared::oauth::StrategyConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{create_dir_all, write};
use std::path::Path;

use super::types::Settings;

/// The complete configuration file structure.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ConfigFile {
    /// Host routes used for callback matching and redirects
    #[serde(default)]
    pub redirect: RedirectPaths,
    /// Global settings
    #[serde(default)]
    pub settings: Settings,
    /// Named strategies (key = strategy name)
    #[serde(default)]
    pub strategies: BTreeMap<String, StrategyConfig>,
}

impl ConfigFile {
    /// Get a strategy by name.
    pub(crate) fn strategy(&self, name: &str) -> Option<&StrategyConfig> {
        self.strategies.get(name)
    }

    /// Insert or replace a strategy.
    pub(crate) fn insert_strategy(&mut self, name: impl Into<String>, strategy: StrategyConfig) {
        self.strategies.insert(name.into(), strategy);
    }

    /// Save the config file to disk.
    pub(crate) fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        if let Some(parent) = path.as_ref().parent() {
            create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {}", e))
            })?;
        }
        let body = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config file: {}", e)))?;
        write(path, body)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {}", e)))
    }
}
