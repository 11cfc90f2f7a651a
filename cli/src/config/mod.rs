//! Configuration management for the oktaplus CLI.
//!
//! This module handles loading and saving `config.toml`:
//! - Host routes (`[redirect]`)
//! - Global settings such as the callback port
//! - Strategy definitions, optionally built on a provider preset
//! - Environment overrides for strategy credentials

mod app;
mod file;
mod types;


pub use app::AppConfig;

// Constants
pub const OKTAPLUS_CONFIG_PATH: &str = ".oktaplus/config.toml";
pub const DEFAULT_CALLBACK_PORT: u16 = 8085;
pub const ENV_PREFIX: &str = "OKTAPLUS";
