use crate::config::AppConfig;
use clap::Subcommand;

pub mod auth;
pub mod config;

pub use auth::AuthCommands;
pub use config::ConfigCommands;

#[derive(Subcommand, PartialEq, Debug)]
pub enum Commands {
    /// Get CLI Version
    Version,

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Sign in, inspect and sign out of configured strategies
    #[command(subcommand)]
    Auth(AuthCommands),
}

impl Commands {
    pub async fn run(self, config: AppConfig) -> Result<(), String> {
        match self {
            Commands::Version => {
                println!("oktaplus v{}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            Commands::Config(config_command) => config_command.run(config),
            Commands::Auth(auth_command) => auth_command.run(config).await,
        }
    }
}
