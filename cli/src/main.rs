use clap::Parser;
use std::path::{Path, PathBuf};

mod commands;
mod config;

use commands::Commands;
use config::AppConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_NAME: &str = "oktaplus.log";

#[derive(Parser, PartialEq, Debug)]
#[command(name = "oktaplus")]
#[command(about = "OAuth2 / OpenID Connect sign-in from the terminal", long_about = None)]
struct Cli {
    /// Enable debug output
    #[arg(long = "debug", default_value_t = false)]
    debug: bool,

    /// Path to the config file (default: ~/.oktaplus/config.toml)
    #[arg(long = "config", env = "OKTAPLUS_CONFIG")]
    config_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    // .env is optional; its values feed the OKTAPLUS_* overrides
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _log_guard = if cli.debug {
        let config_path = AppConfig::get_config_path(cli.config_path.as_ref());
        init_debug_logging(config_path.parent())
    } else {
        None
    };

    match AppConfig::load(cli.config_path.as_ref()) {
        Ok(config) => {
            if let Err(e) = cli.command.run(config).await {
                eprintln!("Ops! something went wrong: {}", e);
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    }
}

/// Debug output to stderr, mirrored to a log file in the config directory
fn init_debug_logging(
    log_dir: Option<&Path>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "error,{}=debug,oktaplus_shared=debug",
                env!("CARGO_CRATE_NAME")
            )
            .into()
        })
    };

    let file_layer = log_dir
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .map(|dir| {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, LOG_FILE_NAME));
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (layer, guard)
        });

    let (file_layer, guard) = match file_layer {
        Some((layer, guard)) => (Some(layer), Some(guard)),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AuthCommands;

    #[test]
    fn test_parse_login_with_params() {
        let cli = Cli::try_parse_from([
            "oktaplus",
            "--debug",
            "auth",
            "login",
            "--strategy",
            "okta",
            "--no-browser",
            "--param",
            "prompt=login",
            "--param",
            "login_hint=jane@example.com",
        ])
        .unwrap();

        assert!(cli.debug);
        assert_eq!(
            cli.command,
            Commands::Auth(AuthCommands::Login {
                strategy: Some("okta".into()),
                no_browser: true,
                no_wait: false,
                params: vec!["prompt=login".into(), "login_hint=jane@example.com".into()],
            })
        );
    }

    #[test]
    fn test_parse_callback_url() {
        let cli = Cli::try_parse_from([
            "oktaplus",
            "--config",
            "/tmp/oktaplus.toml",
            "auth",
            "callback",
            "http://127.0.0.1:8085/callback?code=c1&state=s1",
        ])
        .unwrap();

        assert_eq!(cli.config_path, Some(PathBuf::from("/tmp/oktaplus.toml")));
        assert_eq!(
            cli.command,
            Commands::Auth(AuthCommands::Callback {
                url: "http://127.0.0.1:8085/callback?code=c1&state=s1".into(),
                strategy: None,
            })
        );
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["oktaplus"]).is_err());
    }
}
