//! Authentication commands for configured strategies
//!
//! Each command builds a [`LocalAuthManager`] over `auth.toml` in the config
//! directory and an [`AuthorizationCodeScheme`] for the chosen strategy.
//!
//! # Commands
//!
//! - `oktaplus auth login` - Sign in through the browser
//! - `oktaplus auth callback` - Complete a sign-in from a pasted callback URL
//! - `oktaplus auth whoami` - Show the signed-in user
//! - `oktaplus auth logout` - Forget the session and sign out at the provider
//! - `oktaplus auth list` - List strategies and stored credentials

mod callback;
mod callback_server;
mod list;
mod login;
mod logout;
mod navigator;
mod whoami;

use crate::config::AppConfig;
use clap::Subcommand;
use navigator::TerminalNavigator;
use oktaplus_shared::local_auth::LocalAuthManager;
use oktaplus_shared::oauth::{AuthorizationCodeScheme, ExecutionContext, ProviderRegistry};
use std::sync::Arc;

/// Authentication subcommands
#[derive(Subcommand, PartialEq, Debug)]
pub enum AuthCommands {
    /// Sign in with a strategy through the browser
    Login {
        /// Strategy to sign in with (default: settings.default_strategy)
        #[arg(long, short)]
        strategy: Option<String>,

        /// Print the authorization URL instead of opening a browser
        #[arg(long, default_value_t = false)]
        no_browser: bool,

        /// Only start the flow; finish it later with `oktaplus auth callback`
        #[arg(long, default_value_t = false)]
        no_wait: bool,

        /// Extra authorization parameter, repeatable (e.g. --param prompt=login)
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Complete a sign-in from the URL the provider redirected to
    Callback {
        /// Full callback URL, including query or fragment
        url: String,

        #[arg(long, short)]
        strategy: Option<String>,
    },

    /// Show the signed-in user
    Whoami {
        #[arg(long, short)]
        strategy: Option<String>,
    },

    /// Forget the session and sign out at the provider
    Logout {
        #[arg(long, short)]
        strategy: Option<String>,

        /// Print the provider sign-out URL instead of opening a browser
        #[arg(long, default_value_t = false)]
        no_browser: bool,
    },

    /// List strategies and stored credentials
    List,
}

impl AuthCommands {
    /// Run the auth command
    pub async fn run(self, config: AppConfig) -> Result<(), String> {
        match self {
            AuthCommands::Login {
                strategy,
                no_browser,
                no_wait,
                params,
            } => {
                login::handle_login(
                    &config,
                    strategy.as_deref(),
                    login::LoginArgs {
                        open_browser: config.open_browser && !no_browser,
                        wait: !no_wait,
                        params,
                    },
                )
                .await
            }
            AuthCommands::Callback { url, strategy } => {
                callback::handle_callback(&config, strategy.as_deref(), &url).await
            }
            AuthCommands::Whoami { strategy } => {
                whoami::handle_whoami(&config, strategy.as_deref()).await
            }
            AuthCommands::Logout {
                strategy,
                no_browser,
            } => logout::handle_logout(
                &config,
                strategy.as_deref(),
                config.open_browser && !no_browser,
            ),
            AuthCommands::List => list::handle_list(&config),
        }
    }
}

/// A scheme wired to the file-backed auth manager
pub(crate) struct Session {
    pub name: String,
    pub auth: Arc<LocalAuthManager>,
    pub scheme: AuthorizationCodeScheme,
}

/// Build the session for a strategy
///
/// The CLI acts as the browser: its origin is the local callback listener,
/// so login and a later `auth callback` agree on the redirect URI.
pub(crate) fn open_session(
    config: &AppConfig,
    strategy: Option<&str>,
    open_browser: bool,
) -> Result<Session, String> {
    let name = config.strategy_name(strategy).map_err(|e| e.to_string())?;
    let scheme_config = config
        .scheme_config(&name, &ProviderRegistry::new())
        .map_err(|e| e.to_string())?;

    let auth = Arc::new(
        LocalAuthManager::new(
            &config.get_config_dir(),
            config.redirect.clone(),
            Box::new(TerminalNavigator::new(open_browser)),
        )
        .map_err(|e| format!("Failed to load auth manager: {}", e))?,
    );

    let scheme = AuthorizationCodeScheme::new(
        name.clone(),
        scheme_config,
        auth.clone(),
        ExecutionContext::browser(config.callback_origin()),
    );

    Ok(Session { name, auth, scheme })
}

/// Print who is signed in after a completed flow
pub(crate) fn print_signed_in(session: &Session) {
    use oktaplus_shared::auth_manager::AuthManager;

    println!();
    println!("Signed in with '{}'.", session.name);
    if let Some(user) = session.auth.user() {
        for key in ["name", "email", "preferred_username", "sub"] {
            if let Some(value) = user.get(key).and_then(|v| v.as_str()) {
                println!("  {}: {}", key, value);
            }
        }
    }
    println!(
        "Credentials saved to: {}",
        session.auth.auth_path().display()
    );
}
