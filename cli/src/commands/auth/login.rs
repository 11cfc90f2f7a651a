//! Login command - sign in through the browser

use super::callback::complete;
use super::callback_server::CallbackListener;
use super::open_session;
use crate::config::AppConfig;
use oktaplus_shared::oauth::{LoginOptions, QueryParams};
use std::time::Duration;

/// How long the local listener waits for the provider
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

pub struct LoginArgs {
    pub open_browser: bool,
    /// Wait on the local listener for the callback
    pub wait: bool,
    /// Raw `KEY=VALUE` authorization parameters
    pub params: Vec<String>,
}

/// Handle the login command
pub async fn handle_login(
    config: &AppConfig,
    strategy: Option<&str>,
    args: LoginArgs,
) -> Result<(), String> {
    let params = parse_params(&args.params)?;
    let session = open_session(config, strategy, args.open_browser)?;

    // Bind before leaving for the provider so the redirect cannot arrive first
    let listener = if args.wait {
        Some(
            CallbackListener::bind(config.callback_port, config.redirect.callback.as_deref())
                .await?,
        )
    } else {
        None
    };

    println!("Signing in with '{}'...", session.name);
    session
        .scheme
        .login(LoginOptions {
            params,
            ..LoginOptions::default()
        })
        .map_err(|e| format!("Failed to start sign-in: {}", e))?;

    let Some(listener) = listener else {
        println!("After signing in, copy the URL the browser lands on and run:");
        println!(
            "  oktaplus auth callback --strategy {} '<callback URL>'",
            session.name
        );
        return Ok(());
    };

    println!(
        "Waiting for the provider to redirect to http://{}{} ...",
        listener.local_addr()?,
        config.redirect.callback.as_deref().unwrap_or("/")
    );
    let uri = listener.wait(CALLBACK_TIMEOUT).await?;

    complete(&session, &uri).await
}

/// Parse repeated `--param KEY=VALUE` arguments
fn parse_params(raw: &[String]) -> Result<QueryParams, String> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(format!("Invalid --param '{}', expected KEY=VALUE", pair)),
        })
        .collect()
}
