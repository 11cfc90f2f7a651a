//! List command - configured strategies and their stored credentials

use super::navigator::TerminalNavigator;
use crate::config::AppConfig;
use oktaplus_shared::local_auth::LocalAuthManager;
use oktaplus_shared::models::auth::SchemeCredentials;
use std::collections::BTreeMap;

/// Handle the list command
pub fn handle_list(config: &AppConfig) -> Result<(), String> {
    let credentials = stored_credentials(config)?;

    if config.strategies.is_empty() && credentials.is_empty() {
        println!("No strategies configured.");
        println!();
        println!("Run 'oktaplus config init' to add one.");
        return Ok(());
    }

    println!("Strategies:");
    println!();

    for (name, strategy) in &config.strategies {
        let provider = strategy.provider.as_deref().unwrap_or("custom");
        let default_marker = if config.default_strategy.as_deref() == Some(name.as_str()) {
            " [default]"
        } else {
            ""
        };

        println!(
            "  - {} ({}){}: {}",
            name,
            provider,
            default_marker,
            status(credentials.get(name))
        );
    }

    // Credentials left behind by strategies no longer in config.toml
    let orphans: Vec<&String> = credentials
        .keys()
        .filter(|name| !config.strategies.contains_key(*name))
        .collect();
    if !orphans.is_empty() {
        println!();
        println!("Stored credentials without a strategy:");
        for name in orphans {
            println!("  - {}: {}", name, status(credentials.get(name)));
        }
    }

    Ok(())
}

fn stored_credentials(config: &AppConfig) -> Result<BTreeMap<String, SchemeCredentials>, String> {
    let auth = LocalAuthManager::new(
        &config.get_config_dir(),
        config.redirect.clone(),
        Box::new(TerminalNavigator::new(false)),
    )
    .map_err(|e| format!("Failed to load auth manager: {}", e))?;

    Ok(auth.list())
}

fn status(credentials: Option<&SchemeCredentials>) -> &'static str {
    match credentials {
        Some(creds) if creds.token.is_some() => {
            if creds.is_expired() {
                "signed in (expired)"
            } else if creds.needs_refresh() {
                "signed in (expires soon)"
            } else {
                "signed in"
            }
        }
        _ => "not signed in",
    }
}
