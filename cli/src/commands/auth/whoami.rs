//! Whoami command - show the signed-in user

use super::open_session;
use crate::config::AppConfig;
use oktaplus_shared::auth_manager::AuthManager;
use oktaplus_shared::oauth::Route;

/// Handle the whoami command
pub async fn handle_whoami(
    config: &AppConfig,
    strategy: Option<&str>,
) -> Result<(), String> {
    let session = open_session(config, strategy, false)?;

    if session.auth.get_token(&session.name).is_none() {
        println!("Not signed in with '{}'.", session.name);
        println!();
        println!("Run 'oktaplus auth login' to sign in.");
        return Ok(());
    }

    // Outside the callback route, initialize restores the header and loads the profile
    session.auth.set_route(Route::new(config.redirect.home.clone()));
    session
        .scheme
        .initialize()
        .await
        .map_err(|e| format!("Failed to restore session: {}", e))?;

    if let Some(creds) = session.auth.credentials(&session.name)
        && creds.is_expired()
    {
        println!("Warning: the stored token for '{}' has expired.", session.name);
    }

    match session.auth.user() {
        Some(user) => {
            let pretty = serde_json::to_string_pretty(&user)
                .map_err(|e| format!("Failed to render user: {}", e))?;
            println!("{}", pretty);
        }
        None => println!("Signed in with '{}', no profile available.", session.name),
    }

    Ok(())
}
