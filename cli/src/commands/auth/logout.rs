//! Logout command - end the session locally and at the provider

use super::open_session;
use crate::config::AppConfig;

/// Handle the logout command
pub fn handle_logout(
    config: &AppConfig,
    strategy: Option<&str>,
    open_browser: bool,
) -> Result<(), String> {
    let session = open_session(config, strategy, open_browser)?;

    let had_credentials = session.auth.credentials(&session.name).is_some();

    let end_session_url = session
        .scheme
        .logout()
        .map_err(|e| format!("Failed to sign out: {}", e))?;

    if had_credentials {
        println!("Removed stored credentials for '{}'.", session.name);
    } else {
        println!("No credentials stored for '{}'.", session.name);
    }

    if end_session_url.is_some() {
        println!("Finish signing out at the provider with the URL above.");
    }

    Ok(())
}
