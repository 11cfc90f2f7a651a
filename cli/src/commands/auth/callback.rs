//! Callback command - finish a sign-in from a pasted redirect URL

use super::{Session, open_session, print_signed_in};
use crate::config::AppConfig;
use oktaplus_shared::auth_manager::AuthManager;
use oktaplus_shared::oauth::Route;

/// Handle the callback command
pub async fn handle_callback(
    config: &AppConfig,
    strategy: Option<&str>,
    url: &str,
) -> Result<(), String> {
    let session = open_session(config, strategy, false)?;
    complete(&session, url).await
}

/// Hand a callback URL to the scheme and report the outcome
pub(super) async fn complete(session: &Session, uri: &str) -> Result<(), String> {
    let route = Route::parse(uri);
    session.auth.set_route(route.clone());

    let signed_in = session
        .scheme
        .handle_callback(None)
        .await
        .map_err(|e| format!("Failed to complete sign-in: {}", e))?;

    if !signed_in {
        return Err(describe_rejection(session, &route));
    }

    print_signed_in(session);
    Ok(())
}

/// Explain why a callback did not sign the user in
fn describe_rejection(session: &Session, route: &Route) -> String {
    let params = route.callback_params();

    if let Some(error) = params.get_non_empty("error") {
        return match params.get_non_empty("error_description") {
            Some(description) => format!("Provider returned {}: {}", error, description),
            None => format!("Provider returned {}", error),
        };
    }

    if let Some(callback) = session.auth.redirect_paths().callback.as_deref()
        && route.path != callback
    {
        return format!(
            "'{}' is not the callback route ('{}')",
            route.path, callback
        );
    }

    "Sign-in rejected: the response did not match a pending login or carried no token \
     (run with --debug for details)"
        .to_string()
}
