//! Host contract consumed by authentication schemes
//!
//! The auth manager owns everything a scheme must not: credential storage,
//! the signed-in user, HTTP dispatch, the current route and navigation.
//! Schemes receive it as `Arc<dyn AuthManager>` at construction.
//!
//! All methods take `&self`; implementations keep their state behind
//! interior mutability so a scheme can hold a shared reference across the
//! suspension points of a flow.

use crate::oauth::context::Route;
use crate::oauth::error::OAuthResult;
use crate::storage::Storage;
use async_trait::async_trait;
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// HTTP request issued on behalf of a scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
        }
    }
}

/// Named navigation destinations configured on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Login,
    Logout,
    Callback,
    Home,
}

/// Paths behind each [`RedirectTarget`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectPaths {
    #[serde(default = "default_login")]
    pub login: String,
    #[serde(default = "default_logout")]
    pub logout: String,
    /// Route the provider sends the browser back to; `None` accepts callbacks anywhere
    ///
    /// Written as `callback = ""` in TOML, which has no null.
    #[serde(
        default = "default_callback",
        deserialize_with = "deserialize_callback",
        serialize_with = "serialize_callback"
    )]
    pub callback: Option<String>,
    #[serde(default = "default_home")]
    pub home: String,
}

impl Default for RedirectPaths {
    fn default() -> Self {
        Self {
            login: default_login(),
            logout: default_logout(),
            callback: default_callback(),
            home: default_home(),
        }
    }
}

impl RedirectPaths {
    pub fn path(&self, target: RedirectTarget) -> Option<&str> {
        match target {
            RedirectTarget::Login => Some(&self.login),
            RedirectTarget::Logout => Some(&self.logout),
            RedirectTarget::Callback => self.callback.as_deref(),
            RedirectTarget::Home => Some(&self.home),
        }
    }
}

fn default_login() -> String {
    "/login".to_string()
}

fn default_logout() -> String {
    "/".to_string()
}

fn default_callback() -> Option<String> {
    Some("/callback".to_string())
}

fn default_home() -> String {
    "/".to_string()
}

fn deserialize_callback<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|path| !path.trim().is_empty()))
}

fn serialize_callback<S>(callback: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(callback.as_deref().unwrap_or(""))
}

/// Host-provided coordinator every scheme talks to
#[async_trait]
pub trait AuthManager: Send + Sync {
    /// Stored token for a scheme, already prefixed with its token type
    fn get_token(&self, scheme: &str) -> Option<String>;

    /// Store or clear (`None`) a scheme's token
    fn set_token(&self, scheme: &str, token: Option<&str>) -> OAuthResult<()>;

    fn set_refresh_token(&self, scheme: &str, token: Option<&str>) -> OAuthResult<()>;

    /// Record the token lifetime as supplied by the provider
    fn set_expires_in(&self, scheme: &str, expires_in: u64) -> OAuthResult<()>;

    /// Currently signed-in user, if one was fetched
    fn user(&self) -> Option<Value>;

    /// Replace the signed-in user; `None` signs the user out
    fn set_user(&self, user: Option<Value>) -> OAuthResult<()>;

    fn set_user_id(&self, scheme: &str, user_id: Option<&str>) -> OAuthResult<()>;

    /// Attach (or with `None`, detach) a header on every outgoing request
    fn set_request_header(&self, name: &str, value: Option<&str>) -> OAuthResult<()>;

    /// Persistence that survives a full-page navigation
    fn storage(&self) -> &dyn Storage;

    /// Anonymous request; returns the parsed response body
    async fn request(&self, spec: RequestSpec) -> OAuthResult<Value>;

    /// Request authenticated with the scheme's stored token
    async fn request_with(&self, scheme: &str, spec: RequestSpec) -> OAuthResult<Value>;

    /// Route currently displayed by the host
    fn route(&self) -> Route;

    fn redirect_paths(&self) -> &RedirectPaths;

    /// Navigate to a configured destination; `replace` drops the current history entry
    fn redirect(&self, target: RedirectTarget, replace: bool);

    /// Full-page navigation to an external URL
    fn navigate(&self, url: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_paths_defaults() {
        let paths = RedirectPaths::default();
        assert_eq!(paths.path(RedirectTarget::Login), Some("/login"));
        assert_eq!(paths.path(RedirectTarget::Logout), Some("/"));
        assert_eq!(paths.path(RedirectTarget::Callback), Some("/callback"));
        assert_eq!(paths.path(RedirectTarget::Home), Some("/"));
    }

    #[test]
    fn test_redirect_paths_partial_toml() {
        let paths: RedirectPaths = toml::from_str(
            r#"
            callback = "/auth/callback"
            logout = "/login"
            "#,
        )
        .unwrap();

        assert_eq!(paths.callback.as_deref(), Some("/auth/callback"));
        assert_eq!(paths.logout, "/login");
        assert_eq!(paths.home, "/");
    }

    #[test]
    fn test_empty_callback_accepts_any_route() {
        let paths: RedirectPaths = toml::from_str("callback = \"\"").unwrap();
        assert_eq!(paths.callback, None);
        assert_eq!(paths.path(RedirectTarget::Callback), None);

        let text = toml::to_string(&paths).unwrap();
        let reloaded: RedirectPaths = toml::from_str(&text).unwrap();
        assert_eq!(reloaded, paths);
    }

    #[test]
    fn test_request_spec_get() {
        let spec = RequestSpec::get("https://example.com/userinfo");
        assert_eq!(spec.method, Method::GET);
        assert_eq!(spec.url, "https://example.com/userinfo");
    }
}
