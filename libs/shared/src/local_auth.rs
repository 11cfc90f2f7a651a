//! File-backed auth manager for command-line and desktop hosts
//!
//! Credentials and pending `state` values are written to `auth.toml` in the
//! config directory, so a login started by one process can be completed by
//! another. The signed-in user lives only as long as the manager: each
//! session loads the profile for the token it actually holds.
//!
//! Navigation is delegated to a [`Navigator`]; the host decides whether a
//! URL is opened in a browser, printed, or ignored.

use crate::auth_manager::{AuthManager, RedirectPaths, RedirectTarget, RequestSpec};
use crate::models::auth::{AuthFile, SchemeCredentials};
use crate::oauth::context::Route;
use crate::oauth::error::{OAuthError, OAuthResult};
use crate::storage::Storage;
use crate::tls_client::{TlsClientConfig, create_tls_client};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// The name of the auth state file
const AUTH_FILE_NAME: &str = "auth.toml";

/// Performs the navigation a scheme asks for
pub trait Navigator: Send + Sync {
    /// Go to one of the host's own routes
    fn redirect(&self, path: &str, replace: bool);

    /// Leave for an external URL
    fn navigate(&self, url: &str);
}

/// [`AuthManager`] that persists to `auth.toml`
pub struct LocalAuthManager {
    auth_path: PathBuf,
    auth_file: Mutex<AuthFile>,
    user: Mutex<Option<Value>>,
    headers: Mutex<HashMap<String, String>>,
    route: Mutex<Route>,
    paths: RedirectPaths,
    navigator: Box<dyn Navigator>,
    client: reqwest::Client,
}

impl LocalAuthManager {
    /// Load the auth state kept in `config_dir`
    pub fn new(
        config_dir: &Path,
        paths: RedirectPaths,
        navigator: Box<dyn Navigator>,
    ) -> OAuthResult<Self> {
        let auth_path = config_dir.join(AUTH_FILE_NAME);
        let auth_file = if auth_path.exists() {
            let content = std::fs::read_to_string(&auth_path)?;
            toml::from_str(&content)?
        } else {
            AuthFile::default()
        };

        Ok(Self {
            auth_path,
            auth_file: Mutex::new(auth_file),
            user: Mutex::new(None),
            headers: Mutex::new(HashMap::new()),
            route: Mutex::new(Route::new("/")),
            paths,
            navigator,
            client: create_tls_client(TlsClientConfig::default())?,
        })
    }

    /// Load from the default config directory (~/.oktaplus/)
    pub fn from_default_dir(
        paths: RedirectPaths,
        navigator: Box<dyn Navigator>,
    ) -> OAuthResult<Self> {
        let config_dir = get_default_config_dir()?;
        Self::new(&config_dir, paths, navigator)
    }

    /// Tell the manager which route the host is showing
    pub fn set_route(&self, route: Route) {
        *lock(&self.route) = route;
    }

    /// Stored credentials for a scheme
    pub fn credentials(&self, scheme: &str) -> Option<SchemeCredentials> {
        lock(&self.auth_file).schemes.get(scheme).cloned()
    }

    /// All stored credentials by scheme
    pub fn list(&self) -> BTreeMap<String, SchemeCredentials> {
        lock(&self.auth_file).schemes.clone()
    }

    /// Get the path to the auth file
    pub fn auth_path(&self) -> &Path {
        &self.auth_path
    }

    /// Apply a change to the auth file and write it out
    fn update(&self, change: impl FnOnce(&mut AuthFile) -> OAuthResult<()>) -> OAuthResult<()> {
        let mut file = lock(&self.auth_file);
        change(&mut file)?;
        file.prune();
        self.save(&file)
    }

    /// Save changes to disk
    fn save(&self, file: &AuthFile) -> OAuthResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.auth_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(file)?;

        let temp_path = self.auth_path.with_extension("toml.tmp");
        std::fs::write(&temp_path, &content)?;

        // Owner read/write only: the file holds bearer tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&temp_path, permissions)?;
        }

        std::fs::rename(&temp_path, &self.auth_path)?;

        Ok(())
    }

    async fn send(&self, spec: RequestSpec, headers: Vec<(String, String)>) -> OAuthResult<Value> {
        let mut request = self.client.request(spec.method.clone(), &spec.url);
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| OAuthError::invalid_header(format!("{}: {}", name, e)))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| OAuthError::invalid_header(format!("{}: {}", name, e)))?;
            request = request.header(name, value);
        }

        debug!("{} {}", spec.method, redact_query(&spec.url));
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(OAuthError::RequestFailed {
                url: redact_query(&spec.url).to_string(),
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Get the default oktaplus config directory
pub fn get_default_config_dir() -> OAuthResult<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        OAuthError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".oktaplus"))
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// URL without its query, which may carry codes and verifiers
fn redact_query(url: &str) -> &str {
    url.split_once('?').map(|(base, _)| base).unwrap_or(url)
}

fn put(map: &mut BTreeMap<String, String>, key: &str, value: Option<&str>) {
    match value {
        Some(value) => {
            map.insert(key.to_string(), value.to_string());
        }
        None => {
            map.remove(key);
        }
    }
}

impl Storage for LocalAuthManager {
    fn get_universal(&self, key: &str) -> Option<String> {
        lock(&self.auth_file).universal.get(key).cloned()
    }

    fn set_universal(&self, key: &str, value: Option<&str>) -> OAuthResult<()> {
        self.update(|file| {
            put(&mut file.universal, key, value);
            Ok(())
        })
    }

    fn get_local(&self, key: &str) -> Option<String> {
        lock(&self.auth_file).local.get(key).cloned()
    }

    fn set_local(&self, key: &str, value: Option<&str>) -> OAuthResult<()> {
        self.update(|file| {
            put(&mut file.local, key, value);
            Ok(())
        })
    }
}

#[async_trait]
impl AuthManager for LocalAuthManager {
    fn get_token(&self, scheme: &str) -> Option<String> {
        lock(&self.auth_file)
            .schemes
            .get(scheme)
            .and_then(|creds| creds.token.clone())
    }

    fn set_token(&self, scheme: &str, token: Option<&str>) -> OAuthResult<()> {
        self.update(|file| {
            let creds = file.scheme_mut(scheme);
            creds.token = token.map(str::to_string);
            if token.is_none() {
                creds.expires_in = None;
                creds.expires_at = None;
            }
            Ok(())
        })
    }

    fn set_refresh_token(&self, scheme: &str, token: Option<&str>) -> OAuthResult<()> {
        self.update(|file| {
            file.scheme_mut(scheme).refresh = token.map(str::to_string);
            Ok(())
        })
    }

    fn set_expires_in(&self, scheme: &str, expires_in: u64) -> OAuthResult<()> {
        self.update(|file| {
            file.scheme_mut(scheme).set_expires_in(expires_in);
            Ok(())
        })
    }

    fn user(&self) -> Option<Value> {
        lock(&self.user).clone()
    }

    fn set_user(&self, user: Option<Value>) -> OAuthResult<()> {
        *lock(&self.user) = user;
        Ok(())
    }

    fn set_user_id(&self, scheme: &str, user_id: Option<&str>) -> OAuthResult<()> {
        self.update(|file| {
            file.scheme_mut(scheme).user_id = user_id.map(str::to_string);
            Ok(())
        })
    }

    fn set_request_header(&self, name: &str, value: Option<&str>) -> OAuthResult<()> {
        HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| OAuthError::invalid_header(format!("{}: {}", name, e)))?;

        let mut headers = lock(&self.headers);
        match value {
            Some(value) => {
                headers.insert(name.to_string(), value.to_string());
            }
            None => {
                headers.remove(name);
            }
        }
        Ok(())
    }

    fn storage(&self) -> &dyn Storage {
        self
    }

    async fn request(&self, spec: RequestSpec) -> OAuthResult<Value> {
        self.send(spec, Vec::new()).await
    }

    async fn request_with(&self, scheme: &str, spec: RequestSpec) -> OAuthResult<Value> {
        let mut headers: Vec<(String, String)> = lock(&self.headers)
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        // a stored token still authenticates before any header was set
        if headers.is_empty()
            && let Some(token) = self.get_token(scheme)
        {
            headers.push((AUTHORIZATION.as_str().to_string(), token));
        }

        self.send(spec, headers).await
    }

    fn route(&self) -> Route {
        lock(&self.route).clone()
    }

    fn redirect_paths(&self) -> &RedirectPaths {
        &self.paths
    }

    fn redirect(&self, target: RedirectTarget, replace: bool) {
        match self.paths.path(target) {
            Some(path) => self.navigator.redirect(path, replace),
            None => debug!("no path configured for {:?}, staying put", target),
        }
    }

    fn navigate(&self, url: &str) {
        self.navigator.navigate(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Arc<Mutex<Vec<String>>>,
    }

    impl Navigator for RecordingNavigator {
        fn redirect(&self, path: &str, replace: bool) {
            lock(&self.visited).push(format!("{}{}", path, if replace { " (replace)" } else { "" }));
        }

        fn navigate(&self, url: &str) {
            lock(&self.visited).push(url.to_string());
        }
    }

    fn create_test_manager() -> (LocalAuthManager, Arc<Mutex<Vec<String>>>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let navigator = RecordingNavigator::default();
        let visited = navigator.visited.clone();
        let manager =
            LocalAuthManager::new(temp_dir.path(), RedirectPaths::default(), Box::new(navigator))
                .unwrap();
        (manager, visited, temp_dir)
    }

    #[test]
    fn test_new_empty() {
        let (manager, _, _temp) = create_test_manager();
        assert!(manager.list().is_empty());
        assert_eq!(manager.user(), None);
        assert!(!manager.auth_path().exists());
    }

    #[test]
    fn test_tokens_persist_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        {
            let manager = LocalAuthManager::new(
                temp_dir.path(),
                RedirectPaths::default(),
                Box::new(RecordingNavigator::default()),
            )
            .unwrap();
            manager.set_token("okta", Some("Bearer abc")).unwrap();
            manager.set_refresh_token("okta", Some("r1")).unwrap();
            manager.set_expires_in("okta", 3600).unwrap();
            manager.set_user_id("okta", Some("00u1")).unwrap();
            manager.set_universal("okta.state", Some("S1")).unwrap();
        }

        let manager = LocalAuthManager::new(
            temp_dir.path(),
            RedirectPaths::default(),
            Box::new(RecordingNavigator::default()),
        )
        .unwrap();
        let creds = manager.credentials("okta").unwrap();

        assert_eq!(manager.get_token("okta").as_deref(), Some("Bearer abc"));
        assert_eq!(creds.refresh.as_deref(), Some("r1"));
        assert_eq!(creds.expires_in, Some(3600));
        assert!(creds.expires_at.is_some());
        assert_eq!(creds.user_id.as_deref(), Some("00u1"));
        assert_eq!(manager.get_universal("okta.state").as_deref(), Some("S1"));
    }

    #[test]
    fn test_user_is_not_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let open = || {
            LocalAuthManager::new(
                temp_dir.path(),
                RedirectPaths::default(),
                Box::new(RecordingNavigator::default()),
            )
            .unwrap()
        };

        let first = open();
        first.set_token("okta", Some("Bearer abc")).unwrap();
        first.set_user(Some(json!({ "sub": "00u1" }))).unwrap();
        assert_eq!(first.user(), Some(json!({ "sub": "00u1" })));

        assert_eq!(open().user(), None);
        let content = std::fs::read_to_string(first.auth_path()).unwrap();
        assert!(!content.contains("00u1"));

        first.set_user(None).unwrap();
        assert_eq!(first.user(), None);
    }

    #[test]
    fn test_pending_state_consumed_once_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let open = || {
            LocalAuthManager::new(
                temp_dir.path(),
                RedirectPaths::default(),
                Box::new(RecordingNavigator::default()),
            )
            .unwrap()
        };

        open().set_universal("okta.state", Some("S1")).unwrap();
        assert_eq!(
            open().take_universal("okta.state").unwrap().as_deref(),
            Some("S1")
        );
        assert_eq!(open().get_universal("okta.state"), None);
    }

    #[test]
    fn test_clearing_drops_scheme_entry() {
        let (manager, _, _temp) = create_test_manager();
        manager.set_token("okta", Some("Bearer abc")).unwrap();
        manager.set_expires_in("okta", 60).unwrap();

        manager.set_token("okta", None).unwrap();
        assert_eq!(manager.credentials("okta"), None);
    }

    #[test]
    fn test_redirect_and_navigate_go_through_navigator() {
        let (manager, visited, _temp) = create_test_manager();

        manager.redirect(RedirectTarget::Home, true);
        manager.redirect(RedirectTarget::Logout, false);
        manager.navigate("https://idp.example.com/authorize?state=S1");

        assert_eq!(
            *lock(&visited),
            vec![
                "/ (replace)".to_string(),
                "/".to_string(),
                "https://idp.example.com/authorize?state=S1".to_string(),
            ]
        );
    }

    #[test]
    fn test_route_is_host_controlled() {
        let (manager, _, _temp) = create_test_manager();
        assert_eq!(manager.route().path, "/");

        manager.set_route(Route::parse("/callback?code=c1"));
        assert_eq!(manager.route().path, "/callback");
        assert_eq!(manager.route().query.get("code"), Some("c1"));
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let (manager, _, _temp) = create_test_manager();
        let result = manager.set_request_header("bad header", Some("x"));
        assert!(matches!(result, Err(OAuthError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_request_with_sends_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sub": "00u1" })))
            .expect(1)
            .mount(&server)
            .await;

        let (manager, _, _temp) = create_test_manager();
        manager.set_token("okta", Some("Bearer abc")).unwrap();
        manager
            .set_request_header("Authorization", Some("Bearer abc"))
            .unwrap();

        let user = manager
            .request_with("okta", RequestSpec::get(format!("{}/userinfo", server.uri())))
            .await
            .unwrap();
        assert_eq!(user, json!({ "sub": "00u1" }));
    }

    #[tokio::test]
    async fn test_request_with_falls_back_to_stored_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("authorization", "Bearer stored"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sub": "x" })))
            .expect(1)
            .mount(&server)
            .await;

        let (manager, _, _temp) = create_test_manager();
        manager.set_token("okta", Some("Bearer stored")).unwrap();

        manager
            .request_with("okta", RequestSpec::get(format!("{}/userinfo", server.uri())))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_request_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token"))
            .and(query_param("code", "c1"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let (manager, _, _temp) = create_test_manager();
        let result = manager
            .request(RequestSpec::get(format!("{}/token?code=c1", server.uri())))
            .await;

        match result {
            Err(OAuthError::RequestFailed { url, status, body }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "invalid_grant");
                assert!(!url.contains("code=c1"));
            }
            other => panic!("expected RequestFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_body_is_null() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/empty"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let (manager, _, _temp) = create_test_manager();
        let body = manager
            .request(RequestSpec::get(format!("{}/empty", server.uri())))
            .await
            .unwrap();
        assert_eq!(body, Value::Null);
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (manager, _, _temp) = create_test_manager();
        manager.set_token("okta", Some("Bearer abc")).unwrap();

        let metadata = std::fs::metadata(manager.auth_path()).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
    }
}
