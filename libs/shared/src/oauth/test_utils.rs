//! Recording auth manager for scheme tests.

use crate::auth_manager::{AuthManager, RedirectPaths, RedirectTarget, RequestSpec};
use crate::oauth::context::Route;
use crate::oauth::error::OAuthResult;
use crate::storage::{MemoryStorage, Storage};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// Lock a test mutex, ignoring poisoning from an earlier failed assertion
pub fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

/// In-memory auth manager that records every call a scheme makes
#[derive(Default)]
pub struct RecordingAuthManager {
    pub tokens: Mutex<HashMap<String, String>>,
    pub refresh_tokens: Mutex<HashMap<String, String>>,
    pub expires: Mutex<HashMap<String, u64>>,
    pub user: Mutex<Option<Value>>,
    pub user_ids: Mutex<HashMap<String, Option<String>>>,
    pub headers: Mutex<HashMap<String, String>>,
    pub storage: MemoryStorage,
    pub route: Mutex<Route>,
    pub paths: RedirectPaths,
    pub redirects: Mutex<Vec<(RedirectTarget, bool)>>,
    pub navigations: Mutex<Vec<String>>,
    /// `(scheme, request)`; scheme is `None` for anonymous requests
    pub requests: Mutex<Vec<(Option<String>, RequestSpec)>>,
    /// Responses handed out in order; an empty queue answers `{}`
    pub responses: Mutex<VecDeque<OAuthResult<Value>>>,
}

impl RecordingAuthManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(self, uri: &str) -> Self {
        *locked(&self.route) = Route::parse(uri);
        self
    }

    pub fn respond(&self, response: OAuthResult<Value>) {
        locked(&self.responses).push_back(response);
    }

    pub fn token(&self, scheme: &str) -> Option<String> {
        locked(&self.tokens).get(scheme).cloned()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        locked(&self.headers).get(name).cloned()
    }

    fn next_response(&self, scheme: Option<&str>, spec: RequestSpec) -> OAuthResult<Value> {
        locked(&self.requests).push((scheme.map(str::to_string), spec));
        locked(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Ok(serde_json::json!({})))
    }
}

fn put<V>(map: &Mutex<HashMap<String, V>>, key: &str, value: Option<V>) {
    let mut map = locked(map);
    match value {
        Some(value) => {
            map.insert(key.to_string(), value);
        }
        None => {
            map.remove(key);
        }
    }
}

#[async_trait]
impl AuthManager for RecordingAuthManager {
    fn get_token(&self, scheme: &str) -> Option<String> {
        self.token(scheme)
    }

    fn set_token(&self, scheme: &str, token: Option<&str>) -> OAuthResult<()> {
        put(&self.tokens, scheme, token.map(str::to_string));
        Ok(())
    }

    fn set_refresh_token(&self, scheme: &str, token: Option<&str>) -> OAuthResult<()> {
        put(&self.refresh_tokens, scheme, token.map(str::to_string));
        Ok(())
    }

    fn set_expires_in(&self, scheme: &str, expires_in: u64) -> OAuthResult<()> {
        put(&self.expires, scheme, Some(expires_in));
        Ok(())
    }

    fn user(&self) -> Option<Value> {
        locked(&self.user).clone()
    }

    fn set_user(&self, user: Option<Value>) -> OAuthResult<()> {
        *locked(&self.user) = user;
        Ok(())
    }

    fn set_user_id(&self, scheme: &str, user_id: Option<&str>) -> OAuthResult<()> {
        locked(&self.user_ids).insert(scheme.to_string(), user_id.map(str::to_string));
        Ok(())
    }

    fn set_request_header(&self, name: &str, value: Option<&str>) -> OAuthResult<()> {
        put(&self.headers, name, value.map(str::to_string));
        Ok(())
    }

    fn storage(&self) -> &dyn Storage {
        &self.storage
    }

    async fn request(&self, spec: RequestSpec) -> OAuthResult<Value> {
        self.next_response(None, spec)
    }

    async fn request_with(&self, scheme: &str, spec: RequestSpec) -> OAuthResult<Value> {
        self.next_response(Some(scheme), spec)
    }

    fn route(&self) -> Route {
        locked(&self.route).clone()
    }

    fn redirect_paths(&self) -> &RedirectPaths {
        &self.paths
    }

    fn redirect(&self, target: RedirectTarget, replace: bool) {
        locked(&self.redirects).push((target, replace));
    }

    fn navigate(&self, url: &str) {
        locked(&self.navigations).push(url.to_string());
    }
}
