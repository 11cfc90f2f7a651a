//! Redirect-based OAuth2 / OIDC authorization scheme
//!
//! Drives one login round trip:
//!
//! 1. [`AuthorizationCodeScheme::login`] builds the authorization URL,
//!    persists a random `state` and navigates away.
//! 2. The provider sends the browser back to the callback route, where
//!    [`AuthorizationCodeScheme::handle_callback`] validates `state`, picks
//!    the token out of the query or fragment (exchanging a `code` first when
//!    the flow calls for it) and hands it to the auth manager.
//!
//! Negative outcomes (wrong route, state mismatch, no token) are reported as
//! `Ok(false)`. Only failures of the host itself (transport, persistence)
//! come back as errors.

use super::config::SchemeConfig;
use super::context::{ExecutionContext, Route};
use super::error::OAuthResult;
use super::pkce::PkceChallenge;
use super::query::QueryParams;
use super::state::{TOKEN_ENDPOINT_KEY, generate_opaque, pkce_verifier_key, state_key};
use super::token::{TokenResponse, TokenSet, value_as_string};
use crate::auth_manager::{AuthManager, RedirectTarget, RequestSpec};
use std::sync::Arc;
use tracing::{debug, warn};

/// Caller overrides for a single [`AuthorizationCodeScheme::login`]
#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    /// Extra authorization parameters; they win over the generated ones
    pub params: QueryParams,
    /// Use this `state` instead of a generated one
    pub state: Option<String>,
    /// Use this `nonce` instead of a generated one
    pub nonce: Option<String>,
}

pub struct AuthorizationCodeScheme {
    name: String,
    config: SchemeConfig,
    auth: Arc<dyn AuthManager>,
    context: ExecutionContext,
}

impl AuthorizationCodeScheme {
    pub fn new(
        name: impl Into<String>,
        config: SchemeConfig,
        auth: Arc<dyn AuthManager>,
        context: ExecutionContext,
    ) -> Self {
        Self {
            name: name.into(),
            config,
            auth,
            context,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SchemeConfig {
        &self.config
    }

    /// Redirect URI sent to the provider
    ///
    /// The explicit `redirect_uri` wins; otherwise it is the context origin
    /// (inbound request on a server, page origin in a browser) followed by
    /// the host's callback path.
    pub fn redirect_uri(&self) -> Option<String> {
        if let Some(uri) = self.config.redirect_uri.as_deref().filter(|u| !u.is_empty()) {
            return Some(uri.to_string());
        }

        let origin = self.context.origin()?;
        let callback = self
            .auth
            .redirect_paths()
            .callback
            .as_deref()
            .unwrap_or_default();
        Some(format!("{}{}", origin, callback))
    }

    /// Page-load hook: restore the stored token, complete a pending callback
    /// and otherwise make sure the user is loaded
    pub async fn initialize(&self) -> OAuthResult<()> {
        if let Some(token) = self.auth.get_token(&self.name) {
            self.auth
                .set_request_header(&self.config.token_name, Some(&token))?;
        }

        if self.handle_callback(None).await? {
            return Ok(());
        }

        self.fetch_user_once().await
    }

    /// Build the authorization URL, persist the pending state and navigate to it
    ///
    /// Returns the URL the host was asked to navigate to.
    pub fn login(&self, options: LoginOptions) -> OAuthResult<String> {
        let LoginOptions {
            params: extra,
            state,
            nonce,
        } = options;

        let mut params = QueryParams::new();
        params.insert("protocol", "oauth2");
        params.insert("response_type", self.config.response_type.as_str());
        params.insert_opt("access_type", self.config.access_type.as_deref());
        params.insert("client_id", self.config.client_id.as_str());
        params.insert_opt("redirect_uri", self.redirect_uri());
        if !self.config.scope.is_empty() {
            params.insert("scope", self.config.scope_string());
        }
        params.insert("state", state.unwrap_or_else(generate_opaque));
        params.insert_opt("login_hint", self.config.login_hint.as_deref());
        params.merge(extra);
        // audience is applied after the caller's params and cannot be overridden
        params.insert_opt("audience", self.config.audience.as_deref());

        let response_type = params.get("response_type").unwrap_or_default().to_string();

        if response_type.contains("id_token") {
            params.insert("nonce", nonce.unwrap_or_else(generate_opaque));
        }

        let storage = self.auth.storage();

        if response_type.contains("code")
            && let Some(method) = self.config.code_challenge_method
        {
            let pkce = PkceChallenge::generate(method);
            params.insert("code_challenge", pkce.challenge.as_str());
            params.insert("code_challenge_method", method.as_str());
            storage.set_universal(&pkce_verifier_key(&self.name), Some(&pkce.verifier))?;
        }

        let state = params.get("state").unwrap_or_default().to_string();
        storage.set_universal(&state_key(&self.name), Some(&state))?;

        let url = params.append_to(&self.config.authorization_endpoint);
        debug!(scheme = %self.name, "redirecting to authorization endpoint");
        self.auth.navigate(&url);

        Ok(url)
    }

    /// Complete the flow if the current (or given) location is a provider callback
    ///
    /// Returns `true` when a token was stored and the host was redirected home.
    pub async fn handle_callback(&self, uri: Option<&str>) -> OAuthResult<bool> {
        let route = match uri {
            Some(uri) => Route::parse(uri),
            None => self.auth.route(),
        };

        if let Some(callback) = self.auth.redirect_paths().callback.as_deref()
            && route.path != callback
        {
            return Ok(false);
        }

        if self.context.is_server() {
            debug!(scheme = %self.name, "callback handling skipped during server rendering");
            return Ok(false);
        }

        let params = route.callback_params();
        let mut tokens = TokenResponse::from_params(&params, &self.config);

        let storage = self.auth.storage();
        let pending_state = storage
            .take_universal(&state_key(&self.name))?
            .filter(|s| !s.is_empty());
        let pending_verifier = storage.take_universal(&pkce_verifier_key(&self.name))?;

        if let Some(expected) = pending_state.as_deref()
            && params.get("state") != Some(expected)
        {
            warn!(scheme = %self.name, "rejecting callback: state does not match");
            return Ok(false);
        }

        if self.config.response_includes("code")
            && let Some(code) = params.get_non_empty("code")
            && let Some(endpoint) = self.token_endpoint()
        {
            let exchanged = self
                .exchange_code(&endpoint, code, pending_verifier.as_deref())
                .await?;
            tokens.override_with(exchanged);
        }

        let Some(token_set) = tokens.into_token_set() else {
            debug!(scheme = %self.name, "callback carried no token");
            return Ok(false);
        };

        self.store_tokens(token_set)?;
        self.fetch_user_once().await?;
        self.auth.redirect(RedirectTarget::Home, true);

        Ok(true)
    }

    /// Load the user profile for the stored token
    pub async fn fetch_user(&self) -> OAuthResult<()> {
        if self.auth.get_token(&self.name).is_none() {
            return Ok(());
        }

        let Some(endpoint) = self.config.userinfo_endpoint.as_deref() else {
            self.auth.set_user(Some(serde_json::json!({})))?;
            self.auth.set_user_id(&self.name, None)?;
            return Ok(());
        };

        let user = self
            .auth
            .request_with(&self.name, RequestSpec::get(endpoint))
            .await?;
        let user_id = user.get("sub").and_then(value_as_string);

        self.auth.set_user(Some(user))?;
        self.auth.set_user_id(&self.name, user_id.as_deref())?;

        Ok(())
    }

    /// [`fetch_user`](Self::fetch_user) unless the host already holds a user
    pub async fn fetch_user_once(&self) -> OAuthResult<()> {
        if self.auth.user().is_some() {
            return Ok(());
        }
        self.fetch_user().await
    }

    /// Forget the token, refresh token and user of this scheme
    ///
    /// Safe to call any number of times; only a failing host store makes it
    /// return an error.
    pub fn reset(&self) -> OAuthResult<()> {
        self.auth.set_request_header(&self.config.token_name, None)?;
        self.auth.set_user(None)?;
        self.auth.set_user_id(&self.name, None)?;
        self.auth.set_token(&self.name, None)?;
        self.auth.set_refresh_token(&self.name, None)?;
        Ok(())
    }

    /// Reset the session and leave through the provider's end-session endpoint
    ///
    /// Without an end-session endpoint the host is redirected to its logout
    /// route instead. Returns the provider URL when one was used.
    pub fn logout(&self) -> OAuthResult<Option<String>> {
        self.reset()?;

        let Some(endpoint) = self.config.end_session_endpoint.as_deref() else {
            self.auth.redirect(RedirectTarget::Logout, false);
            return Ok(None);
        };

        let mut params = QueryParams::new();
        params.insert("client_id", self.config.client_id.as_str());
        params.insert_opt(
            "post_logout_redirect_uri",
            self.config.post_logout_redirect_uri.as_deref(),
        );

        let url = params.append_to(endpoint);
        self.auth.navigate(&url);
        Ok(Some(url))
    }

    /// Token endpoint recorded by the host at runtime, else the configured one
    fn token_endpoint(&self) -> Option<String> {
        self.auth
            .storage()
            .get_local(TOKEN_ENDPOINT_KEY)
            .filter(|e| !e.is_empty())
            .or_else(|| self.config.token_endpoint.clone())
    }

    async fn exchange_code(
        &self,
        endpoint: &str,
        code: &str,
        verifier: Option<&str>,
    ) -> OAuthResult<TokenResponse> {
        let mut query = QueryParams::new();
        query.insert("code", code);
        query.insert_opt("redirect_uri", self.redirect_uri());
        query.insert("grant_type", "authorization_code");
        if let Some(verifier) = verifier {
            // public clients identify themselves when proving possession
            query.insert("client_id", self.config.client_id.as_str());
            query.insert("code_verifier", verifier);
        }

        debug!(scheme = %self.name, "exchanging authorization code");
        let body = self
            .auth
            .request(RequestSpec::get(query.append_to(endpoint)))
            .await?;

        Ok(TokenResponse::from_json(&body))
    }

    fn store_tokens(&self, tokens: TokenSet) -> OAuthResult<()> {
        let token = tokens.authorization_value(&self.config);

        self.auth.set_token(&self.name, Some(&token))?;
        self.auth
            .set_request_header(&self.config.token_name, Some(&token))?;

        if let Some(refresh_token) = tokens.refresh_token.as_deref() {
            self.auth.set_refresh_token(&self.name, Some(refresh_token))?;
        }
        if let Some(expires_in) = tokens.expires_in {
            self.auth.set_expires_in(&self.name, expires_in)?;
        }

        Ok(())
    }
}
