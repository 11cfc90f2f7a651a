//! OAuth 2.0 / OpenID Connect sign-in for a host application
//!
//! A scheme drives the redirect-based login round trip against one
//! identity provider and hands the resulting token to the host's
//! [`AuthManager`](crate::auth_manager::AuthManager).
//!
//! # Architecture
//!
//! - `config`: Scheme configuration and per-strategy overrides
//! - `context`: Execution context and route parsing
//! - `error`: Error types for OAuth operations
//! - `pkce`: PKCE (Proof Key for Code Exchange) implementation
//! - `provider`: Provider preset trait
//! - `providers`: Built-in presets (Okta, Auth0, Google)
//! - `query`: Ordered query parameters
//! - `registry`: Provider registry for managing presets
//! - `scheme`: The authorization scheme itself
//! - `state`: Opaque `state`/`nonce` values and their storage keys
//! - `token`: Token values extracted from callbacks and exchanges
//!
//! # Example
//!
//! ```rust,ignore
//! use oktaplus_shared::oauth::{AuthorizationCodeScheme, ExecutionContext, LoginOptions};
//!
//! let config = strategy.resolve(&ProviderRegistry::new())?;
//! let scheme = AuthorizationCodeScheme::new("okta", config, auth, ExecutionContext::browser(origin));
//!
//! // Sends the user to the provider
//! let url = scheme.login(LoginOptions::default())?;
//!
//! // Back on the callback route:
//! let signed_in = scheme.handle_callback(Some(&callback_url)).await?;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod pkce;
pub mod provider;
pub mod providers;
pub mod query;
pub mod registry;
pub mod scheme;
pub mod state;
pub mod token;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::{SchemeConfig, StrategyConfig};
pub use context::{ExecutionContext, InboundRequest, Route};
pub use error::{OAuthError, OAuthResult};
pub use pkce::{PkceChallenge, PkceMethod};
pub use provider::OAuthProvider;
pub use query::QueryParams;
pub use registry::ProviderRegistry;
pub use scheme::{AuthorizationCodeScheme, LoginOptions};
pub use token::{TokenResponse, TokenSet};
