use crate::oauth::error::{OAuthError, OAuthResult};
use reqwest::{Client, header::HeaderMap};
use rustls_platform_verifier::BuilderVerifierExt;
use std::time::Duration;

/// Default timeout for requests made on behalf of a scheme
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct TlsClientConfig {
    pub headers: HeaderMap,
    pub timeout: Duration,
}

impl Default for TlsClientConfig {
    fn default() -> Self {
        Self {
            headers: HeaderMap::new(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

pub fn create_tls_client(config: TlsClientConfig) -> OAuthResult<Client> {
    // needed to use OS-provided CA certificates with Rustls
    let arc_crypto_provider = std::sync::Arc::new(rustls::crypto::ring::default_provider());
    let tls_config = rustls::ClientConfig::builder_with_provider(arc_crypto_provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| OAuthError::ClientBuild(format!("TLS config: {}", e)))?
        .with_platform_verifier()
        .with_no_client_auth();

    Client::builder()
        .use_preconfigured_tls(tls_config)
        .default_headers(config.headers)
        .timeout(config.timeout)
        .build()
        .map_err(|e| OAuthError::ClientBuild(e.to_string()))
}
