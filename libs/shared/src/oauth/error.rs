//! OAuth error types

use thiserror::Error;

/// Errors that can occur during OAuth operations
///
/// Protocol-level negatives (a state mismatch, a callback without a token,
/// a request on the wrong route) are not errors: the scheme reports them as
/// "no redirect happened". These variants cover what the host could not do.
#[derive(Error, Debug)]
pub enum OAuthError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request reached the server but came back with a failure status
    #[error("Request to {url} failed: HTTP {status}: {body}")]
    RequestFailed {
        url: String,
        status: u16,
        body: String,
    },

    /// HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid header name or value
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Provider preset not found
    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    /// Strategy configuration is incomplete or inconsistent
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// TOML deserialization error
    #[error("TOML deserialization error: {0}")]
    TomlDeError(#[from] toml::de::Error),
}

impl OAuthError {
    /// Create a provider not found error
    pub fn provider_not_found(provider: impl Into<String>) -> Self {
        Self::ProviderNotFound(provider.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid header error
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }
}

/// Result type alias for OAuth operations
pub type OAuthResult<T> = Result<T, OAuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_display() {
        let err = OAuthError::RequestFailed {
            url: "https://example.com/token".to_string(),
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request to https://example.com/token failed: HTTP 401: unauthorized"
        );
    }

    #[test]
    fn test_constructors() {
        assert!(matches!(
            OAuthError::provider_not_found("nope"),
            OAuthError::ProviderNotFound(p) if p == "nope"
        ));
        assert!(matches!(
            OAuthError::invalid_config("missing domain"),
            OAuthError::InvalidConfig(m) if m == "missing domain"
        ));
    }
}
