//! PKCE (Proof Key for Code Exchange) implementation
//!
//! This module implements RFC 7636 PKCE for OAuth 2.0 authorization code flow.
//! PKCE provides additional security for public clients by using a code verifier
//! and code challenge.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Code challenge method sent as `code_challenge_method`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PkceMethod {
    #[serde(rename = "S256")]
    S256,
    #[serde(rename = "plain")]
    Plain,
}

impl PkceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S256 => "S256",
            Self::Plain => "plain",
        }
    }
}

/// PKCE challenge pair containing the verifier and challenge
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// The verifier string (stored client-side, sent during token exchange)
    pub verifier: String,
    /// The challenge string (sent during authorization request)
    pub challenge: String,
    pub method: PkceMethod,
}

impl PkceChallenge {
    /// Generate a new PKCE challenge pair
    ///
    /// Creates a cryptographically random 32-byte verifier. With `S256` the
    /// challenge is the base64url SHA256 of the verifier, with `plain` it is
    /// the verifier itself.
    pub fn generate(method: PkceMethod) -> Self {
        let random_bytes: [u8; 32] = rand::random();
        let verifier = URL_SAFE_NO_PAD.encode(random_bytes);
        let challenge = Self::challenge_for(&verifier, method);

        Self {
            verifier,
            challenge,
            method,
        }
    }

    /// Compute the challenge for an existing verifier
    pub fn challenge_for(verifier: &str, method: PkceMethod) -> String {
        match method {
            PkceMethod::S256 => {
                let mut hasher = Sha256::new();
                hasher.update(verifier.as_bytes());
                URL_SAFE_NO_PAD.encode(hasher.finalize())
            }
            PkceMethod::Plain => verifier.to_string(),
        }
    }
}
