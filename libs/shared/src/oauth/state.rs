//! Pending authorization values that survive the round trip to the provider
//!
//! `state`, and the PKCE verifier when one is used, are written to universal
//! storage right before the page navigates away and consumed exactly once
//! when the callback is handled.

/// URL-safe alphabet used for opaque values (64 symbols, so `byte & 63` is uniform)
const ALPHABET: &[u8; 64] = b"ModuleSymbhasOwnPr-0123456789ABCDEFGHNRVfgctiUvz_KqYTJkLxpZXIjQW";

/// Length of generated opaque values
pub const OPAQUE_LEN: usize = 21;

/// Generate a random URL-safe opaque string for `state` and `nonce`
pub fn generate_opaque() -> String {
    let bytes: [u8; OPAQUE_LEN] = rand::random();
    bytes
        .iter()
        .map(|b| ALPHABET[(b & 63) as usize] as char)
        .collect()
}

/// Storage key of the pending `state` for a scheme
pub fn state_key(scheme: &str) -> String {
    format!("{}.state", scheme)
}

/// Storage key of the pending PKCE verifier for a scheme
pub fn pkce_verifier_key(scheme: &str) -> String {
    format!("{}.pkce_code_verifier", scheme)
}

/// Local storage key where a host may record a token endpoint discovered at runtime
pub const TOKEN_ENDPOINT_KEY: &str = "refresh_token_endpoint";
