//! Where the scheme runs and what the current location looks like
//!
//! The host resolves the execution context once, before the scheme is
//! built, so the scheme never inspects its environment.

use super::query::QueryParams;
use reqwest::header::{HOST, HeaderMap};
use tracing::debug;
use url::Url;

/// Inbound request seen while rendering on a server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    /// Value of the `Host` header
    pub host: String,
    /// Whether the request reached us over TLS, directly or via a proxy
    pub https: bool,
}

impl InboundRequest {
    pub fn new(host: impl Into<String>, https: bool) -> Self {
        Self {
            host: host.into(),
            https,
        }
    }

    /// Build from request headers; `tls` is whether the socket itself is encrypted
    ///
    /// A TLS-terminating proxy is recognised via `X-Forwarded-Proto: https`
    /// (first value wins) or `X-Forwarded-Ssl: on`. Returns `None` without a
    /// usable `Host` header.
    pub fn from_headers(headers: &HeaderMap, tls: bool) -> Option<Self> {
        let host = headers
            .get(HOST)?
            .to_str()
            .ok()
            .map(str::trim)
            .filter(|h| !h.is_empty())?;

        let forwarded_proto = headers
            .get("x-forwarded-proto")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().eq_ignore_ascii_case("https"))
            .unwrap_or(false);
        let forwarded_ssl = headers
            .get("x-forwarded-ssl")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().eq_ignore_ascii_case("on"))
            .unwrap_or(false);

        Some(Self::new(host, tls || forwarded_proto || forwarded_ssl))
    }

    /// `http[s]://<host>`
    pub fn origin(&self) -> String {
        format!("{}://{}", if self.https { "https" } else { "http" }, self.host)
    }
}

/// Execution context the scheme was constructed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionContext {
    /// Server-side rendering; callbacks cannot complete here
    Server { request: Option<InboundRequest> },
    /// Browser (or a host acting as one) with a known origin
    Browser { origin: Option<String> },
}

impl ExecutionContext {
    pub fn server(request: Option<InboundRequest>) -> Self {
        Self::Server { request }
    }

    pub fn browser(origin: impl Into<String>) -> Self {
        Self::Browser {
            origin: Some(origin.into()),
        }
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// Origin the redirect URI is derived from, if the context knows one
    pub fn origin(&self) -> Option<String> {
        match self {
            Self::Server { request } => request.as_ref().map(InboundRequest::origin),
            Self::Browser { origin } => origin
                .as_deref()
                .map(|o| o.trim_end_matches('/').to_string()),
        }
    }
}

/// Base for resolving routes given without scheme and authority
const RELATIVE_BASE: &str = "http://localhost";

fn to_url(uri: &str) -> Result<Url, url::ParseError> {
    match Url::parse(uri) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_BASE)?.join(uri),
        parsed => parsed,
    }
}

/// Current route: path, query parameters and the raw fragment (without `#`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub query: QueryParams,
    pub hash: String,
}

impl Route {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Parse an absolute URL or a path-with-query into a route
    ///
    /// Relative input is resolved against a placeholder origin, so `://`
    /// inside a query value (as in Google's unencoded `scope`) stays part of
    /// the query. Input `url` rejects falls back to a plain split.
    pub fn parse(uri: &str) -> Self {
        match to_url(uri) {
            Ok(url) => Self::from_parts(
                url.path(),
                url.query().unwrap_or(""),
                url.fragment().unwrap_or(""),
            ),
            Err(e) => {
                debug!("route '{}' is not a valid URL ({}), splitting as a path", uri, e);
                let (before_hash, hash) = uri.split_once('#').unwrap_or((uri, ""));
                let (path, query) = before_hash.split_once('?').unwrap_or((before_hash, ""));
                Self::from_parts(path, query, hash)
            }
        }
    }

    fn from_parts(path: &str, query: &str, hash: &str) -> Self {
        Self {
            path: if path.is_empty() {
                "/".to_string()
            } else {
                path.to_string()
            },
            query: QueryParams::parse(query),
            hash: hash.to_string(),
        }
    }

    /// Query parameters with fragment parameters merged over them
    pub fn callback_params(&self) -> QueryParams {
        let mut params = self.query.clone();
        params.merge(QueryParams::parse(&self.hash));
        params
    }
}
