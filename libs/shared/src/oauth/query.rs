//! Ordered query-string parameters
//!
//! Authorization requests and callbacks both travel as
//! `application/x-www-form-urlencoded`-style strings. Order matters for the
//! outgoing request (providers and tests read the URL), so parameters are
//! kept in insertion order and a repeated key replaces the value in place.

/// Ordered set of query parameters with last-write-wins semantics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a query string (without the leading `?` or `#`)
    ///
    /// A key without `=` maps to an empty value. Percent-decoding failures
    /// keep the raw text rather than dropping the parameter.
    pub fn parse(query: &str) -> Self {
        let mut params = Self::new();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            params.insert(decode(key), decode(value));
        }
        params
    }

    /// Insert a parameter, replacing an existing value without moving it
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Insert a parameter only when a value is present
    pub fn insert_opt(&mut self, key: impl Into<String>, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value for `key`, treating an empty value as absent
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Merge `other` over `self`; values from `other` win on collision
    pub fn merge(&mut self, other: QueryParams) {
        for (key, value) in other.pairs {
            self.insert(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode as `k=v&k2=v2` with every component percent-encoded
    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Append the encoded parameters to `base`, respecting an existing query
    pub fn append_to(&self, base: &str) -> String {
        if self.is_empty() {
            return base.to_string();
        }
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{}{}{}", base, separator, self.encode())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_preserves_order_and_escapes() {
        let mut params = QueryParams::new();
        params.insert("scope", "openid profile");
        params.insert("redirect_uri", "http://localhost:3000/callback");
        params.insert("state", "abc");

        assert_eq!(
            params.encode(),
            "scope=openid%20profile&redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback&state=abc"
        );
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut params = QueryParams::new();
        params.insert("a", "1");
        params.insert("b", "2");
        params.insert("a", "3");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_parse_decodes_and_handles_bare_keys() {
        let params = QueryParams::parse("access_token=abc%20def&flag&state=S1&&x=a=b");

        assert_eq!(params.get("access_token"), Some("abc def"));
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(params.get("state"), Some("S1"));
        assert_eq!(params.get("x"), Some("a=b"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_parse_bad_escape_keeps_raw() {
        let params = QueryParams::parse("code=%E0%A4%A");
        assert_eq!(params.get("code"), Some("%E0%A4%A"));
    }

    #[test]
    fn test_merge_other_wins() {
        let mut query = QueryParams::parse("state=from-query&code=c1");
        let hash = QueryParams::parse("state=from-hash&access_token=t");
        query.merge(hash);

        assert_eq!(query.get("state"), Some("from-hash"));
        assert_eq!(query.get("code"), Some("c1"));
        assert_eq!(query.get("access_token"), Some("t"));
    }

    #[test]
    fn test_get_non_empty() {
        let params = QueryParams::parse("a=&b=1");
        assert_eq!(params.get_non_empty("a"), None);
        assert_eq!(params.get_non_empty("b"), Some("1"));
        assert_eq!(params.get_non_empty("c"), None);
    }

    #[test]
    fn test_append_to() {
        let params: QueryParams = [("grant_type", "authorization_code")].into_iter().collect();
        assert_eq!(
            params.append_to("https://example.com/token"),
            "https://example.com/token?grant_type=authorization_code"
        );
        assert_eq!(
            params.append_to("https://example.com/token?v=2"),
            "https://example.com/token?v=2&grant_type=authorization_code"
        );
        assert_eq!(
            QueryParams::new().append_to("https://example.com"),
            "https://example.com"
        );
    }
}
