//! Request-level matching: the observed request and the rule evaluated on it.

use hyper::{HeaderMap, Method, Uri};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::matcher::{BodyMatcher, MatcherRegistry, MultiFieldMatcher, MultiMap, StringMatcher};
use crate::urlencoded;

/// Owned snapshot of the request parts a rule can inspect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestView {
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub query_params: MultiMap,
    #[serde(default)]
    pub headers: MultiMap,
    #[serde(default)]
    pub body: String,
}

impl RequestView {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Build a view from the parts handed over by a hyper service.
    ///
    /// Header names keep hyper's lowercase form. Values that are not visible
    /// ASCII, and the body, are decoded lossily.
    pub fn from_hyper(method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut header_map = MultiMap::new();
        for (name, value) in headers {
            let value = match value.to_str() {
                Ok(text) => text.to_string(),
                Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
            };
            header_map
                .entry(name.as_str().to_string())
                .or_default()
                .push(value);
        }

        Self {
            method: method.as_str().to_string(),
            path: uri.path().to_string(),
            query_params: uri.query().map(urlencoded::parse_query).unwrap_or_default(),
            headers: header_map,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

/// Conjunction of matchers over the parts of a request.
///
/// Absent parts are unconstrained; a matcher with every part absent matches
/// every request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RequestMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<StringMatcher>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<StringMatcher>,

    /// Query parameters, looked up by exact name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<MultiFieldMatcher>,

    /// Headers, looked up ignoring name case
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<MultiFieldMatcher>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyMatcher>,
}

impl RequestMatcher {
    pub fn matches(&self, request: &RequestView) -> bool {
        self.matches_in(MatcherRegistry::global(), request)
    }

    /// Check every populated part, stopping at the first one that fails.
    pub fn matches_in(&self, registry: &MatcherRegistry, request: &RequestView) -> bool {
        if let Some(method) = &self.method {
            if !method.matches_in(registry, &request.method) {
                trace!(expected = %method, actual = %request.method, "Method doesn't match");
                return false;
            }
        }

        if let Some(path) = &self.path {
            if !path.matches_in(registry, &request.path) {
                trace!(expected = %path, actual = %request.path, "Path doesn't match");
                return false;
            }
        }

        if let Some(query_params) = &self.query_params {
            if !query_params.matches_in(registry, &request.query_params) {
                trace!("Query parameters don't match");
                return false;
            }
        }

        if let Some(headers) = &self.headers {
            if !headers.matches_headers_in(registry, &request.headers) {
                trace!("Headers don't match");
                return false;
            }
        }

        if let Some(body) = &self.body {
            if !body.matches_in(registry, &request.headers, &request.body) {
                trace!("Body doesn't match");
                return false;
            }
        }

        true
    }
}
