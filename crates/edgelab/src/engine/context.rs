//! Immutable per-request input to the engine.

use hyper::header::{HeaderMap, ACCEPT_LANGUAGE, COOKIE, IF_NONE_MATCH};
use hyper::{Method, Request};

use super::headers::{X_ADMIN_TOKEN, X_DEMO_USER};

/// Query parameters in request order.
///
/// Keys and values are percent-decoded and `+` is read as a space. A key that
/// occurs more than once has no single string value: [`QueryParams::single`]
/// reports it as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: Option<&str>) -> Self {
        let mut pairs = Vec::new();
        if let Some(q) = query {
            for pair in q.split('&') {
                if pair.is_empty() {
                    continue;
                }
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                let key = decode_component(key);
                if key.is_empty() {
                    continue;
                }
                pairs.push((key, decode_component(value)));
            }
        }
        Self { pairs }
    }

    /// Value of `key` when it occurs exactly once.
    pub fn single(&self, key: &str) -> Option<&str> {
        let mut matches = self.pairs.iter().filter(|(k, _)| k == key);
        match (matches.next(), matches.next()) {
            (Some((_, value)), None) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Every value recorded for `key`, in order.
    pub fn all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Distinct keys in first-seen order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (k, _) in &self.pairs {
            if !keys.contains(&k.as_str()) {
                keys.push(k);
            }
        }
        keys
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Everything the engine may consult about a request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub method: Method,
    pub path: String,
    pub query: QueryParams,
    pub accept_language: Option<String>,
    pub if_none_match: Option<String>,
    pub demo_user: Option<String>,
    pub admin_token: Option<String>,
    pub cookie: Option<String>,
}

impl RequestContext {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let headers = req.headers();
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: QueryParams::parse(req.uri().query()),
            accept_language: header_text(headers, &ACCEPT_LANGUAGE),
            if_none_match: header_text(headers, &IF_NONE_MATCH),
            demo_user: header_text(headers, &X_DEMO_USER),
            admin_token: header_text(headers, &X_ADMIN_TOKEN),
            cookie: joined_cookie_header(headers),
        }
    }

    /// A bare GET context for `path`, mostly useful for building fixtures.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: QueryParams::default(),
            accept_language: None,
            if_none_match: None,
            demo_user: None,
            admin_token: None,
            cookie: None,
        }
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = QueryParams::parse(Some(query));
        self
    }

    pub fn with_accept_language(mut self, value: impl Into<String>) -> Self {
        self.accept_language = Some(value.into());
        self
    }

    pub fn with_if_none_match(mut self, value: impl Into<String>) -> Self {
        self.if_none_match = Some(value.into());
        self
    }

    pub fn with_demo_user(mut self, value: impl Into<String>) -> Self {
        self.demo_user = Some(value.into());
        self
    }

    pub fn with_admin_token(mut self, value: impl Into<String>) -> Self {
        self.admin_token = Some(value.into());
        self
    }

    pub fn with_cookie(mut self, value: impl Into<String>) -> Self {
        self.cookie = Some(value.into());
        self
    }
}

fn header_text(headers: &HeaderMap, name: &hyper::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// HTTP/2 clients may split cookies across several header lines.
fn joined_cookie_header(headers: &HeaderMap) -> Option<String> {
    let parts: Vec<&str> = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}
