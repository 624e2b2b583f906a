//! Final `(status, headers, body)` produced by the engine.

use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;

use super::directive::CacheDirective;
use super::headers::{CONTENT_TYPE_HTML, CONTENT_TYPE_JSON};

#[derive(Debug, Clone)]
pub struct ResponseOutcome {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl ResponseOutcome {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

pub struct OutcomeBuilder {
    status: StatusCode,
    body: Bytes,
    headers: HeaderMap,
}

impl OutcomeBuilder {
    pub fn new(status: StatusCode) -> Self {
        OutcomeBuilder {
            status,
            body: Bytes::new(),
            headers: HeaderMap::new(),
        }
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.headers.insert(CONTENT_TYPE, CONTENT_TYPE_HTML.clone());
        self.body = Bytes::from(body.into());
        self
    }

    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.headers.insert(CONTENT_TYPE, CONTENT_TYPE_JSON.clone());
        self.body = serde_json::to_vec(value)
            .map(Bytes::from)
            .unwrap_or_else(|_| Bytes::from_static(b"{}"));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn typed_header(mut self, name: &HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name.clone(), value);
        self
    }

    pub fn directive(mut self, directive: &CacheDirective) -> Self {
        directive.apply(&mut self.headers);
        self
    }

    /// Payload bytes set so far; the engine fingerprints these for validators.
    pub fn payload(&self) -> &Bytes {
        &self.body
    }

    /// Drop the body but keep headers, as a 304 requires.
    pub fn not_modified(mut self) -> Self {
        self.status = StatusCode::NOT_MODIFIED;
        self.body = Bytes::new();
        self
    }

    pub fn build(self) -> ResponseOutcome {
        ResponseOutcome {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}
