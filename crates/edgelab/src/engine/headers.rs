//! Static header names and values used by the simulator.
//!
//! Request headers the engine reads, diagnostic headers it emits, and a small
//! extension trait for inserting them into a `HeaderMap`.

use hyper::header::{HeaderMap, HeaderName, HeaderValue};

// Request headers consulted by the engine
pub static X_DEMO_USER: HeaderName = HeaderName::from_static("x-demo-user");
pub static X_ADMIN_TOKEN: HeaderName = HeaderName::from_static("x-admin-token");

// Diagnostic headers on every simulated response
pub static X_EDGELAB_POSTURE: HeaderName = HeaderName::from_static("x-edgelab-posture");
pub static X_EDGELAB_INTENT: HeaderName = HeaderName::from_static("x-edgelab-intent");
pub static X_EDGELAB_DELAY_MS: HeaderName = HeaderName::from_static("x-edgelab-delay-ms");

pub static CONTENT_TYPE_JSON: HeaderValue =
    HeaderValue::from_static("application/json; charset=utf-8");
pub static CONTENT_TYPE_HTML: HeaderValue = HeaderValue::from_static("text/html; charset=utf-8");

/// Extension trait for inserting headers into a [`HeaderMap`].
pub trait HeaderMapExt {
    /// Insert a header with a static name and dynamic string value.
    /// Returns false if the value couldn't be converted to a valid header value.
    fn set_header_value(&mut self, name: &HeaderName, value: &str) -> bool;
}

impl HeaderMapExt for HeaderMap {
    fn set_header_value(&mut self, name: &HeaderName, value: &str) -> bool {
        match HeaderValue::from_str(value) {
            Ok(header_value) => {
                self.insert(name.clone(), header_value);
                true
            }
            Err(_) => false,
        }
    }
}
