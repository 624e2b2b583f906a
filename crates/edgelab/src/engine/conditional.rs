//! Content fingerprints and `If-None-Match` evaluation.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hyper::StatusCode;
use sha2::{Digest, Sha256};

/// Result of evaluating a conditional request against a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conditional {
    pub status: StatusCode,
    pub etag: String,
}

impl Conditional {
    pub fn is_not_modified(&self) -> bool {
        self.status == StatusCode::NOT_MODIFIED
    }
}

/// Quoted SHA-256 validator for `body`.
pub fn etag(body: &[u8]) -> String {
    let digest = Sha256::digest(body);
    format!("\"{}\"", STANDARD.encode(digest))
}

/// 304 when `if_none_match` is byte-identical to the body's etag, else 200.
///
/// Weak validators, validator lists and `*` are not recognised.
pub fn evaluate(body: &[u8], if_none_match: Option<&str>) -> Conditional {
    let etag = etag(body);
    let status = match if_none_match {
        Some(candidate) if candidate == etag => StatusCode::NOT_MODIFIED,
        _ => StatusCode::OK,
    };
    Conditional { status, etag }
}
