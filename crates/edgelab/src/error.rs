//! Request-level error taxonomy.
//!
//! None of these escape the engine: `InvalidInput` is replaced by a default at
//! the point of parsing, the other two become well-formed JSON responses.

use hyper::StatusCode;
use serde_json::json;

use crate::engine::directive::CacheDirective;
use crate::engine::outcome::{OutcomeBuilder, ResponseOutcome};

pub const UNAUTHORIZED_MESSAGE: &str =
    "Unauthorized. Supply the admin token via ?token=<token> or the x-admin-token header.";
pub const NOT_FOUND_MESSAGE: &str = "Not found";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("invalid value '{value}' for query parameter '{param}'")]
    InvalidInput { param: &'static str, value: String },
    #[error("admin token missing or incorrect")]
    Unauthorized,
    #[error("no route for {path}")]
    NotFound { path: String },
}

impl RequestError {
    pub fn invalid_input(param: &'static str, value: impl Into<String>) -> Self {
        RequestError::InvalidInput {
            param,
            value: value.into(),
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        RequestError::NotFound { path: path.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            RequestError::Unauthorized => StatusCode::UNAUTHORIZED,
            RequestError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    /// User-facing remediation text.
    pub fn message(&self) -> String {
        match self {
            RequestError::InvalidInput { param, .. } => {
                format!("Query parameter '{param}' must be a number.")
            }
            RequestError::Unauthorized => UNAUTHORIZED_MESSAGE.to_string(),
            RequestError::NotFound { .. } => NOT_FOUND_MESSAGE.to_string(),
        }
    }

    pub fn into_outcome(self) -> ResponseOutcome {
        let builder = OutcomeBuilder::new(self.status())
            .json(&json!({ "ok": false, "message": self.message() }));
        match self {
            // Denials must not be cached by anything in front of us
            RequestError::Unauthorized | RequestError::InvalidInput { .. } => {
                builder.directive(&CacheDirective::uncached()).build()
            }
            RequestError::NotFound { .. } => builder.build(),
        }
    }
}
