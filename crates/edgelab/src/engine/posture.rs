//! Process-wide posture and the two decisions that consult it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::context::RequestContext;
use super::escape::escape;

/// Whether the simulator behaves unsafely (for demonstration) or safely.
///
/// Fixed for the lifetime of the process; changing it requires a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Posture {
    Vulnerable,
    #[default]
    Safe,
}

impl Posture {
    pub fn is_vulnerable(self) -> bool {
        self == Posture::Vulnerable
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Posture::Vulnerable => "vulnerable",
            Posture::Safe => "safe",
        }
    }
}

impl fmt::Display for Posture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown posture '{0}', expected 'vulnerable' or 'safe'")]
pub struct ParsePostureError(pub String);

impl FromStr for Posture {
    type Err = ParsePostureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vulnerable" => Ok(Posture::Vulnerable),
            "safe" => Ok(Posture::Safe),
            _ => Err(ParsePostureError(s.to_string())),
        }
    }
}

pub const EMPTY_SEARCH_PLACEHOLDER: &str = "Type something into ?q= to search.";

/// HTML fragment reflecting the search term.
///
/// Vulnerable embeds `input` verbatim, safe escapes it first. Absent or empty
/// input yields the placeholder in either posture.
pub fn reflect(posture: Posture, input: Option<&str>) -> String {
    match input {
        None | Some("") => format!("<p class=\"empty\">{EMPTY_SEARCH_PLACEHOLDER}</p>"),
        Some(term) => {
            let shown = if posture.is_vulnerable() {
                term.to_string()
            } else {
                escape(term)
            };
            format!("<p>Results for: {shown}</p>")
        }
    }
}

/// Authorization state for a gated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Unchecked,
    Granted,
    Denied,
}

impl Access {
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Unchecked => "unchecked",
            Access::Granted => "granted",
            Access::Denied => "denied",
        }
    }
}

/// The token a gated request presents: query `token` first, then `x-admin-token`.
pub fn presented_token(ctx: &RequestContext) -> Option<&str> {
    ctx.query
        .single("token")
        .or(ctx.admin_token.as_deref())
}

impl Access {
    /// Granted and Denied are terminal; Unchecked resolves in one step.
    pub fn transition(self, posture: Posture, presented: Option<&str>, secret: &str) -> Access {
        match self {
            Access::Unchecked if posture.is_vulnerable() => Access::Granted,
            Access::Unchecked => match presented {
                Some(token) if token == secret => Access::Granted,
                _ => Access::Denied,
            },
            terminal => terminal,
        }
    }
}

pub fn authorize(posture: Posture, ctx: &RequestContext, secret: &str) -> Access {
    Access::Unchecked.transition(posture, presented_token(ctx), secret)
}
