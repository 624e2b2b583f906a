//! Identity resolution for personalized responses.
//!
//! Priority: `X-Demo-User` header, then the `demo_user` cookie, then the
//! configured default. Blank candidates (after trimming) fall through.

use super::context::RequestContext;

pub const IDENTITY_COOKIE: &str = "demo_user";

/// Best-effort `Cookie` header parse.
///
/// Segments are split on `;` and then on the first `=`. Keys and values are
/// trimmed, values percent-decoded (kept raw if decoding fails). Segments
/// without `=` or with an empty key are skipped. The first occurrence of a
/// name wins.
pub fn parse_cookies(raw: &str) -> Vec<(String, String)> {
    let mut cookies: Vec<(String, String)> = Vec::new();
    for segment in raw.split(';') {
        let Some((key, value)) = segment.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() || cookies.iter().any(|(k, _)| k == key) {
            continue;
        }
        let value = value.trim();
        let decoded = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.to_string());
        cookies.push((key.to_string(), decoded));
    }
    cookies
}

pub fn cookie_value(raw: &str, name: &str) -> Option<String> {
    parse_cookies(raw)
        .into_iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v)
}

pub fn resolve_identity(ctx: &RequestContext, default_user: &str) -> String {
    if let Some(user) = ctx.demo_user.as_deref().map(str::trim) {
        if !user.is_empty() {
            return user.to_string();
        }
    }

    if let Some(user) = ctx
        .cookie
        .as_deref()
        .and_then(|raw| cookie_value(raw, IDENTITY_COOKIE))
    {
        let user = user.trim();
        if !user.is_empty() {
            return user.to_string();
        }
    }

    default_user.to_string()
}
