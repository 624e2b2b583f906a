//! Fixed five-character HTML escaper.

/// Escape `&`, `<`, `>`, `"` and `'` in a single pass over the input.
///
/// Replacements are never re-scanned, so entities produced here are not
/// escaped again within the same call. Calling it twice is not idempotent:
/// the second pass escapes the ampersands introduced by the first.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
