//! Route dispatch for the simulated surface.

use hyper::Method;

use crate::engine::intent::Endpoint;

/// Map a method and path onto an [`Endpoint`].
///
/// HEAD is routed like GET. A known path with the wrong method is
/// [`Endpoint::NotFound`], as is any asset path that could escape `assets/`.
pub fn route(method: &Method, path: &str) -> Endpoint {
    let method = if method == Method::HEAD {
        Method::GET
    } else {
        method.clone()
    };

    match (&method, path) {
        (&Method::GET, "/search") => Endpoint::Search,
        (&Method::POST, "/login") => Endpoint::Login,
        (&Method::GET, "/api/data") => Endpoint::ApiData,
        (&Method::GET, "/admin") => Endpoint::Admin,
        (&Method::GET, "/echo") => Endpoint::Echo,
        (&Method::GET, "/version") => Endpoint::Version,
        (&Method::GET, "/page") => Endpoint::Page,
        (&Method::GET, "/product") => Endpoint::Product,
        (&Method::GET, "/profile") => Endpoint::Profile,
        (&Method::GET, "/set-user") => Endpoint::SetUser,
        (&Method::GET, "/slow") => Endpoint::Slow,
        (&Method::GET, "/welcome") => Endpoint::Welcome,
        (&Method::GET, "/gallery") => Endpoint::Gallery,
        (&Method::GET, _) => match path.strip_prefix("/assets/") {
            Some(rest) => asset_path(rest)
                .map(Endpoint::Asset)
                .unwrap_or(Endpoint::NotFound),
            None => Endpoint::NotFound,
        },
        _ => Endpoint::NotFound,
    }
}

/// Percent-decode an asset path and reject anything that is not a plain
/// relative path of named segments.
fn asset_path(raw: &str) -> Option<String> {
    let decoded = urlencoding::decode(raw).ok()?;
    if decoded.is_empty() || decoded.contains('\\') || decoded.contains('\0') {
        return None;
    }
    let clean = decoded
        .split('/')
        .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    clean.then(|| decoded.into_owned())
}
