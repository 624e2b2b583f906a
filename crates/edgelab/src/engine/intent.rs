//! Route intents and the endpoints of the simulated surface.

use std::fmt;

/// Caching/security behavior category of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteIntent {
    PublicCacheable,
    CacheableByKey,
    PersonalizedNoCache,
    LocalizedVary,
    LatencySimulated,
    ReflectedInput,
    GatedResource,
    StaticAsset,
}

impl RouteIntent {
    pub const ALL: [RouteIntent; 8] = [
        RouteIntent::PublicCacheable,
        RouteIntent::CacheableByKey,
        RouteIntent::PersonalizedNoCache,
        RouteIntent::LocalizedVary,
        RouteIntent::LatencySimulated,
        RouteIntent::ReflectedInput,
        RouteIntent::GatedResource,
        RouteIntent::StaticAsset,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RouteIntent::PublicCacheable => "public-cacheable",
            RouteIntent::CacheableByKey => "cacheable-by-key",
            RouteIntent::PersonalizedNoCache => "personalized-no-cache",
            RouteIntent::LocalizedVary => "localized-vary",
            RouteIntent::LatencySimulated => "latency-simulated",
            RouteIntent::ReflectedInput => "reflected-input",
            RouteIntent::GatedResource => "gated-resource",
            RouteIntent::StaticAsset => "static-asset",
        }
    }
}

impl fmt::Display for RouteIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Search,
    Login,
    ApiData,
    Admin,
    Echo,
    Version,
    Page,
    Product,
    Profile,
    SetUser,
    Slow,
    Welcome,
    Gallery,
    /// File below `assets/`, relative and already checked for traversal.
    Asset(String),
    NotFound,
}

impl Endpoint {
    /// Intent backing this endpoint; fixed endpoints have none.
    pub fn intent(&self) -> Option<RouteIntent> {
        match self {
            Endpoint::Search => Some(RouteIntent::ReflectedInput),
            Endpoint::Admin => Some(RouteIntent::GatedResource),
            Endpoint::Version | Endpoint::Page => Some(RouteIntent::PublicCacheable),
            Endpoint::Product => Some(RouteIntent::CacheableByKey),
            Endpoint::Profile => Some(RouteIntent::PersonalizedNoCache),
            Endpoint::Slow => Some(RouteIntent::LatencySimulated),
            Endpoint::Welcome => Some(RouteIntent::LocalizedVary),
            Endpoint::Gallery | Endpoint::Asset(_) => Some(RouteIntent::StaticAsset),
            Endpoint::Login
            | Endpoint::ApiData
            | Endpoint::Echo
            | Endpoint::SetUser
            | Endpoint::NotFound => None,
        }
    }

    /// Low-cardinality label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::Search => "search",
            Endpoint::Login => "login",
            Endpoint::ApiData => "api_data",
            Endpoint::Admin => "admin",
            Endpoint::Echo => "echo",
            Endpoint::Version => "version",
            Endpoint::Page => "page",
            Endpoint::Product => "product",
            Endpoint::Profile => "profile",
            Endpoint::SetUser => "set_user",
            Endpoint::Slow => "slow",
            Endpoint::Welcome => "welcome",
            Endpoint::Gallery => "gallery",
            Endpoint::Asset(_) => "asset",
            Endpoint::NotFound => "not_found",
        }
    }
}
