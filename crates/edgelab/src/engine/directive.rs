//! Cache directive policy per route intent.
//!
//! The table is static data. The engine looks an intent up, fills in the
//! etag where the policy asks for a validator, and renders the result into
//! `Cache-Control`, `Vary` and `ETag` headers.

use hyper::header::{HeaderMap, HeaderValue, CACHE_CONTROL, ETAG, VARY};

use super::headers::HeaderMapExt;
use super::intent::RouteIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

/// Static template for an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectivePolicy {
    /// `None` means explicitly uncached: rendered as a bare `no-store`.
    pub visibility: Option<Visibility>,
    pub max_age_secs: u32,
    pub no_store: bool,
    pub immutable: bool,
    pub vary: &'static [&'static str],
    pub validator: bool,
}

const UNCACHED: DirectivePolicy = DirectivePolicy {
    visibility: None,
    max_age_secs: 0,
    no_store: true,
    immutable: false,
    vary: &[],
    validator: false,
};

const fn public(max_age_secs: u32) -> DirectivePolicy {
    DirectivePolicy {
        visibility: Some(Visibility::Public),
        max_age_secs,
        no_store: false,
        immutable: false,
        vary: &[],
        validator: false,
    }
}

pub const fn policy_for(intent: RouteIntent) -> DirectivePolicy {
    match intent {
        RouteIntent::PublicCacheable => DirectivePolicy {
            validator: true,
            ..public(60)
        },
        RouteIntent::CacheableByKey => public(120),
        RouteIntent::PersonalizedNoCache => DirectivePolicy {
            visibility: Some(Visibility::Private),
            max_age_secs: 0,
            no_store: true,
            immutable: false,
            vary: &["Cookie", "X-Demo-User"],
            validator: false,
        },
        RouteIntent::LocalizedVary => DirectivePolicy {
            vary: &["Accept-Language"],
            ..public(120)
        },
        RouteIntent::LatencySimulated => public(60),
        RouteIntent::ReflectedInput => UNCACHED,
        RouteIntent::GatedResource => UNCACHED,
        RouteIntent::StaticAsset => DirectivePolicy {
            immutable: true,
            ..public(86_400)
        },
    }
}

/// Concrete directive attached to one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDirective {
    pub visibility: Option<Visibility>,
    pub max_age_secs: u32,
    pub no_store: bool,
    pub immutable: bool,
    pub vary: Vec<&'static str>,
    pub etag: Option<String>,
}

impl CacheDirective {
    pub fn for_intent(intent: RouteIntent) -> Self {
        Self::from(policy_for(intent))
    }

    /// Directive for fixed endpoints that must never be stored.
    pub fn uncached() -> Self {
        Self::from(UNCACHED)
    }

    pub fn with_etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn cache_control(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if let Some(visibility) = self.visibility {
            parts.push(visibility.as_str().to_string());
        }
        if self.no_store {
            parts.push("no-store".to_string());
        }
        if self.visibility.is_some() {
            parts.push(format!("max-age={}", self.max_age_secs));
        }
        if self.immutable {
            parts.push("immutable".to_string());
        }
        parts.join(", ")
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.set_header_value(&CACHE_CONTROL, &self.cache_control());
        if !self.vary.is_empty() {
            headers.set_header_value(&VARY, &self.vary.join(", "));
        }
        if let Some(etag) = &self.etag {
            if let Ok(value) = HeaderValue::from_str(etag) {
                headers.insert(ETAG, value);
            }
        }
    }
}

impl From<DirectivePolicy> for CacheDirective {
    fn from(policy: DirectivePolicy) -> Self {
        Self {
            visibility: policy.visibility,
            max_age_secs: policy.max_age_secs,
            no_store: policy.no_store,
            immutable: policy.immutable,
            vary: policy.vary.to_vec(),
            etag: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table_cache_control() {
        let expected = [
            (RouteIntent::PublicCacheable, "public, max-age=60"),
            (RouteIntent::CacheableByKey, "public, max-age=120"),
            (RouteIntent::PersonalizedNoCache, "private, no-store, max-age=0"),
            (RouteIntent::LocalizedVary, "public, max-age=120"),
            (RouteIntent::LatencySimulated, "public, max-age=60"),
            (RouteIntent::ReflectedInput, "no-store"),
            (RouteIntent::GatedResource, "no-store"),
            (RouteIntent::StaticAsset, "public, max-age=86400, immutable"),
        ];
        for (intent, header) in expected {
            assert_eq!(CacheDirective::for_intent(intent).cache_control(), header, "{intent}");
        }
    }

    #[test]
    fn test_only_public_cacheable_uses_validator() {
        for intent in RouteIntent::ALL {
            assert_eq!(
                policy_for(intent).validator,
                intent == RouteIntent::PublicCacheable
            );
        }
    }

    #[test]
    fn test_personalized_is_never_public_and_never_stored() {
        let policy = policy_for(RouteIntent::PersonalizedNoCache);
        assert!(policy.no_store);
        assert_ne!(policy.visibility, Some(Visibility::Public));
        assert_eq!(policy.vary, &["Cookie", "X-Demo-User"]);
    }

    #[test]
    fn test_apply_writes_vary_and_etag() {
        let mut headers = HeaderMap::new();
        CacheDirective::for_intent(RouteIntent::LocalizedVary).apply(&mut headers);
        assert_eq!(headers.get(VARY).unwrap(), "Accept-Language");
        assert!(headers.get(ETAG).is_none());

        let mut headers = HeaderMap::new();
        CacheDirective::for_intent(RouteIntent::PublicCacheable)
            .with_etag("\"abc\"")
            .apply(&mut headers);
        assert_eq!(headers.get(ETAG).unwrap(), "\"abc\"");
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), "public, max-age=60");
    }

    #[test]
    fn test_personalized_vary_header() {
        let mut headers = HeaderMap::new();
        CacheDirective::for_intent(RouteIntent::PersonalizedNoCache).apply(&mut headers);
        assert_eq!(headers.get(VARY).unwrap(), "Cookie, X-Demo-User");
    }

    #[test]
    fn test_uncached_directive() {
        assert_eq!(CacheDirective::uncached().cache_control(), "no-store");
    }
}
