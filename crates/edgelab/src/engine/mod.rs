//! Response Behavior Engine.
//!
//! Given an [`Endpoint`] and a [`RequestContext`], produce the exact status,
//! headers and body the simulated surface promises, as a function of the
//! request and the process-wide [`Posture`].
//!
//! # Module Structure
//!
//! - `escape` - fixed five-character HTML escaper
//! - `identity` - cookie parsing and identity resolution chain
//! - `conditional` - content etags and `If-None-Match` evaluation
//! - `posture` - posture flag, reflection and authorization decisions
//! - `directive` - per-intent cache directive policy table
//! - `delay` - clamped simulated latency
//! - `assets` - static asset sources
//! - `context` / `outcome` - request input and response output values

pub mod assets;
pub mod conditional;
pub mod context;
pub mod delay;
pub mod directive;
pub mod escape;
pub mod headers;
pub mod identity;
pub mod intent;
pub mod outcome;
pub mod posture;

use std::sync::Arc;

use hyper::header::{HeaderValue, CONTENT_TYPE, LOCATION, SET_COOKIE};
use hyper::StatusCode;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::error::RequestError;
use crate::metrics;
use assets::{AssetSource, ASSETS_DIR, GALLERY_FILE};
use context::RequestContext;
use delay::SimulatedDelay;
use directive::CacheDirective;
use headers::{HeaderMapExt, X_EDGELAB_DELAY_MS, X_EDGELAB_INTENT, X_EDGELAB_POSTURE};
use identity::{resolve_identity, IDENTITY_COOKIE};
use intent::{Endpoint, RouteIntent};
use outcome::{OutcomeBuilder, ResponseOutcome};
use posture::{authorize, reflect, Access, Posture};

pub const DEFAULT_CURRENCY: &str = "ZAR";
pub const DEFAULT_AMOUNT: f64 = 100.0;

/// Conversion rate from the base currency; anything unlisted converts 1:1.
pub fn rate_for(currency: &str) -> f64 {
    match currency {
        "USD" => 0.055,
        "EUR" => 0.05,
        _ => 1.0,
    }
}

/// Two-decimal rendering of the exact value of `amount * rate`.
///
/// Only a product lying exactly between two cents is a tie; ties round away
/// from zero.
pub fn converted_example(amount: f64, rate: f64) -> String {
    let product = amount * rate;
    let shown = if is_cent_tie(product) {
        // one ulp further from zero
        f64::from_bits(product.to_bits() + 1)
    } else {
        product
    };
    format!("{shown:.2}")
}

// An f64 sits exactly halfway between two cents only when it is an odd
// multiple of 1/8.
fn is_cent_tie(value: f64) -> bool {
    let eighths = value * 8.0;
    eighths.is_finite() && eighths.fract() == 0.0 && eighths % 2.0 != 0.0
}

/// Whole values serialize without a fractional part (`100`, not `100.0`).
fn json_number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

pub fn parse_amount(raw: Option<&str>) -> Result<f64, RequestError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_AMOUNT);
    };
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RequestError::invalid_input("amount", raw))
}

/// Greeting for the primary tag of an `Accept-Language` value.
///
/// The primary tag is everything before the first `,` or `;`; only its
/// language subtag is consulted, so `fr-CA` greets in French.
pub fn greeting_for(accept_language: Option<&str>) -> (String, &'static str) {
    let primary = accept_language
        .and_then(|v| v.split([',', ';']).next())
        .map(|tag| tag.trim().to_ascii_lowercase())
        .unwrap_or_default();
    let language = primary.split('-').next().unwrap_or_default();
    let greeting = match language {
        "fr" => "Bonjour",
        "es" => "Hola",
        _ => "Hello",
    };
    (primary, greeting)
}

/// Immutable settings injected at construction.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub posture: Posture,
    pub admin_token: String,
    pub app_version: String,
    pub default_user: String,
}

pub struct ResponseEngine {
    settings: EngineSettings,
    assets: Arc<dyn AssetSource>,
}

impl ResponseEngine {
    pub fn new(settings: EngineSettings, assets: Arc<dyn AssetSource>) -> Self {
        Self { settings, assets }
    }

    pub fn posture(&self) -> Posture {
        self.settings.posture
    }

    pub async fn respond(&self, endpoint: &Endpoint, ctx: &RequestContext) -> ResponseOutcome {
        let mut outcome = match endpoint {
            Endpoint::Search => self.search(ctx),
            Endpoint::Login => login(),
            Endpoint::ApiData => api_data(),
            Endpoint::Admin => self.admin(ctx),
            Endpoint::Echo => echo(ctx),
            Endpoint::Version => self.version(ctx),
            Endpoint::Page => self.page(ctx),
            Endpoint::Product => product(ctx),
            Endpoint::Profile => self.profile(ctx),
            Endpoint::SetUser => self.set_user(ctx),
            Endpoint::Slow => slow(ctx).await,
            Endpoint::Welcome => welcome(ctx),
            Endpoint::Gallery => self.asset(GALLERY_FILE).await,
            Endpoint::Asset(path) => self.asset(&format!("{ASSETS_DIR}/{path}")).await,
            Endpoint::NotFound => RequestError::not_found(&ctx.path).into_outcome(),
        };

        outcome
            .headers
            .set_header_value(&X_EDGELAB_POSTURE, self.settings.posture.as_str());
        if let Some(intent) = endpoint.intent() {
            outcome
                .headers
                .set_header_value(&X_EDGELAB_INTENT, intent.as_str());
        }
        outcome
    }

    fn search(&self, ctx: &RequestContext) -> ResponseOutcome {
        let fragment = reflect(self.settings.posture, ctx.query.single("q"));
        let page = format!(
            "<!doctype html><html><head><meta charset=\"utf-8\"><title>Search</title></head>\
             <body><h1>Search</h1>{fragment}</body></html>"
        );
        OutcomeBuilder::new(StatusCode::OK)
            .html(page)
            .directive(&CacheDirective::for_intent(RouteIntent::ReflectedInput))
            .build()
    }

    fn admin(&self, ctx: &RequestContext) -> ResponseOutcome {
        let access = authorize(self.settings.posture, ctx, &self.settings.admin_token);
        metrics::record_authorization(access.as_str());
        match access {
            Access::Granted => OutcomeBuilder::new(StatusCode::OK)
                .json(&json!({
                    "ok": true,
                    "message": "Welcome to the admin area",
                    "posture": self.settings.posture,
                }))
                .directive(&CacheDirective::for_intent(RouteIntent::GatedResource))
                .build(),
            Access::Denied | Access::Unchecked => {
                warn!("Admin access denied for {}", ctx.path);
                RequestError::Unauthorized.into_outcome()
            }
        }
    }

    fn version(&self, ctx: &RequestContext) -> ResponseOutcome {
        let builder = OutcomeBuilder::new(StatusCode::OK)
            .json(&json!({ "ok": true, "version": self.settings.app_version }));
        validated(builder, ctx)
    }

    fn page(&self, ctx: &RequestContext) -> ResponseOutcome {
        let now = chrono::Utc::now().to_rfc3339();
        let version = escape::escape(&self.settings.app_version);
        let page = format!(
            "<!doctype html><html><head><meta charset=\"utf-8\"><title>edgelab page</title></head>\
             <body><h1>Cacheable page</h1><p>Version: {version}</p>\
             <p>Rendered at: <time>{now}</time></p></body></html>"
        );
        validated(OutcomeBuilder::new(StatusCode::OK).html(page), ctx)
    }

    fn profile(&self, ctx: &RequestContext) -> ResponseOutcome {
        let user = resolve_identity(ctx, &self.settings.default_user);
        debug!("Resolved identity '{}'", user);
        OutcomeBuilder::new(StatusCode::OK)
            .json(&json!({
                "ok": true,
                "user": user,
                "message": format!("Hello, {user}"),
            }))
            .directive(&CacheDirective::for_intent(RouteIntent::PersonalizedNoCache))
            .build()
    }

    fn set_user(&self, ctx: &RequestContext) -> ResponseOutcome {
        let user = ctx
            .query
            .single("u")
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(self.settings.default_user.as_str());
        let cookie = format!(
            "{IDENTITY_COOKIE}={}; Path=/; SameSite=Lax",
            urlencoding::encode(user)
        );
        let mut builder = OutcomeBuilder::new(StatusCode::FOUND)
            .typed_header(&LOCATION, HeaderValue::from_static("/profile"))
            .directive(&CacheDirective::uncached());
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            builder = builder.typed_header(&SET_COOKIE, value);
        }
        builder.build()
    }

    async fn asset(&self, path: &str) -> ResponseOutcome {
        match self.assets.load(path).await {
            Some(asset) => {
                let mut builder = OutcomeBuilder::new(StatusCode::OK)
                    .body(asset.body)
                    .directive(&CacheDirective::for_intent(RouteIntent::StaticAsset));
                if let Ok(value) = HeaderValue::from_str(&asset.content_type) {
                    builder = builder.typed_header(&CONTENT_TYPE, value);
                }
                builder.build()
            }
            None => RequestError::not_found(path).into_outcome(),
        }
    }
}

/// Attach the public validator and answer 304 when the client already has it.
fn validated(builder: OutcomeBuilder, ctx: &RequestContext) -> ResponseOutcome {
    let result = conditional::evaluate(builder.payload(), ctx.if_none_match.as_deref());
    metrics::record_conditional(result.is_not_modified());
    let directive = CacheDirective::for_intent(RouteIntent::PublicCacheable).with_etag(result.etag);
    let builder = builder.directive(&directive);
    if result.status == StatusCode::NOT_MODIFIED {
        builder.not_modified().build()
    } else {
        builder.build()
    }
}

fn login() -> ResponseOutcome {
    OutcomeBuilder::new(StatusCode::UNAUTHORIZED)
        .json(&json!({ "ok": false, "message": "Invalid credentials" }))
        .directive(&CacheDirective::uncached())
        .build()
}

fn api_data() -> ResponseOutcome {
    OutcomeBuilder::new(StatusCode::OK)
        .json(&json!({
            "ok": true,
            "time": chrono::Utc::now().to_rfc3339(),
            "note": "Dynamic API data; this response must never be cached.",
        }))
        .directive(&CacheDirective::uncached())
        .build()
}

fn echo(ctx: &RequestContext) -> ResponseOutcome {
    let mut query = Map::new();
    for key in ctx.query.keys() {
        let value = match ctx.query.all(key).as_slice() {
            [single] => Value::String(single.to_string()),
            many => Value::Array(many.iter().map(|v| Value::String(v.to_string())).collect()),
        };
        query.insert(key.to_string(), value);
    }
    OutcomeBuilder::new(StatusCode::OK)
        .json(&json!({ "ok": true, "query": query }))
        .build()
}

fn product(ctx: &RequestContext) -> ResponseOutcome {
    let currency = ctx
        .query
        .single("currency")
        .map(|c| c.trim().to_ascii_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
    let amount = parse_amount(ctx.query.single("amount")).unwrap_or_else(|err| {
        debug!("{err}; using {DEFAULT_AMOUNT}");
        DEFAULT_AMOUNT
    });
    let rate = rate_for(&currency);

    OutcomeBuilder::new(StatusCode::OK)
        .json(&json!({
            "ok": true,
            "currency": currency,
            "amount": json_number(amount),
            "rate": json_number(rate),
            "convertedExample": converted_example(amount, rate),
        }))
        .directive(&CacheDirective::for_intent(RouteIntent::CacheableByKey))
        .build()
}

async fn slow(ctx: &RequestContext) -> ResponseOutcome {
    let delay = SimulatedDelay::from_query(ctx.query.single("ms"));
    debug!("Simulating {}ms of latency", delay.as_millis());
    delay.wait().await;
    metrics::record_simulated_delay(delay.as_millis());

    OutcomeBuilder::new(StatusCode::OK)
        .json(&json!({
            "ok": true,
            "waitedMs": delay.as_millis(),
            "note": "Response deliberately delayed",
        }))
        .directive(&CacheDirective::for_intent(RouteIntent::LatencySimulated))
        .header(X_EDGELAB_DELAY_MS.as_str(), &delay.as_millis().to_string())
        .build()
}

fn welcome(ctx: &RequestContext) -> ResponseOutcome {
    let (language, greeting) = greeting_for(ctx.accept_language.as_deref());
    let country = ctx
        .query
        .single("country")
        .map(|c| Value::String(c.trim().to_ascii_uppercase()))
        .unwrap_or(Value::Null);

    OutcomeBuilder::new(StatusCode::OK)
        .json(&json!({
            "ok": true,
            "greeting": greeting,
            "language": language,
            "country": country,
        }))
        .directive(&CacheDirective::for_intent(RouteIntent::LocalizedVary))
        .build()
}
