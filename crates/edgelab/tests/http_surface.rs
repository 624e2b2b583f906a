//! Integration tests for the simulated HTTP surface.
//!
//! Each test binds a real listener on an ephemeral port and drives it with
//! reqwest, checking the status, headers and body an edge layer would see.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use edgelab::engine::assets::DirAssetSource;
use edgelab::engine::conditional;
use edgelab::engine::posture::Posture;
use edgelab::server::{create_listener, SimServer};
use edgelab::{EngineSettings, ResponseEngine};
use reqwest::{redirect, Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

const ADMIN_TOKEN: &str = "t0p-secret";

struct TestServer {
    addr: SocketAddr,
    _assets: TempDir,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn start_server(posture: Posture) -> TestServer {
    let assets = tempfile::tempdir().unwrap();
    std::fs::write(assets.path().join("gallery.html"), "<h1>Gallery</h1>").unwrap();
    std::fs::create_dir(assets.path().join("assets")).unwrap();
    std::fs::write(assets.path().join("assets/site.css"), "body { margin: 0 }").unwrap();

    let engine = ResponseEngine::new(
        EngineSettings {
            posture,
            admin_token: ADMIN_TOKEN.to_string(),
            app_version: "9.9.9".to_string(),
            default_user: "guest".to_string(),
        },
        Arc::new(DirAssetSource::new(assets.path())),
    );

    let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(SimServer::new(Arc::new(engine)).run(listener));

    TestServer {
        addr,
        _assets: assets,
    }
}

fn client() -> Client {
    Client::builder()
        .redirect(redirect::Policy::none())
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

fn header<'a>(response: &'a reqwest::Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

// =============================================================================
// Reflection and authorization
// =============================================================================

#[tokio::test]
async fn test_search_reflects_raw_when_vulnerable() {
    let server = start_server(Posture::Vulnerable).await;
    let response = client()
        .get(server.url("/search?q=%3Cscript%3Ealert(1)%3C%2Fscript%3E"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "cache-control"), Some("no-store"));
    assert_eq!(header(&response, "x-edgelab-posture"), Some("vulnerable"));
    let body = response.text().await.unwrap();
    assert!(body.contains("<script>alert(1)</script>"));
}

#[tokio::test]
async fn test_search_escapes_when_safe() {
    let server = start_server(Posture::Safe).await;
    let body = client()
        .get(server.url("/search?q=%3Cscript%3E"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("&lt;script&gt;"));
    assert!(!body.contains("<script>"));
}

#[tokio::test]
async fn test_admin_gate_in_safe_posture() {
    let server = start_server(Posture::Safe).await;
    let client = client();

    let denied = client.get(server.url("/admin")).send().await.unwrap();
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    let body: Value = denied.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert!(body["message"].as_str().unwrap().contains("x-admin-token"));

    let via_query = client
        .get(server.url(&format!("/admin?token={ADMIN_TOKEN}")))
        .send()
        .await
        .unwrap();
    assert_eq!(via_query.status(), StatusCode::OK);

    let via_header = client
        .get(server.url("/admin"))
        .header("x-admin-token", ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(via_header.status(), StatusCode::OK);

    let wrong = client
        .get(server.url("/admin?token=guess"))
        .header("x-admin-token", ADMIN_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_open_in_vulnerable_posture() {
    let server = start_server(Posture::Vulnerable).await;
    let response = client().get(server.url("/admin")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "x-edgelab-intent"), Some("gated-resource"));
}

// =============================================================================
// Cache directives
// =============================================================================

#[tokio::test]
async fn test_version_conditional_request() {
    let server = start_server(Posture::Safe).await;
    let client = client();

    let first = client.get(server.url("/version")).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(header(&first, "cache-control"), Some("public, max-age=60"));
    let etag = header(&first, "etag").unwrap().to_string();
    let body = first.bytes().await.unwrap();
    assert_eq!(etag, conditional::etag(&body));
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, json!({"ok": true, "version": "9.9.9"}));

    let second = client
        .get(server.url("/version"))
        .header("if-none-match", &etag)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(header(&second, "etag"), Some(etag.as_str()));
    assert!(second.bytes().await.unwrap().is_empty());

    let stale = client
        .get(server.url("/version"))
        .header("if-none-match", "\"stale\"")
        .send()
        .await
        .unwrap();
    assert_eq!(stale.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_product_is_keyed_by_query() {
    let server = start_server(Posture::Safe).await;
    let response = client()
        .get(server.url("/product?currency=USD&amount=100"))
        .send()
        .await
        .unwrap();
    assert_eq!(header(&response, "cache-control"), Some("public, max-age=120"));
    assert!(header(&response, "vary").is_none());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["convertedExample"], "5.50");

    let eur: Value = client()
        .get(server.url("/product?currency=eur&amount=100"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(eur["currency"], "EUR");
    assert_eq!(eur["convertedExample"], "5.00");
}

#[tokio::test]
async fn test_profile_identity_chain_and_directive() {
    let server = start_server(Posture::Vulnerable).await;
    let client = client();

    let by_header = client
        .get(server.url("/profile"))
        .header("x-demo-user", "alice")
        .header("cookie", "demo_user=bob")
        .send()
        .await
        .unwrap();
    assert_eq!(
        header(&by_header, "cache-control"),
        Some("private, no-store, max-age=0")
    );
    assert_eq!(header(&by_header, "vary"), Some("Cookie, X-Demo-User"));
    let body: Value = by_header.json().await.unwrap();
    assert_eq!(body["user"], "alice");

    let by_cookie: Value = client
        .get(server.url("/profile"))
        .header("cookie", "junk; demo_user=b%C3%B8b")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_cookie["user"], "bøb");

    let fallback: Value = client
        .get(server.url("/profile"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fallback["user"], "guest");
}

#[tokio::test]
async fn test_set_user_redirects_with_cookie() {
    let server = start_server(Posture::Safe).await;
    let response = client()
        .get(server.url("/set-user?u=dana"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(header(&response, "location"), Some("/profile"));
    assert!(header(&response, "set-cookie")
        .unwrap()
        .starts_with("demo_user=dana;"));
}

#[tokio::test]
async fn test_welcome_varies_on_accept_language() {
    let server = start_server(Posture::Safe).await;
    let client = client();

    for (language, greeting) in [("fr", "Bonjour"), ("es", "Hola"), ("de", "Hello")] {
        let response = client
            .get(server.url("/welcome?country=za"))
            .header("accept-language", language)
            .send()
            .await
            .unwrap();
        assert_eq!(header(&response, "vary"), Some("Accept-Language"));
        assert_eq!(header(&response, "cache-control"), Some("public, max-age=120"));
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["greeting"], greeting, "{language}");
        assert_eq!(body["country"], "ZA");
    }

    let absent: Value = client
        .get(server.url("/welcome"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(absent["greeting"], "Hello");
    assert_eq!(absent["country"], Value::Null);
}

#[tokio::test]
async fn test_static_assets() {
    let server = start_server(Posture::Safe).await;
    let client = client();

    let gallery = client.get(server.url("/gallery")).send().await.unwrap();
    assert_eq!(gallery.status(), StatusCode::OK);
    assert_eq!(
        header(&gallery, "cache-control"),
        Some("public, max-age=86400, immutable")
    );
    assert_eq!(header(&gallery, "content-type"), Some("text/html; charset=utf-8"));

    let css = client.get(server.url("/assets/site.css")).send().await.unwrap();
    assert_eq!(css.status(), StatusCode::OK);
    assert_eq!(css.text().await.unwrap(), "body { margin: 0 }");

    let missing = client.get(server.url("/assets/none.css")).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let traversal = client
        .get(server.url("/assets/%2e%2e/gallery.html"))
        .send()
        .await
        .unwrap();
    assert_eq!(traversal.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Fixed endpoints
// =============================================================================

#[tokio::test]
async fn test_fixed_endpoints() {
    let server = start_server(Posture::Safe).await;
    let client = client();

    let login = client
        .post(server.url("/login"))
        .body("user=admin&pass=admin")
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::UNAUTHORIZED);
    let body: Value = login.json().await.unwrap();
    assert_eq!(body, json!({"ok": false, "message": "Invalid credentials"}));

    let data = client.get(server.url("/api/data")).send().await.unwrap();
    assert_eq!(header(&data, "cache-control"), Some("no-store"));
    let body: Value = data.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert!(body["time"].is_string());

    let echo: Value = client
        .get(server.url("/echo?b=2&a=hello+world"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(echo, json!({"ok": true, "query": {"b": "2", "a": "hello world"}}));

    for path in ["/", "/nope", "/login"] {
        let response = client.get(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"ok": false, "message": "Not found"}));
    }
}

// =============================================================================
// Simulated latency
// =============================================================================

#[tokio::test]
async fn test_slow_clamps_and_falls_back() {
    let server = start_server(Posture::Safe).await;
    let client = client();

    let low = client.get(server.url("/slow?ms=-5")).send().await.unwrap();
    assert_eq!(header(&low, "x-edgelab-delay-ms"), Some("0"));
    let body: Value = low.json().await.unwrap();
    assert_eq!(body["waitedMs"], 0);

    let start = Instant::now();
    let small = client.get(server.url("/slow?ms=150")).send().await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(150));
    assert_eq!(header(&small, "cache-control"), Some("public, max-age=60"));
}

#[tokio::test]
async fn test_slow_requests_do_not_block_each_other() {
    let server = start_server(Posture::Safe).await;
    let client = client();

    let start = Instant::now();
    let slow = client.get(server.url("/slow?ms=800")).send();
    let fast = async {
        let response = client.get(server.url("/version")).send().await.unwrap();
        (response.status(), start.elapsed())
    };
    let (slow, (fast_status, fast_elapsed)) = tokio::join!(slow, fast);

    assert_eq!(fast_status, StatusCode::OK);
    assert!(fast_elapsed < Duration::from_millis(800));
    assert_eq!(slow.unwrap().status(), StatusCode::OK);
}
