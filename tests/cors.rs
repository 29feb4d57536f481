//! Origin gate behaviour against a running gateway.

use reqwest::{Method, StatusCode};
use serde_json::Value;

mod common;

use common::APP_ORIGIN;
use frontdoor::config::OriginMatch;

#[tokio::test]
async fn test_allowed_origin_gets_cors_grant() {
    let gw = common::spawn_gateway(common::test_config(), common::named_collaborators()).await;

    for origin in [APP_ORIGIN, "https://app.example.com/", "null"] {
        let res = common::client()
            .get(gw.url("/api/sales/orders"))
            .header("Origin", origin)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let h = res.headers();
        assert_eq!(h["access-control-allow-origin"], origin);
        assert_eq!(h["access-control-allow-credentials"], "true");
        assert_eq!(h["access-control-allow-methods"], "GET, POST, PUT, DELETE, OPTIONS");
        assert_eq!(
            h["access-control-allow-headers"],
            "Origin, X-Requested-With, Content-Type, Accept, Authorization"
        );
        assert_eq!(res.text().await.unwrap(), "sales");
    }

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_unlisted_origin_is_denied_with_allow_list() {
    let gw = common::spawn_gateway(common::test_config(), common::named_collaborators()).await;

    let res = common::client()
        .post(gw.url("/api/auth/login"))
        .header("Origin", "https://phish.example.net")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert!(res.headers().get("access-control-allow-origin").is_none());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "CORS policy violation");
    assert_eq!(body["origin"], "https://phish.example.net");
    assert_eq!(body["allowedOrigins"], serde_json::json!([APP_ORIGIN, "null"]));

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_missing_origin_is_always_allowed() {
    let mut config = common::test_config();
    config.cors.allowed_origins = vec!["https://only.example.com".to_string()];
    let gw = common::spawn_gateway(config, common::named_collaborators()).await;

    let res = common::client().get(gw.url("/api/chatbot/ask")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert_eq!(res.text().await.unwrap(), "chatbot");

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_preflight_never_reaches_collaborators() {
    use frontdoor::routing::{Collaborators, LoadError, Service};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let hits = Arc::new(AtomicUsize::new(0));
    let collaborators = Service::ALL.iter().fold(Collaborators::new(), |c, &service| {
        let hits = hits.clone();
        c.register(service, move || -> Result<axum::Router, LoadError> {
            let hits = hits.clone();
            Ok(axum::Router::new().fallback(move || {
                let hits = hits.clone();
                async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    "reached"
                }
            }))
        })
    });
    let gw = common::spawn_gateway(common::test_config(), collaborators).await;

    for path in ["/api/upload/files", "/api/does-not-exist", "/"] {
        let res = common::client()
            .request(Method::OPTIONS, gw.url(path))
            .header("Origin", APP_ORIGIN)
            .header("Access-Control-Request-Method", "PUT")
            .send()
            .await
            .unwrap();

        assert!(res.status().is_success(), "{path}: {}", res.status());
        assert_eq!(
            res.headers()["access-control-allow-methods"],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(res.headers()["access-control-allow-origin"], APP_ORIGIN);
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_loopback_prefix_policy_accepts_any_dev_port() {
    let mut config = common::test_config();
    config.cors.allowed_origins = vec!["http://localhost".to_string()];
    config.cors.origin_match = OriginMatch::LoopbackPrefix;
    let gw = common::spawn_gateway(config, common::named_collaborators()).await;

    let client = common::client();
    let ok = client
        .get(gw.url("/api/health"))
        .header("Origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
    let body: Value = ok.json().await.unwrap();
    assert_eq!(body["origin"], "http://localhost:5173");

    let denied = client
        .get(gw.url("/api/health"))
        .header("Origin", "http://localhost.evil.test")
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    gw.shutdown.trigger();
}
