//! Failure injection tests for collaborator loading and upstream relays.

use axum::Router;
use reqwest::StatusCode;
use serde_json::Value;

use frontdoor::config::FallbackPolicy;
use frontdoor::routing::{Collaborators, LoadError, Service};

mod common;

fn chatbot_broken() -> Collaborators {
    common::named_collaborators().register(Service::Chatbot, || -> Result<Router, LoadError> {
        Err(LoadError::Failed("model weights not found".into()))
    })
}

#[tokio::test]
async fn test_one_broken_collaborator_stubs_all_groups() {
    let gw = common::spawn_gateway(common::test_config(), chatbot_broken()).await;
    let client = common::client();

    for service in Service::ALL {
        let res = client
            .get(gw.url(&format!("{}/anything", service.mount_path())))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE, "{service}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], service.unavailable_message());
        assert_eq!(body["service"], service.name());
    }

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_panicking_collaborator_is_contained() {
    let collaborators = common::named_collaborators().register(Service::Analytics, || -> Result<Router, LoadError> {
        panic!("warehouse connection refused")
    });
    let gw = common::spawn_gateway(common::test_config(), collaborators).await;

    let res = common::client().get(gw.url("/api/auth/me")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let info: Value = common::client().get(gw.url("/")).send().await.unwrap().json().await.unwrap();
    assert!(info["services"].as_object().unwrap().values().all(|v| v == "unavailable"));

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_per_service_policy_keeps_healthy_groups() {
    let mut config = common::test_config();
    config.routing.fallback = FallbackPolicy::PerService;
    let gw = common::spawn_gateway(config, chatbot_broken()).await;
    let client = common::client();

    let res = client.get(gw.url("/api/chatbot/ask")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let res = client.get(gw.url("/api/auth/login")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "auth");

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_health_and_404_survive_degraded_mode() {
    let gw = common::spawn_gateway(common::test_config(), Collaborators::new()).await;
    let client = common::client();

    let res = client.get(gw.url("/api/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

    let res = client.get(gw.url("/api/does-not-exist")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["path"], "/api/does-not-exist");
    assert_eq!(
        body["availableEndpoints"],
        serde_json::json!([
            "/",
            "/api/health",
            "/api/auth",
            "/api/sales",
            "/api/analytics",
            "/api/upload",
            "/api/chatbot"
        ])
    );

    gw.shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_yields_502() {
    let dead = common::closed_port().await;
    let mut config = common::test_config();
    config.routing.fallback = FallbackPolicy::PerService;
    config.services.insert(
        Service::Sales,
        frontdoor::config::UpstreamConfig {
            upstream: format!("http://{dead}"),
        },
    );
    let collaborators = Collaborators::from_upstreams(&config.services);
    let gw = common::spawn_gateway(config, collaborators).await;

    let res = common::client().get(gw.url("/api/sales/report")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Upstream request failed");
    assert_eq!(body["service"], "sales");

    gw.shutdown.trigger();
}
