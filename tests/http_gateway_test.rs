//! Integration tests for the HTTP backend gateway
//!
//! These tests run the reqwest client against a mockito server.
//!
//! Test coverage:
//! - Error message extraction from failure bodies
//! - Connectivity and decode failure classification
//! - Liveness probing through the health monitor
//! - A plan/creatives/regeneration round over HTTP

mod common;

use std::sync::Arc;

use adloop::domain::models::{BackendConfig, BackendMode, BackendHealth, LinkStatus, VisualAxis};
use adloop::domain::ports::{BackendGateway, GatewayError};
use adloop::infrastructure::backend::HttpBackendGateway;
use adloop::services::{HealthMonitor, PhaseController};
use mockito::{Matcher, Server};
use tokio::sync::watch;

use common::{creative_json, plan_json, stock_snapshot};

fn config_for(base_url: &str) -> BackendConfig {
    BackendConfig {
        base_url: base_url.to_string(),
        request_timeout_secs: 5,
        health_timeout_ms: 500,
        health_interval_secs: 30,
    }
}

fn gateway_for(server: &Server) -> HttpBackendGateway {
    HttpBackendGateway::new(&config_for(&server.url())).expect("Failed to create client")
}

#[tokio::test]
async fn test_detail_field_becomes_the_error_message() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/experiment-plan")
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Snapshot needs at least one product"}"#)
        .create_async()
        .await;

    let err = gateway_for(&server).create_plan(&stock_snapshot()).await.expect_err("422");

    mock.assert_async().await;
    assert_eq!(err, GatewayError::request(422, "Snapshot needs at least one product"));
    assert!(!err.is_connectivity());
}

#[tokio::test]
async fn test_short_text_body_is_shown_verbatim() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/score-creatives")
        .with_status(502)
        .with_body("Bad gateway")
        .create_async()
        .await;

    let err = gateway_for(&server).score_creatives(&[]).await.expect_err("502");
    assert_eq!(err.to_string(), "Bad gateway");
}

#[tokio::test]
async fn test_json_body_without_detail_is_generic() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/experiment-plan")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": "boom"}"#)
        .create_async()
        .await;

    let err = gateway_for(&server).create_plan(&stock_snapshot()).await.expect_err("500");
    assert_eq!(err.to_string(), "Request failed with status 500");
}

#[tokio::test]
async fn test_malformed_success_body_is_a_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/experiment-plan")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"experiment_id": 7}"#)
        .create_async()
        .await;

    let err = gateway_for(&server).create_plan(&stock_snapshot()).await.expect_err("decode");
    assert!(matches!(err, GatewayError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_backend_is_a_connectivity_error() {
    let gateway =
        HttpBackendGateway::new(&config_for("http://127.0.0.1:1")).expect("Failed to create client");

    let err = gateway.check_health().await.expect_err("nothing listens on port 1");
    assert!(err.is_connectivity(), "got {err:?}");
    assert!(err.to_string().contains("http://127.0.0.1:1"));
}

#[tokio::test]
async fn test_health_monitor_reports_live_mode() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status": "ok", "mode": "live"}"#)
        .create_async()
        .await;

    let (health, _) = watch::channel(BackendHealth::default());
    let monitor = HealthMonitor::from_config(
        Arc::new(gateway_for(&server)),
        Arc::new(health),
        &config_for(&server.url()),
    );

    let observed = monitor.probe_once().await;
    assert_eq!(observed, BackendHealth::online(BackendMode::Live));
    assert_eq!(monitor.current().status, LinkStatus::Online);
}

#[tokio::test]
async fn test_two_variant_round_with_prompted_regeneration() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/experiment-plan")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "guardrails": { "disclaimer": "Results may vary. Ages 7+." },
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(plan_json("exp_42", &["A", "B"]).to_string())
        .create_async()
        .await;
    server
        .mock("POST", "/creative-variants")
        .match_body(Matcher::PartialJson(serde_json::json!({ "experiment_id": "exp_42" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!([
                creative_json("A", "https://img.example/a1.png"),
                creative_json("B", "https://img.example/b1.png"),
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let mut regenerated = creative_json("A", "https://img.example/a2.png");
    regenerated["fibo_spec"]["lighting_style"] = "warm".into();
    regenerated["fibo_spec"]["color_palette"] = "warm_golden".into();
    let regen_mock = server
        .mock("POST", "/regenerate-image")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "variant": { "variant_id": "A" },
            "spec_patch": {
                "prompt": "Same framing, warmer lighting",
                "lighting_style": "warm",
                "color_palette": "warm_golden",
            },
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(regenerated.to_string())
        .create_async()
        .await;

    let mut controller = PhaseController::new(Arc::new(gateway_for(&server)));
    controller.create_plan(stock_snapshot()).await.expect("plan");
    assert_eq!(controller.plan().map(|p| p.variants.len()), Some(2));
    assert!((controller.results()[1].clicks - 350.0).abs() < f64::EPSILON);
    assert!((controller.results()[1].revenue - 1000.0).abs() < f64::EPSILON);

    controller.generate_creatives().await.expect("creatives");
    assert_eq!(controller.creatives().len(), 2);

    controller.set_prompt("A", "Same framing, warmer lighting").expect("prompt");
    controller.regenerate_image("A").await.expect("regenerated");
    regen_mock.assert_async().await;

    let a = controller.creative("A").expect("A exists");
    assert_eq!(a.image_url.as_deref(), Some("https://img.example/a2.png"));
    assert_eq!(a.fibo_spec.axis(VisualAxis::LightingStyle), Some("warm"));
    assert_eq!(a.fibo_spec.axis(VisualAxis::ColorPalette), Some("warm_golden"));
    assert_eq!(a.audit.changed_fields, vec!["prompt", "lighting_style", "color_palette"]);
    assert_eq!(a.audit.previous_image_url.as_deref(), Some("https://img.example/a1.png"));

    let b = controller.creative("B").expect("B exists");
    assert_eq!(b.image_url.as_deref(), Some("https://img.example/b1.png"));
}
