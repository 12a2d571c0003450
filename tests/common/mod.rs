//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use std::sync::Arc;

use adloop::adapters::MockBackend;
use adloop::domain::models::{BusinessSnapshot, SnapshotDraft};
use adloop::domain::ports::BackendGateway;
use adloop::services::PhaseController;

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Snapshot built from the stock form values.
pub fn stock_snapshot() -> BusinessSnapshot {
    SnapshotDraft::default().into_snapshot()
}

/// A controller wired to a fresh mock backend. The backend handle stays with
/// the test for failure injection and call inspection.
pub fn mock_controller() -> (Arc<MockBackend>, PhaseController) {
    let backend = Arc::new(MockBackend::new());
    let gateway: Arc<dyn BackendGateway> = backend.clone();
    let controller = PhaseController::new(gateway);
    (backend, controller)
}

/// A controller already holding a plan and generated creatives.
pub async fn controller_with_creatives() -> (Arc<MockBackend>, PhaseController) {
    let (backend, mut controller) = mock_controller();
    controller.create_plan(stock_snapshot()).await.expect("plan created");
    controller.generate_creatives().await.expect("creatives generated");
    (backend, controller)
}

/// Plan body with one variant per id; the first id is the control.
pub fn plan_json(experiment_id: &str, variant_ids: &[&str]) -> serde_json::Value {
    let variants: Vec<_> = variant_ids
        .iter()
        .enumerate()
        .map(|(i, id)| {
            serde_json::json!({
                "variant_id": id,
                "control": i == 0,
                "description": format!("Variant {id}"),
            })
        })
        .collect();

    serde_json::json!({
        "experiment_id": experiment_id,
        "objective": "Increase ROAS",
        "hypothesis": "Benefit-led copy beats control",
        "variants": variants,
        "metrics": ["ctr", "roas"],
        "sample_size_rules": { "min_spend_per_variant": 200.0, "min_conversions": 50 },
    })
}

/// Creative body with a neutral visual spec.
pub fn creative_json(variant_id: &str, image_url: &str) -> serde_json::Value {
    serde_json::json!({
        "variant_id": variant_id,
        "hook": format!("Hook {variant_id}"),
        "primary_text": "Primary text",
        "headline": format!("Headline {variant_id}"),
        "call_to_action": "Shop Now",
        "image_url": image_url,
        "image_status": "fibo",
        "fibo_spec": {
            "lighting_style": "cool",
            "color_palette": "pastel",
            "background_type": "studio",
        },
        "guardrails_report": { "status": "pass", "issues": [] },
    })
}
