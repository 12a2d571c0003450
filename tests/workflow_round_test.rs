//! End-to-end rounds through the phase controller against the mock backend.

mod common;

use adloop::adapters::GatewayCall;
use adloop::domain::models::{
    GuardrailStatus, LinkStatus, Phase, ResultField, SnapshotDraft, VisualAxis,
};
use adloop::domain::ports::GatewayError;
use adloop::services::results_calculator::derive_all;
use adloop::services::{AxisSelection, RetryAction};
use adloop::DomainError;

use tokio_test::{assert_err, assert_ok};

use common::{controller_with_creatives, mock_controller, setup_test_logging, stock_snapshot};

#[tokio::test]
async fn test_full_round_with_edits_and_recommendation() {
    setup_test_logging();
    let (backend, mut controller) = mock_controller();
    let draft = SnapshotDraft { avoid_words: "scrolling".to_string(), ..SnapshotDraft::default() };

    controller.create_plan(draft.into_snapshot()).await.expect("plan");
    assert_eq!(controller.phase(), Phase::PlanAndCreatives);
    assert_eq!(controller.plan().map(|p| p.experiment_id.as_str()), Some("exp_101"));
    assert_eq!(controller.results().len(), 3);

    controller.generate_creatives().await.expect("creatives");
    controller.score_creatives().await.expect("scores");
    assert_eq!(controller.scores().len(), 3);

    let flagged = controller.creative("A").and_then(|c| c.guardrails_report.clone()).expect("report");
    assert_eq!(flagged.status, GuardrailStatus::NeedsFix);
    assert_eq!(flagged.issues, vec!["Avoided word found: 'scrolling'"]);

    controller.set_prompt("A", "Same framing, warmer lighting").expect("prompt");
    controller.regenerate_image("A").await.expect("regenerated");
    let regenerated = controller.creative("A").cloned().expect("A exists");

    controller.auto_fix("A").await.expect("fixed");
    let fixed = controller.creative("A").expect("A exists");
    assert!(fixed.hook.contains("***"));
    assert!(!fixed.hook.to_lowercase().contains("scrolling"));
    assert_eq!(fixed.image_url, regenerated.image_url, "auto-fix keeps the image");
    assert_eq!(fixed.fibo_spec, regenerated.fibo_spec, "auto-fix keeps the spec");
    assert_eq!(
        fixed.guardrails_report.as_ref().map(|r| r.status),
        Some(GuardrailStatus::Pass)
    );
    assert_eq!(fixed.audit.changed_fields, vec!["hook (censored 'scrolling')"]);

    controller.advance_to_results().expect("advance");
    controller.edit_result("C", ResultField::Revenue, "5000").expect("edit");
    controller.select_winner("C").expect("winner");
    controller.submit_results().await.expect("submitted");

    let recommendation = controller.recommendation().expect("recommendation");
    assert!(recommendation.summary.starts_with("Variant C was the clear winner with $4700.00 profit"));
    let next: Vec<_> =
        recommendation.recommended_variants.iter().map(|v| v.variant_id.as_str()).collect();
    assert_eq!(next, vec!["D", "E"]);

    let submitted = backend.calls_of(GatewayCall::SubmitResults);
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].payload["experiment_id"], "exp_101");
    assert_eq!(submitted[0].payload["winner_variant_id"], "C");
}

#[tokio::test]
async fn test_regeneration_records_one_step_of_history() {
    let (_backend, mut controller) = controller_with_creatives().await;
    let before = controller.creative("A").cloned().expect("A exists");

    controller.set_prompt("A", "Same framing, warmer lighting").expect("prompt");
    controller.regenerate_image("A").await.expect("regenerated");

    let after = controller.creative("A").expect("A exists");
    assert_eq!(after.fibo_spec.axis(VisualAxis::LightingStyle), Some("warm"));
    assert_eq!(after.fibo_spec.axis(VisualAxis::ColorPalette), Some("warm_golden"));
    assert_eq!(after.audit.changed_fields, vec!["prompt", "lighting_style", "color_palette"]);
    assert_eq!(after.audit.previous_image_url, before.image_url);
    assert_eq!(after.audit.previous_timestamp, before.audit.timestamp);
    assert_ne!(after.image_url, before.image_url);

    let untouched = controller.creative("B").expect("B exists");
    assert!(untouched.audit.previous_image_url.is_none());
}

#[tokio::test]
async fn test_zero_spend_submission_metrics() {
    let (backend, mut controller) = controller_with_creatives().await;
    controller.advance_to_results().expect("advance");
    controller.edit_result("B", ResultField::Spend, "0").expect("spend");
    controller.edit_result("B", ResultField::Revenue, "500").expect("revenue");

    let derived = derive_all(controller.results());
    let b = derived.iter().find(|r| r.variant_id == "B").expect("row B");
    assert!(b.roas.abs() < f64::EPSILON);
    assert!((b.profit - 500.0).abs() < f64::EPSILON);
    assert!(b.cac.abs() < f64::EPSILON, "zero spend over 25 conversions");

    controller.submit_results().await.expect("submitted");
    let payload = &backend.calls_of(GatewayCall::SubmitResults)[0].payload;
    assert_eq!(payload["results"][1]["variant_id"], "B");
    assert_eq!(payload["results"][1]["roas"], 0.0);
    assert_eq!(payload["results"][1]["profit"], 500.0);
}

#[tokio::test]
async fn test_failed_plan_replays_identical_payload() {
    let (backend, mut controller) = mock_controller();
    backend.fail_next(GatewayCall::CreatePlan, GatewayError::request(503, "Planner warming up"));

    let err = controller.create_plan(stock_snapshot()).await.expect_err("injected failure");
    assert_eq!(err.to_string(), "Planner warming up");
    assert_eq!(controller.phase(), Phase::Snapshot);
    assert_eq!(controller.error().map(|e| e.message.as_str()), Some("Planner warming up"));
    assert_eq!(controller.pending_retry(), Some(RetryAction::CreatePlan));

    controller.retry().await.expect("replay succeeds");
    assert_eq!(controller.phase(), Phase::PlanAndCreatives);
    assert!(controller.error().is_none());

    let calls = backend.calls_of(GatewayCall::CreatePlan);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].payload, calls[1].payload);

    assert_eq!(controller.retry().await, Err(DomainError::NoCachedAction));
}

#[tokio::test]
async fn test_failed_submission_replays_the_same_rows() {
    let (backend, mut controller) = controller_with_creatives().await;
    controller.advance_to_results().expect("advance");
    backend.fail_next(GatewayCall::SubmitResults, GatewayError::request(500, "Try again"));

    controller.submit_results().await.expect_err("injected failure");
    assert_eq!(controller.pending_retry(), Some(RetryAction::SubmitResults));

    // Edits after the failure do not leak into the replay
    controller.edit_result("A", ResultField::Revenue, "1").expect("edit");
    controller.retry().await.expect("replay");

    let calls = backend.calls_of(GatewayCall::SubmitResults);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].payload, calls[1].payload);
    assert!(controller.recommendation().is_some());
}

#[tokio::test]
async fn test_regeneration_replay_after_repeated_failure() {
    let (backend, mut controller) = controller_with_creatives().await;
    let before = controller.creative("A").cloned().expect("A exists");
    backend.fail_next(GatewayCall::RegenerateImage, GatewayError::request(503, "Renderer busy"));
    backend.fail_next(GatewayCall::RegenerateImage, GatewayError::request(504, "Renderer timed out"));

    controller.set_prompt("A", "Same framing, warmer lighting").expect("prompt");
    let err = controller.regenerate_image("A").await.expect_err("first failure");
    assert_eq!(err.to_string(), "Renderer busy");
    assert_eq!(controller.pending_retry(), Some(RetryAction::RegenerateImage));

    assert_err!(controller.retry().await);
    assert_eq!(controller.error().map(|e| e.message.as_str()), Some("Renderer timed out"));
    assert_eq!(controller.pending_retry(), Some(RetryAction::RegenerateImage));
    assert_eq!(controller.creative("A"), Some(&before), "failed attempts leave A untouched");

    assert_ok!(controller.retry().await);
    assert!(controller.error().is_none());
    assert_eq!(controller.pending_retry(), None);

    let after = controller.creative("A").expect("A exists");
    assert_eq!(after.audit.changed_fields, vec!["prompt", "lighting_style", "color_palette"]);
    assert_eq!(after.audit.previous_image_url, before.image_url);
    assert_eq!(after.fibo_spec.axis(VisualAxis::LightingStyle), Some("warm"));

    let calls = backend.calls_of(GatewayCall::RegenerateImage);
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[0].payload, calls[1].payload);
    assert_eq!(calls[1].payload, calls[2].payload);
}

#[tokio::test]
async fn test_explore_and_adopt_replaces_image_and_spec() {
    let (backend, mut controller) = controller_with_creatives().await;
    let before = controller.creative("B").cloned().expect("B exists");

    controller.explore("B").await.expect("explored");
    let grid = controller.exploration().cloned().expect("grid open");
    assert_eq!(grid.base_variant_name, "Variant B");
    assert_eq!(grid.variants.len(), 8);
    assert_eq!(
        grid.axes_explored.axes().collect::<Vec<_>>(),
        VisualAxis::DEFAULT_EXPLORATION.to_vec()
    );

    let request = &backend.calls_of(GatewayCall::ExploreVariants)[0].payload;
    assert_eq!(request["axes"]["lighting_style"], serde_json::json!(["warm", "cool"]));

    controller.adopt_explored(0).expect("adopted");
    assert!(controller.exploration().is_none());

    let adopted = controller.creative("B").expect("B exists");
    assert_eq!(adopted.image_url, grid.variants[0].image_url);
    assert_eq!(adopted.headline, before.headline, "copy stays with the base");
    assert_eq!(adopted.audit.previous_image_url, before.image_url);
    assert_eq!(
        adopted.audit.changed_fields,
        vec!["lighting_style", "color_palette", "background_type"]
    );
}

#[tokio::test]
async fn test_advanced_axes_limit_the_grid() {
    let (_backend, mut controller) = controller_with_creatives().await;
    controller
        .set_axis_selection(AxisSelection::Advanced(vec![VisualAxis::ShotType]))
        .expect("one axis is valid");

    controller.explore("C").await.expect("explored");
    let grid = controller.exploration().expect("grid open");
    assert_eq!(grid.variants.len(), 2);
    assert_eq!(grid.variants[1].fibo_spec.axis(VisualAxis::ShotType), Some("lifestyle"));

    let too_many = AxisSelection::Advanced(VisualAxis::ALL.to_vec());
    assert!(matches!(
        controller.set_axis_selection(too_many),
        Err(DomainError::InvalidAxisSelection(_))
    ));
}

#[tokio::test]
async fn test_outage_blocks_images_until_health_returns() {
    let (backend, mut controller) = controller_with_creatives().await;
    backend.set_offline(true);

    let err = controller.score_creatives().await.expect_err("offline");
    assert!(matches!(err, DomainError::Gateway(GatewayError::Unreachable { .. })));
    assert_eq!(controller.health().status, LinkStatus::Offline);

    let regenerate_calls = backend.calls_of(GatewayCall::RegenerateImage).len();
    assert_eq!(controller.regenerate_image("A").await, Err(DomainError::BackendOffline));
    assert_eq!(
        backend.calls_of(GatewayCall::RegenerateImage).len(),
        regenerate_calls,
        "refused before any call"
    );

    backend.set_offline(false);
    controller.retry().await.expect("scoring replays once reachable");
    assert_eq!(controller.scores().len(), 3);
}

#[tokio::test]
async fn test_export_bundle_carries_history_and_prompts() {
    let (_backend, mut controller) = controller_with_creatives().await;
    controller.set_prompt("B", "lock the lighting").expect("prompt");
    controller.regenerate_image("B").await.expect("regenerated");

    let bundle = controller.export();
    assert_eq!(bundle.session_id, controller.session_id());
    assert_eq!(bundle.creative_variants.len(), 3);
    assert_eq!(bundle.spec_patches_used.get("B").map(String::as_str), Some("lock the lighting"));
    assert!(bundle.creative_history["B"].previous_image_url.is_some());

    let json: serde_json::Value =
        serde_json::from_str(&bundle.to_json_pretty().expect("serializes")).expect("valid json");
    assert_eq!(json["experiment_plan"]["experiment_id"], "exp_101");
}

#[tokio::test]
async fn test_start_over_discards_the_session() {
    let (_backend, mut controller) = controller_with_creatives().await;
    assert_ok!(controller.start_over());
    assert_err!(controller.start_over(), "already at the snapshot phase");

    assert_eq!(controller.phase(), Phase::Snapshot);
    assert!(controller.plan().is_none());
    assert!(controller.creatives().is_empty());
    assert!(controller.results().is_empty());

    controller.create_plan(stock_snapshot()).await.expect("second plan");
    assert_eq!(controller.plan().map(|p| p.experiment_id.as_str()), Some("exp_102"));
}
