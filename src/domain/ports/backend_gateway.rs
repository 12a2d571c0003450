//! Backend gateway port - the remote planning/creative/scoring service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::GatewayError;
use crate::domain::models::{
    BackendMode, BusinessSnapshot, Creative, ExperimentPlan, ExploreVariantsRequest,
    ExploreVariantsResponse, Guardrails, GuardrailsReport, Recommendation, ResultsSubmission,
    Score, SpecPatch,
};

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Body of an image regeneration call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegenerateImageRequest {
    pub variant: Creative,
    pub spec_patch: SpecPatch,
}

/// Body of a guardrail auto-fix call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyGuardrailsRequest {
    pub variant: Creative,
    pub guardrails: Guardrails,
}

/// Auto-fix response: copy fields and a report. Any image fields the
/// service sends back are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailFix {
    pub variant_id: String,
    pub hook: String,
    pub primary_text: String,
    pub headline: String,
    pub call_to_action: String,
    pub guardrails_report: GuardrailsReport,
}

/// Liveness probe answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub mode: BackendMode,
}

/// Remote service contract the workflow core depends on.
///
/// Implementations own transport and failure-message wrapping; the core
/// only sees typed requests, typed responses and [`GatewayError`].
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn create_plan(&self, snapshot: &BusinessSnapshot) -> GatewayResult<ExperimentPlan>;

    async fn generate_creatives(&self, plan: &ExperimentPlan) -> GatewayResult<Vec<Creative>>;

    async fn score_creatives(&self, creatives: &[Creative]) -> GatewayResult<Vec<Score>>;

    async fn regenerate_image(&self, request: &RegenerateImageRequest) -> GatewayResult<Creative>;

    async fn apply_guardrails(&self, request: &ApplyGuardrailsRequest)
        -> GatewayResult<GuardrailFix>;

    async fn explore_variants(
        &self,
        request: &ExploreVariantsRequest,
    ) -> GatewayResult<ExploreVariantsResponse>;

    async fn submit_results(&self, submission: &ResultsSubmission)
        -> GatewayResult<Recommendation>;

    /// Liveness only; any failure means offline.
    async fn check_health(&self) -> GatewayResult<HealthReport>;
}
