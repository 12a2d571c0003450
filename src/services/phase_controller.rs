//! Phase controller.
//!
//! Owns the workflow phase and every session entity, sequences calls to the
//! backend, and routes each response through the matching merge or derive
//! step. Failures of retryable calls are kept in the [`RetryCache`]; every
//! failure, remote or local, ends up as the single current [`SessionError`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    BackendHealth, BusinessSnapshot, Creative, CreativeSet, ErrorKind, ExperimentPlan,
    ExplorationGrid, Guardrails, Phase, Recommendation, ResultField, ResultRow,
    ResultsSubmission, Score, SessionError,
};
use crate::domain::ports::{
    ApplyGuardrailsRequest, BackendGateway, GatewayError, InferredPatch, PatchInferer,
    RegenerateImageRequest,
};
use crate::services::creative_merge::{apply_guardrail_fix, apply_regeneration, merge_adoption};
use crate::services::exploration_builder::{build_request, AxisSelection};
use crate::services::export::ExportBundle;
use crate::services::patch_inference::KeywordPatchInferer;
use crate::services::results_calculator::{derive_all, seed_rows};
use crate::services::retry_cache::{PendingAction, ReplayOutcome, RetryAction, RetryCache};

/// Stock prompt overrides offered to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptPreset {
    ProductShot,
    Lifestyle,
    PunchyAd,
    LockLighting,
}

impl PromptPreset {
    pub const ALL: [Self; 4] = [Self::ProductShot, Self::Lifestyle, Self::PunchyAd, Self::LockLighting];

    pub const fn text(self) -> &'static str {
        match self {
            Self::ProductShot => "Professional product photography, studio lighting, eye level",
            Self::Lifestyle => "Lifestyle photography, warm natural lighting, candid moment",
            Self::PunchyAd => "Vibrant advertisement, high contrast, dramatic lighting, close up",
            Self::LockLighting => "Same framing, warmer lighting with golden hour glow",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ProductShot => "Product shot",
            Self::Lifestyle => "Lifestyle",
            Self::PunchyAd => "Punchy ad",
            Self::LockLighting => "Lock lighting",
        }
    }
}

impl std::str::FromStr for PromptPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "product_shot" => Ok(Self::ProductShot),
            "lifestyle" => Ok(Self::Lifestyle),
            "punchy_ad" => Ok(Self::PunchyAd),
            "lock_lighting" => Ok(Self::LockLighting),
            other => Err(format!("unknown prompt preset: {other}")),
        }
    }
}

/// Entities accumulated over one workflow session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub snapshot: Option<BusinessSnapshot>,
    pub plan: Option<ExperimentPlan>,
    pub creatives: CreativeSet,
    pub scores: Vec<Score>,
    pub results: Vec<ResultRow>,
    pub recommendation: Option<Recommendation>,
    pub winner_variant_id: Option<String>,
    /// Prompt override per variant.
    pub prompts: BTreeMap<String, String>,
    pub exploration: Option<ExplorationGrid>,
}

/// Top-level workflow state machine.
///
/// Every action borrows the controller mutably, so at most one action is in
/// flight at a time and session entities never see interleaved writes.
pub struct PhaseController {
    session_id: Uuid,
    gateway: Arc<dyn BackendGateway>,
    inferer: Box<dyn PatchInferer>,
    health: Arc<watch::Sender<BackendHealth>>,
    axis_selection: AxisSelection,
    phase: Phase,
    state: SessionState,
    retry: RetryCache,
    error: Option<SessionError>,
}

impl fmt::Debug for PhaseController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseController")
            .field("session_id", &self.session_id)
            .field("phase", &self.phase)
            .field("pending_retry", &self.retry.action())
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl PhaseController {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        let (health, _) = watch::channel(BackendHealth::default());
        Self {
            session_id: Uuid::new_v4(),
            gateway,
            inferer: Box::new(KeywordPatchInferer),
            health: Arc::new(health),
            axis_selection: AxisSelection::Default,
            phase: Phase::Snapshot,
            state: SessionState::default(),
            retry: RetryCache::new(),
            error: None,
        }
    }

    /// Replace the prompt inference rules.
    pub fn with_inferer(mut self, inferer: Box<dyn PatchInferer>) -> Self {
        self.inferer = inferer;
        self
    }

    /// Share a liveness channel with a [`HealthMonitor`](crate::services::HealthMonitor).
    pub fn with_health_channel(mut self, health: Arc<watch::Sender<BackendHealth>>) -> Self {
        self.health = health;
        self
    }

    pub fn with_axis_selection(mut self, selection: AxisSelection) -> Self {
        self.axis_selection = selection;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub const fn snapshot(&self) -> Option<&BusinessSnapshot> {
        self.state.snapshot.as_ref()
    }

    pub const fn plan(&self) -> Option<&ExperimentPlan> {
        self.state.plan.as_ref()
    }

    pub const fn creatives(&self) -> &CreativeSet {
        &self.state.creatives
    }

    pub fn creative(&self, variant_id: &str) -> Option<&Creative> {
        self.state.creatives.get(variant_id)
    }

    pub fn scores(&self) -> &[Score] {
        &self.state.scores
    }

    pub fn results(&self) -> &[ResultRow] {
        &self.state.results
    }

    pub const fn recommendation(&self) -> Option<&Recommendation> {
        self.state.recommendation.as_ref()
    }

    pub fn winner_variant_id(&self) -> Option<&str> {
        self.state.winner_variant_id.as_deref()
    }

    pub fn prompt(&self, variant_id: &str) -> Option<&str> {
        self.state.prompts.get(variant_id).map(String::as_str)
    }

    pub const fn exploration(&self) -> Option<&ExplorationGrid> {
        self.state.exploration.as_ref()
    }

    pub const fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn pending_retry(&self) -> Option<RetryAction> {
        self.retry.action()
    }

    pub const fn axis_selection(&self) -> &AxisSelection {
        &self.axis_selection
    }

    pub fn health(&self) -> BackendHealth {
        *self.health.borrow()
    }

    pub fn health_channel(&self) -> Arc<watch::Sender<BackendHealth>> {
        Arc::clone(&self.health)
    }

    // ========================================================================
    // Remote actions
    // ========================================================================

    /// Request a plan for `snapshot`. Success moves the session to
    /// [`Phase::PlanAndCreatives`]; failure leaves the phase unchanged.
    #[instrument(skip_all, fields(session_id = %self.session_id))]
    pub async fn create_plan(&mut self, snapshot: BusinessSnapshot) -> DomainResult<()> {
        self.begin("create_plan", Some(Phase::Snapshot))?;

        match self.gateway.create_plan(&snapshot).await {
            Ok(plan) => {
                self.on_plan_created(snapshot, plan);
                Ok(())
            }
            Err(e) => {
                self.retry.record(PendingAction::CreatePlan(snapshot));
                Err(self.fail(e.into()))
            }
        }
    }

    #[instrument(skip_all, fields(session_id = %self.session_id))]
    pub async fn generate_creatives(&mut self) -> DomainResult<()> {
        self.begin("generate_creatives", Some(Phase::PlanAndCreatives))?;
        let plan = self.require_plan()?.clone();

        match self.gateway.generate_creatives(&plan).await {
            Ok(creatives) => {
                self.on_creatives_generated(creatives);
                Ok(())
            }
            Err(e) => {
                self.retry.record(PendingAction::GenerateCreatives(plan));
                Err(self.fail(e.into()))
            }
        }
    }

    #[instrument(skip_all, fields(session_id = %self.session_id))]
    pub async fn score_creatives(&mut self) -> DomainResult<()> {
        self.begin("score_creatives", Some(Phase::PlanAndCreatives))?;
        if self.state.creatives.is_empty() {
            return Err(self.fail(DomainError::NoCreatives));
        }
        let creatives = self.state.creatives.to_vec();

        match self.gateway.score_creatives(&creatives).await {
            Ok(scores) => {
                self.on_creatives_scored(scores);
                Ok(())
            }
            Err(e) => {
                self.retry.record(PendingAction::ScoreCreatives(creatives));
                Err(self.fail(e.into()))
            }
        }
    }

    /// Regenerate one creative's image using its prompt override.
    #[instrument(skip_all, fields(session_id = %self.session_id, variant_id = %variant_id))]
    pub async fn regenerate_image(&mut self, variant_id: &str) -> DomainResult<()> {
        self.begin("regenerate_image", Some(Phase::PlanAndCreatives))?;
        self.require_online()?;
        let variant = self.require_creative(variant_id)?.clone();

        let prompt = self.state.prompts.get(variant_id).map_or("", String::as_str);
        let inferred = self.inferer.infer(prompt);
        debug!(changed_fields = ?inferred.changed_fields, "inferred spec patch");

        let request = RegenerateImageRequest {
            variant,
            spec_patch: inferred.spec_patch.clone(),
        };

        match self.gateway.regenerate_image(&request).await {
            Ok(creative) => self.on_image_regenerated(creative, inferred),
            Err(e) => {
                self.retry.record(PendingAction::RegenerateImage {
                    request,
                    changed_fields: inferred.changed_fields,
                });
                Err(self.fail(e.into()))
            }
        }
    }

    /// Apply the guardrail auto-fix to one creative's copy.
    #[instrument(skip_all, fields(session_id = %self.session_id, variant_id = %variant_id))]
    pub async fn auto_fix(&mut self, variant_id: &str) -> DomainResult<()> {
        self.begin("auto_fix", Some(Phase::PlanAndCreatives))?;
        let guardrails = self.guardrails()?;
        let variant = self.require_creative(variant_id)?.clone();

        match self
            .gateway
            .apply_guardrails(&ApplyGuardrailsRequest { variant, guardrails })
            .await
        {
            Ok(fix) => {
                let id = fix.variant_id.clone();
                if !apply_guardrail_fix(&mut self.state.creatives, fix) {
                    return Err(self.fail(DomainError::CreativeNotFound(id)));
                }
                self.succeed();
                info!(variant_id = %id, "guardrail fix applied");
                Ok(())
            }
            Err(e) => {
                self.retry.clear();
                Err(self.fail(e.into()))
            }
        }
    }

    /// Open an exploration grid around one creative.
    #[instrument(skip_all, fields(session_id = %self.session_id, variant_id = %variant_id))]
    pub async fn explore(&mut self, variant_id: &str) -> DomainResult<()> {
        self.begin("explore", Some(Phase::PlanAndCreatives))?;
        self.require_online()?;
        let base = self.require_creative(variant_id)?.clone();
        let request = match build_request(&base, &self.axis_selection) {
            Ok(request) => request,
            Err(e) => return Err(self.fail(e)),
        };

        match self.gateway.explore_variants(&request).await {
            Ok(response) => {
                info!(
                    generated = response.generated.len(),
                    expected = request.axes.combination_count(),
                    runtime_ms = response.meta.runtime_ms,
                    "exploration grid received"
                );
                self.state.exploration = Some(ExplorationGrid {
                    base_variant_name: format!("Variant {}", base.variant_id),
                    base_variant_id: base.variant_id,
                    axes_explored: request.axes,
                    variants: response.generated,
                });
                self.succeed();
                Ok(())
            }
            Err(e) => {
                self.retry.clear();
                Err(self.fail(e.into()))
            }
        }
    }

    #[instrument(skip_all, fields(session_id = %self.session_id))]
    pub async fn submit_results(&mut self) -> DomainResult<()> {
        self.begin("submit_results", Some(Phase::ResultsAndRecommendation))?;
        let plan = self.require_plan()?.clone();
        let winner_variant_id = self
            .state
            .winner_variant_id
            .clone()
            .or_else(|| plan.variants.first().map(|v| v.variant_id.clone()))
            .unwrap_or_default();
        let submission = ResultsSubmission {
            experiment_id: plan.experiment_id,
            winner_variant_id,
            results: derive_all(&self.state.results),
        };

        match self.gateway.submit_results(&submission).await {
            Ok(recommendation) => {
                self.on_results_submitted(recommendation);
                Ok(())
            }
            Err(e) => {
                self.retry.record(PendingAction::SubmitResults(submission));
                Err(self.fail(e.into()))
            }
        }
    }

    /// Replay the last failed call with its original payload.
    #[instrument(skip_all, fields(session_id = %self.session_id))]
    pub async fn retry(&mut self) -> DomainResult<()> {
        self.begin("retry", None)?;

        match self.retry.replay(self.gateway.as_ref()).await {
            Ok(outcome) => self.apply_outcome(outcome),
            Err(e) => Err(self.fail(e)),
        }
    }

    // ========================================================================
    // Local actions
    // ========================================================================

    /// Adopt the explored projection at `index` onto its base creative and
    /// close the grid.
    pub fn adopt_explored(&mut self, index: usize) -> DomainResult<()> {
        self.begin("adopt_explored", Some(Phase::PlanAndCreatives))?;
        let Some(grid) = self.state.exploration.as_ref() else {
            return Err(self.fail(DomainError::NoExplorationOpen));
        };
        let Some(projection) = grid.variants.get(index) else {
            let len = grid.variants.len();
            return Err(self.fail(DomainError::ExploredVariantOutOfRange { index, len }));
        };
        let Some(existing) = self.state.creatives.get(&grid.base_variant_id) else {
            let id = grid.base_variant_id.clone();
            return Err(self.fail(DomainError::CreativeNotFound(id)));
        };

        let merged = merge_adoption(existing, projection, grid, Utc::now());
        info!(
            variant_id = %merged.variant_id,
            projection = %projection.variant_id,
            changed_fields = ?merged.audit.changed_fields,
            "explored variant adopted"
        );
        self.state.creatives.upsert(merged);
        self.state.exploration = None;
        self.error = None;
        Ok(())
    }

    pub fn close_exploration(&mut self) {
        self.state.exploration = None;
    }

    /// Change the axes future explorations vary.
    pub fn set_axis_selection(&mut self, selection: AxisSelection) -> DomainResult<()> {
        if let Err(e) = selection.axes() {
            return Err(self.fail(e));
        }
        self.axis_selection = selection;
        Ok(())
    }

    /// Set or clear (empty text) a creative's prompt override.
    pub fn set_prompt(&mut self, variant_id: &str, prompt: impl Into<String>) -> DomainResult<()> {
        self.require_creative(variant_id)?;
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            self.state.prompts.remove(variant_id);
        } else {
            self.state.prompts.insert(variant_id.to_string(), prompt);
        }
        Ok(())
    }

    pub fn apply_preset(&mut self, variant_id: &str, preset: PromptPreset) -> DomainResult<()> {
        self.set_prompt(variant_id, preset.text())
    }

    pub fn select_winner(&mut self, variant_id: &str) -> DomainResult<()> {
        let known = self.require_plan()?.has_variant(variant_id);
        if !known {
            return Err(self.fail(DomainError::UnknownVariant(variant_id.to_string())));
        }
        self.state.winner_variant_id = Some(variant_id.to_string());
        Ok(())
    }

    /// Store a raw operator value in a result row.
    pub fn edit_result(&mut self, variant_id: &str, field: ResultField, raw: &str) -> DomainResult<()> {
        let Some(row) = self.state.results.iter_mut().find(|r| r.variant_id == variant_id) else {
            return Err(self.fail(DomainError::UnknownVariant(variant_id.to_string())));
        };
        row.set(field, raw);
        Ok(())
    }

    /// Publish a liveness observation. Coming back online clears a
    /// connectivity error.
    pub fn apply_health(&mut self, health: BackendHealth) {
        self.health.send_replace(health);
        if !health.is_offline()
            && self.error.as_ref().is_some_and(|e| e.kind == ErrorKind::Connectivity)
        {
            debug!("backend reachable again, clearing connectivity error");
            self.error = None;
        }
    }

    pub fn export(&self) -> ExportBundle {
        ExportBundle::new(
            self.session_id,
            self.state.plan.as_ref(),
            self.state.creatives.as_slice(),
            &self.state.scores,
            self.state.recommendation.as_ref(),
            &self.state.prompts,
            Utc::now(),
        )
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Move on to results entry; requires at least one creative.
    pub fn advance_to_results(&mut self) -> DomainResult<()> {
        self.begin("advance_to_results", Some(Phase::PlanAndCreatives))?;
        if self.state.creatives.is_empty() {
            return Err(self.fail(DomainError::NoCreatives));
        }
        self.transition(Phase::ResultsAndRecommendation);
        Ok(())
    }

    pub fn back_to_snapshot(&mut self) -> DomainResult<()> {
        self.begin("back_to_snapshot", Some(Phase::PlanAndCreatives))?;
        self.transition(Phase::Snapshot);
        Ok(())
    }

    pub fn back_to_creatives(&mut self) -> DomainResult<()> {
        self.begin("back_to_creatives", Some(Phase::ResultsAndRecommendation))?;
        self.transition(Phase::PlanAndCreatives);
        Ok(())
    }

    /// Discard every session entity and return to the snapshot phase.
    pub fn start_over(&mut self) -> DomainResult<()> {
        self.begin("start_over", None)?;
        if self.phase == Phase::Snapshot {
            return Err(self.fail(DomainError::InvalidPhase {
                action: "start_over",
                phase: self.phase,
            }));
        }
        self.state = SessionState::default();
        self.transition(Phase::Snapshot);
        Ok(())
    }

    // ========================================================================
    // Success handlers
    // ========================================================================

    fn apply_outcome(&mut self, outcome: ReplayOutcome) -> DomainResult<()> {
        match outcome {
            ReplayOutcome::PlanCreated { snapshot, plan } => self.on_plan_created(snapshot, plan),
            ReplayOutcome::CreativesGenerated(creatives) => self.on_creatives_generated(creatives),
            ReplayOutcome::CreativesScored(scores) => self.on_creatives_scored(scores),
            ReplayOutcome::ResultsSubmitted(rec) => self.on_results_submitted(rec),
            ReplayOutcome::ImageRegenerated { creative, inferred } => {
                return self.on_image_regenerated(creative, inferred);
            }
        }
        Ok(())
    }

    fn on_plan_created(&mut self, snapshot: BusinessSnapshot, plan: ExperimentPlan) {
        info!(
            experiment_id = %plan.experiment_id,
            variants = plan.variants.len(),
            "plan created"
        );
        self.state.results = seed_rows(&plan.variants);
        self.state.winner_variant_id = plan.variants.first().map(|v| v.variant_id.clone());
        self.state.creatives.clear();
        self.state.scores.clear();
        self.state.recommendation = None;
        self.state.prompts.clear();
        self.state.snapshot = Some(snapshot);
        self.state.plan = Some(plan);
        self.succeed();
        if self.phase != Phase::PlanAndCreatives {
            self.transition(Phase::PlanAndCreatives);
        }
    }

    fn on_creatives_generated(&mut self, creatives: Vec<Creative>) {
        let now = Utc::now();
        let stamped = creatives.into_iter().map(|mut c| {
            c.audit.timestamp = Some(now);
            c
        });
        self.state.creatives = CreativeSet::from_vec(stamped.collect());
        self.state.scores.clear();
        self.state.recommendation = None;
        self.state.exploration = None;
        info!(count = self.state.creatives.len(), "creatives generated");
        self.succeed();
    }

    fn on_creatives_scored(&mut self, scores: Vec<Score>) {
        info!(count = scores.len(), "creatives scored");
        self.state.scores = scores;
        self.state.recommendation = None;
        self.succeed();
    }

    fn on_results_submitted(&mut self, recommendation: Recommendation) {
        info!(
            recommended = recommendation.recommended_variants.len(),
            "recommendation received"
        );
        self.state.recommendation = Some(recommendation);
        self.succeed();
    }

    fn on_image_regenerated(&mut self, creative: Creative, inferred: InferredPatch) -> DomainResult<()> {
        let id = creative.variant_id.clone();
        if !apply_regeneration(&mut self.state.creatives, creative, &inferred, Utc::now()) {
            return Err(self.fail(DomainError::CreativeNotFound(id)));
        }
        info!(variant_id = %id, changed_fields = ?inferred.changed_fields, "image regenerated");
        self.succeed();
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Check the phase. A new attempt clears the previous error.
    fn begin(&mut self, action: &'static str, phase: Option<Phase>) -> DomainResult<()> {
        if let Some(expected) = phase {
            if self.phase != expected {
                return Err(self.fail(DomainError::InvalidPhase { action, phase: self.phase }));
            }
        }
        debug!(action, phase = ?self.phase, "action started");
        self.error = None;
        Ok(())
    }

    /// Bookkeeping after a remote call succeeded.
    fn succeed(&mut self) {
        self.retry.clear();
        self.error = None;
        self.mark_online();
    }

    /// Funnel an error into the current error string.
    fn fail(&mut self, err: DomainError) -> DomainError {
        if let DomainError::Gateway(gateway_err) = &err {
            if gateway_err.is_connectivity() {
                self.mark_offline(gateway_err);
            }
        }
        warn!(kind = ?err.kind(), error = %err, "action failed");
        self.error = Some(SessionError { kind: err.kind(), message: err.to_string() });
        err
    }

    fn mark_offline(&self, cause: &GatewayError) {
        let previous = *self.health.borrow();
        if !previous.is_offline() {
            info!(cause = %cause, "marking backend offline");
            self.health.send_replace(previous.offline());
        }
    }

    /// A call just got through, so an offline flag is stale.
    fn mark_online(&self) {
        let previous = *self.health.borrow();
        if previous.is_offline() {
            info!("backend answered, marking online");
            self.health.send_replace(BackendHealth::online(previous.mode));
        }
    }

    fn transition(&mut self, to: Phase) {
        info!(from = ?self.phase, to = ?to, "phase transition");
        self.phase = to;
        self.error = None;
        self.retry.clear();
        self.state.exploration = None;
    }

    fn require_plan(&mut self) -> DomainResult<&ExperimentPlan> {
        if self.state.plan.is_none() {
            return Err(self.fail(DomainError::NoPlan));
        }
        self.state.plan.as_ref().ok_or(DomainError::NoPlan)
    }

    fn require_creative(&mut self, variant_id: &str) -> DomainResult<&Creative> {
        if self.state.creatives.get(variant_id).is_none() {
            return Err(self.fail(DomainError::CreativeNotFound(variant_id.to_string())));
        }
        self.state
            .creatives
            .get(variant_id)
            .ok_or_else(|| DomainError::CreativeNotFound(variant_id.to_string()))
    }

    fn require_online(&mut self) -> DomainResult<()> {
        if self.health().is_offline() {
            return Err(self.fail(DomainError::BackendOffline));
        }
        Ok(())
    }

    /// Guardrails the plan echoed back, falling back to the snapshot's.
    fn guardrails(&mut self) -> DomainResult<Guardrails> {
        let plan = self.require_plan()?;
        if let Some(g) = &plan.guardrails {
            return Ok(g.clone());
        }
        Ok(self
            .state
            .snapshot
            .as_ref()
            .map(|s| s.guardrails.clone())
            .unwrap_or_default())
    }
}
