//! Single-slot record of the last failed mutating call.
//!
//! Only "repeat the same call" is supported: the stored payload is replayed
//! verbatim. A new failure overwrites the slot; there is no history.

use std::fmt;

use tracing::{debug, info};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    BusinessSnapshot, Creative, ExperimentPlan, Recommendation, ResultsSubmission, Score,
};
use crate::domain::ports::{BackendGateway, InferredPatch, RegenerateImageRequest};

/// A failed call together with the exact payload that was sent.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    CreatePlan(BusinessSnapshot),
    GenerateCreatives(ExperimentPlan),
    ScoreCreatives(Vec<Creative>),
    SubmitResults(ResultsSubmission),
    RegenerateImage {
        request: RegenerateImageRequest,
        /// Change log inferred for the original attempt, reapplied on success.
        changed_fields: Vec<String>,
    },
}

/// Tag of a [`PendingAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetryAction {
    CreatePlan,
    GenerateCreatives,
    ScoreCreatives,
    SubmitResults,
    RegenerateImage,
}

impl RetryAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreatePlan => "createPlan",
            Self::GenerateCreatives => "generateCreatives",
            Self::ScoreCreatives => "scoreCreatives",
            Self::SubmitResults => "submitResults",
            Self::RegenerateImage => "regenerateImage",
        }
    }
}

impl fmt::Display for RetryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PendingAction {
    pub const fn action(&self) -> RetryAction {
        match self {
            Self::CreatePlan(_) => RetryAction::CreatePlan,
            Self::GenerateCreatives(_) => RetryAction::GenerateCreatives,
            Self::ScoreCreatives(_) => RetryAction::ScoreCreatives,
            Self::SubmitResults(_) => RetryAction::SubmitResults,
            Self::RegenerateImage { .. } => RetryAction::RegenerateImage,
        }
    }
}

/// Successful replay result, handed to the same success handler the
/// original attempt would have used.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayOutcome {
    PlanCreated { snapshot: BusinessSnapshot, plan: ExperimentPlan },
    CreativesGenerated(Vec<Creative>),
    CreativesScored(Vec<Score>),
    ResultsSubmitted(Recommendation),
    ImageRegenerated { creative: Creative, inferred: InferredPatch },
}

#[derive(Debug, Clone, Default)]
pub struct RetryCache {
    slot: Option<PendingAction>,
}

impl RetryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a failed call, replacing whatever was there.
    pub fn record(&mut self, pending: PendingAction) {
        debug!(action = %pending.action(), "recording retryable failure");
        self.slot = Some(pending);
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub const fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn action(&self) -> Option<RetryAction> {
        self.slot.as_ref().map(PendingAction::action)
    }

    /// Re-issue the cached call with its stored payload.
    ///
    /// The slot is cleared only when the call succeeds; on renewed failure
    /// it stays so the operator can try again.
    pub async fn replay(&mut self, gateway: &dyn BackendGateway) -> DomainResult<ReplayOutcome> {
        let pending = self.slot.as_ref().ok_or(DomainError::NoCachedAction)?;
        info!(action = %pending.action(), "replaying failed action");

        let outcome = match pending {
            PendingAction::CreatePlan(snapshot) => {
                let plan = gateway.create_plan(snapshot).await?;
                ReplayOutcome::PlanCreated { snapshot: snapshot.clone(), plan }
            }
            PendingAction::GenerateCreatives(plan) => {
                ReplayOutcome::CreativesGenerated(gateway.generate_creatives(plan).await?)
            }
            PendingAction::ScoreCreatives(creatives) => {
                ReplayOutcome::CreativesScored(gateway.score_creatives(creatives).await?)
            }
            PendingAction::SubmitResults(submission) => {
                ReplayOutcome::ResultsSubmitted(gateway.submit_results(submission).await?)
            }
            PendingAction::RegenerateImage { request, changed_fields } => {
                let creative = gateway.regenerate_image(request).await?;
                ReplayOutcome::ImageRegenerated {
                    creative,
                    inferred: InferredPatch {
                        spec_patch: request.spec_patch.clone(),
                        changed_fields: changed_fields.clone(),
                    },
                }
            }
        };

        self.slot = None;
        Ok(outcome)
    }
}
