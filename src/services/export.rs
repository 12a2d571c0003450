//! Session export bundle.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::{
    Creative, CreativeAudit, ExperimentPlan, Recommendation, Score,
};

/// Everything an operator takes away from a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub session_id: Uuid,
    pub experiment_plan: Option<ExperimentPlan>,
    pub creative_variants: Vec<Creative>,
    /// Session-local audit trail per variant.
    pub creative_history: BTreeMap<String, CreativeAudit>,
    pub scores: Vec<Score>,
    pub recommendation: Option<Recommendation>,
    /// Prompt override last set per variant.
    pub spec_patches_used: BTreeMap<String, String>,
    pub export_timestamp: DateTime<Utc>,
}

impl ExportBundle {
    pub fn new(
        session_id: Uuid,
        plan: Option<&ExperimentPlan>,
        creatives: &[Creative],
        scores: &[Score],
        recommendation: Option<&Recommendation>,
        prompts: &BTreeMap<String, String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id,
            experiment_plan: plan.cloned(),
            creative_history: creatives
                .iter()
                .map(|c| (c.variant_id.clone(), c.audit.clone()))
                .collect(),
            creative_variants: creatives.to_vec(),
            scores: scores.to_vec(),
            recommendation: recommendation.cloned(),
            spec_patches_used: prompts.clone(),
            export_timestamp: now,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
