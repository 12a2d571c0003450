//! Server-issued experiment plan.

use serde::{Deserialize, Serialize};

use super::snapshot::Guardrails;

/// One arm of the experiment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanVariant {
    pub variant_id: String,
    #[serde(rename = "control", default)]
    pub is_control: bool,
    pub description: String,
}

/// Minimum evidence each variant needs before a winner is called.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSizeRule {
    pub min_spend_per_variant: f64,
    pub min_conversions: u32,
}

/// Experiment structure returned by plan creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    pub experiment_id: String,
    pub objective: String,
    pub hypothesis: String,
    pub variants: Vec<PlanVariant>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(rename = "sample_size_rules")]
    pub sample_size_rule: SampleSizeRule,
    /// Guardrails echoed back from the snapshot, used by auto-fix.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardrails: Option<Guardrails>,
}

impl ExperimentPlan {
    pub fn has_variant(&self, variant_id: &str) -> bool {
        self.variants.iter().any(|v| v.variant_id == variant_id)
    }
}
