//! Rubric scores returned by the scoring capability.

use serde::{Deserialize, Serialize};

/// Rubric score for one creative; sub-scores are on a 0-10 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub creative_id: String,
    #[serde(default)]
    pub clarity_of_promise: u8,
    #[serde(default)]
    pub emotional_resonance: u8,
    #[serde(default)]
    pub proof_and_credibility: u8,
    #[serde(default)]
    pub offer_and_risk_reversal: u8,
    #[serde(default)]
    pub call_to_action_score: u8,
    #[serde(default)]
    pub channel_fit: u8,
    #[serde(default)]
    pub curiosity_hook_factor: u8,
    pub overall_strength: f64,
    #[serde(default)]
    pub feedback: String,
}

/// Find the score for a creative; `None` means not yet scored.
pub fn score_for<'a>(scores: &'a [Score], creative_id: &str) -> Option<&'a Score> {
    scores.iter().find(|s| s.creative_id == creative_id)
}
