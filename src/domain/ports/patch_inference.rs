//! Prompt-to-patch inference port.

use serde::{Deserialize, Serialize};

use crate::domain::models::SpecPatch;

/// Structured patch derived from a free-text prompt override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredPatch {
    pub spec_patch: SpecPatch,
    /// Names of the fields the patch sets, in the order they were inferred.
    pub changed_fields: Vec<String>,
}

/// Turns an operator's prompt override into a spec patch.
///
/// Kept behind a trait so the keyword rules can be replaced by a stronger
/// classifier without touching the phase controller.
pub trait PatchInferer: Send + Sync {
    fn infer(&self, prompt: &str) -> InferredPatch;
}
