//! Generated ad creatives and the session-local audit trail kept for each.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fibo::{FiboSpec, SpecPatch};

/// Where a creative's image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStatus {
    /// Rendered by the live image service.
    #[serde(rename = "fibo", alias = "live")]
    Live,
    /// Placeholder produced in mock mode.
    Mocked,
    /// Rendering failed; the image is a fallback.
    Error,
}

/// Outcome of a guardrail check on a creative's copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GuardrailStatus {
    Pass,
    #[serde(alias = "fail")]
    NeedsFix,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailsReport {
    pub status: GuardrailStatus,
    #[serde(default)]
    pub issues: Vec<String>,
    /// Populated by the auto-fix capability only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixed_issues: Vec<String>,
}

/// Session-local history for a creative. Never sent to the service.
///
/// `previous_image_url` / `previous_timestamp` hold exactly one step of
/// history: the image that was current before the most recent regeneration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreativeAudit {
    /// When the current image became current.
    pub timestamp: Option<DateTime<Utc>>,
    pub previous_image_url: Option<String>,
    pub previous_timestamp: Option<DateTime<Utc>>,
    /// Fields altered by the most recent regeneration, adoption or auto-fix.
    pub changed_fields: Vec<String>,
    pub spec_patch_used: Option<SpecPatch>,
}

/// One generated ad variant, keyed by its plan `variant_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creative {
    pub variant_id: String,
    pub hook: String,
    pub primary_text: String,
    pub headline: String,
    pub call_to_action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_status: Option<ImageStatus>,
    #[serde(default)]
    pub fibo_spec: FiboSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardrails_report: Option<GuardrailsReport>,
    #[serde(skip)]
    pub audit: CreativeAudit,
}

/// Ordered set of creatives holding at most one entry per `variant_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreativeSet {
    items: Vec<Creative>,
}

impl CreativeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a service response; a later duplicate replaces the
    /// earlier entry in place.
    pub fn from_vec(creatives: Vec<Creative>) -> Self {
        let mut set = Self::new();
        for creative in creatives {
            set.upsert(creative);
        }
        set
    }

    /// Insert, or replace the entry with the same `variant_id`.
    pub fn upsert(&mut self, creative: Creative) {
        match self.position(&creative.variant_id) {
            Some(idx) => self.items[idx] = creative,
            None => self.items.push(creative),
        }
    }

    pub fn get(&self, variant_id: &str) -> Option<&Creative> {
        self.items.iter().find(|c| c.variant_id == variant_id)
    }

    fn position(&self, variant_id: &str) -> Option<usize> {
        self.items.iter().position(|c| c.variant_id == variant_id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Creative> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Creative] {
        &self.items
    }

    pub fn to_vec(&self) -> Vec<Creative> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a CreativeSet {
    type Item = &'a Creative;
    type IntoIter = std::slice::Iter<'a, Creative>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn creative(variant_id: &str, image_url: &str) -> Creative {
        Creative {
            variant_id: variant_id.to_string(),
            hook: format!("Hook {variant_id}"),
            primary_text: "Primary text".to_string(),
            headline: format!("Headline {variant_id}"),
            call_to_action: "Shop Now".to_string(),
            image_url: Some(image_url.to_string()),
            image_status: Some(ImageStatus::Mocked),
            fibo_spec: [
                ("lighting_style", "cool"),
                ("color_palette", "pastel"),
                ("background_type", "studio"),
            ]
            .into_iter()
            .collect(),
            guardrails_report: None,
            audit: CreativeAudit::default(),
        }
    }
}
