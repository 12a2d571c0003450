//! Keyword-based prompt inference.
//!
//! A closed, ordered rule set: the first rule whose keyword occurs anywhere
//! in the prompt (case-insensitive) wins and the rest are skipped.

use crate::domain::models::{SpecPatch, VisualAxis};
use crate::domain::ports::{InferredPatch, PatchInferer};

struct Rule {
    keywords: &'static [&'static str],
    sets: [(VisualAxis, &'static str); 2],
}

const RULES: [Rule; 4] = [
    Rule {
        keywords: &["same framing", "lock"],
        sets: [
            (VisualAxis::LightingStyle, "warm"),
            (VisualAxis::ColorPalette, "warm_golden"),
        ],
    },
    Rule {
        keywords: &["studio"],
        sets: [
            (VisualAxis::BackgroundType, "studio"),
            (VisualAxis::LightingStyle, "soft"),
        ],
    },
    Rule {
        keywords: &["lifestyle"],
        sets: [
            (VisualAxis::BackgroundType, "lifestyle"),
            (VisualAxis::LightingStyle, "warm"),
        ],
    },
    Rule {
        keywords: &["dramatic"],
        sets: [
            (VisualAxis::LightingStyle, "dramatic"),
            (VisualAxis::ColorPalette, "vibrant"),
        ],
    },
];

/// Default [`PatchInferer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordPatchInferer;

impl PatchInferer for KeywordPatchInferer {
    fn infer(&self, prompt: &str) -> InferredPatch {
        let mut out = InferredPatch::default();
        if prompt.is_empty() {
            return out;
        }

        out.spec_patch = SpecPatch {
            prompt: Some(prompt.to_string()),
            ..SpecPatch::default()
        };
        out.changed_fields.push("prompt".to_string());

        let lowered = prompt.to_lowercase();
        if let Some(rule) = RULES
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
        {
            for (axis, value) in rule.sets {
                out.spec_patch.set_axis(axis, value);
                out.changed_fields.push(axis.as_str().to_string());
            }
        }

        out
    }
}
