//! Reconciling partial creative updates into the session's creative set.
//!
//! Image regeneration and guardrail auto-fix come from different remote
//! capabilities and own different fields:
//! - regeneration owns copy, image and spec; the merge only adds history
//! - auto-fix owns copy and the guardrail report; image, spec and history
//!   are kept from the creative being fixed
//!
//! Every merge touches exactly one creative, matched by `variant_id`.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::models::{Creative, CreativeAudit, CreativeSet, ExplorationGrid};
use crate::domain::ports::{GuardrailFix, InferredPatch};

/// Regeneration merge for a single creative.
///
/// The prior image and its timestamp become the one-step history; a prior
/// creative without a timestamp is stamped `now`.
pub fn merge_regeneration(
    existing: &Creative,
    updated: Creative,
    inferred: &InferredPatch,
    now: DateTime<Utc>,
) -> Creative {
    Creative {
        audit: CreativeAudit {
            timestamp: Some(now),
            previous_image_url: existing.image_url.clone(),
            previous_timestamp: Some(existing.audit.timestamp.unwrap_or(now)),
            changed_fields: inferred.changed_fields.clone(),
            spec_patch_used: Some(inferred.spec_patch.clone()),
        },
        ..updated
    }
}

/// Auto-fix merge for a single creative.
pub fn merge_guardrail_fix(existing: &Creative, fix: GuardrailFix) -> Creative {
    let changed_fields = fix.guardrails_report.fixed_issues.clone();
    Creative {
        variant_id: existing.variant_id.clone(),
        hook: fix.hook,
        primary_text: fix.primary_text,
        headline: fix.headline,
        call_to_action: fix.call_to_action,
        image_url: existing.image_url.clone(),
        image_status: existing.image_status,
        fibo_spec: existing.fibo_spec.clone(),
        guardrails_report: Some(fix.guardrails_report),
        audit: CreativeAudit {
            timestamp: existing.audit.timestamp,
            previous_image_url: existing.audit.previous_image_url.clone(),
            previous_timestamp: existing.audit.previous_timestamp,
            changed_fields,
            spec_patch_used: None,
        },
    }
}

/// Adopt an explored projection's image and spec onto its base creative.
///
/// Copy stays with the base; `changed_fields` lists the explored axes whose
/// value differs from the base spec.
pub fn merge_adoption(
    existing: &Creative,
    projection: &Creative,
    grid: &ExplorationGrid,
    now: DateTime<Utc>,
) -> Creative {
    let changed_fields = grid
        .axes_explored
        .axes()
        .filter(|axis| existing.fibo_spec.axis(*axis) != projection.fibo_spec.axis(*axis))
        .map(|axis| axis.as_str().to_string())
        .collect();

    Creative {
        image_url: projection.image_url.clone(),
        image_status: projection.image_status,
        fibo_spec: projection.fibo_spec.clone(),
        audit: CreativeAudit {
            timestamp: Some(now),
            previous_image_url: existing.image_url.clone(),
            previous_timestamp: Some(existing.audit.timestamp.unwrap_or(now)),
            changed_fields,
            spec_patch_used: None,
        },
        ..existing.clone()
    }
}

/// Apply a regeneration response to the set. Returns `false` when the
/// response names a variant the set does not hold.
pub fn apply_regeneration(
    creatives: &mut CreativeSet,
    updated: Creative,
    inferred: &InferredPatch,
    now: DateTime<Utc>,
) -> bool {
    let Some(existing) = creatives.get(&updated.variant_id) else {
        warn!(variant_id = %updated.variant_id, "regeneration response for unknown variant");
        return false;
    };
    let merged = merge_regeneration(existing, updated, inferred, now);
    creatives.upsert(merged);
    true
}

/// Apply an auto-fix response to the set.
pub fn apply_guardrail_fix(creatives: &mut CreativeSet, fix: GuardrailFix) -> bool {
    let Some(existing) = creatives.get(&fix.variant_id) else {
        warn!(variant_id = %fix.variant_id, "auto-fix response for unknown variant");
        return false;
    };
    let merged = merge_guardrail_fix(existing, fix);
    creatives.upsert(merged);
    true
}
