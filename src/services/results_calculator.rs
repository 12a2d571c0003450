//! Result-row seeding and derived financial metrics.
//!
//! Both functions are pure. Seeding is a fixed placeholder distribution so
//! an operator can walk the submission flow without typing every counter.

use crate::domain::models::{PlanVariant, ResultRow, VariantResult};

const SEED_IMPRESSIONS: f64 = 10_000.0;
const SEED_SPEND: f64 = 300.0;

/// Default rows for a freshly loaded plan, one per variant in plan order.
pub fn seed_rows(variants: &[PlanVariant]) -> Vec<ResultRow> {
    variants
        .iter()
        .enumerate()
        .map(|(i, variant)| {
            #[allow(clippy::cast_precision_loss)]
            let i = i as f64;
            ResultRow {
                variant_id: variant.variant_id.clone(),
                impressions: SEED_IMPRESSIONS,
                clicks: 50.0f64.mul_add(i, 300.0),
                conversions: 5.0f64.mul_add(i, 20.0),
                spend: SEED_SPEND,
                revenue: 200.0f64.mul_add(i, 800.0),
            }
        })
        .collect()
}

/// Derive profit, CAC and ROAS for one row.
///
/// Division guards are the only checks: CAC is 0 without conversions and
/// ROAS is 0 without spend.
pub fn derive(row: &ResultRow) -> VariantResult {
    let profit = row.revenue - row.spend;
    let cac = if row.conversions > 0.0 { row.spend / row.conversions } else { 0.0 };
    let roas = if row.spend > 0.0 { row.revenue / row.spend } else { 0.0 };

    VariantResult {
        variant_id: row.variant_id.clone(),
        impressions: row.impressions,
        clicks: row.clicks,
        conversions: row.conversions,
        spend: row.spend,
        revenue: row.revenue,
        profit,
        cac,
        roas,
    }
}

pub fn derive_all(rows: &[ResultRow]) -> Vec<VariantResult> {
    rows.iter().map(derive).collect()
}
