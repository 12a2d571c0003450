//! Table builders around comfy-table for the session views.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;

use super::colors::{colorize_guardrail, image_status_label};
use crate::cli::output::truncate;
use crate::domain::models::{score_for, Creative, ExperimentPlan, Score, VariantResult, VisualAxis};

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Render the table to string with a count header.
pub fn render_list(entity_name: &str, table: &Table, total: usize) -> String {
    if total == 0 {
        return format!("No {entity_name}s found.");
    }
    let noun = if total == 1 { entity_name.to_string() } else { format!("{entity_name}s") };
    format!("{} {noun}:\n{table}", style(total).bold())
}

pub fn plan_table(plan: &ExperimentPlan) -> String {
    let mut table = list_table(&["Variant", "Control", "Description"]);
    for variant in &plan.variants {
        table.add_row(vec![
            Cell::new(&variant.variant_id),
            Cell::new(if variant.is_control { "yes" } else { "" }),
            Cell::new(truncate(&variant.description, 60)),
        ]);
    }
    render_list("variant", &table, plan.variants.len())
}

/// Creatives with their guardrail state and overall score, when scored.
pub fn creatives_table(creatives: &[Creative], scores: &[Score]) -> String {
    let mut table = list_table(&["Variant", "Headline", "Image", "Guardrails", "Score"]);
    for creative in creatives {
        let guardrail = creative.guardrails_report.as_ref().map(|r| r.status);
        let score = score_for(scores, &creative.variant_id)
            .map_or_else(|| "-".to_string(), |s| format!("{:.1}", s.overall_strength));
        table.add_row(vec![
            Cell::new(&creative.variant_id),
            Cell::new(truncate(&creative.headline, 40)),
            Cell::new(image_status_label(creative.image_status)),
            Cell::new(colorize_guardrail(guardrail)),
            Cell::new(score).set_alignment(CellAlignment::Right),
        ]);
    }
    render_list("creative", &table, creatives.len())
}

pub fn results_table(results: &[VariantResult], winner: Option<&str>) -> String {
    let mut table =
        list_table(&["Variant", "Impr.", "Clicks", "Conv.", "Spend", "Revenue", "Profit", "CAC", "ROAS"]);
    for row in results {
        let id = if winner == Some(row.variant_id.as_str()) {
            format!("{} {}", row.variant_id, style("(winner)").green())
        } else {
            row.variant_id.clone()
        };
        table.add_row(vec![
            Cell::new(id),
            Cell::new(row.impressions),
            Cell::new(row.clicks),
            Cell::new(row.conversions),
            Cell::new(format!("${:.2}", row.spend)),
            Cell::new(format!("${:.2}", row.revenue)),
            Cell::new(format!("${:.2}", row.profit)),
            Cell::new(format!("${:.2}", row.cac)),
            Cell::new(format!("{:.2}x", row.roas)),
        ]);
    }
    render_list("result", &table, results.len())
}

/// Explored projections, indexed for adoption, with the value each varied
/// axis took.
pub fn explored_table(variants: &[Creative], axes: &[VisualAxis]) -> String {
    let mut headers = vec!["#", "Variant"];
    headers.extend(axes.iter().map(|axis| axis.label()));
    let mut table = list_table(&headers);

    for (index, variant) in variants.iter().enumerate() {
        let mut row = vec![Cell::new(index), Cell::new(&variant.variant_id)];
        row.extend(axes.iter().map(|axis| Cell::new(variant.fibo_spec.axis(*axis).unwrap_or("-"))));
        table.add_row(row);
    }
    render_list("explored variant", &table, variants.len())
}
