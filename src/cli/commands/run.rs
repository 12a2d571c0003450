//! `adloop run`: drive one experiment round end to end.
//!
//! Steps run in workflow order: plan, creatives, scoring, per-variant edits,
//! exploration, then results entry and submission. Remote steps that fail
//! are replayed from the retry cache up to `--retries` times.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Args;
use indicatif::ProgressBar;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use super::build_gateway;
use crate::cli::display::{
    colorize_link, colorize_mode, create_spinner, creatives_table, explored_table, heading,
    plan_table, results_table, ProgressBarExt,
};
use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::DomainResult;
use crate::domain::models::{
    BackendHealth, Config, Creative, ExperimentPlan, Phase, Recommendation, ResultField, Score,
    SnapshotDraft, VariantResult, VisualAxis,
};
use crate::services::results_calculator::derive_all;
use crate::services::{AxisSelection, HealthMonitor, PhaseController, PromptPreset};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML file with snapshot form values; stock values when omitted
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Use the in-process mock backend instead of the configured URL
    #[arg(long)]
    pub mock: bool,

    /// Skip creative scoring
    #[arg(long)]
    pub skip_scoring: bool,

    /// Prompt override for a variant's next regeneration
    #[arg(long = "prompt", value_name = "VARIANT=TEXT", value_parser = parse_assignment)]
    pub prompts: Vec<(String, String)>,

    /// Stock prompt override (product-shot, lifestyle, punchy-ad, lock-lighting)
    #[arg(long = "preset", value_name = "VARIANT=PRESET", value_parser = parse_preset)]
    pub presets: Vec<(String, PromptPreset)>,

    /// Regenerate a variant's image
    #[arg(long = "regenerate", value_name = "VARIANT")]
    pub regenerate: Vec<String>,

    /// Rewrite a variant's copy to satisfy the guardrails
    #[arg(long = "auto-fix", value_name = "VARIANT")]
    pub auto_fix: Vec<String>,

    /// Explore visual axes around a variant
    #[arg(long, value_name = "VARIANT")]
    pub explore: Option<String>,

    /// Axes to explore (1-3), overriding configuration
    #[arg(long, value_delimiter = ',', value_name = "AXIS")]
    pub axes: Vec<VisualAxis>,

    /// Adopt the explored variant at this index onto its base creative
    #[arg(long, value_name = "INDEX", requires = "explore")]
    pub adopt: Option<usize>,

    /// Performance figure for a variant, e.g. `B.spend=120`
    #[arg(long = "result", value_name = "VARIANT.FIELD=VALUE", value_parser = parse_result_edit)]
    pub results: Vec<ResultEdit>,

    /// Winning variant; defaults to the first plan variant
    #[arg(long, value_name = "VARIANT")]
    pub winner: Option<String>,

    /// Submit results and fetch the next-round recommendation
    #[arg(long)]
    pub submit: bool,

    /// How many times a failed backend call is replayed
    #[arg(long, default_value_t = 1)]
    pub retries: u32,

    /// Write the session export bundle to this path
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

impl RunArgs {
    fn enters_results(&self) -> bool {
        self.submit || !self.results.is_empty() || self.winner.is_some()
    }
}

/// One `--result` edit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultEdit {
    pub variant_id: String,
    pub field: ResultField,
    pub raw: String,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (variant, value) =
        s.split_once('=').ok_or_else(|| format!("expected VARIANT=VALUE, got '{s}'"))?;
    let variant = variant.trim();
    if variant.is_empty() {
        return Err(format!("missing variant in '{s}'"));
    }
    Ok((variant.to_string(), value.to_string()))
}

fn parse_preset(s: &str) -> Result<(String, PromptPreset), String> {
    let (variant, preset) = parse_assignment(s)?;
    Ok((variant, preset.parse()?))
}

fn parse_result_edit(s: &str) -> Result<ResultEdit, String> {
    let (target, raw) = parse_assignment(s)?;
    let (variant_id, field) = target
        .rsplit_once('.')
        .ok_or_else(|| format!("expected VARIANT.FIELD=VALUE, got '{s}'"))?;
    Ok(ResultEdit { variant_id: variant_id.to_string(), field: field.parse()?, raw })
}

#[derive(Debug, Serialize)]
pub struct ExploredOutput {
    pub base_variant_id: String,
    pub axes: Vec<VisualAxis>,
    pub variants: Vec<Creative>,
    pub adopted_index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub session_id: Uuid,
    pub phase: Phase,
    pub backend: BackendHealth,
    pub plan: Option<ExperimentPlan>,
    pub creatives: Vec<Creative>,
    pub scores: Vec<Score>,
    pub explored: Option<ExploredOutput>,
    pub results: Vec<VariantResult>,
    pub winner_variant_id: Option<String>,
    pub recommendation: Option<Recommendation>,
    pub exported_to: Option<PathBuf>,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let mut sections = vec![format!(
            "Session {} | step {}: {} | backend {} ({})",
            self.session_id,
            self.phase.step(),
            self.phase,
            colorize_link(self.backend.status),
            colorize_mode(self.backend.mode),
        )];

        if let Some(plan) = &self.plan {
            sections.push(format!(
                "{}\n{}\nHypothesis: {}\n{}",
                heading(&format!("Experiment {}", plan.experiment_id)),
                plan.objective,
                plan.hypothesis,
                plan_table(plan)
            ));
        }
        if !self.creatives.is_empty() {
            sections.push(format!(
                "{}\n{}",
                heading("Creatives"),
                creatives_table(&self.creatives, &self.scores)
            ));
        }
        if let Some(explored) = &self.explored {
            let adopted = explored
                .adopted_index
                .map_or_else(String::new, |i| format!("\nAdopted #{i} onto {}", explored.base_variant_id));
            sections.push(format!(
                "{}\n{}{adopted}",
                heading(&format!("Explored around {}", explored.base_variant_id)),
                explored_table(&explored.variants, &explored.axes)
            ));
        }
        if !self.results.is_empty() {
            sections.push(format!(
                "{}\n{}",
                heading("Results"),
                results_table(&self.results, self.winner_variant_id.as_deref())
            ));
        }
        if let Some(recommendation) = &self.recommendation {
            let next: Vec<&str> = recommendation
                .recommended_variants
                .iter()
                .map(|v| v.variant_id.as_str())
                .collect();
            sections.push(format!(
                "{}\n{}\nNext round: {}",
                heading("Recommendation"),
                recommendation.summary,
                if next.is_empty() { "-".to_string() } else { next.join(", ") }
            ));
        }
        if let Some(path) = &self.exported_to {
            sections.push(format!("Exported session to {}", path.display()));
        }

        sections.join("\n\n")
    }
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let draft = load_draft(args.snapshot.as_deref())?;
    let gateway = build_gateway(&config.backend, args.mock)?;

    let selection = if args.axes.is_empty() {
        AxisSelection::from_config(&config.exploration)?
    } else {
        AxisSelection::Advanced(args.axes.clone())
    };

    let mut controller = PhaseController::new(std::sync::Arc::clone(&gateway));
    controller.set_axis_selection(selection)?;

    let monitor = HealthMonitor::from_config(gateway, controller.health_channel(), &config.backend);
    let health = monitor.probe_once().await;
    controller.apply_health(health);
    if health.is_offline() {
        warn!("backend offline at start; image requests will be refused until it returns");
    }

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let monitor_handle = monitor.start_monitoring(shutdown_rx);

    let outcome = drive(&mut controller, draft, &args, json_mode).await;

    let _ = shutdown_tx.send(());
    if let Err(e) = monitor_handle.await {
        warn!(error = %e, "health monitor task ended abnormally");
    }

    let explored = outcome?;
    let exported_to = match &args.export {
        Some(path) => Some(write_export(&controller, path).await?),
        None => None,
    };

    let out = RunOutput {
        session_id: controller.session_id(),
        phase: controller.phase(),
        backend: controller.health(),
        plan: controller.plan().cloned(),
        creatives: controller.creatives().to_vec(),
        scores: controller.scores().to_vec(),
        explored,
        results: derive_all(controller.results()),
        winner_variant_id: controller.winner_variant_id().map(ToString::to_string),
        recommendation: controller.recommendation().cloned(),
        exported_to,
    };
    output(&out, json_mode);
    Ok(())
}

fn load_draft(path: Option<&Path>) -> Result<SnapshotDraft> {
    let Some(path) = path else {
        return Ok(SnapshotDraft::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot from {}", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse snapshot from {}", path.display()))
}

async fn drive(
    controller: &mut PhaseController,
    draft: SnapshotDraft,
    args: &RunArgs,
    json_mode: bool,
) -> Result<Option<ExploredOutput>> {
    let spinner = create_spinner("Creating experiment plan", json_mode);
    let first = controller.create_plan(draft.into_snapshot()).await;
    settle(controller, &spinner, "Experiment plan ready", first, args.retries).await?;

    let spinner = create_spinner("Generating creatives", json_mode);
    let first = controller.generate_creatives().await;
    settle(controller, &spinner, "Creatives generated", first, args.retries).await?;

    if !args.skip_scoring {
        let spinner = create_spinner("Scoring creatives", json_mode);
        let first = controller.score_creatives().await;
        settle(controller, &spinner, "Creatives scored", first, args.retries).await?;
    }

    for (variant_id, prompt) in &args.prompts {
        controller.set_prompt(variant_id, prompt.as_str())?;
    }
    for (variant_id, preset) in &args.presets {
        controller.apply_preset(variant_id, *preset)?;
        info!(variant_id = %variant_id, preset = preset.label(), "prompt preset applied");
    }

    for variant_id in &args.regenerate {
        let spinner = create_spinner(format!("Regenerating image for {variant_id}"), json_mode);
        let first = controller.regenerate_image(variant_id).await;
        let done = format!("Image regenerated for {variant_id}");
        settle(controller, &spinner, &done, first, args.retries).await?;
    }

    for variant_id in &args.auto_fix {
        let spinner = create_spinner(format!("Fixing guardrails for {variant_id}"), json_mode);
        let first = controller.auto_fix(variant_id).await;
        let done = format!("Guardrails fixed for {variant_id}");
        settle(controller, &spinner, &done, first, args.retries).await?;
    }

    let explored = match &args.explore {
        Some(variant_id) => Some(explore(controller, variant_id, args, json_mode).await?),
        None => None,
    };

    if args.enters_results() {
        controller.advance_to_results()?;
        for edit in &args.results {
            controller.edit_result(&edit.variant_id, edit.field, &edit.raw)?;
        }
        if let Some(winner) = &args.winner {
            controller.select_winner(winner)?;
        }
    }

    if args.submit {
        let spinner = create_spinner("Submitting results", json_mode);
        let first = controller.submit_results().await;
        settle(controller, &spinner, "Recommendation received", first, args.retries).await?;
    }

    Ok(explored)
}

async fn explore(
    controller: &mut PhaseController,
    variant_id: &str,
    args: &RunArgs,
    json_mode: bool,
) -> Result<ExploredOutput> {
    let spinner = create_spinner(format!("Exploring variations of {variant_id}"), json_mode);
    let first = controller.explore(variant_id).await;
    settle(controller, &spinner, "Exploration complete", first, args.retries).await?;

    let grid = controller
        .exploration()
        .ok_or_else(|| anyhow!("Exploration finished without a grid"))?;
    let explored = ExploredOutput {
        base_variant_id: grid.base_variant_id.clone(),
        axes: grid.axes_explored.axes().collect(),
        variants: grid.variants.clone(),
        adopted_index: args.adopt,
    };

    match args.adopt {
        Some(index) => controller.adopt_explored(index)?,
        None => controller.close_exploration(),
    }
    Ok(explored)
}

/// Resolve a remote step, replaying the cached call while attempts remain.
async fn settle(
    controller: &mut PhaseController,
    spinner: &ProgressBar,
    done: &str,
    first: DomainResult<()>,
    retries: u32,
) -> Result<()> {
    let mut result = first;
    let mut attempt = 0;
    loop {
        match result {
            Ok(()) => {
                spinner.finish_success(done);
                return Ok(());
            }
            Err(err) if attempt < retries && controller.pending_retry().is_some() => {
                attempt += 1;
                warn!(attempt, retries, error = %err, "replaying failed backend call");
                spinner.set_message(format!("Retrying ({attempt}/{retries}): {err}"));
                result = controller.retry().await;
            }
            Err(err) => {
                spinner.finish_error(err.to_string());
                return Err(err.into());
            }
        }
    }
}

async fn write_export(controller: &PhaseController, path: &Path) -> Result<PathBuf> {
    let json = controller.export().to_json_pretty().context("Failed to serialize export")?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    info!(path = %path.display(), "session exported");
    Ok(path.to_path_buf())
}
