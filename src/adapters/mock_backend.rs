//! In-process backend for dry runs and tests.
//!
//! Reproduces the remote service's mocked mode deterministically: template
//! copy, placeholder images, heuristic scores, cartesian exploration and a
//! max-profit recommendation. Failures can be injected per operation and
//! every call is recorded with its JSON payload.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::models::{
    BackendMode, BusinessSnapshot, Creative, CreativeAudit, ExperimentPlan, ExploreMeta,
    ExploreVariantsRequest, ExploreVariantsResponse, FiboSpec, GuardrailStatus, GuardrailsReport,
    Guardrails, ImageStatus, PlanVariant, Recommendation, ResultsSubmission, SampleSizeRule,
    Score, VisualAxis,
};
use crate::domain::ports::{
    ApplyGuardrailsRequest, BackendGateway, GatewayError, GatewayResult, GuardrailFix,
    HealthReport, RegenerateImageRequest,
};

const MOCK_BASE_URL: &str = "mock://backend";
const PLACEHOLDER_BASE: &str = "https://placehold.co/600x400/png?text=";

/// Operation of the backend contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayCall {
    CreatePlan,
    GenerateCreatives,
    ScoreCreatives,
    RegenerateImage,
    ApplyGuardrails,
    ExploreVariants,
    SubmitResults,
    CheckHealth,
}

/// One call received by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub call: GatewayCall,
    pub payload: serde_json::Value,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    failures: HashMap<GatewayCall, VecDeque<GatewayError>>,
    offline: bool,
    next_experiment: u32,
    regenerations: u32,
}

/// Deterministic stand-in for the remote service.
#[derive(Debug)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_experiment: 101,
                ..MockState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next call of `call` fail with `error`. Queued failures are
    /// consumed in order.
    pub fn fail_next(&self, call: GatewayCall, error: GatewayError) {
        self.state().failures.entry(call).or_default().push_back(error);
    }

    /// While offline every call fails as unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    pub fn calls_of(&self, call: GatewayCall) -> Vec<RecordedCall> {
        self.state().calls.iter().filter(|c| c.call == call).cloned().collect()
    }

    fn begin<T: Serialize + ?Sized>(&self, call: GatewayCall, payload: &T) -> GatewayResult<()> {
        let mut state = self.state();
        state.calls.push(RecordedCall {
            call,
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        });
        if state.offline {
            return Err(GatewayError::Unreachable { base_url: MOCK_BASE_URL.to_string() });
        }
        match state.failures.get_mut(&call).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BackendGateway for MockBackend {
    async fn create_plan(&self, snapshot: &BusinessSnapshot) -> GatewayResult<ExperimentPlan> {
        self.begin(GatewayCall::CreatePlan, snapshot)?;

        let product = snapshot.primary_product_name().unwrap_or("Product");
        let audience = snapshot.primary_segment().unwrap_or("General Audience");
        let experiment_id = {
            let mut state = self.state();
            let id = state.next_experiment;
            state.next_experiment += 1;
            format!("exp_{id}")
        };

        Ok(ExperimentPlan {
            experiment_id,
            objective: "Increase ROAS".to_string(),
            hypothesis: format!(
                "New creative variants targeting {audience} for {product} will outperform control"
            ),
            variants: vec![
                variant("A", true, "Control variant (Generic)".to_string()),
                variant("B", false, format!("Benefit-focused: {product} saves time")),
                variant("C", false, format!("Social Proof: {product} user reviews")),
            ],
            metrics: ["ctr", "cpc", "cvr", "roas", "net_profit"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            sample_size_rule: SampleSizeRule {
                min_spend_per_variant: 200.0,
                min_conversions: 50,
            },
            guardrails: Some(snapshot.guardrails.clone()),
        })
    }

    async fn generate_creatives(&self, plan: &ExperimentPlan) -> GatewayResult<Vec<Creative>> {
        self.begin(GatewayCall::GenerateCreatives, plan)?;
        Ok(plan
            .variants
            .iter()
            .enumerate()
            .map(|(idx, v)| template_creative(idx, v, plan.guardrails.as_ref()))
            .collect())
    }

    async fn score_creatives(&self, creatives: &[Creative]) -> GatewayResult<Vec<Score>> {
        self.begin(GatewayCall::ScoreCreatives, creatives)?;
        Ok(creatives.iter().map(heuristic_score).collect())
    }

    async fn regenerate_image(&self, request: &RegenerateImageRequest) -> GatewayResult<Creative> {
        self.begin(GatewayCall::RegenerateImage, request)?;
        let n = {
            let mut state = self.state();
            state.regenerations += 1;
            state.regenerations
        };

        let mut creative = request.variant.clone();
        creative.fibo_spec = creative.fibo_spec.overlaid_with(&request.spec_patch);
        creative.image_url = Some(format!(
            "{PLACEHOLDER_BASE}Regen+{}+{n}",
            creative.variant_id
        ));
        creative.image_status = Some(ImageStatus::Mocked);
        creative.audit = CreativeAudit::default();
        Ok(creative)
    }

    async fn apply_guardrails(
        &self,
        request: &ApplyGuardrailsRequest,
    ) -> GatewayResult<GuardrailFix> {
        self.begin(GatewayCall::ApplyGuardrails, request)?;
        Ok(auto_fix(&request.variant, &request.guardrails))
    }

    async fn explore_variants(
        &self,
        request: &ExploreVariantsRequest,
    ) -> GatewayResult<ExploreVariantsResponse> {
        self.begin(GatewayCall::ExploreVariants, request)?;

        let base = &request.base_variant;
        let generated: Vec<Creative> = cartesian(&request.axes.iter().cloned().collect::<Vec<_>>())
            .into_iter()
            .enumerate()
            .map(|(idx, combo)| {
                let mut copy = base.clone();
                copy.variant_id = format!("{}_explore_{}", base.variant_id, idx + 1);
                for (axis, value) in combo {
                    copy.fibo_spec.set(axis.as_str(), value);
                }
                copy.image_url = Some(format!("{PLACEHOLDER_BASE}{}", copy.variant_id));
                copy.image_status = Some(ImageStatus::Mocked);
                copy.audit = CreativeAudit::default();
                copy
            })
            .collect();

        Ok(ExploreVariantsResponse {
            base_variant_id: Some(base.variant_id.clone()),
            meta: ExploreMeta { count: generated.len(), runtime_ms: 0 },
            generated,
        })
    }

    async fn submit_results(&self, submission: &ResultsSubmission) -> GatewayResult<Recommendation> {
        self.begin(GatewayCall::SubmitResults, submission)?;

        let winner = submission
            .results
            .iter()
            .reduce(|best, r| if r.profit > best.profit { r } else { best })
            .ok_or_else(|| GatewayError::request(400, "No results provided"))?;

        Ok(Recommendation {
            experiment_id: Some(submission.experiment_id.clone()),
            summary: format!(
                "Variant {} was the clear winner with ${:.2} profit. We recommend iterating on its successful elements.",
                winner.variant_id, winner.profit
            ),
            recommended_variants: vec![
                variant("D", false, format!("Iterate on {} - Angle 1", winner.variant_id)),
                variant("E", false, format!("Iterate on {} - Angle 2", winner.variant_id)),
            ],
        })
    }

    async fn check_health(&self) -> GatewayResult<HealthReport> {
        self.begin(GatewayCall::CheckHealth, &())?;
        Ok(HealthReport { mode: BackendMode::Mocked })
    }
}

fn variant(id: &str, is_control: bool, description: String) -> PlanVariant {
    PlanVariant { variant_id: id.to_string(), is_control, description }
}

fn template_creative(idx: usize, plan_variant: &PlanVariant, guardrails: Option<&Guardrails>) -> Creative {
    let (hook, headline) = match plan_variant.variant_id.chars().last() {
        Some('A') => ("Stop scrolling!".to_string(), "The best solution.".to_string()),
        Some('B') => ("Tired of wasting time?".to_string(), "Save hours every day.".to_string()),
        Some('C') => (
            "See what everyone is talking about.".to_string(),
            "Rated 5 stars by thousands.".to_string(),
        ),
        _ => (format!("Discover {}", plan_variant.description), "Learn More".to_string()),
    };

    let mut primary_text = format!(
        "Experience the difference with our latest offering. {}.",
        plan_variant.description
    );
    let mut report = GuardrailsReport {
        status: GuardrailStatus::Pass,
        issues: Vec::new(),
        fixed_issues: Vec::new(),
    };

    if let Some(g) = guardrails {
        if !g.disclaimer.is_empty() && !primary_text.contains(&g.disclaimer) {
            primary_text.push(' ');
            primary_text.push_str(&g.disclaimer);
        }
        for term in g.required_terms.iter().filter(|t| !t.is_empty()) {
            if !text_blob(&primary_text, &headline, &hook).contains(&term.to_lowercase()) {
                primary_text.push_str(&format!(" {term}."));
            }
        }
        let blob = text_blob(&primary_text, &headline, &hook);
        for word in g.avoid_words.iter().filter(|w| !w.is_empty()) {
            if blob.contains(&word.to_lowercase()) {
                report.status = GuardrailStatus::NeedsFix;
                report.issues.push(format!("Avoided word found: '{word}'"));
            }
        }
    }

    let palettes = ["pastel", "vibrant", "neutral"];
    let mut spec: FiboSpec = [
        ("camera_angle", "medium"),
        ("shot_type", "product_only"),
        ("lighting_style", "warm"),
        ("color_palette", palettes[idx % palettes.len()]),
        ("background_type", "studio"),
    ]
    .into_iter()
    .collect();
    let desc = plan_variant.description.to_lowercase();
    if desc.contains("benefit") || desc.contains("saves time") {
        spec.set("shot_type", "product_in_use");
        spec.set("background_type", "lifestyle");
        spec.set("lighting_style", "bright");
    } else if desc.contains("social proof") || desc.contains("user reviews") {
        spec.set("shot_type", "people_with_product");
        spec.set("background_type", "testimonial");
        spec.set("lighting_style", "neutral");
    }

    Creative {
        variant_id: plan_variant.variant_id.clone(),
        hook,
        primary_text,
        headline,
        call_to_action: "Shop Now".to_string(),
        image_url: Some(format!("{PLACEHOLDER_BASE}Mock+Image+{}", plan_variant.variant_id)),
        image_status: Some(ImageStatus::Mocked),
        fibo_spec: spec,
        guardrails_report: Some(report),
        audit: CreativeAudit::default(),
    }
}

fn text_blob(primary_text: &str, headline: &str, hook: &str) -> String {
    format!("{primary_text} {headline} {hook}").to_lowercase()
}

fn heuristic_score(creative: &Creative) -> Score {
    let mut clarity: i32 = 4;
    let mut emotional: i32 = 3;
    match creative.fibo_spec.axis(VisualAxis::ShotType) {
        Some("product_only") => clarity += 2,
        Some("product_in_use") => clarity += 1,
        Some("people_with_product") => {
            clarity -= 1;
            emotional += 2;
        }
        _ => {}
    }
    match creative.fibo_spec.axis(VisualAxis::ColorPalette) {
        Some("vibrant") => emotional += 1,
        Some("neutral") => clarity += 1,
        _ => {}
    }
    if creative.image_status == Some(ImageStatus::Error) {
        clarity = 0;
        emotional = 0;
    }

    let feedback = if emotional < 4 {
        format!("Good clarity ({clarity}). Consider improving emotional resonance.")
    } else {
        "Strong emotional appeal!".to_string()
    };
    let clamp = |v: i32| u8::try_from(v.clamp(0, 10)).unwrap_or(0);

    Score {
        creative_id: creative.variant_id.clone(),
        clarity_of_promise: clamp(clarity),
        emotional_resonance: clamp(emotional),
        proof_and_credibility: 4,
        offer_and_risk_reversal: 4,
        call_to_action_score: 4,
        channel_fit: 4,
        curiosity_hook_factor: 3,
        overall_strength: f64::from(clarity + emotional) / 2.0 + 0.5,
        feedback,
    }
}

fn auto_fix(variant: &Creative, guardrails: &Guardrails) -> GuardrailFix {
    let mut primary_text = variant.primary_text.clone();
    let mut headline = variant.headline.clone();
    let mut hook = variant.hook.clone();
    let mut changed = Vec::new();

    if !guardrails.disclaimer.is_empty() && !primary_text.contains(&guardrails.disclaimer) {
        primary_text.push(' ');
        primary_text.push_str(&guardrails.disclaimer);
        changed.push("primary_text (disclaimer added)".to_string());
    }

    for term in guardrails.required_terms.iter().filter(|t| !t.is_empty()) {
        if !text_blob(&primary_text, &headline, &hook).contains(&term.to_lowercase()) {
            primary_text.push_str(&format!(" {term}."));
            changed.push(format!("primary_text (added '{term}')"));
        }
    }

    for word in guardrails.avoid_words.iter().filter(|w| !w.is_empty()) {
        for (name, field) in [
            ("primary_text", &mut primary_text),
            ("headline", &mut headline),
            ("hook", &mut hook),
        ] {
            if let Some(censored) = censor(field, word) {
                *field = censored;
                changed.push(format!("{name} (censored '{word}')"));
            }
        }
    }

    GuardrailFix {
        variant_id: variant.variant_id.clone(),
        hook,
        primary_text,
        headline,
        call_to_action: variant.call_to_action.clone(),
        guardrails_report: GuardrailsReport {
            status: GuardrailStatus::Pass,
            issues: Vec::new(),
            fixed_issues: changed,
        },
    }
}

/// Replace every case-insensitive occurrence of `word` with `***`.
/// `None` when nothing matched.
fn censor(text: &str, word: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    let mut hit = false;
    while let Some(ch) = rest.chars().next() {
        if let Some(len) = match_len(rest, word) {
            out.push_str("***");
            rest = &rest[len..];
            hit = true;
        } else {
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
    }
    hit.then_some(out)
}

/// Byte length of the prefix of `rest` equal to `word` under Unicode
/// lowercasing.
fn match_len(rest: &str, word: &str) -> Option<usize> {
    let mut needle = word.chars().flat_map(char::to_lowercase).peekable();
    needle.peek()?;
    let mut consumed = 0;
    for ch in rest.chars() {
        for lower in ch.to_lowercase() {
            if needle.next() != Some(lower) {
                return None;
            }
        }
        consumed += ch.len_utf8();
        if needle.peek().is_none() {
            return Some(consumed);
        }
    }
    None
}

/// Cartesian product with the first axis varying slowest.
fn cartesian(axes: &[(VisualAxis, Vec<String>)]) -> Vec<Vec<(VisualAxis, String)>> {
    if axes.is_empty() {
        return Vec::new();
    }
    let mut combos: Vec<Vec<(VisualAxis, String)>> = vec![Vec::new()];
    for (axis, values) in axes {
        combos = combos
            .into_iter()
            .flat_map(|prefix| {
                values.iter().map(move |v| {
                    let mut next = prefix.clone();
                    next.push((*axis, v.clone()));
                    next
                })
            })
            .collect();
    }
    combos
}
