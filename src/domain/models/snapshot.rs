//! Business snapshot: the operator-supplied context a plan is requested for.
//!
//! A snapshot is built once per planning attempt and never mutated; a new
//! attempt replaces it wholesale.

use serde::{Deserialize, Serialize};

/// A product being advertised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub margin: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub objections: Vec<String>,
}

/// An audience segment the experiment targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audience {
    pub id: String,
    pub segment: String,
    #[serde(default)]
    pub size_estimate: Option<u64>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub jobs_to_be_done: Vec<String>,
}

/// Brand and compliance constraints the creative copy must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guardrails {
    #[serde(default)]
    pub brand_voice: String,
    #[serde(default)]
    pub avoid_words: Vec<String>,
    #[serde(default)]
    pub required_terms: Vec<String>,
    #[serde(default)]
    pub disclaimer: String,
    #[serde(default)]
    pub prohibited_claims: Vec<String>,
    #[serde(default = "default_regulated_category")]
    pub regulated_category: String,
    #[serde(default = "default_channel")]
    pub target_channel: String,
}

fn default_regulated_category() -> String {
    "none".to_string()
}

fn default_channel() -> String {
    "Meta".to_string()
}

/// Immutable business context sent to plan creation.
///
/// `historical_performance` and `sales_data` are reserved slots; they are
/// always sent empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessSnapshot {
    pub products: Vec<Product>,
    pub audiences: Vec<Audience>,
    pub guardrails: Guardrails,
    #[serde(default)]
    pub historical_performance: Vec<serde_json::Value>,
    #[serde(default)]
    pub sales_data: Vec<serde_json::Value>,
}

impl BusinessSnapshot {
    /// Name of the first product, if any.
    pub fn primary_product_name(&self) -> Option<&str> {
        self.products.first().map(|p| p.name.as_str())
    }

    /// Segment of the first audience, if any.
    pub fn primary_segment(&self) -> Option<&str> {
        self.audiences.first().map(|a| a.segment.as_str())
    }
}

/// Raw operator form values a snapshot is drafted from.
///
/// Every field is free text; [`SnapshotDraft::into_snapshot`] applies the
/// fallbacks and list splitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotDraft {
    pub product_name: String,
    pub price: String,
    pub main_benefit: String,
    pub audience_segment: String,
    pub audience_pain: String,
    pub brand_voice: String,
    /// Comma-separated.
    pub avoid_words: String,
    /// Comma-separated.
    pub required_terms: String,
    pub disclaimer: String,
}

impl Default for SnapshotDraft {
    fn default() -> Self {
        Self {
            product_name: "Math Wars Meta DIY Kit".to_string(),
            price: "49".to_string(),
            main_benefit: "Turns math practice into a co-op board game".to_string(),
            audience_segment: "Parents of 7–12 year olds".to_string(),
            audience_pain: "Kids hate math homework".to_string(),
            brand_voice: "Playful, encouraging, educational".to_string(),
            avoid_words: "boring, difficult".to_string(),
            required_terms: "fun, family".to_string(),
            disclaimer: "Results may vary. Ages 7+.".to_string(),
        }
    }
}

impl SnapshotDraft {
    /// Build the snapshot sent to plan creation.
    pub fn into_snapshot(self) -> BusinessSnapshot {
        let product = Product {
            id: "product_1".to_string(),
            name: non_empty_or(&self.product_name, "Demo Product"),
            price: self.price.trim().parse::<f64>().ok().filter(|p| p.is_finite()).unwrap_or(0.0),
            margin: None,
            category: None,
            benefits: vec![non_empty_or(
                &self.main_benefit,
                "High-converting, AI-optimized offer",
            )],
            objections: vec!["Budget constraints".to_string()],
        };

        let audience = Audience {
            id: "audience_1".to_string(),
            segment: non_empty_or(&self.audience_segment, "General Audience"),
            size_estimate: Some(1_000_000),
            platform: Some("Meta".to_string()),
            pain_points: vec![non_empty_or(
                &self.audience_pain,
                "Current solutions are too expensive",
            )],
            jobs_to_be_done: vec![
                "Improve ROAS".to_string(),
                "Scale winners with less thrash".to_string(),
            ],
        };

        let guardrails = Guardrails {
            brand_voice: self.brand_voice,
            avoid_words: split_list(&self.avoid_words),
            required_terms: split_list(&self.required_terms),
            disclaimer: self.disclaimer,
            prohibited_claims: Vec::new(),
            regulated_category: default_regulated_category(),
            target_channel: default_channel(),
        };

        BusinessSnapshot {
            products: vec![product],
            audiences: vec![audience],
            guardrails,
            historical_performance: Vec::new(),
            sales_data: Vec::new(),
        }
    }
}

fn non_empty_or(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Split a comma-separated list, trimming entries and dropping empties.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
