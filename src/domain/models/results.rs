//! Operator-entered performance rows, their derived metrics, and the
//! recommendation produced from them.

use serde::{Deserialize, Serialize};

use super::plan::PlanVariant;

/// Raw counters for one plan variant, editable by the operator.
///
/// Values are not validated: negative input is kept as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub variant_id: String,
    pub impressions: f64,
    pub clicks: f64,
    pub conversions: f64,
    pub spend: f64,
    pub revenue: f64,
}

/// Editable counter of a [`ResultRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultField {
    Impressions,
    Clicks,
    Conversions,
    Spend,
    Revenue,
}

impl std::str::FromStr for ResultField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "impressions" => Ok(Self::Impressions),
            "clicks" => Ok(Self::Clicks),
            "conversions" => Ok(Self::Conversions),
            "spend" => Ok(Self::Spend),
            "revenue" => Ok(Self::Revenue),
            other => Err(format!("unknown result field: {other}")),
        }
    }
}

impl ResultRow {
    /// Store a raw operator value, coerced with [`coerce_number`].
    pub fn set(&mut self, field: ResultField, raw: &str) {
        let value = coerce_number(raw);
        match field {
            ResultField::Impressions => self.impressions = value,
            ResultField::Clicks => self.clicks = value,
            ResultField::Conversions => self.conversions = value,
            ResultField::Spend => self.spend = value,
            ResultField::Revenue => self.revenue = value,
        }
    }
}

/// Coerce free-text input to a number; empty, invalid or non-finite input
/// becomes 0.
pub fn coerce_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// A row with its derived financial metrics, as submitted to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantResult {
    pub variant_id: String,
    pub impressions: f64,
    pub clicks: f64,
    pub conversions: f64,
    pub spend: f64,
    pub revenue: f64,
    pub profit: f64,
    pub cac: f64,
    pub roas: f64,
}

/// Body of a results submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSubmission {
    pub experiment_id: String,
    pub winner_variant_id: String,
    pub results: Vec<VariantResult>,
}

/// Server-issued next-round recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub experiment_id: Option<String>,
    pub summary: String,
    #[serde(default)]
    pub recommended_variants: Vec<PlanVariant>,
}
