//! Structured visual parameters (`fibo_spec`) and the axes they range over.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named visual dimension with a small enumerated set of explorable values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualAxis {
    LightingStyle,
    ColorPalette,
    BackgroundType,
    ShotType,
    CameraAngle,
    SubjectDistance,
}

impl VisualAxis {
    /// Every axis, in display order.
    pub const ALL: [Self; 6] = [
        Self::LightingStyle,
        Self::ColorPalette,
        Self::BackgroundType,
        Self::ShotType,
        Self::CameraAngle,
        Self::SubjectDistance,
    ];

    /// Axes explored when the operator has not enabled advanced configuration.
    pub const DEFAULT_EXPLORATION: [Self; 3] =
        [Self::LightingStyle, Self::ColorPalette, Self::BackgroundType];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LightingStyle => "lighting_style",
            Self::ColorPalette => "color_palette",
            Self::BackgroundType => "background_type",
            Self::ShotType => "shot_type",
            Self::CameraAngle => "camera_angle",
            Self::SubjectDistance => "subject_distance",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LightingStyle => "Lighting",
            Self::ColorPalette => "Palette",
            Self::BackgroundType => "Background",
            Self::ShotType => "Shot Type",
            Self::CameraAngle => "Camera Angle",
            Self::SubjectDistance => "Subject Dist.",
        }
    }

    /// The full domain an exploration expands this axis to.
    pub const fn explore_values(self) -> &'static [&'static str] {
        match self {
            Self::LightingStyle => &["warm", "cool"],
            Self::ColorPalette => &["warm_golden", "pastel"],
            Self::BackgroundType => &["studio", "natural"],
            Self::ShotType => &["product_only", "lifestyle"],
            Self::CameraAngle => &["eye_level", "high_angle"],
            Self::SubjectDistance => &["close", "medium"],
        }
    }
}

impl fmt::Display for VisualAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisualAxis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|axis| axis.as_str() == s.trim())
            .ok_or_else(|| format!("unknown visual axis: {s}"))
    }
}

/// Opaque mapping of named axes to the values an image was generated with.
///
/// The service may add keys beyond the six known axes (e.g. `prompt`), so
/// values are kept as raw JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiboSpec(BTreeMap<String, serde_json::Value>);

impl FiboSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(serde_json::Value::as_str)
    }

    pub fn axis(&self, axis: VisualAxis) -> Option<&str> {
        self.get_str(axis.as_str())
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), serde_json::Value::String(value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// This spec with every field of `patch` laid over it.
    pub fn overlaid_with(&self, patch: &SpecPatch) -> Self {
        let mut merged = self.clone();
        for (key, value) in patch.entries() {
            merged.set(key, value);
        }
        merged
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FiboSpec {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut spec = Self::new();
        for (k, v) in iter {
            spec.set(k, v);
        }
        spec
    }
}

/// Partial override of a creative's visual spec sent with a regeneration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lighting_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shot_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_angle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_distance: Option<String>,
}

impl SpecPatch {
    pub fn set_axis(&mut self, axis: VisualAxis, value: impl Into<String>) {
        let slot = match axis {
            VisualAxis::LightingStyle => &mut self.lighting_style,
            VisualAxis::ColorPalette => &mut self.color_palette,
            VisualAxis::BackgroundType => &mut self.background_type,
            VisualAxis::ShotType => &mut self.shot_type,
            VisualAxis::CameraAngle => &mut self.camera_angle,
            VisualAxis::SubjectDistance => &mut self.subject_distance,
        };
        *slot = Some(value.into());
    }

    pub fn axis(&self, axis: VisualAxis) -> Option<&str> {
        match axis {
            VisualAxis::LightingStyle => self.lighting_style.as_deref(),
            VisualAxis::ColorPalette => self.color_palette.as_deref(),
            VisualAxis::BackgroundType => self.background_type.as_deref(),
            VisualAxis::ShotType => self.shot_type.as_deref(),
            VisualAxis::CameraAngle => self.camera_angle.as_deref(),
            VisualAxis::SubjectDistance => self.subject_distance.as_deref(),
        }
    }

    /// Populated fields as `(key, value)` pairs, `prompt` first.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(prompt) = self.prompt.as_deref() {
            out.push(("prompt", prompt));
        }
        for axis in VisualAxis::ALL {
            if let Some(value) = self.axis(axis) {
                out.push((axis.as_str(), value));
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}
