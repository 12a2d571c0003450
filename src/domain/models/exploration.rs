//! Axis exploration: request shape, response shape and the transient grid.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::creative::Creative;
use super::fibo::VisualAxis;

/// Ordered mapping of axis to the values explored along it.
///
/// Serialized as a JSON object whose key order is the selection order; the
/// service derives its combination order from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisGrid(Vec<(VisualAxis, Vec<String>)>);

impl AxisGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis with its values; an axis already present is left as is.
    pub fn push(&mut self, axis: VisualAxis, values: Vec<String>) {
        if !self.contains(axis) {
            self.0.push((axis, values));
        }
    }

    pub fn contains(&self, axis: VisualAxis) -> bool {
        self.0.iter().any(|(a, _)| *a == axis)
    }

    pub fn axes(&self) -> impl Iterator<Item = VisualAxis> + '_ {
        self.0.iter().map(|(a, _)| *a)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (VisualAxis, Vec<String>)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of combinations a full cartesian expansion would yield.
    pub fn combination_count(&self) -> usize {
        if self.0.is_empty() {
            return 0;
        }
        self.0.iter().map(|(_, values)| values.len()).product()
    }
}

impl Serialize for AxisGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (axis, values) in &self.0 {
            map.serialize_entry(axis.as_str(), values)?;
        }
        map.end()
    }
}

/// Body of an exploration call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExploreVariantsRequest {
    pub base_variant: Creative,
    pub axes: AxisGrid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploreMeta {
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub runtime_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreVariantsResponse {
    #[serde(default)]
    pub base_variant_id: Option<String>,
    pub generated: Vec<Creative>,
    #[serde(default)]
    pub meta: ExploreMeta,
}

/// Transient result of an exploration, alive while the panel is open.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorationGrid {
    pub base_variant_id: String,
    pub base_variant_name: String,
    /// The axis set that was sent, echoed verbatim.
    pub axes_explored: AxisGrid,
    pub variants: Vec<Creative>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_grid_serializes_in_selection_order() {
        let mut grid = AxisGrid::new();
        grid.push(VisualAxis::ShotType, vec!["product_only".into(), "lifestyle".into()]);
        grid.push(VisualAxis::LightingStyle, vec!["warm".into(), "cool".into()]);
        grid.push(VisualAxis::ShotType, vec!["ignored".into()]);

        let json = serde_json::to_string(&grid).expect("grid serializes");
        assert_eq!(
            json,
            r#"{"shot_type":["product_only","lifestyle"],"lighting_style":["warm","cool"]}"#
        );
        assert_eq!(grid.combination_count(), 4);
    }

    #[test]
    fn test_empty_grid_has_no_combinations() {
        assert_eq!(AxisGrid::new().combination_count(), 0);
    }
}
