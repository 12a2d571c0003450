//! Shapes axis-exploration requests.
//!
//! The operator chooses which axes vary; every chosen axis is expanded to its
//! complete value list. The service decides how many combinations it renders
//! and in what order.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AxisGrid, Creative, ExplorationConfig, ExploreVariantsRequest, VisualAxis};

/// Maximum number of axes explored at once.
pub const MAX_EXPLORED_AXES: usize = 3;

/// Which axes an exploration varies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AxisSelection {
    /// Lighting, palette and background.
    #[default]
    Default,
    /// Operator-chosen axes (advanced configuration).
    Advanced(Vec<VisualAxis>),
}

impl AxisSelection {
    /// Selection described by configuration.
    pub fn from_config(config: &ExplorationConfig) -> DomainResult<Self> {
        if !config.advanced {
            return Ok(Self::Default);
        }
        let axes = config
            .axes
            .iter()
            .map(|name| name.parse::<VisualAxis>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(DomainError::InvalidAxisSelection)?;
        Ok(Self::Advanced(axes))
    }

    /// The selected axes, deduplicated in first-seen order.
    pub fn axes(&self) -> DomainResult<Vec<VisualAxis>> {
        let chosen: &[VisualAxis] = match self {
            Self::Default => &VisualAxis::DEFAULT_EXPLORATION,
            Self::Advanced(axes) => axes,
        };

        let mut unique = Vec::with_capacity(chosen.len());
        for axis in chosen {
            if !unique.contains(axis) {
                unique.push(*axis);
            }
        }

        if unique.is_empty() || unique.len() > MAX_EXPLORED_AXES {
            return Err(DomainError::InvalidAxisSelection(format!(
                "select between 1 and {MAX_EXPLORED_AXES} distinct axes (got {})",
                unique.len()
            )));
        }
        Ok(unique)
    }
}

/// Build the exploration request for `base`.
pub fn build_request(
    base: &Creative,
    selection: &AxisSelection,
) -> DomainResult<ExploreVariantsRequest> {
    let mut axes = AxisGrid::new();
    for axis in selection.axes()? {
        axes.push(
            axis,
            axis.explore_values().iter().map(ToString::to_string).collect(),
        );
    }

    Ok(ExploreVariantsRequest {
        base_variant: base.clone(),
        axes,
    })
}
