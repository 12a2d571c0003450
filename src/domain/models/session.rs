//! Workflow session state shared by the controller and the liveness probe.

use serde::{Deserialize, Serialize};

/// Workflow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Snapshot,
    PlanAndCreatives,
    ResultsAndRecommendation,
}

impl Phase {
    /// 1-based step number, as shown to the operator.
    pub const fn step(self) -> u8 {
        match self {
            Self::Snapshot => 1,
            Self::PlanAndCreatives => 2,
            Self::ResultsAndRecommendation => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Snapshot => "Business snapshot",
            Self::PlanAndCreatives => "Plan & creatives",
            Self::ResultsAndRecommendation => "Results & next moves",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Reachability of the remote service as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Checking,
    Online,
    Offline,
}

/// Whether the remote service renders real images or placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    Live,
    #[default]
    Mocked,
}

/// Latest liveness observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendHealth {
    pub status: LinkStatus,
    pub mode: BackendMode,
}

impl BackendHealth {
    pub const fn online(mode: BackendMode) -> Self {
        Self { status: LinkStatus::Online, mode }
    }

    /// Offline keeps the last reported mode.
    pub const fn offline(self) -> Self {
        Self { status: LinkStatus::Offline, mode: self.mode }
    }

    pub const fn is_offline(self) -> bool {
        matches!(self.status, LinkStatus::Offline)
    }
}

/// Category of the error currently surfaced to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Service unreachable.
    Connectivity,
    /// Service answered with a failure.
    Request,
    /// Rejected locally before any call was made.
    Validation,
}

/// The single current error string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
    pub kind: ErrorKind,
    pub message: String,
}
