//! Domain errors for the Adloop workflow.

use thiserror::Error;

use crate::domain::models::{ErrorKind, Phase};
use crate::domain::ports::GatewayError;

/// Errors surfaced by the workflow core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("No failed action to retry")]
    NoCachedAction,

    #[error("{action} is not available during the {phase} phase")]
    InvalidPhase { action: &'static str, phase: Phase },

    #[error("No experiment plan loaded")]
    NoPlan,

    #[error("Generate creatives before moving on")]
    NoCreatives,

    #[error("Variant {0} not found")]
    CreativeNotFound(String),

    #[error("Variant {0} is not part of the plan")]
    UnknownVariant(String),

    #[error("Invalid axis selection: {0}")]
    InvalidAxisSelection(String),

    #[error("Backend is offline; reconnect before requesting images")]
    BackendOffline,

    #[error("No exploration grid is open")]
    NoExplorationOpen,

    #[error("Explored variant {index} does not exist (grid holds {len})")]
    ExploredVariantOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl DomainError {
    /// How the error is presented: remote failures vs. local rejections.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Gateway(err) if err.is_connectivity() => ErrorKind::Connectivity,
            Self::Gateway(_) => ErrorKind::Request,
            _ => ErrorKind::Validation,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
