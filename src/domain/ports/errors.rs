use thiserror::Error;

/// Failures crossing the backend service boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The service could not be reached at all.
    #[error(
        "Backend not reachable at {base_url}. Make sure the backend server is running and try again."
    )]
    Unreachable { base_url: String },

    /// The service did not answer within the configured timeout.
    #[error("Backend at {base_url} did not respond in time. Check that it is running and try again.")]
    Timeout { base_url: String },

    /// The service answered with a non-success status.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// The service answered with a body that does not match the contract.
    #[error("Unexpected response from backend: {0}")]
    Decode(String),
}

impl GatewayError {
    pub fn request(status: u16, message: impl Into<String>) -> Self {
        Self::Request { status, message: message.into() }
    }

    /// Connectivity failures also flip the liveness status to offline.
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Unreachable { .. } | Self::Timeout { .. })
    }
}
