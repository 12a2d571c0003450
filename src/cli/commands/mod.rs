//! One module per subcommand: an `Args` struct and an `execute` entry point.

pub mod config;
pub mod health;
pub mod run;

use std::sync::Arc;

use anyhow::Result;

use crate::adapters::MockBackend;
use crate::domain::models::BackendConfig;
use crate::domain::ports::BackendGateway;
use crate::infrastructure::backend::HttpBackendGateway;

/// The HTTP gateway, or the in-process mock when `mock` is set.
pub(crate) fn build_gateway(config: &BackendConfig, mock: bool) -> Result<Arc<dyn BackendGateway>> {
    if mock {
        tracing::info!("using in-process mock backend");
        return Ok(Arc::new(MockBackend::new()));
    }
    Ok(Arc::new(HttpBackendGateway::new(config)?))
}
