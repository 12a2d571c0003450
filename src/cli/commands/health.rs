//! `adloop health`: a single liveness probe.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tokio::sync::watch;

use super::build_gateway;
use crate::cli::display::{colorize_link, colorize_mode};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{BackendHealth, Config};
use crate::services::HealthMonitor;

#[derive(Args, Debug)]
pub struct HealthArgs {
    /// Probe the in-process mock backend instead of the configured URL
    #[arg(long)]
    pub mock: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthOutput {
    pub base_url: String,
    #[serde(flatten)]
    pub health: BackendHealth,
}

impl CommandOutput for HealthOutput {
    fn to_human(&self) -> String {
        format!(
            "Backend {}: {} ({})",
            self.base_url,
            colorize_link(self.health.status),
            colorize_mode(self.health.mode)
        )
    }
}

pub async fn execute(args: HealthArgs, config: &Config, json_mode: bool) -> Result<()> {
    let gateway = build_gateway(&config.backend, args.mock)?;
    let (health, _) = watch::channel(BackendHealth::default());
    let monitor = HealthMonitor::from_config(gateway, Arc::new(health), &config.backend);

    let health = monitor.probe_once().await;
    let base_url = if args.mock { "mock://backend".to_string() } else { config.backend.base_url.clone() };

    output(&HealthOutput { base_url, health }, json_mode);

    if health.is_offline() {
        anyhow::bail!("Backend is offline");
    }
    Ok(())
}
