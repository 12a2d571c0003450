//! `adloop config`: show the merged configuration and the explorable axes.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::display::{list_table, render_list};
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, VisualAxis};
use crate::services::AxisSelection;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration after all layers are merged
    Show,
    /// List visual axes and the values an exploration expands them to
    Axes,
}

#[derive(Debug, Serialize)]
pub struct ConfigShowOutput {
    #[serde(flatten)]
    pub config: Config,
    #[serde(skip)]
    rendered: String,
}

impl CommandOutput for ConfigShowOutput {
    fn to_human(&self) -> String {
        self.rendered.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct AxisEntry {
    pub axis: VisualAxis,
    pub label: &'static str,
    pub values: Vec<&'static str>,
    pub explored_by_default: bool,
}

#[derive(Debug, Serialize)]
pub struct AxesOutput {
    pub axes: Vec<AxisEntry>,
}

impl CommandOutput for AxesOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["Axis", "Label", "Values", "Explored"]);
        for entry in &self.axes {
            table.add_row(vec![
                entry.axis.as_str().to_string(),
                entry.label.to_string(),
                entry.values.join(", "),
                if entry.explored_by_default { "yes".to_string() } else { String::new() },
            ]);
        }
        render_list("axis", &table, self.axes.len())
    }
}

/// Axes listing, marking the ones the configured selection explores.
pub fn axes_output(config: &Config) -> Result<AxesOutput> {
    let explored = AxisSelection::from_config(&config.exploration)?.axes()?;
    Ok(AxesOutput {
        axes: VisualAxis::ALL
            .into_iter()
            .map(|axis| AxisEntry {
                axis,
                label: axis.label(),
                values: axis.explore_values().to_vec(),
                explored_by_default: explored.contains(&axis),
            })
            .collect(),
    })
}

pub async fn execute(args: ConfigArgs, config: &Config, json_mode: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let rendered =
                serde_yaml::to_string(config).context("Failed to render configuration")?;
            output(&ConfigShowOutput { config: config.clone(), rendered }, json_mode);
        }
        ConfigCommands::Axes => output(&axes_output(config)?, json_mode),
    }
    Ok(())
}
