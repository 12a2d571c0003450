//! Adloop CLI entry point.

use clap::Parser;

use adloop::cli::{handle_error, load_config, Cli, Commands};
use adloop::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let _logger = match LogConfig::from_settings(&config.logging).and_then(|c| LoggerImpl::init(&c)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Health(args) => adloop::cli::commands::health::execute(args, &config, cli.json).await,
        Commands::Run(args) => adloop::cli::commands::run::execute(args, &config, cli.json).await,
        Commands::Config(args) => adloop::cli::commands::config::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
