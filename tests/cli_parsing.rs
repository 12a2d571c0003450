use adloop::cli::commands::config::ConfigCommands;
use adloop::cli::{Cli, Commands};
use adloop::domain::models::{ResultField, VisualAxis};
use adloop::services::PromptPreset;
use clap::Parser;

#[test]
fn test_parse_run_with_edits() {
    let cli = Cli::try_parse_from([
        "adloop",
        "run",
        "--mock",
        "--prompt",
        "A=Same framing, warmer lighting",
        "--preset",
        "B=punchy ad",
        "--regenerate",
        "A",
        "--auto-fix",
        "B",
        "--explore",
        "C",
        "--axes",
        "shot_type,camera_angle",
        "--adopt",
        "1",
        "--result",
        "B.spend=0",
        "--result",
        "B.revenue=500",
        "--winner",
        "B",
        "--submit",
    ])
    .expect("valid arguments");

    let Commands::Run(args) = cli.command else {
        panic!("Wrong top-level command");
    };
    assert!(args.mock);
    assert_eq!(
        args.prompts,
        vec![("A".to_string(), "Same framing, warmer lighting".to_string())]
    );
    assert_eq!(args.presets, vec![("B".to_string(), PromptPreset::PunchyAd)]);
    assert_eq!(args.regenerate, vec!["A"]);
    assert_eq!(args.auto_fix, vec!["B"]);
    assert_eq!(args.explore.as_deref(), Some("C"));
    assert_eq!(args.axes, vec![VisualAxis::ShotType, VisualAxis::CameraAngle]);
    assert_eq!(args.adopt, Some(1));
    assert_eq!(args.results.len(), 2);
    assert_eq!(args.results[1].field, ResultField::Revenue);
    assert_eq!(args.winner.as_deref(), Some("B"));
    assert!(args.submit);
    assert_eq!(args.retries, 1);
}

#[test]
fn test_adopt_requires_explore() {
    let result = Cli::try_parse_from(["adloop", "run", "--adopt", "0"]);
    assert!(result.is_err());
}

#[test]
fn test_unknown_axis_rejected() {
    let result = Cli::try_parse_from(["adloop", "run", "--axes", "hue"]);
    assert!(result.is_err());
}

#[test]
fn test_bad_result_edit_rejected() {
    let result = Cli::try_parse_from(["adloop", "run", "--result", "B.ctr=3"]);
    assert!(result.is_err());
}

#[test]
fn test_global_flags() {
    let cli = Cli::try_parse_from(["adloop", "health", "--json", "--config", "custom.yaml"])
        .expect("valid arguments");
    assert!(cli.json);
    assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("custom.yaml")));
    assert!(matches!(cli.command, Commands::Health(_)));
}

#[test]
fn test_parse_config_axes() {
    let cli = Cli::try_parse_from(["adloop", "config", "axes"]).expect("valid arguments");
    match cli.command {
        Commands::Config(args) => assert!(matches!(args.command, ConfigCommands::Axes)),
        _ => panic!("Wrong top-level command"),
    }
}
