//! # FiberTools CLI
//!
//! Command-line front end for `fiber_core`: run any calculator, keep
//! persistent row counters, generate stripe patterns.
//!
//! Logs go to stderr (`RUST_LOG` or `--verbose`); results go to stdout.

mod cli;

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fiber_core::settings::Settings;

use cli::calc::{CalcArgs, FieldsArgs};
use cli::consent::ConsentArgs;
use cli::counter::CounterArgs;
use cli::stripes::StripesArgs;
use cli::tools::{RouteArgs, ToolArgs, ToolsArgs};
use cli::Context;

const APP_DIR: &str = "fibertools";

/// FiberTools - calculators for knitting, crochet, weaving, spinning and cross-stitch
#[derive(Parser, Debug)]
#[command(name = "fibertools", author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file (default: <config dir>/fibertools/config.toml)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Where counters and consent are stored
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tools
    Tools(ToolsArgs),
    /// Show one tool and related tools
    Tool(ToolArgs),
    /// Run a calculator
    Calc(CalcArgs),
    /// List a calculator's input fields
    Fields(FieldsArgs),
    /// Stitch and row counters
    Counter(CounterArgs),
    /// Generate a stripe pattern
    Stripes(StripesArgs),
    /// Cookie consent record
    Consent(ConsentArgs),
    /// Resolve a URL path to a page
    Route(RouteArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn config_path(cli: &Cli) -> Option<PathBuf> {
    cli.config
        .clone()
        .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml")))
}

/// `--data-dir`, then the settings file, then the platform data directory
fn data_dir(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    cli.data_dir
        .clone()
        .or_else(|| settings.data_dir.clone())
        .or_else(|| dirs::data_dir().map(|dir| dir.join(APP_DIR)))
        .context("Could not determine a data directory; pass --data-dir")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match config_path(&cli) {
        Some(path) => Settings::load(&path).with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let ctx = Context {
        data_dir: data_dir(&cli, &settings)?,
        settings,
    };
    tracing::debug!(data_dir = %ctx.data_dir.display(), "starting");

    match cli.command {
        Command::Tools(args) => cli::tools::run_list(args),
        Command::Tool(args) => cli::tools::run_show(args),
        Command::Calc(args) => cli::calc::run(&ctx, args),
        Command::Fields(args) => cli::calc::run_fields(&ctx, args),
        Command::Counter(args) => cli::counter::run(&ctx, args),
        Command::Stripes(args) => cli::stripes::run(&ctx, args),
        Command::Consent(args) => cli::consent::run(&ctx, args),
        Command::Route(args) => cli::tools::run_route(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cli::counter::CounterCommand;

    #[test]
    fn test_parse_calc() {
        let cli = Cli::try_parse_from([
            "fibertools",
            "calc",
            "gauge-calculator",
            "--set",
            "pattern_stitches=22",
            "--set",
            "your_stitches=20",
            "--metric",
        ])
        .unwrap();
        match cli.command {
            Command::Calc(args) => {
                assert_eq!(args.slug, "gauge-calculator");
                assert_eq!(args.set.len(), 2);
                assert_eq!(args.set[0].field, "pattern_stitches");
                assert!(args.metric);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_counter_global_flags() {
        let cli = Cli::try_parse_from(["fibertools", "counter", "inc", "Sleeve", "--data-dir", "/tmp/ft", "-v"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/ft")));
        match cli.command {
            Command::Counter(args) => assert!(matches!(args.command, CounterCommand::Inc { .. })),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_counter_set() {
        let cli = Cli::try_parse_from(["fibertools", "counter", "set", "Yoke", "--target", "40"]).unwrap();
        match cli.command {
            Command::Counter(args) => match args.command {
                CounterCommand::Set { options, .. } => {
                    assert_eq!(options.target, Some(40));
                    assert_eq!(options.step, None);
                    assert_eq!(options.remind_every, None);
                }
                other => panic!("unexpected command {:?}", other),
            },
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["fibertools", "counter", "set", "Yoke", "--target", "40", "--no-target"]).is_err());
    }

    #[test]
    fn test_parse_stripes() {
        let cli = Cli::try_parse_from([
            "fibertools",
            "stripes",
            "--total",
            "40",
            "--color",
            "Navy:3",
            "--color",
            "Cream",
            "--weighted",
            "--seed",
            "7",
        ])
        .unwrap();
        match cli.command {
            Command::Stripes(args) => {
                assert_eq!(args.total, 40);
                assert_eq!(args.color.len(), 2);
                assert_eq!(args.color[0].weight, 3.0);
                assert_eq!(args.seed, Some(7));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_bad_assignment_rejected() {
        assert!(Cli::try_parse_from(["fibertools", "calc", "gauge-calculator", "--set", "oops"]).is_err());
        assert!(Cli::try_parse_from(["fibertools", "stripes", "--total", "10"]).is_err());
    }

    #[test]
    fn test_settings_data_dir_used_without_flag() {
        let cli = Cli::try_parse_from(["fibertools", "tools"]).unwrap();
        let settings = Settings {
            data_dir: Some(PathBuf::from("/srv/fiber")),
            ..Settings::default()
        };
        assert_eq!(data_dir(&cli, &settings).unwrap(), PathBuf::from("/srv/fiber"));
    }
}
