pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use staffquote_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "staffquote",
    about = "Staffquote pricing CLI",
    long_about = "Price data-services engagements, score sustain criticality, auto-staff from a tech stack and freeze issued quotes.",
    after_help = "Examples:\n  staffquote quote --spec spec.json --json\n  staffquote quote --spec spec.json --snapshot issued.json --currency EUR\n  staffquote doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a specification and print the cost breakdown")]
    Quote {
        #[arg(long, help = "Specification JSON document")]
        spec: PathBuf,
        #[arg(long, help = "Rate catalog JSON document (overrides pricing.catalog_path)")]
        catalog: Option<PathBuf>,
        #[arg(long, help = "Snapshot of an issued quote; its rates shadow the live catalog")]
        snapshot: Option<PathBuf>,
        #[arg(long, help = "Display currency (defaults to pricing.default_currency)")]
        currency: Option<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Score the sustain criticality rubric and report the tier")]
    Score {
        #[arg(long, help = "Specification JSON document")]
        spec: PathBuf,
    },
    #[command(about = "Reconcile auto-staffing from the tech stack and print the profiles")]
    Staff {
        #[arg(long, help = "Specification JSON document")]
        spec: PathBuf,
    },
    #[command(about = "Price a specification and emit the snapshot to persist with the quote")]
    Snapshot {
        #[arg(long, help = "Specification JSON document")]
        spec: PathBuf,
        #[arg(long, help = "Rate catalog JSON document (overrides pricing.catalog_path)")]
        catalog: Option<PathBuf>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, catalog readability and the FX table")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Installs a stderr subscriber so stdout carries only command payloads.
pub fn init_logging(config: &AppConfig) -> anyhow::Result<()> {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Commands report config failures themselves; logging just stays off in that case.
    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        if let Err(error) = init_logging(&config) {
            eprintln!("{error:#}");
        }
    }

    let result = match cli.command {
        Command::Quote { spec, catalog, snapshot, currency, json } => {
            commands::quote::run(&commands::quote::QuoteArgs {
                spec,
                catalog,
                snapshot,
                currency,
                json,
            })
        }
        Command::Score { spec } => commands::score::run(&spec),
        Command::Staff { spec } => commands::staff::run(&spec),
        Command::Snapshot { spec, catalog } => {
            commands::snapshot::run(&spec, catalog.as_deref())
        }
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
