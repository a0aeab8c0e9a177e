use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use ssm_core::{ElapsedItem, Slotter, TimeSlots};
use tracing_subscriber::EnvFilter;

use ssm_cli::report::{self, IcingaSource, ReportOptions};
use ssm_cli::{Cli, Config};

/// Load the time slot file and build an empty registry from it.
fn load_slotter(config: &Config) -> Result<Slotter<ElapsedItem>> {
    let path = &config.time_slots;
    let slots = TimeSlots::load(path)
        .with_context(|| format!("failed to load time slots from {}", path.display()))?;
    slots
        .to_slotter()
        .with_context(|| format!("invalid time slots in {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr; stdout carries the report
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref(), &cli.overrides())
        .context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let slotter = load_slotter(&config)?;
    let source = IcingaSource::new(config.client_config()?)?;

    let options = ReportOptions {
        state: config.state,
        graphite_scheme: config.graphite_scheme().map(str::to_string),
        verbose: cli.verbose,
        table: cli.table,
    };

    let mut stdout = std::io::stdout().lock();
    report::run(&mut stdout, slotter, &source, &options, Utc::now().timestamp())
}
