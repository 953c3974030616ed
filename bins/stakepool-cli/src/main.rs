//! stakepool-cli: Command-line simulator for the staking pool.
//!
//! Replays JSON scenarios against an in-memory deployment and quotes
//! single-segment rewards.

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use stakepool_core::accrual::RewardAccrual;
use stakepool_engine::PoolConfig;

use crate::scenario::{Scenario, Simulation};

/// Pooled staking simulator.
#[derive(Parser)]
#[command(name = "stakepool-cli")]
#[command(version, about = "Simulate a pooled staking ledger.")]
struct Cli {
    /// Path to a TOML config file (default: <config dir>/stakepool/pool.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level filter. `RUST_LOG` takes precedence.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format: text or json.
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON scenario and print the report.
    Simulate(SimulateArgs),
    /// Reward for an amount held in a pool of constant size.
    Quote(QuoteArgs),
}

#[derive(Args)]
struct SimulateArgs {
    /// Scenario file.
    #[arg(short, long)]
    scenario: PathBuf,
}

#[derive(Args)]
struct QuoteArgs {
    /// Staked amount, base units.
    #[arg(short, long)]
    amount: u128,

    /// Pool total including the amount, base units.
    #[arg(short, long)]
    pool: u128,

    /// Holding period in seconds.
    #[arg(short, long)]
    seconds: u64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = PoolConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    config.validate().context("invalid configuration")?;
    init_logging(&config.log_level, &config.log_format);

    match cli.command {
        Commands::Simulate(args) => simulate(&config, args),
        Commands::Quote(args) => quote(&config, args),
    }
}

fn simulate(config: &PoolConfig, args: SimulateArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading {}", args.scenario.display()))?;
    let scenario = Scenario::from_json(&text)?;
    info!(path = %args.scenario.display(), steps = scenario.steps.len(), "replaying scenario");

    let report = Simulation::new(config, &scenario)?.run(&scenario.steps)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn quote(config: &PoolConfig, args: QuoteArgs) -> Result<()> {
    anyhow::ensure!(args.amount <= args.pool, "amount exceeds pool total");
    let accrual = RewardAccrual::new(config.reward_rate());
    let reward = accrual
        .segment_reward(args.amount, args.seconds, args.pool)
        .context("reward does not fit in 128 bits")?;
    println!("{reward}");
    Ok(())
}

fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_str));

    // Logs go to stderr; stdout carries the report.
    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
            .init();
    }
}
