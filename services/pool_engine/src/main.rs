//! Pool Engine CLI
//!
//! Replays JSON scenarios against an in-process accounting engine and prints
//! one JSON line per step. With `--state`, pools, balances and names persist
//! between runs.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pool_config::{load_config, EngineConfig};
use pool_engine::{EngineState, Scenario, ScenarioRunner};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "pool_engine")]
#[command(about = "Constant-product pool accounting engine")]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scenario file
    Run {
        /// JSON scenario: a list of steps
        scenario: PathBuf,

        /// State file to resume from and save to (overrides the configured one)
        #[arg(short, long)]
        state: Option<PathBuf>,

        /// Print the final engine counters after the steps
        #[arg(long)]
        stats: bool,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

fn init_tracing(config: &EngineConfig) -> Result<()> {
    // Logs go to stderr so stdout stays pure JSON lines
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.global.log_level))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn run(config: &EngineConfig, scenario_path: PathBuf, state: Option<PathBuf>, stats: bool) -> Result<()> {
    let scenario = Scenario::load(&scenario_path)?;
    let state_file = state.or_else(|| config.global.state_file.clone());

    let mut runner = match &state_file {
        Some(path) if path.exists() => {
            info!("Resuming from state file {:?}", path);
            let state = EngineState::load(path)?;
            ScenarioRunner::from_state(config, state)
                .with_context(|| format!("State file {:?} is inconsistent", path))?
        }
        _ => ScenarioRunner::new(config),
    };

    let outcomes = runner.run(&scenario);
    for outcome in &outcomes {
        println!("{}", serde_json::to_string(outcome)?);
    }
    if stats {
        println!("{}", serde_json::to_string(&runner.engine().stats())?);
    }

    if let Some(path) = &state_file {
        runner.state().save(path)?;
    }

    let mismatched: Vec<usize> = outcomes
        .iter()
        .filter(|outcome| !outcome.matched)
        .map(|outcome| outcome.step)
        .collect();
    if !mismatched.is_empty() {
        warn!("{} of {} steps did not match expectations", mismatched.len(), outcomes.len());
        bail!("Steps {:?} did not match expectations", mismatched);
    }

    info!("Scenario {:?} completed: {} steps", scenario_path, outcomes.len());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_tracing(&config)?;

    match args.command {
        Command::Run {
            scenario,
            state,
            stats,
        } => run(&config, scenario, state, stats),
        Command::ShowConfig => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
