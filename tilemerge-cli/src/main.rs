//! tilemerge CLI - Command-line interface
//!
//! Commands:
//! - play: Play games with the search or scripted agent
//! - imitate: Train the learned agent on search-agent games, then play with it
//! - benchmark: Measure fixed-depth search throughput

mod benchmark;
mod imitate;
mod play_cmd;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use benchmark::BenchmarkArgs;
use imitate::ImitateArgs;
use play_cmd::PlayArgs;

#[derive(Parser)]
#[command(name = "tilemerge")]
#[command(about = "Adversarial search player for the 4x4 slide-and-merge puzzle")]
struct Cli {
    /// Random seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play games and report scores
    Play(PlayArgs),
    /// Learn from the search agent, then play with the learned agent
    Imitate(ImitateArgs),
    /// Benchmark the search at fixed depths
    Benchmark(BenchmarkArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize logging (RUST_LOG overrides, info by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Imitate(args) => imitate::run(args, cli.seed),
        Commands::Benchmark(args) => benchmark::run(args, cli.seed),
    }
}
