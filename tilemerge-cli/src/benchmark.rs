//! Benchmark command - fixed-depth search throughput
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: sample_positions(), run_search_benchmarks(), report_results()
//! - Level 3: benchmark_depth()
//! - Level 4: timing utilities, formatting

use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Args;
use rand::Rng;

use tilemerge_core::ai::ROOT_WINDOW;
use tilemerge_core::{search, Board, CycleAgent, EvalWeights, Game};

use crate::play_cmd::create_rng;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BenchmarkArgs {
    /// Deepest search depth to time (every depth from 0 up is run)
    #[arg(long, default_value = "3")]
    pub depth: u32,

    /// Number of sampled positions searched per depth
    #[arg(long, default_value = "20")]
    pub positions: usize,

    /// Scripted moves played before a position is sampled
    #[arg(long, default_value = "40")]
    pub warmup_moves: u32,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Timing of one depth over all sampled positions
#[derive(Clone, Debug)]
struct BenchmarkResult {
    depth: u32,
    searches: usize,
    total_time: Duration,
    positions: u64,
    cutoffs: u64,
    nodes_per_second: f64,
}

/// All benchmark results
#[derive(Clone, Debug)]
struct AllResults {
    results: Vec<BenchmarkResult>,
    system_info: String,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run benchmark command
///
/// 1. Sample midgame positions
/// 2. Search each one at every depth up to the maximum
/// 3. Report all results
pub fn run(args: BenchmarkArgs, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Starting benchmarks: {} positions, depths 0..={}",
        args.positions,
        args.depth
    );

    let boards = sample_positions(args.positions, args.warmup_moves, seed)?;
    let all_results = AllResults {
        results: run_search_benchmarks(&boards, args.depth, &EvalWeights::default()),
        system_info: get_system_info(),
    };

    report_results(&all_results, &args);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play the scripted agent from seeded games and keep the reached positions
fn sample_positions(count: usize, warmup_moves: u32, seed: Option<u64>) -> Result<Vec<Board>> {
    let mut rng = create_rng(seed);
    let mut boards = Vec::with_capacity(count);

    for _ in 0..count {
        let mut game = Game::new(rng.gen());
        let mut agent = CycleAgent::new();
        game.play(&mut agent, warmup_moves)?;

        // Finished games have nothing to search
        if game.is_over() || game.is_won() {
            tracing::debug!("Skipping finished sample after {} moves", game.moves());
            continue;
        }
        boards.push(*game.board());
    }

    if boards.len() < count {
        tracing::warn!("Only {} of {} sampled positions are playable", boards.len(), count);
    }

    Ok(boards)
}

/// Time every depth from 0 to `max_depth`
fn run_search_benchmarks(
    boards: &[Board],
    max_depth: u32,
    weights: &EvalWeights,
) -> Vec<BenchmarkResult> {
    (0..=max_depth)
        .map(|depth| {
            tracing::info!("Benchmarking alpha-beta at depth {}...", depth);
            benchmark_depth(boards, depth, weights)
        })
        .collect()
}

/// Report all benchmark results
fn report_results(results: &AllResults, args: &BenchmarkArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Search every board once at `depth` with the root window
fn benchmark_depth(boards: &[Board], depth: u32, weights: &EvalWeights) -> BenchmarkResult {
    let mut positions = 0;
    let mut cutoffs = 0;

    let start = Instant::now();
    for board in boards {
        let result = search(board, depth, -ROOT_WINDOW, ROOT_WINDOW, 0, 0, weights);
        positions += result.positions;
        cutoffs += result.cutoffs;
    }
    let total_time = start.elapsed();

    BenchmarkResult {
        depth,
        searches: boards.len(),
        total_time,
        positions,
        cutoffs,
        nodes_per_second: per_second(positions, total_time),
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn per_second(count: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        count as f64 / secs
    } else {
        0.0
    }
}

/// Get system information string
fn get_system_info() -> String {
    format!(
        "tilemerge {}, {} CPUs",
        env!("CARGO_PKG_VERSION"),
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1)
    )
}

/// Format duration for display
fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 60 {
        format!(
            "{}m {:.1}s",
            d.as_secs() / 60,
            (d.as_secs() % 60) as f64 + d.subsec_millis() as f64 / 1000.0
        )
    } else if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.1}us", d.as_secs_f64() * 1_000_000.0)
    }
}

/// Print results as JSON
fn print_json_results(results: &AllResults) {
    #[derive(serde::Serialize)]
    struct JsonBenchmark {
        depth: u32,
        searches: usize,
        total_time_ms: f64,
        positions: u64,
        cutoffs: u64,
        nodes_per_second: f64,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        system_info: String,
        benchmarks: Vec<JsonBenchmark>,
    }

    let output = JsonOutput {
        system_info: results.system_info.clone(),
        benchmarks: results
            .results
            .iter()
            .map(|r| JsonBenchmark {
                depth: r.depth,
                searches: r.searches,
                total_time_ms: r.total_time.as_secs_f64() * 1000.0,
                positions: r.positions,
                cutoffs: r.cutoffs,
                nodes_per_second: r.nodes_per_second,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text table
fn print_text_results(results: &AllResults) {
    println!("\n=== Search Benchmark Results ===");
    println!("System: {}\n", results.system_info);

    println!(
        "{:<8} {:>9} {:>12} {:>12} {:>10} {:>14}",
        "Depth", "Searches", "Total Time", "Positions", "Cutoffs", "Positions/s"
    );
    println!("{}", "-".repeat(70));

    for r in &results.results {
        println!(
            "{:<8} {:>9} {:>12} {:>12} {:>10} {:>14.0}",
            r.depth,
            r.searches,
            format_duration(r.total_time),
            r.positions,
            r.cutoffs,
            r.nodes_per_second
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert!(format_duration(Duration::from_micros(50)).contains("us"));
        assert!(format_duration(Duration::from_millis(500)).contains("ms"));
        assert!(format_duration(Duration::from_secs(5)).contains("s"));
        assert!(format_duration(Duration::from_secs(90)).contains("m"));
    }

    #[test]
    fn test_per_second_handles_zero_elapsed() {
        assert_eq!(per_second(100, Duration::ZERO), 0.0);
        assert_eq!(per_second(100, Duration::from_secs(2)), 50.0);
    }

    #[test]
    fn test_sampled_positions_are_playable() {
        let boards = sample_positions(5, 10, Some(42)).unwrap();
        assert!(!boards.is_empty());
        assert!(boards.iter().all(|b| b.moves_available()));
    }

    #[test]
    fn test_sampling_is_reproducible() {
        let a = sample_positions(3, 15, Some(7)).unwrap();
        let b = sample_positions(3, 15, Some(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_deeper_search_visits_more_positions() {
        let boards = sample_positions(3, 10, Some(1)).unwrap();
        let results = run_search_benchmarks(&boards, 1, &EvalWeights::default());

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].depth, 0);
        assert_eq!(results[0].searches, boards.len());
        assert!(results[0].positions > 0);
        assert!(results[1].positions > results[0].positions);
    }

    #[test]
    fn test_get_system_info() {
        let info = get_system_info();
        assert!(info.contains("tilemerge"));
        assert!(info.contains("CPUs"));
    }
}
