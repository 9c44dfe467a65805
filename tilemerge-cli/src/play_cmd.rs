//! Play command - run games with one agent and report the results
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_games(), report_results()
//! - Level 3: play_single_game(), compute_statistics()
//! - Level 4: config loading, RNG and formatting utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use tilemerge_core::{Agent, AlphaBetaAI, Board, CycleAgent, Game, SearchConfig};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Which agent plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    /// Alpha-beta search with iterative deepening
    Search,
    /// Scripted direction cycle
    Cycle,
}

#[derive(Args)]
pub struct PlayArgs {
    /// Agent to play with
    #[arg(long, value_enum, default_value = "search")]
    pub agent: AgentKind,

    /// Number of games to play
    #[arg(long, default_value = "1")]
    pub games: usize,

    /// Maximum agent moves per game
    #[arg(long, default_value = "100000")]
    pub max_moves: u32,

    /// Search config JSON file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the per-move search budget in milliseconds
    #[arg(long)]
    pub min_search_ms: Option<u64>,

    /// Override the search depth cap
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Print the final board of every game
    #[arg(long)]
    pub show_board: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
pub(crate) struct GameSummary {
    pub game_number: usize,
    pub seed: u64,
    pub score: u32,
    pub max_tile: u32,
    pub moves: u32,
    pub won: bool,
    pub final_board: Board,
}

/// Aggregated results over several games
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Statistics {
    pub games: usize,
    pub wins: usize,
    pub avg_score: f64,
    pub best_score: u32,
    pub best_tile: u32,
    pub avg_moves: f64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// This function reads like a table of contents:
/// 1. Resolve the search config
/// 2. Play the games
/// 3. Report results
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = load_search_config(args.config.as_deref(), args.min_search_ms, args.max_depth)?;

    tracing::info!(
        "Playing {} game(s) with {:?} agent (budget={}ms, depth cap={:?})",
        args.games,
        args.agent,
        config.min_search_time_ms,
        config.max_depth
    );

    let mut agent = create_agent(args.agent, &config);
    let games = play_games(agent.as_mut(), args.games, args.max_moves, seed)?;
    let stats = compute_statistics(&games);

    report_results(agent.name(), &games, &stats, args.json, args.show_board);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play `count` games, each from its own seed drawn from the master RNG
pub(crate) fn play_games(
    agent: &mut dyn Agent,
    count: usize,
    max_moves: u32,
    seed: Option<u64>,
) -> Result<Vec<GameSummary>> {
    let mut rng = create_rng(seed);
    let mut games = Vec::with_capacity(count);

    for game_number in 1..=count {
        let game_seed = rng.gen::<u64>();
        let summary = play_single_game(agent, game_number, game_seed, max_moves)?;

        tracing::info!(
            "Game {}: score {} (max tile {}, {} moves{})",
            summary.game_number,
            summary.score,
            summary.max_tile,
            summary.moves,
            if summary.won { ", won" } else { "" }
        );

        games.push(summary);
    }

    Ok(games)
}

/// Report results as text or JSON
pub(crate) fn report_results(
    agent_name: &str,
    games: &[GameSummary],
    stats: &Statistics,
    json: bool,
    show_board: bool,
) {
    if json {
        print_json_results(agent_name, games, stats);
    } else {
        print_text_results(agent_name, games, stats, show_board);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game to the end (or the move cap)
fn play_single_game(
    agent: &mut dyn Agent,
    game_number: usize,
    seed: u64,
    max_moves: u32,
) -> Result<GameSummary> {
    let mut game = Game::new(seed);
    let record = game
        .play(agent, max_moves)
        .with_context(|| format!("Game {} aborted", game_number))?;

    Ok(GameSummary {
        game_number,
        seed,
        score: record.score,
        max_tile: record.max_tile,
        moves: record.moves,
        won: record.won,
        final_board: *game.board(),
    })
}

/// Compute aggregate statistics from game summaries
pub(crate) fn compute_statistics(games: &[GameSummary]) -> Statistics {
    if games.is_empty() {
        return Statistics {
            games: 0,
            wins: 0,
            avg_score: 0.0,
            best_score: 0,
            best_tile: 0,
            avg_moves: 0.0,
        };
    }

    let count = games.len() as f64;
    let total_score: u64 = games.iter().map(|g| g.score as u64).sum();
    let total_moves: u64 = games.iter().map(|g| g.moves as u64).sum();

    Statistics {
        games: games.len(),
        wins: games.iter().filter(|g| g.won).count(),
        avg_score: total_score as f64 / count,
        best_score: games.iter().map(|g| g.score).max().unwrap_or(0),
        best_tile: games.iter().map(|g| g.max_tile).max().unwrap_or(0),
        avg_moves: total_moves as f64 / count,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Build the requested agent
fn create_agent(kind: AgentKind, config: &SearchConfig) -> Box<dyn Agent> {
    match kind {
        AgentKind::Search => Box::new(AlphaBetaAI::new(config.clone())),
        AgentKind::Cycle => Box::new(CycleAgent::new()),
    }
}

/// Config from file (or defaults) with command-line overrides applied
pub(crate) fn load_search_config(
    path: Option<&Path>,
    min_search_ms: Option<u64>,
    max_depth: Option<u32>,
) -> Result<SearchConfig> {
    let mut config = match path {
        Some(path) => SearchConfig::load(path)
            .with_context(|| format!("Failed to load search config: {}", path.display()))?,
        None => SearchConfig::default(),
    };

    if let Some(ms) = min_search_ms {
        config.min_search_time_ms = ms;
    }
    if let Some(depth) = max_depth {
        config.max_depth = Some(depth);
    }

    Ok(config)
}

/// Create RNG from seed or random
pub(crate) fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Print results as JSON
fn print_json_results(agent_name: &str, games: &[GameSummary], stats: &Statistics) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        seed: u64,
        score: u32,
        max_tile: u32,
        moves: u32,
        won: bool,
        final_board: Vec<u32>,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput<'a> {
        agent: &'a str,
        total_games: usize,
        wins: usize,
        win_rate: f64,
        avg_score: f64,
        best_score: u32,
        best_tile: u32,
        avg_moves: f64,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        agent: agent_name,
        total_games: stats.games,
        wins: stats.wins,
        win_rate: if stats.games > 0 {
            stats.wins as f64 / stats.games as f64
        } else {
            0.0
        },
        avg_score: stats.avg_score,
        best_score: stats.best_score,
        best_tile: stats.best_tile,
        avg_moves: stats.avg_moves,
        games: games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                seed: g.seed,
                score: g.score,
                max_tile: g.max_tile,
                moves: g.moves,
                won: g.won,
                final_board: g.final_board.cells().to_vec(),
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(
    agent_name: &str,
    games: &[GameSummary],
    stats: &Statistics,
    show_board: bool,
) {
    println!("\n=== Results ({}) ===", agent_name);
    println!("Total games: {}", stats.games);
    println!(
        "Wins:        {} ({:.1}%)",
        stats.wins,
        if stats.games > 0 {
            stats.wins as f64 / stats.games as f64 * 100.0
        } else {
            0.0
        }
    );
    println!("Avg score:   {:.1}", stats.avg_score);
    println!("Best score:  {}", stats.best_score);
    println!("Best tile:   {}", stats.best_tile);
    println!("Avg moves:   {:.1}", stats.avg_moves);

    println!("\nGame details:");
    for game in games {
        println!(
            "  Game {}: score {} / tile {} in {} moves (seed {})",
            game.game_number, game.score, game.max_tile, game.moves, game.seed
        );
        if show_board {
            print!("{}", game.final_board);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(
        game_number: usize,
        score: u32,
        max_tile: u32,
        moves: u32,
        won: bool,
    ) -> GameSummary {
        GameSummary {
            game_number,
            seed: game_number as u64,
            score,
            max_tile,
            moves,
            won,
            final_board: Board::empty(),
        }
    }

    #[test]
    fn test_compute_statistics_empty() {
        let stats = compute_statistics(&[]);
        assert_eq!(stats.games, 0);
        assert_eq!(stats.wins, 0);
        assert_eq!(stats.avg_score, 0.0);
        assert_eq!(stats.avg_moves, 0.0);
    }

    #[test]
    fn test_compute_statistics() {
        let games = vec![
            summary(1, 1000, 128, 100, false),
            summary(2, 3000, 256, 200, false),
            summary(3, 20000, 2048, 900, true),
        ];

        let stats = compute_statistics(&games);
        assert_eq!(stats.games, 3);
        assert_eq!(stats.wins, 1);
        assert_eq!(stats.avg_score, 8000.0);
        assert_eq!(stats.best_score, 20000);
        assert_eq!(stats.best_tile, 2048);
        assert_eq!(stats.avg_moves, 400.0);
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }

    #[test]
    fn test_config_overrides() {
        let config = load_search_config(None, Some(5), Some(2)).unwrap();
        assert_eq!(config.min_search_time_ms, 5);
        assert_eq!(config.max_depth, Some(2));

        let defaults = load_search_config(None, None, None).unwrap();
        assert_eq!(defaults, SearchConfig::default());
    }

    #[test]
    fn test_missing_config_file_has_context() {
        let err = load_search_config(Some(Path::new("/nonexistent/config.json")), None, None)
            .unwrap_err();
        assert!(err.to_string().contains("Failed to load search config"));
    }

    #[test]
    fn test_play_games_is_reproducible() {
        let mut a = CycleAgent::new();
        let mut b = CycleAgent::new();
        let first = play_games(&mut a, 2, 50, Some(9)).unwrap();
        let second = play_games(&mut b, 2, 50, Some(9)).unwrap();

        let scores = |games: &[GameSummary]| {
            games
                .iter()
                .map(|g| (g.seed, g.score))
                .collect::<Vec<_>>()
        };
        assert_eq!(scores(&first), scores(&second));
    }
}
