//! Imitate command - train the learned agent on search-agent games
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: record_demonstrations(), play_games()
//! - Level 3: demonstrate_single_game()
//! - Level 4: shared utilities from play_cmd

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rand::Rng;

use tilemerge_core::{Agent, AlphaBetaAI, Board, Direction, Game, ImitationAgent, SearchConfig};

use crate::play_cmd::{self, compute_statistics, create_rng, load_search_config, GameSummary};

#[derive(Args)]
pub struct ImitateArgs {
    /// Number of search-agent games to learn from
    #[arg(long, default_value = "3")]
    pub demo_games: usize,

    /// Number of games the learned agent plays afterwards
    #[arg(long, default_value = "3")]
    pub games: usize,

    /// Neighbours consulted per prediction
    #[arg(short = 'k', long, alias = "k", default_value = "5")]
    pub neighbours: usize,

    /// Maximum agent moves per game
    #[arg(long, default_value = "2000")]
    pub max_moves: u32,

    /// Search config JSON file for the demonstrating agent
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the per-move search budget in milliseconds
    #[arg(long, default_value = "10")]
    pub min_search_ms: u64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run imitate command
///
/// 1. Let the search agent play while the learner watches
/// 2. Let the learner play on its own
/// 3. Report both
pub fn run(args: ImitateArgs, seed: Option<u64>) -> Result<()> {
    let config = load_search_config(args.config.as_deref(), Some(args.min_search_ms), None)?;
    let mut rng = create_rng(seed);

    tracing::info!(
        "Recording {} demonstration game(s) with {}ms search budget",
        args.demo_games,
        config.min_search_time_ms
    );

    let mut learner = ImitationAgent::new(args.neighbours);
    let demos = record_demonstrations(
        &config,
        &mut learner,
        args.demo_games,
        args.max_moves,
        rng.gen(),
    )?;

    tracing::info!(
        "Learner observed {} moves over {} distinct positions",
        learner.sample_count(),
        learner.distinct_positions()
    );

    let learned =
        play_cmd::play_games(&mut learner, args.games, args.max_moves, Some(rng.gen()))?;

    play_cmd::report_results(
        "alpha-beta (demonstrations)",
        &demos,
        &compute_statistics(&demos),
        false,
        false,
    );
    play_cmd::report_results(
        learner.name(),
        &learned,
        &compute_statistics(&learned),
        false,
        false,
    );

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play `count` search-agent games, feeding every move to `learner`
pub(crate) fn record_demonstrations(
    config: &SearchConfig,
    learner: &mut ImitationAgent,
    count: usize,
    max_moves: u32,
    seed: u64,
) -> Result<Vec<GameSummary>> {
    let mut rng = create_rng(Some(seed));
    let mut demonstrator = AlphaBetaAI::new(config.clone());

    (1..=count)
        .map(|game_number| {
            let summary = demonstrate_single_game(
                &mut demonstrator,
                learner,
                game_number,
                rng.gen(),
                max_moves,
            )?;
            tracing::info!(
                "Demo game {}: score {} (max tile {}, {} moves)",
                summary.game_number,
                summary.score,
                summary.max_tile,
                summary.moves
            );
            Ok(summary)
        })
        .collect()
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn demonstrate_single_game(
    demonstrator: &mut AlphaBetaAI,
    learner: &mut ImitationAgent,
    game_number: usize,
    seed: u64,
    max_moves: u32,
) -> Result<GameSummary> {
    let mut game = Game::new(seed);
    let record = game
        .play_observed(demonstrator, max_moves, &mut |board: &Board, direction: Direction| {
            learner.learn_from_observed_move(board, direction)
        })
        .with_context(|| format!("Demonstration game {} aborted", game_number))?;

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
