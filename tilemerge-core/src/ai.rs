//! Alpha-beta AI: agent moves maximise, environment placements minimise
//! over a pruned set of worst-looking tiles, iterative deepening on top.

use std::time::Instant;

use rand_chacha::ChaCha8Rng;

use crate::agent::{Agent, AgentError};
use crate::board::{Board, Cell, Direction, Turn, SPAWN_VALUES};
use crate::config::SearchConfig;
use crate::eval::{evaluate, EvalWeights, WIN_SCORE, WIN_THRESHOLD};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Root window half-width for every deepening iteration
pub const ROOT_WINDOW: f64 = 10000.0;

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Outcome of one search call
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchResult {
    /// Best agent move; always None for environment nodes
    pub best_move: Option<Direction>,
    pub score: f64,
    /// Positions visited so far (diagnostic)
    pub positions: u64,
    /// Alpha/beta cutoffs so far (diagnostic)
    pub cutoffs: u64,
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Search-based agent with a wall-clock budget per move
#[derive(Clone, Debug, Default)]
pub struct AlphaBetaAI {
    pub config: SearchConfig,
    last_result: Option<SearchResult>,
    last_depth: Option<u32>,
}

impl AlphaBetaAI {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            last_result: None,
            last_depth: None,
        }
    }

    /// Evaluate a position
    pub fn evaluate(&self, board: &Board) -> f64 {
        evaluate(board, &self.config.weights)
    }

    /// Fixed-depth search from `board`
    pub fn search(
        &self,
        board: &Board,
        depth: u32,
        alpha: f64,
        beta: f64,
        positions: u64,
        cutoffs: u64,
    ) -> SearchResult {
        search(board, depth, alpha, beta, positions, cutoffs, &self.config.weights)
    }

    /// Deepen from depth 0 until the time budget is spent.
    ///
    /// Every started depth runs to completion; the clock is only checked
    /// between depths. Returns the deepest result that still had a move, or
    /// None when the agent has no legal move at all.
    pub fn find_best_move(&mut self, board: &Board) -> Option<SearchResult> {
        let start = Instant::now();
        let budget = self.config.min_search_time();
        let mut depth = 0;
        let mut best = None;
        self.last_depth = None;

        loop {
            let result = self.search(board, depth, -ROOT_WINDOW, ROOT_WINDOW, 0, 0);
            if result.best_move.is_none() {
                break;
            }

            tracing::debug!(
                depth,
                best_move = ?result.best_move,
                score = result.score,
                positions = result.positions,
                cutoffs = result.cutoffs,
                "search iteration complete"
            );
            best = Some(result);
            self.last_depth = Some(depth);

            if self.config.max_depth.is_some_and(|max| depth >= max) {
                break;
            }
            depth += 1;
            if start.elapsed() >= budget {
                break;
            }
        }

        self.last_result = best;
        best
    }

    /// Result of the most recent `find_best_move`
    pub fn last_result(&self) -> Option<SearchResult> {
        self.last_result
    }

    /// Deepest completed depth of the most recent `find_best_move`
    pub fn last_depth(&self) -> Option<u32> {
        self.last_depth
    }
}

impl Agent for AlphaBetaAI {
    fn name(&self) -> &str {
        "alpha-beta"
    }

    fn produce_move(
        &mut self,
        board: &Board,
        _rng: &mut ChaCha8Rng,
    ) -> Result<Option<Direction>, AgentError> {
        Ok(self.find_best_move(board).and_then(|r| r.best_move))
    }
}

// ============================================================================
// SEARCH
// ============================================================================

/// Depth-limited alpha-beta search, dispatched on the turn owner.
///
/// Counters are threaded through and returned in the result.
pub fn search(
    board: &Board,
    depth: u32,
    alpha: f64,
    beta: f64,
    positions: u64,
    cutoffs: u64,
    weights: &EvalWeights,
) -> SearchResult {
    match board.turn {
        Turn::Agent => agent_search(board, depth, alpha, beta, positions, cutoffs, weights),
        Turn::Environment => {
            environment_search(board, depth, alpha, beta, positions, cutoffs, weights)
        }
    }
}

fn agent_search(
    board: &Board,
    depth: u32,
    alpha: f64,
    beta: f64,
    mut positions: u64,
    mut cutoffs: u64,
    weights: &EvalWeights,
) -> SearchResult {
    let mut best_score = alpha;
    let mut best_move = None;

    for direction in Direction::ALL {
        let mut child = *board;
        let outcome = child.apply_move(direction);
        if !outcome.moved {
            continue;
        }
        positions += 1;

        if outcome.won {
            return SearchResult {
                best_move: Some(direction),
                score: WIN_SCORE,
                positions,
                cutoffs,
            };
        }

        let score = if depth == 0 {
            evaluate(&child, weights)
        } else {
            // The child sees the window in its own scale, before the discount
            let result = search(
                &child,
                depth - 1,
                lift_win_bound(best_score),
                lift_win_bound(beta),
                positions,
                cutoffs,
                weights,
            );
            positions = result.positions;
            cutoffs = result.cutoffs;
            discount_win(result.score)
        };

        if score > best_score {
            best_score = score;
            best_move = Some(direction);
        }
        if best_score > beta {
            cutoffs += 1;
            return SearchResult {
                best_move,
                score: beta,
                positions,
                cutoffs,
            };
        }
    }

    SearchResult {
        best_move,
        score: best_score,
        positions,
        cutoffs,
    }
}

fn environment_search(
    board: &Board,
    depth: u32,
    alpha: f64,
    beta: f64,
    mut positions: u64,
    mut cutoffs: u64,
    weights: &EvalWeights,
) -> SearchResult {
    let mut best_score = beta;

    for (cell, value) in environment_candidates(board) {
        let mut child = *board;
        child.insert_tile(cell, value);
        child.turn = Turn::Agent;
        positions += 1;

        // Placing a tile does not use up a depth level
        let result = search(&child, depth, alpha, best_score, positions, cutoffs, weights);
        positions = result.positions;
        cutoffs = result.cutoffs;

        if result.score < best_score {
            best_score = result.score;
        }
        if best_score < alpha {
            cutoffs += 1;
            return SearchResult {
                best_move: None,
                score: alpha,
                positions,
                cutoffs,
            };
        }
    }

    SearchResult {
        best_move: None,
        score: best_score,
        positions,
        cutoffs,
    }
}

/// A win further down is worth slightly less than a nearer one
fn discount_win(score: f64) -> f64 {
    if score > WIN_THRESHOLD {
        score - 1.0
    } else {
        score
    }
}

/// Inverse of [`discount_win`] for window bounds
fn lift_win_bound(bound: f64) -> f64 {
    if bound > WIN_THRESHOLD - 1.0 {
        bound + 1.0
    } else {
        bound
    }
}

/// How much a placed tile hurts the agent: rough boards and many islands
pub fn annoyance(board: &Board) -> f64 {
    -board.smoothness() + board.islands() as f64
}

/// Placements whose annoyance equals the maximum over every empty cell and
/// spawn value. Ordered by value, then cell (row-major).
pub fn environment_candidates(board: &Board) -> Vec<(Cell, u32)> {
    let cells = board.cells_available();
    let mut probe = *board;
    let mut scored = Vec::with_capacity(cells.len() * SPAWN_VALUES.len());

    for value in SPAWN_VALUES {
        for &cell in &cells {
            probe.insert_tile(cell, value);
            scored.push((cell, value, annoyance(&probe)));
            probe.remove_tile(cell);
        }
    }

    let max = scored
        .iter()
        .map(|&(_, _, a)| a)
        .fold(f64::NEG_INFINITY, f64::max);

    scored
        .into_iter()
        .filter(|&(_, _, a)| a == max)
        .map(|(cell, value, _)| (cell, value))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
