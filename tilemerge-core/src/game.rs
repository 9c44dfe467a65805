//! Game driver: random environment, scoring and the play loop

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::agent::{Agent, AgentError};
use crate::board::{Board, Cell, Direction, Turn, SPAWN_VALUES};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Chance that a spawned tile is the lower value
pub const LOW_SPAWN_PROBABILITY: f64 = 0.9;

/// Tiles placed before the first move
const START_TILES: usize = 2;

// ============================================================================
// TYPES
// ============================================================================

/// Result of one agent move plus the environment's reply
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepResult {
    /// Whether the board changed (and a tile was spawned)
    pub moved: bool,
    /// Points earned from merges
    pub points: u32,
    /// Whether a winning tile is on the board
    pub won: bool,
    /// Whether no direction moves any more
    pub over: bool,
}

/// Summary of a finished game
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub score: u32,
    pub max_tile: u32,
    pub moves: u32,
    pub won: bool,
    /// Position before each agent move, and the move taken
    pub history: Vec<(Board, Direction)>,
}

/// A single game against the random environment (clone to branch)
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    score: u32,
    moves: u32,
    rng: ChaCha8Rng,
}

impl Game {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// New game with two random starting tiles
    pub fn new(seed: u64) -> Self {
        let mut game = Self::from_board(Board::empty(), seed);
        for _ in 0..START_TILES {
            game.spawn_tile();
        }
        game
    }

    /// Start from an existing position (agent to move), no tiles added
    pub fn from_board(mut board: Board, seed: u64) -> Self {
        board.turn = Turn::Agent;
        Self {
            board,
            score: 0,
            moves: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn is_won(&self) -> bool {
        self.board.is_win()
    }

    pub fn is_over(&self) -> bool {
        !self.board.moves_available()
    }

    // ========================================================================
    // TURNS
    // ========================================================================

    /// Place a random tile in a random empty cell and hand the turn back
    /// to the agent. Returns the placement, or None on a full board.
    pub fn spawn_tile(&mut self) -> Option<(Cell, u32)> {
        let cell = *self.board.cells_available().choose(&mut self.rng)?;
        let value = if self.rng.gen_bool(LOW_SPAWN_PROBABILITY) {
            SPAWN_VALUES[0]
        } else {
            SPAWN_VALUES[1]
        };
        self.board.insert_tile(cell, value);
        self.board.turn = Turn::Agent;
        Some((cell, value))
    }

    /// Apply an agent move; the environment replies only if the board changed
    pub fn step(&mut self, direction: Direction) -> StepResult {
        let outcome = self.board.apply_move(direction);
        if outcome.moved {
            self.score += outcome.points;
            self.moves += 1;
            self.spawn_tile();
        }

        StepResult {
            moved: outcome.moved,
            points: outcome.points,
            won: self.is_won(),
            over: self.is_over(),
        }
    }

    // ========================================================================
    // PLAY LOOP
    // ========================================================================

    /// Let `agent` play until it wins, runs out of moves or hits `max_moves`
    pub fn play(
        &mut self,
        agent: &mut dyn Agent,
        max_moves: u32,
    ) -> Result<GameRecord, AgentError> {
        self.play_observed(agent, max_moves, &mut |_: &Board, _: Direction| Ok(()))
    }

    /// Like [`Game::play`], reporting every (position, move) to `observer`
    /// before it is applied
    pub fn play_observed(
        &mut self,
        agent: &mut dyn Agent,
        max_moves: u32,
        observer: &mut dyn FnMut(&Board, Direction) -> Result<(), AgentError>,
    ) -> Result<GameRecord, AgentError> {
        let mut history = Vec::new();

        while self.moves < max_moves && !self.is_won() {
            let board = self.board;
            let Some(direction) = agent.produce_move(&board, &mut self.rng)? else {
                break;
            };
            observer(&board, direction)?;
            history.push((board, direction));

            let step = self.step(direction);
            if !step.moved {
                tracing::warn!(
                    "{} chose {} which does not move, stopping",
                    agent.name(),
                    direction
                );
                break;
            }
        }

        tracing::debug!(
            agent = agent.name(),
            score = self.score,
            moves = self.moves,
            max_tile = self.board.max_tile(),
            "game finished"
        );

        Ok(GameRecord {
            score: self.score,
            max_tile: self.board.max_tile(),
            moves: self.moves,
            won: self.is_won(),
            history,
        })
    }
}
