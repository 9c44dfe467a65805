//! tilemerge core - board, evaluation and search for the 4x4 slide-and-merge puzzle
//!
//! This crate provides:
//! - Board state with slide/merge mechanics and heuristics
//! - Static position evaluation
//! - Alpha-beta search over agent moves and pruned environment placements,
//!   with iterative deepening under a time budget
//! - The agent interface plus scripted and learned agents
//! - A game driver with a seedable random environment
//!
//! Quick start:
//! ```
//! use tilemerge_core::{AlphaBetaAI, Game, SearchConfig};
//!
//! let mut game = Game::new(42);
//! let mut ai = AlphaBetaAI::new(SearchConfig::with_time_ms(0));
//! let result = ai.find_best_move(game.board()).expect("fresh board has moves");
//! let step = game.step(result.best_move.unwrap());
//! assert!(step.moved);
//! ```

pub mod board;
pub mod eval;
pub mod ai;
pub mod agent;
pub mod game;
pub mod config;

// Re-exports for convenient access
pub use board::{Board, Cell, Direction, MoveOutcome, Turn, SIZE, SPAWN_VALUES, WIN_TILE};
pub use eval::{evaluate, EvalWeights, WIN_SCORE};
pub use ai::{search, AlphaBetaAI, SearchResult};
pub use agent::{Agent, AgentError, CycleAgent, ImitationAgent};
pub use game::{Game, GameRecord, StepResult};
pub use config::SearchConfig;
