//! Integration tests for tilemerge
//!
//! Tests the full stack: board mechanics, search, agents and the game driver

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use tilemerge_core::{
    ai::ROOT_WINDOW, search, Agent, AgentError, AlphaBetaAI, Board, CycleAgent, Direction,
    EvalWeights, Game, ImitationAgent, SearchConfig, Turn, WIN_SCORE,
};

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// A midgame position with room to move in every direction
fn midgame_board() -> Board {
    Board::from_rows([
        [2, 4, 8, 16],
        [0, 2, 4, 8],
        [0, 0, 2, 4],
        [0, 0, 0, 2],
    ])
}

/// Depth-capped search; the budget is long enough that the cap always decides
fn capped_config(max_depth: u32) -> SearchConfig {
    SearchConfig::with_time_ms(60_000).with_max_depth(max_depth)
}

// ============================================================================
// GAME TESTS
// ============================================================================

#[test]
fn test_game_creation_and_moves() {
    let mut game = Game::new(1);
    assert_eq!(game.board().empty_count(), 14);

    let direction = game
        .board()
        .legal_moves()
        .into_iter()
        .next()
        .expect("fresh game has a legal move");
    let step = game.step(direction);

    assert!(step.moved);
    assert_eq!(game.moves(), 1);
    assert_eq!(game.board().turn, Turn::Agent);
}

#[test]
fn test_cycle_agent_plays_to_the_end() {
    let mut game = Game::new(2024);
    let mut agent = CycleAgent::new();
    let record = game.play(&mut agent, u32::MAX).unwrap();

    assert!(record.won || game.is_over());
    assert_eq!(record.moves as usize, record.history.len());
    assert_eq!(record.max_tile, game.board().max_tile());
}

// ============================================================================
// SEARCH TESTS
// ============================================================================

#[test]
fn test_alphabeta_finds_move() {
    let mut ai = AlphaBetaAI::new(capped_config(2));
    let board = midgame_board();
    let result = ai.find_best_move(&board).expect("midgame has moves");

    let direction = result.best_move.expect("agent node returns a move");
    assert!(board.legal_moves().contains(&direction));
    assert!(result.positions > 0);
    assert_eq!(ai.last_depth(), Some(2));
}

#[test]
fn test_alphabeta_takes_immediate_win() {
    let board = Board::from_rows([[0; 4], [1024, 1024, 0, 0], [2, 4, 2, 4], [4, 2, 4, 2]]);
    let mut ai = AlphaBetaAI::new(capped_config(2));
    let result = ai.find_best_move(&board).unwrap();

    assert_eq!(result.score, WIN_SCORE);
    let mut after = board;
    assert!(after.apply_move(result.best_move.unwrap()).won);
}

#[test]
fn test_environment_node_never_returns_move() {
    let mut board = midgame_board();
    assert!(board.apply_move(Direction::Left).moved);
    assert_eq!(board.turn, Turn::Environment);

    for depth in 0..=2 {
        let weights = EvalWeights::default();
        let result = search(&board, depth, -ROOT_WINDOW, ROOT_WINDOW, 0, 0, &weights);
        assert_eq!(result.best_move, None);
        assert!(result.score <= ROOT_WINDOW);
    }
}

#[test]
fn test_search_is_deterministic() {
    let board = midgame_board();
    let weights = EvalWeights::default();
    let a = search(&board, 2, -ROOT_WINDOW, ROOT_WINDOW, 0, 0, &weights);
    let b = search(&board, 2, -ROOT_WINDOW, ROOT_WINDOW, 0, 0, &weights);
    assert_eq!(a, b);
}

#[test]
fn test_alphabeta_plays_game() {
    let mut game = Game::new(99);
    let mut ai = AlphaBetaAI::new(capped_config(1));
    let record = game.play(&mut ai, 60).unwrap();

    assert_eq!(record.moves, 60);
    assert!(record.score > 0);
    assert!(ai.last_result().is_some());
}

#[test]
fn test_alphabeta_performance() {
    let board = midgame_board();
    let weights = EvalWeights::default();

    let start = Instant::now();
    let result = search(&board, 3, -ROOT_WINDOW, ROOT_WINDOW, 0, 0, &weights);
    let elapsed = start.elapsed();

    println!(
        "Depth 3: {} positions, {} cutoffs in {:?}",
        result.positions, result.cutoffs, elapsed
    );
    assert!(result.best_move.is_some());
    assert!(result.positions > 0);
}

// ============================================================================
// AGENT TESTS
// ============================================================================

#[test]
fn test_imitation_learns_from_search_games() {
    let mut demonstrator = AlphaBetaAI::new(capped_config(0));
    let mut learner = ImitationAgent::new(3);

    let mut game = Game::new(8);
    let record = game
        .play_observed(&mut demonstrator, 40, &mut |board: &Board, direction: Direction| {
            learner.learn_from_observed_move(board, direction)
        })
        .unwrap();
    assert_eq!(learner.sample_count(), record.history.len());

    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let board = *Game::new(8).board();
    let direction = learner.produce_move(&board, &mut rng).unwrap();
    assert!(direction.is_some());
    assert!(!learner.is_learning());

    // Frozen learners ignore further observations
    learner.learn_from_observed_move(&board, Direction::Up).unwrap();
    assert_eq!(learner.sample_count(), record.history.len());
}

#[test]
fn test_search_agent_rejects_learning() {
    let mut ai = AlphaBetaAI::default();
    let err = ai
        .learn_from_observed_move(&midgame_board(), Direction::Up)
        .unwrap_err();
    assert_eq!(
        err,
        AgentError::LearningUnsupported {
            agent: "alpha-beta".to_string()
        }
    );
}

// ============================================================================
// CONFIG TESTS
// ============================================================================

#[test]
fn test_config_file_drives_search() {
    let path = std::env::temp_dir().join(format!("tilemerge-it-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"min_search_time_ms": 60000, "max_depth": 1}"#).unwrap();

    let config = SearchConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.weights, EvalWeights::default());
    let mut ai = AlphaBetaAI::new(config);
    ai.find_best_move(&midgame_board()).unwrap();
    assert_eq!(ai.last_depth(), Some(1));
}
