//! Static position evaluation

use crate::board::Board;
use serde::{Deserialize, Serialize};

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    /// Weight for smoothness (itself <= 0, so flat boards score higher)
    pub smoothness: f64,
    /// Weight for row/column ordering
    pub monotonicity: f64,
    /// Weight for ln(empty cells)
    pub empty: f64,
    /// Weight for log2 of the largest tile
    pub max_value: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            smoothness: 0.1,
            monotonicity: 1.0,
            empty: 2.7,
            max_value: 1.0,
        }
    }
}

/// Score assigned to a won position
pub const WIN_SCORE: f64 = 10000.0;

/// Scores above this came from a win somewhere below
pub const WIN_THRESHOLD: f64 = 9900.0;

/// Stand-in cell count for a full board, keeps ln() finite and below ln(1)
const FULL_BOARD_EMPTY: f64 = 0.5;

/// Evaluate a position from the agent's perspective (higher is better)
pub fn evaluate(board: &Board, weights: &EvalWeights) -> f64 {
    let empty = match board.empty_count() {
        0 => FULL_BOARD_EMPTY,
        n => n as f64,
    };

    board.smoothness() * weights.smoothness
        + board.monotonicity() * weights.monotonicity
        + empty.ln() * weights.empty
        + board.max_value() * weights.max_value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let w = EvalWeights::default();
        assert_eq!(w.smoothness, 0.1);
        assert_eq!(w.monotonicity, 1.0);
        assert_eq!(w.empty, 2.7);
        assert_eq!(w.max_value, 1.0);
    }

    #[test]
    fn test_evaluate_weighted_sum() {
        let board = Board::from_rows([[2, 4, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let expected = -1.0 * 0.1 + -1.0 * 1.0 + (14.0f64).ln() * 2.7 + 2.0 * 1.0;
        let score = evaluate(&board, &EvalWeights::default());
        assert!((score - expected).abs() < 1e-12, "{} != {}", score, expected);
    }

    #[test]
    fn test_full_board_is_finite_and_low() {
        let full = Board::from_rows([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ]);
        let mut one_gap = full;
        one_gap.remove_tile(crate::board::Cell::new(0, 0));

        let weights = EvalWeights {
            smoothness: 0.0,
            monotonicity: 0.0,
            empty: 2.7,
            max_value: 0.0,
        };
        let full_score = evaluate(&full, &weights);
        assert!(full_score.is_finite());
        assert!(full_score < evaluate(&one_gap, &weights));
    }

    #[test]
    fn test_more_space_scores_higher() {
        let weights = EvalWeights::default();
        let crowded = Board::from_rows([[2, 2, 2, 2], [2, 2, 2, 2], [0; 4], [0; 4]]);
        let open = Board::from_rows([[2, 2, 2, 2], [0; 4], [0; 4], [0; 4]]);
        assert!(evaluate(&open, &weights) > evaluate(&crowded, &weights));
    }

    #[test]
    fn test_weights_deserialize_partial() {
        let w: EvalWeights = serde_json::from_str(r#"{"empty": 3.5}"#).unwrap();
        assert_eq!(w.empty, 3.5);
        assert_eq!(w.smoothness, 0.1);
    }
}
