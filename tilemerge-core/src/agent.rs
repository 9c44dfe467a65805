//! Agent interface and the non-search agent variants

use crate::board::{Board, Direction, CELL_COUNT};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;

// ============================================================================
// ERRORS
// ============================================================================

/// Contract violations raised by agents
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    #[error("{agent} must implement move selection")]
    MoveSelectionUnimplemented { agent: String },

    #[error("{agent} does not support learning")]
    LearningUnsupported { agent: String },

    #[error("{agent} has not observed any moves yet")]
    Untrained { agent: String },
}

// ============================================================================
// AGENT TRAIT
// ============================================================================

/// Something that picks a slide direction for the agent's turn.
///
/// Variants either override [`Agent::produce_move`] outright or supply
/// [`Agent::choose_direction`] and inherit the fallback scan that turns a
/// preference into a legal move.
pub trait Agent {
    /// Display name used in logs and errors
    fn name(&self) -> &str;

    /// Pick a legal move, or `Ok(None)` when the board has none.
    ///
    /// Tries the preferred direction first, then the other three in a random
    /// order drawn from `rng`.
    fn produce_move(
        &mut self,
        board: &Board,
        rng: &mut ChaCha8Rng,
    ) -> Result<Option<Direction>, AgentError> {
        let preferred = self.choose_direction(board)?;

        let mut order = Vec::with_capacity(Direction::ALL.len());
        order.push(preferred);
        let mut rest: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|&d| d != preferred)
            .collect();
        rest.shuffle(rng);
        order.extend(rest);

        Ok(board.first_legal_move(&order))
    }

    /// Preferred direction; need not be legal
    fn choose_direction(&mut self, _board: &Board) -> Result<Direction, AgentError> {
        Err(AgentError::MoveSelectionUnimplemented {
            agent: self.name().to_string(),
        })
    }

    /// Record a (position, move) pair made by someone else
    fn learn_from_observed_move(
        &mut self,
        _board: &Board,
        _direction: Direction,
    ) -> Result<(), AgentError> {
        Err(AgentError::LearningUnsupported {
            agent: self.name().to_string(),
        })
    }
}

// ============================================================================
// CYCLE AGENT
// ============================================================================

/// Preference lists the cycle agent rotates through
const CYCLE_ORDERS: [[Direction; 4]; 4] = [
    [Direction::Up, Direction::Right, Direction::Down, Direction::Left],
    [Direction::Right, Direction::Down, Direction::Up, Direction::Left],
    [Direction::Down, Direction::Right, Direction::Up, Direction::Left],
    [Direction::Right, Direction::Up, Direction::Down, Direction::Left],
];

/// Scripted agent that cycles through fixed direction preferences
#[derive(Clone, Debug, Default)]
pub struct CycleAgent {
    phase: usize,
}

impl CycleAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> usize {
        self.phase
    }
}

impl Agent for CycleAgent {
    fn name(&self) -> &str {
        "cycle"
    }

    fn choose_direction(&mut self, board: &Board) -> Result<Direction, AgentError> {
        let order = &CYCLE_ORDERS[self.phase];
        let direction = board.first_legal_move(order).unwrap_or(order[0]);
        self.phase = (self.phase + 1) % CYCLE_ORDERS.len();
        Ok(direction)
    }
}

// ============================================================================
// IMITATION AGENT
// ============================================================================

/// Default number of neighbours consulted per prediction
pub const DEFAULT_NEIGHBOURS: usize = 5;

/// A distinct training position and the moves observed there
#[derive(Clone, Debug)]
struct Sample {
    features: [u8; CELL_COUNT],
    votes: [u32; 4],
}

/// Learned agent: records observed moves, then predicts by k-nearest-neighbour
/// vote over log2 tile features.
///
/// Learning stops at the first prediction; later observations are ignored.
#[derive(Clone, Debug)]
pub struct ImitationAgent {
    neighbours: usize,
    learning: bool,
    tallies: FxHashMap<[u8; CELL_COUNT], [u32; 4]>,
    samples: Vec<Sample>,
}

impl Default for ImitationAgent {
    fn default() -> Self {
        Self::new(DEFAULT_NEIGHBOURS)
    }
}

impl ImitationAgent {
    pub fn new(neighbours: usize) -> Self {
        Self {
            neighbours: neighbours.max(1),
            learning: true,
            tallies: FxHashMap::default(),
            samples: Vec::new(),
        }
    }

    pub fn is_learning(&self) -> bool {
        self.learning
    }

    /// Number of observed moves (duplicates included)
    pub fn sample_count(&self) -> usize {
        let tallied: u32 = if self.learning {
            self.tallies.values().flatten().sum()
        } else {
            self.samples.iter().flat_map(|s| s.votes).sum()
        };
        tallied as usize
    }

    /// Number of distinct positions seen
    pub fn distinct_positions(&self) -> usize {
        if self.learning {
            self.tallies.len()
        } else {
            self.samples.len()
        }
    }

    /// Stop learning and build the lookup set
    fn freeze(&mut self) {
        self.learning = false;
        self.samples = self
            .tallies
            .drain()
            .map(|(features, votes)| Sample { features, votes })
            .collect();
        // Fixed order so equal distances resolve the same way every run
        self.samples.sort_by(|a, b| a.features.cmp(&b.features));

        tracing::debug!(
            "{} trained on {} positions",
            self.name(),
            self.samples.len()
        );
    }

    fn predict(&self, board: &Board) -> Direction {
        let features = board.log2_features();

        let mut ranked: Vec<(u32, &Sample)> = self
            .samples
            .iter()
            .map(|s| (squared_distance(&features, &s.features), s))
            .collect();
        ranked.sort_by_key(|&(distance, _)| distance);

        let mut votes = [0u32; 4];
        for (_, sample) in ranked.iter().take(self.neighbours) {
            for (total, count) in votes.iter_mut().zip(sample.votes) {
                *total += count;
            }
        }

        let mut best = 0;
        for (i, &count) in votes.iter().enumerate() {
            if count > votes[best] {
                best = i;
            }
        }
        Direction::ALL[best]
    }
}

fn squared_distance(a: &[u8; CELL_COUNT], b: &[u8; CELL_COUNT]) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = x as i32 - y as i32;
            (d * d) as u32
        })
        .sum()
}

impl Agent for ImitationAgent {
    fn name(&self) -> &str {
        "imitation"
    }

    fn choose_direction(&mut self, board: &Board) -> Result<Direction, AgentError> {
        if self.learning {
            if self.tallies.is_empty() {
                return Err(AgentError::Untrained {
                    agent: self.name().to_string(),
                });
            }
            self.freeze();
        }
        Ok(self.predict(board))
    }

    fn learn_from_observed_move(
        &mut self,
        board: &Board,
        direction: Direction,
    ) -> Result<(), AgentError> {
        if !self.learning {
            tracing::warn!(
                "{} is no longer accepting new data, ignoring observed move",
                self.name()
            );
            return Ok(());
        }
        self.tallies
            .entry(board.log2_features())
            .or_insert([0; 4])[direction.index()] += 1;
        Ok(())
    }
}
