//! 4x4 tile grid: slide/merge mechanics and board heuristics

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of the grid
pub const SIZE: usize = 4;

/// Number of cells on the grid
pub const CELL_COUNT: usize = SIZE * SIZE;

/// A tile of this value (or larger) wins the game
pub const WIN_TILE: u32 = 2048;

/// Values the environment may place, lowest first
pub const SPAWN_VALUES: [u32; 2] = [2, 4];

// ============================================================================
// COORDINATES
// ============================================================================

/// Slide direction. The ordinal order is the search tie-break order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    /// All directions in ascending ordinal order
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Unit step (dx, dy); y grows downwards
    pub fn vector(self) -> (i8, i8) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        };
        f.write_str(name)
    }
}

/// Grid position: `x` is the column, `y` the row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u8,
    pub y: u8,
}

impl Cell {
    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Row-major index into the cell array
    pub fn index(&self) -> usize {
        self.y as usize * SIZE + self.x as usize
    }

    pub fn from_index(index: usize) -> Self {
        Self::new((index % SIZE) as u8, (index / SIZE) as u8)
    }

    /// Neighbouring cell, or None when the step leaves the grid
    pub fn offset(&self, dx: i8, dy: i8) -> Option<Cell> {
        let x = self.x as i8 + dx;
        let y = self.y as i8 + dy;
        let bound = SIZE as i8;
        if (0..bound).contains(&x) && (0..bound).contains(&y) {
            Some(Cell::new(x as u8, y as u8))
        } else {
            None
        }
    }
}

// ============================================================================
// TURNS AND OUTCOMES
// ============================================================================

/// Who moves next
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Turn {
    /// Slides the tiles
    Agent,
    /// Places a new tile
    Environment,
}

/// Result of applying a direction to a board
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Whether any tile changed position or merged
    pub moved: bool,
    /// Whether the resulting board holds a winning tile
    pub won: bool,
    /// Sum of the merged tile values
    pub points: u32,
}

// ============================================================================
// BOARD
// ============================================================================

/// Grid contents plus the turn owner (copy to mutate)
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Row-major tile values, 0 = empty
    cells: [u32; CELL_COUNT],
    /// Owner of the next ply
    pub turn: Turn,
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Empty grid, agent to move
    pub const fn empty() -> Self {
        Self {
            cells: [0; CELL_COUNT],
            turn: Turn::Agent,
        }
    }

    /// Build from rows (top row first), agent to move
    pub fn from_rows(rows: [[u32; SIZE]; SIZE]) -> Self {
        let mut board = Self::empty();
        for (y, row) in rows.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                board.cells[y * SIZE + x] = value;
            }
        }
        board
    }

    /// Build from a row-major slice; missing cells stay empty
    pub fn from_cells(values: &[u32]) -> Self {
        let mut board = Self::empty();
        for (slot, &value) in board.cells.iter_mut().zip(values) {
            *slot = value;
        }
        board
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn cells(&self) -> &[u32; CELL_COUNT] {
        &self.cells
    }

    pub fn tile(&self, cell: Cell) -> u32 {
        self.cells[cell.index()]
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.tile(cell) != 0
    }

    /// Empty cells in row-major order
    pub fn cells_available(&self) -> Vec<Cell> {
        (0..CELL_COUNT)
            .filter(|&i| self.cells[i] == 0)
            .map(Cell::from_index)
            .collect()
    }

    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    pub fn max_tile(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn is_win(&self) -> bool {
        self.cells.iter().any(|&v| v >= WIN_TILE)
    }

    /// log2 of every cell (0 for empty), row-major
    pub fn log2_features(&self) -> [u8; CELL_COUNT] {
        let mut features = [0u8; CELL_COUNT];
        for (feature, &value) in features.iter_mut().zip(self.cells.iter()) {
            if value != 0 {
                *feature = value.trailing_zeros() as u8;
            }
        }
        features
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    pub fn insert_tile(&mut self, cell: Cell, value: u32) {
        self.cells[cell.index()] = value;
    }

    pub fn remove_tile(&mut self, cell: Cell) {
        self.cells[cell.index()] = 0;
    }

    /// Slide every line toward `direction`, merging equal neighbours once.
    ///
    /// When the board changes the turn passes to the environment.
    pub fn apply_move(&mut self, direction: Direction) -> MoveOutcome {
        let mut outcome = MoveOutcome::default();

        for line in 0..SIZE {
            let indices = line_indices(direction, line);
            let mut values = [0u32; SIZE];
            for (value, &i) in values.iter_mut().zip(indices.iter()) {
                *value = self.cells[i];
            }

            let (slid, points) = slide_line(values);
            if slid != values {
                outcome.moved = true;
                for (&value, &i) in slid.iter().zip(indices.iter()) {
                    self.cells[i] = value;
                }
            }
            outcome.points += points;
        }

        if outcome.moved {
            self.turn = Turn::Environment;
            outcome.won = self.is_win();
        }
        outcome
    }

    // ========================================================================
    // MOVE QUERIES
    // ========================================================================

    pub fn can_move(&self, direction: Direction) -> bool {
        let mut probe = *self;
        probe.apply_move(direction).moved
    }

    pub fn moves_available(&self) -> bool {
        Direction::ALL.iter().any(|&d| self.can_move(d))
    }

    pub fn legal_moves(&self) -> Vec<Direction> {
        Direction::ALL
            .iter()
            .copied()
            .filter(|&d| self.can_move(d))
            .collect()
    }

    /// First direction in `order` that changes the board
    pub fn first_legal_move(&self, order: &[Direction]) -> Option<Direction> {
        order.iter().copied().find(|&d| self.can_move(d))
    }

    // ========================================================================
    // HEURISTICS
    // ========================================================================

    /// Negated sum of log2 differences between each tile and the next
    /// occupied tile to its right and below. Always <= 0.
    pub fn smoothness(&self) -> f64 {
        let mut smoothness = 0.0;
        for index in 0..CELL_COUNT {
            let value = self.cells[index];
            if value == 0 {
                continue;
            }
            let cell = Cell::from_index(index);
            for direction in [Direction::Right, Direction::Down] {
                if let Some(target) = self.next_occupied(cell, direction) {
                    smoothness -= (log2(value) - log2(self.tile(target))).abs();
                }
            }
        }
        smoothness
    }

    /// How well rows and columns are ordered; 0 for perfectly monotone
    /// lines, more negative the more they zig-zag.
    pub fn monotonicity(&self) -> f64 {
        // [up, down, left, right]
        let mut totals = [0.0f64; 4];

        for x in 0..SIZE {
            let column = self.log2_line(|i| Cell::new(x as u8, i as u8));
            let (decreasing, increasing) = line_monotonicity(column);
            totals[0] += decreasing;
            totals[1] += increasing;
        }
        for y in 0..SIZE {
            let row = self.log2_line(|i| Cell::new(i as u8, y as u8));
            let (decreasing, increasing) = line_monotonicity(row);
            totals[2] += decreasing;
            totals[3] += increasing;
        }

        totals[0].max(totals[1]) + totals[2].max(totals[3])
    }

    /// log2 of the largest tile, 0 on an empty board
    pub fn max_value(&self) -> f64 {
        log2(self.max_tile())
    }

    /// Number of 4-connected groups of equal-valued tiles
    pub fn islands(&self) -> u32 {
        let mut marked = [false; CELL_COUNT];
        let mut stack = Vec::with_capacity(CELL_COUNT);
        let mut islands = 0;

        for start in 0..CELL_COUNT {
            let value = self.cells[start];
            if value == 0 || marked[start] {
                continue;
            }
            islands += 1;
            marked[start] = true;
            stack.push(Cell::from_index(start));

            while let Some(cell) = stack.pop() {
                for direction in Direction::ALL {
                    let (dx, dy) = direction.vector();
                    if let Some(neighbour) = cell.offset(dx, dy) {
                        let i = neighbour.index();
                        if !marked[i] && self.cells[i] == value {
                            marked[i] = true;
                            stack.push(neighbour);
                        }
                    }
                }
            }
        }

        islands
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn next_occupied(&self, from: Cell, direction: Direction) -> Option<Cell> {
        let (dx, dy) = direction.vector();
        let mut cell = from.offset(dx, dy)?;
        while !self.is_occupied(cell) {
            cell = cell.offset(dx, dy)?;
        }
        Some(cell)
    }

    fn log2_line(&self, cell_at: impl Fn(usize) -> Cell) -> [f64; SIZE] {
        let mut line = [0.0; SIZE];
        for (i, slot) in line.iter_mut().enumerate() {
            *slot = log2(self.tile(cell_at(i)));
        }
        line
    }
}

fn log2(value: u32) -> f64 {
    if value == 0 {
        0.0
    } else {
        (value as f64).log2()
    }
}

/// Cell indices of one line, starting at the edge tiles slide toward
fn line_indices(direction: Direction, line: usize) -> [usize; SIZE] {
    let mut indices = [0usize; SIZE];
    for (i, slot) in indices.iter_mut().enumerate() {
        let (x, y) = match direction {
            Direction::Up => (line, i),
            Direction::Down => (line, SIZE - 1 - i),
            Direction::Left => (i, line),
            Direction::Right => (SIZE - 1 - i, line),
        };
        *slot = y * SIZE + x;
    }
    indices
}

/// Compact a line toward index 0, each tile merging at most once
fn slide_line(line: [u32; SIZE]) -> ([u32; SIZE], u32) {
    let mut out = [0u32; SIZE];
    let mut points = 0;
    let mut write = 0;
    let mut pending: Option<u32> = None;

    for &value in line.iter().filter(|&&v| v != 0) {
        match pending {
            Some(held) if held == value => {
                out[write] = held * 2;
                points += held * 2;
                write += 1;
                pending = None;
            }
            Some(held) => {
                out[write] = held;
                write += 1;
                pending = Some(value);
            }
            None => pending = Some(value),
        }
    }
    if let Some(held) = pending {
        out[write] = held;
    }

    (out, points)
}

/// Decreasing and increasing penalties along one line of log2 values
fn line_monotonicity(line: [f64; SIZE]) -> (f64, f64) {
    let mut decreasing = 0.0;
    let mut increasing = 0.0;
    let mut current = 0;
    let mut next = 1;

    while next < SIZE {
        while next < SIZE && line[next] == 0.0 {
            next += 1;
        }
        if next >= SIZE {
            next -= 1;
        }
        let (a, b) = (line[current], line[next]);
        if a > b {
            decreasing += b - a;
        } else if b > a {
            increasing += a - b;
        }
        current = next;
        next += 1;
    }

    (decreasing, increasing)
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+------+------+------+------+")?;
        for y in 0..SIZE {
            write!(f, "|")?;
            for x in 0..SIZE {
                match self.cells[y * SIZE + x] {
                    0 => write!(f, "      |")?,
                    value => write!(f, "{:^6}|", value)?,
                }
            }
            writeln!(f)?;
            writeln!(f, "+------+------+------+------+")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Board {{ turn: {:?} }}", self.turn)?;
        for row in self.cells.chunks(SIZE) {
            for &value in row {
                if value == 0 {
                    write!(f, "    .")?;
                } else {
                    write!(f, "{:5}", value)?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
