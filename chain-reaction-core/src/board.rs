//! Rectangular board geometry, cells and cascade resolution

use crate::error::{BoardError, ParseBoardError};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Orthogonal direction vectors (drow, dcol)
/// Index: 0=Up, 1=Right, 2=Down, 3=Left
pub const DIRECTIONS: [(isize, isize); 4] = [
    (-1, 0), // Up
    (0, 1),  // Right
    (1, 0),  // Down
    (0, -1), // Left
];

/// Critical mass by positional class
pub const CORNER_MASS: u32 = 2;
pub const EDGE_MASS: u32 = 3;
pub const INTERIOR_MASS: u32 = 4;

/// Queue pops allowed per board cell before a cascade is cut off. Live
/// positions stay far below this; a saturated single-color board can cycle.
pub const CASCADE_STEPS_PER_CELL: usize = 64;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Orb color. An unowned cell has no color (`None`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red = 0,
    Blue = 1,
}

impl Color {
    pub const ALL: [Color; 2] = [Color::Red, Color::Blue];

    pub fn opponent(self) -> Self {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }

    /// One-letter symbol used in board notation
    pub fn symbol(self) -> char {
        match self {
            Color::Red => 'R',
            Color::Blue => 'B',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'R' => Some(Color::Red),
            'B' => Some(Color::Blue),
            _ => None,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => f.write_str("Red"),
            Color::Blue => f.write_str("Blue"),
        }
    }
}

/// Grid coordinates. Signed so that neighbors of border cells can be
/// represented before they are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: isize,
    pub col: isize,
}

impl Pos {
    pub const fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }

    /// Get neighbor in direction (0-3)
    pub fn neighbor(&self, direction: usize) -> Pos {
        let (dr, dc) = DIRECTIONS[direction % 4];
        Pos::new(self.row + dr, self.col + dc)
    }

    /// All four orthogonal neighbors: up, right, down, left
    pub fn neighbors(&self) -> [Pos; 4] {
        [
            self.neighbor(0),
            self.neighbor(1),
            self.neighbor(2),
            self.neighbor(3),
        ]
    }
}

impl From<(isize, isize)> for Pos {
    fn from((row, col): (isize, isize)) -> Self {
        Pos::new(row, col)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A single board cell.
///
/// Invariant: an unowned cell holds no orbs and an owned cell holds at least one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCell")]
pub struct Cell {
    orb_count: u32,
    owner: Option<Color>,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        orb_count: 0,
        owner: None,
    };

    fn owned(color: Color, orb_count: u32) -> Self {
        debug_assert!(orb_count >= 1);
        Self {
            orb_count,
            owner: Some(color),
        }
    }

    /// Build a cell, rejecting an owner without orbs or orbs without an owner
    pub fn new(orb_count: u32, owner: Option<Color>) -> Result<Self, BoardError> {
        match (owner, orb_count) {
            (None, 0) => Ok(Cell::EMPTY),
            (Some(color), n) if n >= 1 => Ok(Cell::owned(color, n)),
            _ => Err(BoardError::InvalidCell { orb_count, owner }),
        }
    }

    pub fn orb_count(&self) -> u32 {
        self.orb_count
    }

    pub fn owner(&self) -> Option<Color> {
        self.owner
    }

    pub fn is_empty(&self) -> bool {
        self.owner.is_none()
    }

    /// Empty or owned by `color`
    pub fn accepts(&self, color: Color) -> bool {
        self.owner.map_or(true, |owner| owner == color)
    }

    fn add_orb(&mut self, color: Color) {
        self.orb_count += 1;
        self.owner = Some(color);
    }

    fn clear(&mut self) {
        *self = Cell::EMPTY;
    }
}

/// Unchecked serialized form of a `Cell`
#[derive(Deserialize)]
struct RawCell {
    orb_count: u32,
    owner: Option<Color>,
}

impl TryFrom<RawCell> for Cell {
    type Error = BoardError;

    fn try_from(raw: RawCell) -> Result<Self, Self::Error> {
        Cell::new(raw.orb_count, raw.owner)
    }
}

/// Work done by one `insert_orb` call
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cascade {
    /// Coordinates popped from the work queue, including off-board ones
    pub steps: usize,
    /// Cells that reached critical mass and reset
    pub explosions: usize,
    /// Stopped at the step limit with deliveries still queued
    pub truncated: bool,
}

// ============================================================================
// BOARD
// ============================================================================

/// Fixed-size grid of cells (clone for an independent copy)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    rows: usize,
    cols: usize,
    /// Row-major cells
    grid: Vec<Cell>,
}

impl Board {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Create an empty board
    pub fn new(rows: usize, cols: usize) -> Result<Self, BoardError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::InvalidDimensions { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            grid: vec![Cell::EMPTY; rows * cols],
        })
    }

    // ========================================================================
    // GEOMETRY
    // ========================================================================

    pub fn get_rows(&self) -> usize {
        self.rows
    }

    pub fn get_cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.index(pos).is_some()
    }

    fn index(&self, pos: Pos) -> Option<usize> {
        let row = usize::try_from(pos.row).ok()?;
        let col = usize::try_from(pos.col).ok()?;
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    fn last_row(&self) -> isize {
        self.rows as isize - 1
    }

    fn last_col(&self) -> isize {
        self.cols as isize - 1
    }

    pub fn is_corner(&self, row: isize, col: isize) -> bool {
        (row == 0 || row == self.last_row()) && (col == 0 || col == self.last_col())
    }

    /// Border cell that is not a corner
    pub fn is_edge(&self, row: isize, col: isize) -> bool {
        (row == 0 || row == self.last_row() || col == 0 || col == self.last_col())
            && !self.is_corner(row, col)
    }

    pub fn is_center(&self, row: isize, col: isize) -> bool {
        row > 0 && row < self.last_row() && col > 0 && col < self.last_col()
    }

    /// Orb count at which a cell explodes: 2 at a corner, 3 on an edge, 4 elsewhere
    pub fn get_critical_mass(&self, row: isize, col: isize) -> u32 {
        if self.is_corner(row, col) {
            CORNER_MASS
        } else if self.is_edge(row, col) {
            EDGE_MASS
        } else {
            INTERIOR_MASS
        }
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn cell(&self, row: isize, col: isize) -> Option<&Cell> {
        self.index(Pos::new(row, col)).map(|i| &self.grid[i])
    }

    /// Orb count, 0 when out of range
    pub fn get_orb_count(&self, row: isize, col: isize) -> u32 {
        self.cell(row, col).map_or(0, Cell::orb_count)
    }

    /// Owner, `None` when empty or out of range
    pub fn get_color(&self, row: isize, col: isize) -> Option<Color> {
        self.cell(row, col).and_then(Cell::owner)
    }

    /// Iterate cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (Pos, &Cell)> + '_ {
        let cols = self.cols;
        self.grid.iter().enumerate().map(move |(i, cell)| {
            (Pos::new((i / cols) as isize, (i % cols) as isize), cell)
        })
    }

    /// Cells that are empty or owned by `color`, in row-major order
    pub fn get_valid_moves(&self, color: Color) -> Vec<Pos> {
        self.cells()
            .filter(|(_, cell)| cell.accepts(color))
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Total orbs owned by `color`
    pub fn get_score(&self, color: Color) -> u32 {
        self.grid
            .iter()
            .filter(|cell| cell.owner == Some(color))
            .map(|cell| cell.orb_count)
            .sum()
    }

    /// Total orbs on the board
    pub fn total_orbs(&self) -> u32 {
        self.grid.iter().map(|cell| cell.orb_count).sum()
    }

    /// True when a single color owns every occupied cell and holds at least
    /// two orbs. The orb threshold keeps the opening placement from ending
    /// the game.
    pub fn is_game_over(&self) -> bool {
        let mut sole: Option<Color> = None;
        let mut orbs = 0;
        for cell in &self.grid {
            let Some(owner) = cell.owner else { continue };
            match sole {
                None => sole = Some(owner),
                Some(color) if color != owner => return false,
                Some(_) => {}
            }
            orbs += cell.orb_count;
        }
        sole.is_some() && orbs >= 2
    }

    // ========================================================================
    // PLACEMENT
    // ========================================================================

    /// Place one orb of `color` at (row, col) and resolve the full cascade.
    ///
    /// Propagation is breadth-first. A coordinate is never queued twice at the
    /// same time; orbs pushed off the board are lost. A delivery only lands
    /// on a cell that is empty or already `color`, unless `force` is set. The
    /// cascade never sets `force` for neighbor deliveries, so an
    /// opponent-owned neighbor absorbs nothing and keeps its owner.
    ///
    /// Placing on a board that is already won can cycle forever on narrow
    /// grids; such a cascade is cut off after `CASCADE_STEPS_PER_CELL` pops
    /// per cell and reported as truncated.
    pub fn insert_orb(&mut self, row: isize, col: isize, color: Color, force: bool) -> Cascade {
        let mut cascade = Cascade::default();
        let start = Pos::new(row, col);
        let step_limit = CASCADE_STEPS_PER_CELL * self.grid.len();

        let mut queue = VecDeque::from([start]);
        let mut queued: FxHashSet<Pos> = FxHashSet::default();
        queued.insert(start);

        while let Some(pos) = queue.pop_front() {
            if cascade.steps == step_limit {
                cascade.truncated = true;
                tracing::warn!(row, col, %color, steps = cascade.steps, "cascade cut off at step limit");
                break;
            }
            queued.remove(&pos);
            cascade.steps += 1;

            let Some(index) = self.index(pos) else {
                continue;
            };
            let critical = self.get_critical_mass(pos.row, pos.col);

            let cell = &mut self.grid[index];
            if force || cell.accepts(color) {
                cell.add_orb(color);
            }

            if cell.orb_count >= critical {
                cell.clear();
                cascade.explosions += 1;
                tracing::trace!(row = pos.row, col = pos.col, %color, "cell exploded");

                for next in pos.neighbors() {
                    if queued.insert(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        cascade
    }
}

/// Unchecked serialized form of a `Board`; cells are checked on their own
#[derive(Deserialize)]
struct RawBoard {
    rows: usize,
    cols: usize,
    grid: Vec<Cell>,
}

impl TryFrom<RawBoard> for Board {
    type Error = BoardError;

    fn try_from(raw: RawBoard) -> Result<Self, Self::Error> {
        let mut board = Board::new(raw.rows, raw.cols)?;
        if raw.grid.len() != board.grid.len() {
            return Err(BoardError::CellCount {
                expected: board.grid.len(),
                found: raw.grid.len(),
            });
        }
        board.grid = raw.grid;
        Ok(board)
    }
}

// ============================================================================
// NOTATION
// ============================================================================

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.grid.chunks(self.cols).enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                match cell.owner {
                    Some(color) => write!(f, "{}{}", color.symbol(), cell.orb_count)?,
                    None => f.write_str(".")?,
                }
            }
        }
        Ok(())
    }
}

/// Parse the token at (row, col): `0` or `.` for empty, `2R` or `R2` for owned
fn parse_cell(token: &str, row: usize, col: usize) -> Result<Cell, ParseBoardError> {
    if token == "0" || token == "." {
        return Ok(Cell::EMPTY);
    }

    let invalid = || ParseBoardError::InvalidToken {
        row,
        col,
        token: token.to_string(),
    };
    let first = token.chars().next().ok_or_else(invalid)?;
    let last = token.chars().last().ok_or_else(invalid)?;
    let (color, digits) = if let Some(color) = Color::from_symbol(first) {
        (color, &token[first.len_utf8()..])
    } else if let Some(color) = Color::from_symbol(last) {
        (color, &token[..token.len() - last.len_utf8()])
    } else {
        return Err(invalid());
    };

    let count: u32 = digits.parse().map_err(|_| invalid())?;
    if count == 0 {
        return Err(ParseBoardError::OwnedWithoutOrbs { row, col });
    }
    Ok(Cell::owned(color, count))
}

impl FromStr for Board {
    type Err = ParseBoardError;

    /// Parses whitespace-separated rows. Blank lines and header lines ending
    /// in `:` (e.g. `AI MOVE:`) are skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lines: Vec<&str> = s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.ends_with(':'))
            .collect();
        if lines.is_empty() {
            return Err(ParseBoardError::Empty);
        }

        let cols = lines[0].split_whitespace().count();
        let mut board = Board::new(lines.len(), cols)?;

        for (row, line) in lines.iter().enumerate() {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != cols {
                return Err(ParseBoardError::RaggedRow {
                    row,
                    expected: cols,
                    found: tokens.len(),
                });
            }
            for (col, token) in tokens.into_iter().enumerate() {
                board.grid[row * cols + col] = parse_cell(token, row, col)?;
            }
        }

        Ok(board)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn board(notation: &str) -> Board {
        notation.parse().unwrap()
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert!(Board::new(0, 5).is_err());
        assert!(Board::new(5, 0).is_err());
        let b = Board::new(5, 6).unwrap();
        assert_eq!((b.get_rows(), b.get_cols()), (5, 6));
        assert_eq!(b.total_orbs(), 0);
    }

    #[test]
    fn test_critical_mass_classes() {
        let b = Board::new(5, 6).unwrap();
        for (r, c) in [(0, 0), (0, 5), (4, 0), (4, 5)] {
            assert!(b.is_corner(r, c));
            assert!(!b.is_edge(r, c));
            assert_eq!(b.get_critical_mass(r, c), 2);
        }
        for (r, c) in [(0, 1), (0, 4), (4, 3), (2, 0), (3, 5)] {
            assert!(b.is_edge(r, c));
            assert!(!b.is_center(r, c));
            assert_eq!(b.get_critical_mass(r, c), 3);
        }
        for (r, c) in [(1, 1), (2, 3), (3, 4)] {
            assert!(b.is_center(r, c));
            assert_eq!(b.get_critical_mass(r, c), 4);
        }
    }

    #[test]
    fn test_out_of_range_queries() {
        let b = board("R1 .\n. B1");
        assert_eq!(b.get_orb_count(-1, 0), 0);
        assert_eq!(b.get_orb_count(0, 2), 0);
        assert_eq!(b.get_color(2, 0), None);
        assert_eq!(b.get_color(0, -3), None);
        assert_eq!(b.get_color(0, 0), Some(Color::Red));
    }

    #[test]
    fn test_single_placement_no_explosion() {
        let mut b = Board::new(3, 3).unwrap();
        let cascade = b.insert_orb(1, 1, Color::Red, false);
        assert_eq!(
            cascade,
            Cascade {
                steps: 1,
                explosions: 0,
                truncated: false
            }
        );
        assert_eq!(b.get_orb_count(1, 1), 1);
        assert_eq!(b.get_color(1, 1), Some(Color::Red));
    }

    #[test]
    fn test_corner_explosion() {
        let mut b = board(
            "R1 . .
             .  . .
             .  . .",
        );
        let cascade = b.insert_orb(0, 0, Color::Red, false);
        assert_eq!(cascade.explosions, 1);
        assert_eq!(b.get_orb_count(0, 0), 0);
        assert_eq!(b.get_color(0, 0), None);
        for (r, c) in [(0, 1), (1, 0)] {
            assert_eq!(b.get_orb_count(r, c), 1);
            assert_eq!(b.get_color(r, c), Some(Color::Red));
        }
        assert_eq!(b.total_orbs(), 2);
    }

    #[test]
    fn test_chain_reaction_captures_through_own_cells() {
        let mut b = board(
            "R1 R2 .
             .  .  .
             .  .  .",
        );
        b.insert_orb(0, 0, Color::Red, false);
        // (0,0) explodes into (0,1), which reaches 3 and explodes in turn
        assert_eq!(b.get_color(0, 1), None);
        assert_eq!(b.get_orb_count(0, 0), 1);
        assert_eq!(b.get_orb_count(1, 0), 1);
        assert_eq!(b.get_orb_count(1, 1), 1);
        assert_eq!(b.get_orb_count(0, 2), 1);
        assert_eq!(b.get_score(Color::Red), 4);
    }

    /// Documented quirk: a cascade delivery to an opponent-owned cell is
    /// dropped. The cell keeps its owner and count instead of being captured.
    #[test]
    fn test_quirk_opponent_neighbor_is_not_captured() {
        let mut b = board(
            "R1 B1 .
             .  .  .
             .  .  .",
        );
        b.insert_orb(0, 0, Color::Red, false);
        assert_eq!(b.get_color(0, 1), Some(Color::Blue));
        assert_eq!(b.get_orb_count(0, 1), 1);
        assert_eq!(b.get_color(1, 0), Some(Color::Red));
        assert_eq!(b.get_score(Color::Red), 1);
    }

    #[test]
    fn test_saturated_board_cascade_is_cut_off() {
        let mut b = board(". R1\nR1 R1");
        let cascade = b.insert_orb(0, 1, Color::Red, false);
        assert!(cascade.truncated);
        assert_eq!(cascade.steps, CASCADE_STEPS_PER_CELL * 4);
        for (_, cell) in b.cells() {
            assert_eq!(cell.is_empty(), cell.orb_count() == 0);
        }
    }

    #[test]
    fn test_force_overrides_owner() {
        let mut b = board(". B1 .\n. . .\n. . .");
        b.insert_orb(0, 1, Color::Red, false);
        assert_eq!(b.get_color(0, 1), Some(Color::Blue));
        assert_eq!(b.get_orb_count(0, 1), 1);

        b.insert_orb(0, 1, Color::Red, true);
        assert_eq!(b.get_color(0, 1), Some(Color::Red));
        assert_eq!(b.get_orb_count(0, 1), 2);
    }

    #[test]
    fn test_valid_moves_row_major() {
        let b = board("R1 B1\nB2 .");
        let red: Vec<Pos> = b.get_valid_moves(Color::Red);
        assert_eq!(red, vec![Pos::new(0, 0), Pos::new(1, 1)]);
        let blue = b.get_valid_moves(Color::Blue);
        assert_eq!(blue, vec![Pos::new(0, 1), Pos::new(1, 0), Pos::new(1, 1)]);
    }

    #[test]
    fn test_score_counts_only_owner() {
        let b = board("R1 B2 .\n. R3 .\n B1 . .");
        assert_eq!(b.get_score(Color::Red), 4);
        assert_eq!(b.get_score(Color::Blue), 3);
        assert_eq!(b.total_orbs(), 7);
    }

    #[test]
    fn test_game_over() {
        assert!(!Board::new(3, 3).unwrap().is_game_over());
        // First placement of the game is not a win
        assert!(!board(". . .\n. R1 .\n. . .").is_game_over());
        // Two colors present
        assert!(!board("R1 . .\n. . .\n. . B1").is_game_over());
        assert!(board("R1 . .\n. . .\n. . R1").is_game_over());
        assert!(board(". . .\n. R2 .\n. . .").is_game_over());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Board::new(3, 3).unwrap();
        let mut copy = original.clone();
        copy.insert_orb(1, 1, Color::Blue, false);
        assert_eq!(original.total_orbs(), 0);
        assert_eq!(copy.total_orbs(), 1);
    }

    #[test]
    fn test_notation_display_and_parse() {
        let b = board("HUMAN MOVE:\n0 1R 0\n2B 0 0");
        assert_eq!(b.to_string(), ". R1 .\nB2 . .");
        assert_eq!(b.to_string().parse::<Board>().unwrap(), b);
    }

    #[test]
    fn test_json_round_trip() {
        let b = board("R1 . B2\n. R2 .");
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(serde_json::from_str::<Board>(&json).unwrap(), b);
    }

    #[test]
    fn test_json_rejects_broken_cells() {
        let owned_empty = r#"{"rows":1,"cols":2,"grid":[{"orb_count":0,"owner":"Red"},{"orb_count":0,"owner":null}]}"#;
        assert!(serde_json::from_str::<Board>(owned_empty).is_err());

        let unowned_orbs = r#"{"rows":1,"cols":2,"grid":[{"orb_count":1,"owner":"Red"},{"orb_count":3,"owner":null}]}"#;
        assert!(serde_json::from_str::<Board>(unowned_orbs).is_err());

        assert_eq!(
            Cell::new(0, Some(Color::Blue)),
            Err(BoardError::InvalidCell {
                orb_count: 0,
                owner: Some(Color::Blue)
            })
        );
    }

    #[test]
    fn test_json_rejects_wrong_shape() {
        let short = serde_json::from_str::<Board>(r#"{"rows":3,"cols":3,"grid":[]}"#);
        let err = short.unwrap_err().to_string();
        assert!(err.contains("expected 9 cells, found 0"), "{err}");

        let zero = serde_json::from_str::<Board>(r#"{"rows":0,"cols":3,"grid":[]}"#);
        assert!(zero.is_err());
    }

    #[test]
    fn test_notation_errors() {
        assert_eq!("".parse::<Board>(), Err(ParseBoardError::Empty));
        assert!(matches!(
            "R1 .\n.".parse::<Board>(),
            Err(ParseBoardError::RaggedRow { row: 1, expected: 2, found: 1 })
        ));
        assert!(matches!(
            "R1 X2".parse::<Board>(),
            Err(ParseBoardError::InvalidToken { row: 0, col: 1, .. })
        ));
        assert_eq!(
            "R0 .".parse::<Board>(),
            Err(ParseBoardError::OwnedWithoutOrbs { row: 0, col: 0 })
        );
    }
}
