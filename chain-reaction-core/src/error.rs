//! Error types

use crate::board::Color;
use thiserror::Error;

/// Errors raised when constructing a board
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board dimensions must be positive (got {rows}x{cols})")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("expected {expected} cells, found {found}")]
    CellCount { expected: usize, found: usize },

    #[error("cell with {orb_count} orbs and owner {owner:?} breaks the ownership rule")]
    InvalidCell { orb_count: u32, owner: Option<Color> },
}

/// Errors raised when parsing board notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseBoardError {
    #[error("board notation is empty")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid cell token {token:?} at ({row}, {col})")]
    InvalidToken { row: usize, col: usize, token: String },

    #[error("owned cell at ({row}, {col}) must hold at least one orb")]
    OwnedWithoutOrbs { row: usize, col: usize },

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Reasons a player's move is rejected. The board is untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("({row}, {col}) is outside the board")]
    OutOfBounds { row: isize, col: isize },

    #[error("({row}, {col}) is owned by {owner}")]
    OccupiedByOpponent { row: isize, col: isize, owner: Color },

    #[error("{0} has no valid moves")]
    NoValidMoves(Color),
}

/// Errors raised when validating game settings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("grid dimensions must be positive (got {rows}x{cols})")]
    InvalidGrid { rows: usize, cols: usize },

    #[error("max_turns must be positive")]
    ZeroTurnLimit,

    #[error("{0} AI seat has search depth 0")]
    ZeroDepth(Color),

    #[error("invalid grid size {0:?}, expected ROWSxCOLS")]
    InvalidGridSize(String),

    #[error("unknown difficulty {0:?}, expected easy, normal, medium or hard")]
    InvalidDifficulty(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_error_display() {
        let err = MoveError::OccupiedByOpponent {
            row: 1,
            col: 2,
            owner: Color::Blue,
        };
        assert_eq!(err.to_string(), "(1, 2) is owned by Blue");
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseBoardError::RaggedRow {
            row: 2,
            expected: 6,
            found: 5,
        };
        assert_eq!(err.to_string(), "row 2 has 5 cells, expected 6");
    }

    #[test]
    fn test_board_error_converts() {
        let err: ParseBoardError = BoardError::InvalidDimensions { rows: 0, cols: 3 }.into();
        assert_eq!(err.to_string(), "board dimensions must be positive (got 0x3)");
    }
}
