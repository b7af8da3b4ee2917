//! Player capability and the human player

use crate::board::{Board, Color, Pos};
use crate::error::MoveError;
use serde::{Deserialize, Serialize};

/// Who controls a seat
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Human,
    Ai,
}

/// Anything that can take a turn on a board
pub trait Player {
    fn color(&self) -> Color;

    fn kind(&self) -> PlayerKind;

    /// Apply one placement. `row`/`col` is the intended target for players
    /// that take input; search players ignore it. On error the board is
    /// left untouched.
    fn attempt_move(&mut self, board: &mut Board, row: isize, col: isize) -> Result<Pos, MoveError>;

    /// `attempt_move` reduced to success/failure
    fn make_move(&mut self, board: &mut Board, row: isize, col: isize) -> bool {
        self.attempt_move(board, row, col).is_ok()
    }
}

/// Player whose moves come from outside (keyboard, UI)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Human {
    color: Color,
}

impl Human {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Player for Human {
    fn color(&self) -> Color {
        self.color
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Human
    }

    fn attempt_move(&mut self, board: &mut Board, row: isize, col: isize) -> Result<Pos, MoveError> {
        let cell = board.cell(row, col).ok_or(MoveError::OutOfBounds { row, col })?;
        if let Some(owner) = cell.owner().filter(|&owner| owner != self.color) {
            return Err(MoveError::OccupiedByOpponent { row, col, owner });
        }
        board.insert_orb(row, col, self.color, false);
        Ok(Pos::new(row, col))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_places_on_empty_and_own() {
        let mut board = Board::new(3, 3).unwrap();
        let mut human = Human::new(Color::Red);
        assert!(human.make_move(&mut board, 1, 1));
        assert!(human.make_move(&mut board, 1, 1));
        assert_eq!(board.get_orb_count(1, 1), 2);
        assert_eq!(board.get_color(1, 1), Some(Color::Red));
    }

    #[test]
    fn test_human_rejects_opponent_cell() {
        let mut board: Board = ". B1 .\n. . .\n. . .".parse().unwrap();
        let before = board.clone();
        let mut human = Human::new(Color::Red);

        assert_eq!(
            human.attempt_move(&mut board, 0, 1),
            Err(MoveError::OccupiedByOpponent {
                row: 0,
                col: 1,
                owner: Color::Blue
            })
        );
        assert!(!human.make_move(&mut board, 0, 1));
        assert_eq!(board, before);
    }

    #[test]
    fn test_human_rejects_out_of_bounds() {
        let mut board = Board::new(3, 3).unwrap();
        let mut human = Human::new(Color::Blue);
        assert_eq!(
            human.attempt_move(&mut board, 3, 0),
            Err(MoveError::OutOfBounds { row: 3, col: 0 })
        );
        assert!(!human.make_move(&mut board, -1, 2));
        assert_eq!(board.total_orbs(), 0);
    }
}
