//! Position evaluation

use crate::board::{Board, Color};

/// Orb difference from `own`'s perspective.
///
/// Always relative to the searching side, whichever color is to move.
pub fn evaluate(board: &Board, own: Color) -> i32 {
    board.get_score(own) as i32 - board.get_score(own.opponent()) as i32
}

/// The remaining color once the game is over
pub fn winner(board: &Board) -> Option<Color> {
    if !board.is_game_over() {
        return None;
    }
    Color::ALL
        .into_iter()
        .find(|&color| board.get_score(color) > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_is_antisymmetric() {
        let board: Board = "R2 B1 .\n. R1 .\n. . B1".parse().unwrap();
        assert_eq!(evaluate(&board, Color::Red), 1);
        assert_eq!(evaluate(&board, Color::Blue), -1);
    }

    #[test]
    fn test_winner() {
        let ongoing: Board = "R1 . B1".parse().unwrap();
        assert_eq!(winner(&ongoing), None);

        let finished: Board = ". B2 .\nB1 . .".parse().unwrap();
        assert_eq!(winner(&finished), Some(Color::Blue));
    }
}
