//! Game loop - alternates two players on one board
//!
//! Red always moves first. A rejected human move keeps the turn; a side with
//! no valid moves passes. The loop ends when one color remains, when the turn
//! limit is reached, or when human input runs out.

use anyhow::Result;
use chain_reaction_core::{
    winner, Board, Color, GameSettings, Human, MoveError, Player, PlayerKind, Pos,
};

// ============================================================================
// TYPES
// ============================================================================

/// Supplies target cells for human seats
pub trait MoveSource {
    /// Next (row, col) for `color`, or `None` when input is exhausted
    fn next_target(&mut self, board: &Board, color: Color) -> Option<(isize, isize)>;
}

/// Source for games without human seats
pub struct NoInput;

impl MoveSource for NoInput {
    fn next_target(&mut self, _board: &Board, _color: Color) -> Option<(isize, isize)> {
        None
    }
}

/// What happened on one call to `GameLoop::step`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Turn {
    Moved(Pos),
    /// Move refused; the same side is still to move
    Rejected(MoveError),
    /// Side to move had no valid cell
    Skipped,
    InputClosed,
}

/// How a game ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEnd {
    Won(Color),
    TurnLimit,
    InputClosed,
}

/// Summary of a finished game
#[derive(Clone, Debug)]
pub struct GameRecord {
    pub end: GameEnd,
    pub turns: u32,
    pub red_score: u32,
    pub blue_score: u32,
    pub moves: Vec<(Color, Pos)>,
}

impl GameRecord {
    pub fn winner(&self) -> Option<Color> {
        match self.end {
            GameEnd::Won(color) => Some(color),
            GameEnd::TurnLimit | GameEnd::InputClosed => None,
        }
    }

    /// Side with more orbs, `None` on a tie
    pub fn leader(&self) -> Option<Color> {
        match self.red_score.cmp(&self.blue_score) {
            std::cmp::Ordering::Greater => Some(Color::Red),
            std::cmp::Ordering::Less => Some(Color::Blue),
            std::cmp::Ordering::Equal => None,
        }
    }
}

// ============================================================================
// GAME LOOP
// ============================================================================

/// One board and the two players taking turns on it
pub struct GameLoop {
    board: Board,
    red: Box<dyn Player>,
    blue: Box<dyn Player>,
    current: Color,
    turn: u32,
    max_turns: u32,
    input_closed: bool,
    moves: Vec<(Color, Pos)>,
}

impl GameLoop {
    pub fn new(board: Board, red: Box<dyn Player>, blue: Box<dyn Player>, max_turns: u32) -> Self {
        Self {
            board,
            red,
            blue,
            current: Color::Red,
            turn: 0,
            max_turns,
            input_closed: false,
            moves: Vec::new(),
        }
    }

    /// Validate settings and build the board and both seats
    pub fn from_settings(settings: &GameSettings) -> Result<Self> {
        settings.validate()?;
        let board = settings.new_board()?;
        Ok(Self::new(
            board,
            settings.red.build(Color::Red),
            settings.blue.build(Color::Blue),
            settings.max_turns,
        ))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> Color {
        self.current
    }

    /// Turns completed so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn current_kind(&self) -> PlayerKind {
        self.player(self.current).kind()
    }

    fn player(&self, color: Color) -> &dyn Player {
        match color {
            Color::Red => self.red.as_ref(),
            Color::Blue => self.blue.as_ref(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.input_closed || self.turn >= self.max_turns || self.board.is_game_over()
    }

    /// Play one turn for the side to move
    pub fn step(&mut self, input: &mut dyn MoveSource) -> Turn {
        let color = self.current;
        if self.board.get_valid_moves(color).is_empty() {
            tracing::debug!(%color, turn = self.turn, "no valid moves, passing");
            self.advance();
            return Turn::Skipped;
        }

        let player = match color {
            Color::Red => &mut self.red,
            Color::Blue => &mut self.blue,
        };

        let (row, col) = match player.kind() {
            PlayerKind::Human => match input.next_target(&self.board, color) {
                Some(target) => target,
                None => {
                    self.input_closed = true;
                    return Turn::InputClosed;
                }
            },
            PlayerKind::Ai => (0, 0),
        };

        match player.attempt_move(&mut self.board, row, col) {
            Ok(pos) => {
                tracing::debug!(%color, turn = self.turn, %pos, "move played");
                self.moves.push((color, pos));
                self.advance();
                Turn::Moved(pos)
            }
            Err(MoveError::NoValidMoves(_)) => {
                self.advance();
                Turn::Skipped
            }
            Err(err) => {
                tracing::debug!(%color, %err, "move rejected");
                Turn::Rejected(err)
            }
        }
    }

    /// Play a move for the side to move under the human placement rule,
    /// regardless of who controls the seat. Used for scripted openings.
    pub fn place(&mut self, row: isize, col: isize) -> Result<Pos, MoveError> {
        let color = self.current;
        let pos = Human::new(color).attempt_move(&mut self.board, row, col)?;
        self.moves.push((color, pos));
        self.advance();
        Ok(pos)
    }

    fn advance(&mut self) {
        self.turn += 1;
        self.current = self.current.opponent();
    }

    /// Run until the game is finished
    pub fn run(&mut self, input: &mut dyn MoveSource) -> GameRecord {
        while !self.is_finished() {
            self.step(input);
        }
        self.record()
    }

    /// Summary of the game so far
    pub fn record(&self) -> GameRecord {
        let end = match winner(&self.board) {
            Some(color) => GameEnd::Won(color),
            None if self.input_closed => GameEnd::InputClosed,
            None => GameEnd::TurnLimit,
        };
        GameRecord {
            end,
            turns: self.turn,
            red_score: self.board.get_score(Color::Red),
            blue_score: self.board.get_score(Color::Blue),
            moves: self.moves.clone(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chain_reaction_core::AlphaBetaAI;
    use std::collections::VecDeque;

    /// Replays a fixed list of targets
    struct Scripted(VecDeque<(isize, isize)>);

    impl Scripted {
        fn new(targets: &[(isize, isize)]) -> Self {
            Self(targets.iter().copied().collect())
        }
    }

    impl MoveSource for Scripted {
        fn next_target(&mut self, _board: &Board, _color: Color) -> Option<(isize, isize)> {
            self.0.pop_front()
        }
    }

    fn humans(rows: usize, cols: usize) -> GameLoop {
        GameLoop::new(
            Board::new(rows, cols).unwrap(),
            Box::new(Human::new(Color::Red)),
            Box::new(Human::new(Color::Blue)),
            100,
        )
    }

    #[test]
    fn test_turns_alternate() {
        let mut game = humans(3, 3);
        let mut input = Scripted::new(&[(0, 0), (2, 2)]);
        assert_eq!(game.step(&mut input), Turn::Moved(Pos::new(0, 0)));
        assert_eq!(game.current(), Color::Blue);
        assert_eq!(game.step(&mut input), Turn::Moved(Pos::new(2, 2)));
        assert_eq!(game.current(), Color::Red);
        assert_eq!(game.turn(), 2);
    }

    #[test]
    fn test_rejected_move_keeps_turn() {
        let mut game = humans(3, 3);
        let mut input = Scripted::new(&[(1, 1), (1, 1), (5, 5), (0, 1)]);
        game.step(&mut input);

        assert!(matches!(
            game.step(&mut input),
            Turn::Rejected(MoveError::OccupiedByOpponent { .. })
        ));
        assert!(matches!(
            game.step(&mut input),
            Turn::Rejected(MoveError::OutOfBounds { .. })
        ));
        assert_eq!(game.current(), Color::Blue);
        assert_eq!(game.turn(), 1);

        assert_eq!(game.step(&mut input), Turn::Moved(Pos::new(0, 1)));
        assert_eq!(game.current(), Color::Red);
    }

    #[test]
    fn test_input_closed_ends_game() {
        let mut game = humans(3, 3);
        let record = game.run(&mut Scripted::new(&[(0, 0)]));
        assert_eq!(record.end, GameEnd::InputClosed);
        assert_eq!(record.turns, 1);
        assert_eq!(record.moves, vec![(Color::Red, Pos::new(0, 0))]);
    }

    #[test]
    fn test_game_won_by_elimination() {
        // Blue's corner explodes into two Red cells and both orbs are lost
        let mut game = humans(2, 2);
        let mut input = Scripted::new(&[(0, 1), (1, 1), (1, 0), (1, 1)]);
        let record = game.run(&mut input);
        assert_eq!(record.end, GameEnd::Won(Color::Red));
        assert_eq!(record.winner(), Some(Color::Red));
        assert_eq!(record.blue_score, 0);
    }

    #[test]
    fn test_turn_limit() {
        let mut game = GameLoop::new(
            Board::new(3, 3).unwrap(),
            Box::new(AlphaBetaAI::new(Color::Red, 1)),
            Box::new(AlphaBetaAI::new(Color::Blue, 1)),
            4,
        );
        let record = game.run(&mut NoInput);
        assert_eq!(record.turns, 4);
        assert_eq!(record.end, GameEnd::TurnLimit);
        assert_eq!(record.moves.len(), 4);
    }

    #[test]
    fn test_opening_placement_then_ai() {
        let settings = GameSettings::ai_vs_ai(1, 1);
        let mut game = GameLoop::from_settings(&settings).unwrap();

        assert_eq!(game.place(2, 3), Ok(Pos::new(2, 3)));
        assert_eq!(game.current(), Color::Blue);
        assert!(game.place(2, 3).is_err());
        assert_eq!(game.current_kind(), PlayerKind::Ai);
        assert!(matches!(game.step(&mut NoInput), Turn::Moved(_)));
    }

    #[test]
    fn test_from_settings_rejects_invalid() {
        let mut settings = GameSettings::default();
        settings.max_turns = 0;
        assert!(GameLoop::from_settings(&settings).is_err());
    }
}
