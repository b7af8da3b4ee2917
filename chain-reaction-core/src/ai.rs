//! CPU-based minimax AI with alpha-beta pruning

use crate::board::{Board, Color, Pos};
use crate::error::MoveError;
use crate::eval::evaluate;
use crate::player::{Player, PlayerKind};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default search depth in plies
pub const DEFAULT_DEPTH: u32 = 4;

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Counters collected during one search
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Positions visited, leaves included
    pub nodes: u64,
    /// Move loops cut short by `beta <= alpha`
    pub cutoffs: u64,
}

/// Outcome of a root search
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Pos,
    pub score: i32,
    pub stats: SearchStats,
}

// ============================================================================
// ALPHA-BETA AI
// ============================================================================

/// Alpha-Beta AI player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlphaBetaAI {
    pub color: Color,
    pub depth: u32,
}

impl AlphaBetaAI {
    pub fn new(color: Color, depth: u32) -> Self {
        Self { color, depth }
    }

    pub fn with_default_depth(color: Color) -> Self {
        Self::new(color, DEFAULT_DEPTH)
    }

    /// Pick a move without touching `board`.
    ///
    /// Candidates are scanned in row-major order and only a strictly better
    /// score replaces the current best, so ties go to the earliest cell.
    pub fn choose_move(&self, board: &Board) -> Option<SearchResult> {
        let mut stats = SearchStats::default();
        let mut best: Option<(Pos, i32)> = None;

        for mv in board.get_valid_moves(self.color) {
            let mut child = board.clone();
            child.insert_orb(mv.row, mv.col, self.color, false);

            let score = search(
                &child,
                self.depth.saturating_sub(1),
                i32::MIN,
                i32::MAX,
                false,
                self.color,
                &mut stats,
            );

            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((mv, score));
            }
        }

        best.map(|(best_move, score)| SearchResult {
            best_move,
            score,
            stats,
        })
    }
}

impl Player for AlphaBetaAI {
    fn color(&self) -> Color {
        self.color
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Ai
    }

    /// Search and play. The row/col hint is ignored.
    fn attempt_move(&mut self, board: &mut Board, _row: isize, _col: isize) -> Result<Pos, MoveError> {
        let result = self
            .choose_move(board)
            .ok_or(MoveError::NoValidMoves(self.color))?;

        tracing::debug!(
            color = %self.color,
            depth = self.depth,
            best = %result.best_move,
            score = result.score,
            nodes = result.stats.nodes,
            cutoffs = result.stats.cutoffs,
            "AI selected move"
        );

        let Pos { row, col } = result.best_move;
        board.insert_orb(row, col, self.color, false);
        Ok(result.best_move)
    }
}

// ============================================================================
// MINIMAX WITH ALPHA-BETA
// ============================================================================

/// Minimax value of `board` for `own`.
///
/// `maximizing` selects the side to move: `own` when true, its opponent
/// otherwise. Leaves (depth 0, game over, or no moves for the side to move)
/// score `evaluate(board, own)`.
pub fn minimax(
    board: &Board,
    depth: u32,
    alpha: i32,
    beta: i32,
    maximizing: bool,
    own: Color,
) -> i32 {
    search(board, depth, alpha, beta, maximizing, own, &mut SearchStats::default())
}

fn search(
    board: &Board,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    maximizing: bool,
    own: Color,
    stats: &mut SearchStats,
) -> i32 {
    stats.nodes += 1;

    if depth == 0 || board.is_game_over() {
        return evaluate(board, own);
    }

    let mover = if maximizing { own } else { own.opponent() };
    let moves = board.get_valid_moves(mover);
    if moves.is_empty() {
        return evaluate(board, own);
    }

    if maximizing {
        let mut best = i32::MIN;
        for mv in moves {
            let mut child = board.clone();
            child.insert_orb(mv.row, mv.col, mover, false);
            let value = search(&child, depth - 1, alpha, beta, false, own, stats);

            best = best.max(value);
            alpha = alpha.max(value);
            if beta <= alpha {
                stats.cutoffs += 1;
                break;
            }
        }
        best
    } else {
        let mut best = i32::MAX;
        for mv in moves {
            let mut child = board.clone();
            child.insert_orb(mv.row, mv.col, mover, false);
            let value = search(&child, depth - 1, alpha, beta, true, own, stats);

            best = best.min(value);
            beta = beta.min(value);
            if beta <= alpha {
                stats.cutoffs += 1;
                break;
            }
        }
        best
    }
}

// ============================================================================
// TESTS
// ============================================================================
