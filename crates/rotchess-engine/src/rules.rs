//! Game-status rules: mate, stalemate and the automatic draws a single
//! position (plus its move history) can decide.

use rotchess_core::{Color, Piece};

use crate::movegen::generate_moves;
use crate::{Bitboard, Position};

/// Result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameResult {
    /// White wins by checkmate.
    WhiteWins,
    /// Black wins by checkmate.
    BlackWins,
    /// Draw with a specific reason.
    Draw(DrawReason),
}

/// Reason for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawReason {
    /// No legal moves but not in check.
    Stalemate,
    /// Neither side can possibly mate.
    InsufficientMaterial,
    /// 100 half-moves without a pawn move or capture.
    FiftyMoveRule,
    /// The same position for the third time since the last irreversible move.
    Repetition,
}

/// Half-moves without a pawn move or capture before the fifty-move draw.
pub const FIFTY_MOVE_PLIES: u32 = 100;

/// Occurrences of a position that end the game.
pub const REPETITION_LIMIT: usize = 3;

/// Returns the game result if the game is over, otherwise `None`.
///
/// Mate and stalemate are checked first, so a mating move that also
/// reaches the fiftieth move still wins.
pub fn game_result(pos: &Position) -> Option<GameResult> {
    if generate_moves(pos).is_empty() {
        return Some(if pos.is_check() {
            match pos.side_to_move() {
                Color::White => GameResult::BlackWins,
                Color::Black => GameResult::WhiteWins,
            }
        } else {
            GameResult::Draw(DrawReason::Stalemate)
        });
    }
    if is_insufficient_material(pos) {
        return Some(GameResult::Draw(DrawReason::InsufficientMaterial));
    }
    if pos.halfmove_clock() >= FIFTY_MOVE_PLIES {
        return Some(GameResult::Draw(DrawReason::FiftyMoveRule));
    }
    if pos.repetition_count() >= REPETITION_LIMIT {
        return Some(GameResult::Draw(DrawReason::Repetition));
    }
    None
}

#[inline]
pub fn is_game_over(pos: &Position) -> bool {
    game_result(pos).is_some()
}

/// True for KK, KNK, KBK, KNKB, KBKN, and KBKB with both bishops on the
/// same square color.
pub fn is_insufficient_material(pos: &Position) -> bool {
    let heavy = [Piece::Pawn, Piece::Rook, Piece::Queen];
    if Color::BOTH
        .iter()
        .any(|&color| heavy.iter().any(|&piece| pos.pieces(color, piece).any()))
    {
        return false;
    }

    let minors = |color| {
        (
            pos.pieces(color, Piece::Knight).count(),
            pos.pieces(color, Piece::Bishop).count(),
        )
    };
    match (minors(Color::White), minors(Color::Black)) {
        ((0, 0), (0, 0))
        | ((1, 0), (0, 0))
        | ((0, 1), (0, 0))
        | ((0, 0), (1, 0))
        | ((0, 0), (0, 1))
        | ((1, 0), (0, 1))
        | ((0, 1), (1, 0)) => true,
        ((0, 1), (0, 1)) => {
            let on_dark = |color| {
                (pos.pieces(color, Piece::Bishop) & Bitboard::DARK_SQUARES).any()
            };
            on_dark(Color::White) == on_dark(Color::Black)
        }
        _ => false,
    }
}

/// True if `color` alone has enough material to deliver mate: any pawn,
/// rook or queen, or at least two minor pieces.
pub fn has_mating_material(pos: &Position, color: Color) -> bool {
    let pieces = |piece| pos.pieces(color, piece);
    pieces(Piece::Pawn).any()
        || pieces(Piece::Rook).any()
        || pieces(Piece::Queen).any()
        || (pieces(Piece::Knight) | pieces(Piece::Bishop)).count() > 1
}
