//! Long algebraic notation: `Ng1-f3`, `e4xd5`, `e7-e8=Q`, `O-O`.

use rotchess_core::{Move, MoveFlag, Piece, Square};

use super::{parse_san, reject, split_promotion, strip_check_suffix, MatchFailure, MoveSpec, NotationError};
use crate::Position;

/// LAN for `m`. Castling is written as in SAN; no check suffix is added.
pub fn to_lan(pos: &Position, m: Move) -> String {
    match m.flag() {
        MoveFlag::CastleKingside => return "O-O".to_string(),
        MoveFlag::CastleQueenside => return "O-O-O".to_string(),
        _ => {}
    }

    let mut lan = String::with_capacity(8);
    match pos.piece_at(m.from()) {
        Some(Piece::Pawn) | None => {}
        Some(piece) => lan.push(piece.san_char()),
    }
    lan.push_str(&m.from().to_algebraic());
    lan.push(if pos.is_capture(m) { 'x' } else { '-' });
    lan.push_str(&m.to().to_algebraic());
    if let Some(promoted) = m.promotion() {
        lan.push('=');
        lan.push(promoted.san_char());
    }
    lan
}

/// Parses LAN. The separator may be `-`, `x` or missing, and the piece
/// letter may be left out.
pub fn parse_lan(pos: &Position, text: &str) -> Result<Move, NotationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NotationError::Empty);
    }
    let body = strip_check_suffix(text);
    if body.starts_with(['O', 'o', '0']) {
        return parse_san(pos, text);
    }

    let (body, promotion) = split_promotion(body, text)?;
    let (letter, squares) = match body.chars().next() {
        Some(c) if c.is_ascii_uppercase() => (Piece::from_san_char(c), &body[1..]),
        _ => (None, body),
    };
    let squares: String = squares.chars().filter(|&c| c != '-' && c != 'x').collect();
    if squares.len() != 4 || !squares.is_ascii() {
        return Err(NotationError::InvalidFormat(text.to_string()));
    }
    let (from, to) = match (
        Square::from_algebraic(&squares[..2]),
        Square::from_algebraic(&squares[2..]),
    ) {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(NotationError::InvalidSquare(text.to_string())),
    };

    let piece = match (letter, pos.piece_at(from)) {
        (Some(letter), _) => letter,
        (None, Some(piece)) => piece,
        (None, None) => return Err(reject(pos, text, MatchFailure::None)),
    };
    let promotion = match promotion {
        None if piece == Piece::Pawn && to.rank() == pos.side_to_move().promotion_rank() => {
            Some(Piece::Queen)
        }
        promotion => promotion,
    };

    MoveSpec {
        piece,
        from_file: Some(from.file()),
        from_rank: Some(from.rank()),
        to,
        promotion,
    }
    .resolve(pos, text)
}
