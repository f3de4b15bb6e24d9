//! Coordinate notation: `e2e4`, `e7e8q`, `e7e8=Q`.

use rotchess_core::{File, Move, MoveFlag, Piece, Square};

use super::{
    parse_san, reject, split_promotion, strip_check_suffix, MatchFailure, MoveSpec, NotationError,
};
use crate::Position;

/// How castling is written in coordinate notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CastleStyle {
    /// `O-O` and `O-O-O`.
    San,
    /// The king's own move, `e1g1`.
    #[default]
    KingToSquare,
    /// The king onto its rook, `e1h1`.
    KingTakesRook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnStyle {
    /// `e7e8q` rather than `e7e8=Q`.
    pub short: bool,
    pub castle: CastleStyle,
}

impl Default for AnStyle {
    fn default() -> Self {
        AnStyle {
            short: true,
            castle: CastleStyle::KingToSquare,
        }
    }
}

/// Short coordinate form with king-to-square castling, e.g. `e1g1`, `a7a8q`.
pub fn to_an(m: Move) -> String {
    to_an_with(m, AnStyle::default())
}

pub fn to_an_with(m: Move, style: AnStyle) -> String {
    let (from, mut to) = (m.from(), m.to());
    if m.is_castling() {
        match style.castle {
            CastleStyle::San if m.flag() == MoveFlag::CastleKingside => return "O-O".to_string(),
            CastleStyle::San => return "O-O-O".to_string(),
            CastleStyle::KingToSquare => {}
            CastleStyle::KingTakesRook => {
                let file = if m.flag() == MoveFlag::CastleKingside {
                    File::H
                } else {
                    File::A
                };
                to = Square::new(file, from.rank());
            }
        }
    }

    let mut an = format!("{}{}", from, to);
    if let Some(promoted) = m.promotion() {
        if style.short {
            an.push(promoted.san_char().to_ascii_lowercase());
        } else {
            an.push('=');
            an.push(promoted.san_char());
        }
    }
    an
}

/// Parses coordinate notation. A king moving onto its own rook is read as
/// castling, and a pawn reaching the last rank without a piece promotes to
/// a queen.
pub fn parse_an(pos: &Position, text: &str) -> Result<Move, NotationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NotationError::Empty);
    }
    if text.starts_with(['O', 'o', '0']) {
        return parse_san(pos, text);
    }
    let body = strip_check_suffix(text);
    if !(4..=6).contains(&body.len()) || !body.is_ascii() {
        return Err(NotationError::InvalidFormat(text.to_string()));
    }

    let (squares, promotion) = split_promotion(body, text)?;
    if squares.len() != 4 {
        return Err(NotationError::InvalidFormat(text.to_string()));
    }
    let (from, mut to) = match (
        Square::from_algebraic(&squares[..2]),
        Square::from_algebraic(&squares[2..]),
    ) {
        (Some(from), Some(to)) => (from, to),
        _ => return Err(NotationError::InvalidSquare(text.to_string())),
    };

    let us = pos.side_to_move();
    let Some(piece) = pos.piece_at(from) else {
        return Err(reject(pos, text, MatchFailure::None));
    };

    if piece == Piece::King
        && pos.piece_at(to) == Some(Piece::Rook)
        && pos.color_at(to) == Some(us)
    {
        let file = if to.file() > from.file() { File::G } else { File::C };
        to = Square::new(file, from.rank());
    }

    let promotion = match promotion {
        None if piece == Piece::Pawn && to.rank() == us.promotion_rank() => Some(Piece::Queen),
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
