//! Packed move words.

use crate::{Color, Piece, Square};
use std::fmt;

/// What a move does besides relocating one piece.
///
/// The flag alone determines every side effect `apply_move` performs, so a
/// move word never needs the board to be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MoveFlag {
    Normal = 0,
    /// Pawn advances two squares and leaves an en-passant target behind.
    DoublePush = 1,
    CastleKingside = 2,
    CastleQueenside = 3,
    /// Pawn captures the pawn that just double-stepped past it.
    EnPassant = 4,
    PromoteKnight = 5,
    PromoteBishop = 6,
    PromoteRook = 7,
    PromoteQueen = 8,
}

impl MoveFlag {
    const ALL: [MoveFlag; 9] = [
        MoveFlag::Normal,
        MoveFlag::DoublePush,
        MoveFlag::CastleKingside,
        MoveFlag::CastleQueenside,
        MoveFlag::EnPassant,
        MoveFlag::PromoteKnight,
        MoveFlag::PromoteBishop,
        MoveFlag::PromoteRook,
        MoveFlag::PromoteQueen,
    ];

    #[inline]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if (bits as usize) < Self::ALL.len() {
            Some(Self::ALL[bits as usize])
        } else {
            None
        }
    }

    #[inline]
    pub const fn promotion_piece(self) -> Option<Piece> {
        match self {
            MoveFlag::PromoteKnight => Some(Piece::Knight),
            MoveFlag::PromoteBishop => Some(Piece::Bishop),
            MoveFlag::PromoteRook => Some(Piece::Rook),
            MoveFlag::PromoteQueen => Some(Piece::Queen),
            _ => None,
        }
    }

    /// The flag that promotes to `piece`, if `piece` is a legal promotion.
    #[inline]
    pub const fn promoting_to(piece: Piece) -> Option<Self> {
        match piece {
            Piece::Knight => Some(MoveFlag::PromoteKnight),
            Piece::Bishop => Some(MoveFlag::PromoteBishop),
            Piece::Rook => Some(MoveFlag::PromoteRook),
            Piece::Queen => Some(MoveFlag::PromoteQueen),
            Piece::Pawn | Piece::King => None,
        }
    }

    #[inline]
    pub const fn is_promotion(self) -> bool {
        self.promotion_piece().is_some()
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        matches!(self, MoveFlag::CastleKingside | MoveFlag::CastleQueenside)
    }
}

/// A move packed into 16 bits: `flag << 12 | from << 6 | to`.
///
/// Castling is encoded as the king's move (e1g1, e1c1, e8g8, e8c8); the
/// rook's relocation is implied by the flag, see [`Move::castling_rook`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move(u16);

impl Move {
    /// Placeholder word; never a legal move.
    pub const NULL: Move = Move(0);

    #[inline]
    pub const fn new(from: Square, to: Square, flag: MoveFlag) -> Self {
        Move((flag as u16) << 12 | (from.index() as u16) << 6 | to.index() as u16)
    }

    #[inline]
    pub const fn normal(from: Square, to: Square) -> Self {
        Self::new(from, to, MoveFlag::Normal)
    }

    /// Reinterprets a raw word, rejecting undefined flag nibbles.
    pub const fn from_raw(raw: u16) -> Option<Self> {
        match MoveFlag::from_bits((raw >> 12) as u8) {
            Some(_) => Some(Move(raw)),
            None => None,
        }
    }

    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn from(self) -> Square {
        Square::from_index_unchecked(((self.0 >> 6) & 0x3F) as u8)
    }

    #[inline]
    pub const fn to(self) -> Square {
        Square::from_index_unchecked((self.0 & 0x3F) as u8)
    }

    #[inline]
    pub const fn flag(self) -> MoveFlag {
        match MoveFlag::from_bits((self.0 >> 12) as u8) {
            Some(flag) => flag,
            None => MoveFlag::Normal,
        }
    }

    #[inline]
    pub const fn promotion(self) -> Option<Piece> {
        self.flag().promotion_piece()
    }

    #[inline]
    pub const fn is_castling(self) -> bool {
        self.flag().is_castling()
    }

    /// Rook origin and destination for a castling move made by `color`.
    pub const fn castling_rook(self, color: Color) -> Option<(Square, Square)> {
        match (self.flag(), color) {
            (MoveFlag::CastleKingside, Color::White) => Some((Square::H1, Square::F1)),
            (MoveFlag::CastleQueenside, Color::White) => Some((Square::A1, Square::D1)),
            (MoveFlag::CastleKingside, Color::Black) => Some((Square::H8, Square::F8)),
            (MoveFlag::CastleQueenside, Color::Black) => Some((Square::A8, Square::D8)),
            _ => None,
        }
    }

    /// Coordinate form with a lowercase promotion letter, e.g. `e2e4`, `e7e8q`.
    pub fn to_coordinate(self) -> String {
        match self.promotion() {
            Some(piece) => format!(
                "{}{}{}",
                self.from(),
                self.to(),
                piece.san_char().to_ascii_lowercase()
            ),
            None => format!("{}{}", self.from(), self.to()),
        }
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Move({}, {:?})", self.to_coordinate(), self.flag())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_coordinate())
    }
}
