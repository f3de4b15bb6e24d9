//! Mutable board state with a reversible undo log.

use std::fmt;
use std::ops::{Deref, DerefMut};

use rotchess_core::{Color, FenError, FenParser, Move, MoveFlag, Piece, Rank, Square};
use thiserror::Error;

use crate::attacks;
use crate::rotated::RotatedOccupancy;
use crate::zobrist::ZOBRIST;
use crate::Bitboard;

/// The four castling permissions as a nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: CastlingRights = CastlingRights(0);
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    #[inline]
    pub const fn new(flags: u8) -> Self {
        CastlingRights(flags & 0b1111)
    }

    #[inline]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn kingside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        };
        self.0 & flag != 0
    }

    #[inline]
    pub const fn queenside(self, color: Color) -> bool {
        let flag = match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        };
        self.0 & flag != 0
    }

    /// Rights left once a piece has moved from `from` to `to`. Touching a
    /// king's or rook's home square forfeits the rights tied to it.
    #[inline]
    pub const fn after_move(self, from: Square, to: Square) -> Self {
        CastlingRights(self.0 & Self::kept_by(from) & Self::kept_by(to))
    }

    const fn kept_by(sq: Square) -> u8 {
        match sq.index() {
            0 => !Self::WHITE_QUEENSIDE,
            4 => !(Self::WHITE_KINGSIDE | Self::WHITE_QUEENSIDE),
            7 => !Self::WHITE_KINGSIDE,
            56 => !Self::BLACK_QUEENSIDE,
            60 => !(Self::BLACK_KINGSIDE | Self::BLACK_QUEENSIDE),
            63 => !Self::BLACK_KINGSIDE,
            _ => 0b1111,
        }
    }

    /// Parses the FEN castling field ("KQkq", "Kq", "-").
    pub fn from_fen(field: &str) -> Self {
        let flags = field.chars().fold(0u8, |acc, c| {
            acc | match c {
                'K' => Self::WHITE_KINGSIDE,
                'Q' => Self::WHITE_QUEENSIDE,
                'k' => Self::BLACK_KINGSIDE,
                'q' => Self::BLACK_QUEENSIDE,
                _ => 0,
            }
        });
        CastlingRights::new(flags)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("-");
        }
        for (flag, c) in [
            (Self::WHITE_KINGSIDE, 'K'),
            (Self::WHITE_QUEENSIDE, 'Q'),
            (Self::BLACK_KINGSIDE, 'k'),
            (Self::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.0 & flag != 0 {
                write!(f, "{}", c)?;
            }
        }
        Ok(())
    }
}

/// Why a setup string does not describe a playable position.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error(transparent)]
    Fen(#[from] FenError),

    #[error("{0} has no king")]
    MissingKing(Color),

    #[error("{0} has more than one king")]
    ExtraKing(Color),

    #[error("pawn on {0}, a back rank")]
    PawnOnBackRank(Square),

    #[error("{0} has more than eight pawns")]
    TooManyPawns(Color),

    #[error("{0} is in check with the other side to move")]
    OpponentInCheck(Color),

    #[error("en passant target {0} does not follow a double pawn push")]
    InvalidEnPassant(Square),

    #[error("castling right '{0}' without king and rook on their home squares")]
    InvalidCastling(char),
}

/// Everything a move destroys, so [`Position::pop_move`] can put it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Undo {
    mv: Move,
    captured: Option<Piece>,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    hash: u64,
}

/// A chess position.
///
/// `boards` is the source of truth; `occupancy`, the rotated encodings, the
/// mailbox and the Zobrist key are derived from it and kept in step by every
/// piece placement. Only [`apply_move`](Position::apply_move) and
/// [`pop_move`](Position::pop_move) change a position once it is set up, and
/// they must be paired last-in first-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    boards: [[Bitboard; 6]; 2],
    occupancy: [Bitboard; 2],
    rotated: RotatedOccupancy,
    mailbox: [Option<Piece>; 64],
    castling: CastlingRights,
    en_passant: Option<Square>,
    side_to_move: Color,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
    history: Vec<Undo>,
}

impl Position {
    /// A board with no pieces, White to move. Not playable until pieces are added.
    pub fn empty() -> Self {
        Position {
            boards: [[Bitboard::EMPTY; 6]; 2],
            occupancy: [Bitboard::EMPTY; 2],
            rotated: RotatedOccupancy::EMPTY,
            mailbox: [None; 64],
            castling: CastlingRights::NONE,
            en_passant: None,
            side_to_move: Color::White,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            history: Vec::new(),
        }
    }

    pub fn startpos() -> Self {
        Self::from_fen(FenParser::STARTPOS).expect("start position is valid")
    }

    /// Builds and validates a position from a FEN record (4 to 6 fields).
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let parsed = FenParser::parse(fen)?;
        let mut position = Position::empty();
        for (sq, piece, color) in parsed.placements() {
            position.put_piece(color, piece, sq);
        }
        position.side_to_move = parsed.active_color;
        position.castling = CastlingRights::from_fen(&parsed.castling);
        position.en_passant = parsed.en_passant;
        position.halfmove_clock = parsed.halfmove_clock;
        position.fullmove_number = parsed.fullmove_number;
        position.hash = position.compute_hash();
        position.validate()?;
        Ok(position)
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();
        for rank in (0..8).rev() {
            let mut gap = 0;
            for file in 0..8 {
                let sq = Square::from_index_unchecked(rank * 8 + file);
                match self.occupant(sq) {
                    Some((piece, color)) => {
                        if gap > 0 {
                            placement.push_str(&gap.to_string());
                            gap = 0;
                        }
                        placement.push(piece.fen_char(color));
                    }
                    None => gap += 1,
                }
            }
            if gap > 0 {
                placement.push_str(&gap.to_string());
            }
            if rank > 0 {
                placement.push('/');
            }
        }
        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{} {} {} {} {} {}",
            placement,
            self.side_to_move.fen_char(),
            self.castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Checks the invariants a legal game can reach: one king per side, no
    /// pawns on the first or last rank, the side not to move not in check,
    /// and en-passant and castling fields that agree with the board.
    pub fn validate(&self) -> Result<(), PositionError> {
        for color in Color::BOTH {
            match self.pieces(color, Piece::King).count() {
                0 => return Err(PositionError::MissingKing(color)),
                1 => {}
                _ => return Err(PositionError::ExtraKing(color)),
            }
            let pawns = self.pieces(color, Piece::Pawn);
            if pawns.count() > 8 {
                return Err(PositionError::TooManyPawns(color));
            }
            if let Some(sq) = (pawns & (Bitboard::RANK_1 | Bitboard::RANK_8)).first() {
                return Err(PositionError::PawnOnBackRank(sq));
            }
        }

        let waiting = !self.side_to_move;
        if attacks::is_attacked(self, self.king_square(waiting), self.side_to_move) {
            return Err(PositionError::OpponentInCheck(waiting));
        }

        if let Some(ep) = self.en_passant {
            // The pawn that just moved two squares sits in front of the
            // target, and the square it came from is empty again.
            let pushed = ep.forward(waiting);
            let origin = ep.backward(waiting);
            let consistent = ep.rank() == waiting.en_passant_rank()
                && self.piece_at(ep).is_none()
                && pushed.is_some_and(|sq| self.pieces(waiting, Piece::Pawn).contains(sq))
                && origin.is_some_and(|sq| self.piece_at(sq).is_none());
            if !consistent {
                return Err(PositionError::InvalidEnPassant(ep));
            }
        }

        for (color, kingside, letter) in [
            (Color::White, true, 'K'),
            (Color::White, false, 'Q'),
            (Color::Black, true, 'k'),
            (Color::Black, false, 'q'),
        ] {
            let granted = if kingside {
                self.castling.kingside(color)
            } else {
                self.castling.queenside(color)
            };
            if !granted {
                continue;
            }
            let back = color.back_rank().index() * 8;
            let king_home = Square::from_index_unchecked(back + 4);
            let rook_home = Square::from_index_unchecked(if kingside { back + 7 } else { back });
            if !self.pieces(color, Piece::King).contains(king_home)
                || !self.pieces(color, Piece::Rook).contains(rook_home)
            {
                return Err(PositionError::InvalidCastling(letter));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn castling(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Zobrist key of the current position.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn pieces(&self, color: Color, piece: Piece) -> Bitboard {
        self.boards[color.index()][piece.index()]
    }

    #[inline]
    pub fn occupancy(&self, color: Color) -> Bitboard {
        self.occupancy[color.index()]
    }

    /// Every occupied square.
    #[inline]
    pub fn blocker(&self) -> Bitboard {
        self.rotated.blocker()
    }

    #[inline]
    pub fn rotated(&self) -> &RotatedOccupancy {
        &self.rotated
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.mailbox[sq.idx()]
    }

    #[inline]
    pub fn color_at(&self, sq: Square) -> Option<Color> {
        if self.occupancy[0].contains(sq) {
            Some(Color::White)
        } else if self.occupancy[1].contains(sq) {
            Some(Color::Black)
        } else {
            None
        }
    }

    #[inline]
    pub fn occupant(&self, sq: Square) -> Option<(Piece, Color)> {
        Some((self.piece_at(sq)?, self.color_at(sq)?))
    }

    /// The king of `color`. Every validated position has exactly one.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        let king = self.pieces(color, Piece::King);
        debug_assert!(king.count() == 1, "{} must have exactly one king", color);
        king.first().unwrap_or(Square::A1)
    }

    /// True when the side to move is in check.
    pub fn is_check(&self) -> bool {
        let us = self.side_to_move;
        attacks::is_attacked(self, self.king_square(us), !us)
    }

    /// Number of moves applied and not yet popped.
    #[inline]
    pub fn ply(&self) -> usize {
        self.history.len()
    }

    /// Moves applied so far, oldest first.
    pub fn moves(&self) -> impl DoubleEndedIterator<Item = Move> + '_ {
        self.history.iter().map(|undo| undo.mv)
    }

    #[inline]
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|undo| undo.mv)
    }

    /// How often the current position has occurred since the last capture
    /// or pawn move, this occurrence included.
    pub fn repetition_count(&self) -> usize {
        let window = (self.halfmove_clock as usize).min(self.history.len());
        1 + self.history[self.history.len() - window..]
            .iter()
            .filter(|undo| undo.hash == self.hash)
            .count()
    }

    /// True if the move captures something, en passant included.
    #[inline]
    pub fn is_capture(&self, m: Move) -> bool {
        m.flag() == MoveFlag::EnPassant || self.occupancy(!self.side_to_move).contains(m.to())
    }

    /// Plays `m` for the side to move. `m` must be legal here.
    pub fn apply_move(&mut self, m: Move) {
        let us = self.side_to_move;
        let them = !us;
        let (from, to, flag) = (m.from(), m.to(), m.flag());
        let piece = match self.piece_at(from) {
            Some(piece) if self.occupancy(us).contains(from) => piece,
            _ => {
                debug_assert!(false, "apply_move {} with no {} piece on {}", m, us, from);
                return;
            }
        };

        let (captured, captured_on) = if flag == MoveFlag::EnPassant {
            (Some(Piece::Pawn), to.backward(us))
        } else {
            (self.piece_at(to), Some(to))
        };

        self.history.push(Undo {
            mv: m,
            captured,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        });

        if let Some(ep) = self.en_passant.take() {
            self.hash ^= ZOBRIST.en_passant(ep);
        }
        if let (Some(victim), Some(at)) = (captured, captured_on) {
            self.remove_piece(them, victim, at);
        }
        self.remove_piece(us, piece, from);
        self.put_piece(us, m.promotion().unwrap_or(piece), to);
        if let Some((rook_from, rook_to)) = m.castling_rook(us) {
            self.remove_piece(us, Piece::Rook, rook_from);
            self.put_piece(us, Piece::Rook, rook_to);
        }

        let rights = self.castling.after_move(from, to);
        self.hash ^= ZOBRIST.castling(self.castling.raw()) ^ ZOBRIST.castling(rights.raw());
        self.castling = rights;

        if flag == MoveFlag::DoublePush {
            self.en_passant = from.forward(us);
            if let Some(ep) = self.en_passant {
                self.hash ^= ZOBRIST.en_passant(ep);
            }
        }

        if piece == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if us == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = them;
        self.hash ^= ZOBRIST.black_to_move();
    }

    /// Takes back the last applied move and returns it. Restores the
    /// position bit for bit.
    pub fn pop_move(&mut self) -> Option<Move> {
        debug_assert!(!self.history.is_empty(), "pop_move without a matching apply_move");
        let undo = *self.history.last()?;
        let m = undo.mv;
        let them = self.side_to_move;
        let us = !them;
        let (from, to) = (m.from(), m.to());
        let Some(on_target) = self.piece_at(to) else {
            debug_assert!(false, "pop_move {} finds {} empty", m, to);
            return None;
        };
        self.history.pop();

        if let Some((rook_from, rook_to)) = m.castling_rook(us) {
            self.remove_piece(us, Piece::Rook, rook_to);
            self.put_piece(us, Piece::Rook, rook_from);
        }
        self.remove_piece(us, on_target, to);
        let mover = if m.promotion().is_some() { Piece::Pawn } else { on_target };
        self.put_piece(us, mover, from);
        if let Some(victim) = undo.captured {
            let at = if m.flag() == MoveFlag::EnPassant { to.backward(us) } else { Some(to) };
            if let Some(at) = at {
                self.put_piece(them, victim, at);
            }
        }

        self.side_to_move = us;
        if us == Color::Black {
            self.fullmove_number -= 1;
        }
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.hash = undo.hash;
        Some(m)
    }

    /// Applies `m` and returns a guard that pops it when dropped, on every
    /// exit path.
    pub fn scoped(&mut self, m: Move) -> MoveGuard<'_> {
        self.apply_move(m);
        MoveGuard { position: self }
    }

    fn put_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        debug_assert!(self.mailbox[sq.idx()].is_none(), "{} is occupied", sq);
        self.boards[color.index()][piece.index()].set(sq);
        self.occupancy[color.index()].set(sq);
        self.rotated.toggle(sq);
        self.mailbox[sq.idx()] = Some(piece);
        self.hash ^= ZOBRIST.piece(color, piece, sq);
    }

    fn remove_piece(&mut self, color: Color, piece: Piece, sq: Square) {
        debug_assert!(self.boards[color.index()][piece.index()].contains(sq), "no {} {} on {}", color, piece, sq);
        self.boards[color.index()][piece.index()].clear(sq);
        self.occupancy[color.index()].clear(sq);
        self.rotated.toggle(sq);
        self.mailbox[sq.idx()] = None;
        self.hash ^= ZOBRIST.piece(color, piece, sq);
    }

    /// The Zobrist key recomputed from scratch.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = ZOBRIST.castling(self.castling.raw());
        for color in Color::BOTH {
            for piece in Piece::ALL {
                for sq in self.pieces(color, piece) {
                    hash ^= ZOBRIST.piece(color, piece, sq);
                }
            }
        }
        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant(ep);
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.black_to_move();
        }
        hash
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.iter().rev() {
            write!(f, "{} ", rank)?;
            for file in 0..8 {
                let sq = Square::from_index_unchecked(rank.index() * 8 + file);
                let c = self.occupant(sq).map_or('.', |(piece, color)| piece.fen_char(color));
                write!(f, "{} ", c)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "{}", self.to_fen())
    }
}

/// A move applied for the lifetime of the guard.
///
/// Dereferences to the position after the move; dropping the guard pops it.
pub struct MoveGuard<'a> {
    position: &'a mut Position,
}

impl Deref for MoveGuard<'_> {
    type Target = Position;

    fn deref(&self) -> &Position {
        self.position
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Position {
        self.position
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.position.pop_move();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    #[test]
    fn startpos_round_trips_through_fen() {
        let position = Position::startpos();
        assert_eq!(position.to_fen(), FenParser::STARTPOS);
        assert_eq!(position.blocker().count(), 32);
        assert_eq!(position.piece_at(Square::E1), Some(Piece::King));
        assert_eq!(position.color_at(Square::E8), Some(Color::Black));
        assert_eq!(position.hash(), position.compute_hash());
    }

    #[test]
    fn four_field_fen_defaults_clocks() {
        let position = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.fullmove_number(), 1);
        assert_eq!(position.to_fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
    }

    #[test]
    fn derived_boards_agree_after_moves() {
        let mut position = Position::startpos();
        position.apply_move(Move::new(sq("e2"), sq("e4"), MoveFlag::DoublePush));
        position.apply_move(Move::new(sq("d7"), sq("d5"), MoveFlag::DoublePush));
        position.apply_move(Move::normal(sq("e4"), sq("d5")));
        let white = position.occupancy(Color::White);
        let black = position.occupancy(Color::Black);
        assert!(white.contains(sq("d5")));
        assert!(!black.contains(sq("d5")));
        assert_eq!(position.blocker(), white | black);
        assert_eq!(*position.rotated(), RotatedOccupancy::from(white | black));
        assert_eq!(position.hash(), position.compute_hash());
        assert_eq!(position.halfmove_clock(), 0);
        assert_eq!(position.fullmove_number(), 2);
    }

    #[test]
    fn double_push_sets_and_next_move_clears_en_passant() {
        let mut position = Position::startpos();
        position.apply_move(Move::new(sq("e2"), sq("e4"), MoveFlag::DoublePush));
        assert_eq!(position.en_passant(), Some(sq("e3")));
        position.apply_move(Move::normal(sq("g8"), sq("f6")));
        assert_eq!(position.en_passant(), None);
        assert_eq!(position.hash(), position.compute_hash());
    }

    #[test]
    fn history_lists_moves_oldest_first() {
        let mut position = Position::startpos();
        assert_eq!(position.last_move(), None);
        let e4 = Move::new(sq("e2"), sq("e4"), MoveFlag::DoublePush);
        let e5 = Move::new(sq("e7"), sq("e5"), MoveFlag::DoublePush);
        position.apply_move(e4);
        position.apply_move(e5);
        assert_eq!(position.last_move(), Some(e5));
        assert_eq!(position.moves().collect::<Vec<_>>(), vec![e4, e5]);
        assert_eq!(position.pop_move(), Some(e5));
        assert_eq!(position.last_move(), Some(e4));
        assert_eq!(position.ply(), 1);
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut position =
            Position::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let before = position.clone();
        position.apply_move(Move::new(sq("e5"), sq("d6"), MoveFlag::EnPassant));
        assert_eq!(position.piece_at(sq("d5")), None);
        assert_eq!(position.piece_at(sq("d6")), Some(Piece::Pawn));
        assert_eq!(position.pieces(Color::Black, Piece::Pawn), Bitboard::EMPTY);
        position.pop_move();
        assert_eq!(position, before);
    }

    #[test]
    fn castling_moves_the_rook_and_clears_rights() {
        let mut position =
            Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let before = position.clone();
        position.apply_move(Move::new(Square::E1, Square::G1, MoveFlag::CastleKingside));
        assert_eq!(position.piece_at(Square::F1), Some(Piece::Rook));
        assert_eq!(position.piece_at(Square::H1), None);
        assert_eq!(position.castling().to_string(), "kq");
        position.apply_move(Move::new(Square::E8, Square::C8, MoveFlag::CastleQueenside));
        assert_eq!(position.piece_at(Square::D8), Some(Piece::Rook));
        assert_eq!(position.castling(), CastlingRights::NONE);
        assert_eq!(position.hash(), position.compute_hash());
        position.pop_move();
        position.pop_move();
        assert_eq!(position, before);
    }

    #[test]
    fn capturing_a_rook_removes_its_right() {
        let mut position =
            Position::from_fen("r3k2r/8/8/8/8/8/6B1/R3K2R w KQkq - 0 1").unwrap();
        position.apply_move(Move::normal(sq("g2"), Square::A8));
        assert_eq!(position.castling().to_string(), "KQk");
    }

    #[test]
    fn promotion_and_pop() {
        let mut position = Position::from_fen("1n2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let before = position.clone();
        position.apply_move(Move::new(sq("a7"), sq("b8"), MoveFlag::PromoteQueen));
        assert_eq!(position.occupant(sq("b8")), Some((Piece::Queen, Color::White)));
        assert!(position.pieces(Color::White, Piece::Pawn).is_empty());
        assert_eq!(position.pop_move(), Some(Move::new(sq("a7"), sq("b8"), MoveFlag::PromoteQueen)));
        assert_eq!(position, before);
    }

    #[test]
    fn guard_pops_on_drop() {
        let mut position = Position::startpos();
        let before = position.clone();
        {
            let guard = position.scoped(Move::normal(sq("g1"), sq("f3")));
            assert_eq!(guard.side_to_move(), Color::Black);
            assert_eq!(guard.ply(), 1);
        }
        assert_eq!(position, before);
    }

    #[test]
    fn repetition_counts_knight_shuffles() {
        let mut position = Position::startpos();
        assert_eq!(position.repetition_count(), 1);
        for _ in 0..2 {
            position.apply_move(Move::normal(sq("g1"), sq("f3")));
            position.apply_move(Move::normal(sq("g8"), sq("f6")));
            position.apply_move(Move::normal(sq("f3"), sq("g1")));
            position.apply_move(Move::normal(sq("f6"), sq("g8")));
        }
        assert_eq!(position.repetition_count(), 3);
    }

    #[test]
    fn validate_rejects_impossible_setups() {
        assert_eq!(
            Position::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(PositionError::MissingKing(Color::Black))
        );
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/2K1K3 w - - 0 1"),
            Err(PositionError::ExtraKing(Color::White))
        );
        assert_eq!(
            Position::from_fen("4k2P/8/8/8/8/8/8/4K3 w - - 0 1"),
            Err(PositionError::PawnOnBackRank(Square::H8))
        );
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/4R3/4K3 w - - 0 1"),
            Err(PositionError::OpponentInCheck(Color::Black))
        );
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - e6 0 1"),
            Err(PositionError::InvalidEnPassant(sq("e6")))
        );
        assert_eq!(
            Position::from_fen("4k3/8/8/8/8/8/8/4K3 w K - 0 1"),
            Err(PositionError::InvalidCastling('K'))
        );
        assert!(matches!(
            Position::from_fen("not a fen"),
            Err(PositionError::Fen(_))
        ));
    }
}
