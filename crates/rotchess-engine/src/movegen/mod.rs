//! Move generation.
//!
//! [`generate_moves`] picks one of three paths from the position itself:
//! the normal generator when the side to move is not in check, the evasion
//! generator under a single check, and king moves only under a double
//! check. [`gen_mode`] reports which one applies.

mod evasion;
pub mod perft;

use rotchess_core::{Color, Move, MoveFlag, Piece, Square};

use crate::attacks;
use crate::tables;
use crate::{Bitboard, Position};

pub use evasion::generate_evasions;

/// A list of moves with a fixed maximum capacity.
///
/// Chess positions have at most 218 legal moves, so we use a fixed-size
/// array to avoid heap allocations during move generation.
#[derive(Clone)]
pub struct MoveList {
    moves: [Move; Self::MAX_MOVES],
    len: usize,
}

impl MoveList {
    /// Maximum number of moves a list holds.
    pub const MAX_MOVES: usize = 256;

    #[inline]
    pub const fn new() -> Self {
        MoveList {
            moves: [Move::NULL; Self::MAX_MOVES],
            len: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, m: Move) {
        debug_assert!(self.len < Self::MAX_MOVES);
        self.moves[self.len] = m;
        self.len += 1;
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[Move] {
        &self.moves[..self.len]
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.as_slice().iter()
    }

    #[inline]
    pub fn contains(&self, m: Move) -> bool {
        self.as_slice().contains(&m)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Retains only moves for which the predicate returns true.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&Move) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if f(&self.moves[read]) {
                self.moves[write] = self.moves[read];
                write += 1;
            }
        }
        self.len = write;
    }
}

impl Default for MoveList {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<usize> for MoveList {
    type Output = Move;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.len);
        &self.moves[index]
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl std::fmt::Debug for MoveList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// Which generator a position calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenMode {
    /// The side to move is not in check.
    Normal,
    /// Exactly one piece gives check.
    Evasion,
    /// Two pieces give check; only the king may move.
    DoubleCheck,
}

pub fn gen_mode(pos: &Position) -> GenMode {
    let checkers = attacks::checkers(pos, pos.side_to_move());
    if checkers.is_empty() {
        GenMode::Normal
    } else if checkers.more_than_one() {
        GenMode::DoubleCheck
    } else {
        GenMode::Evasion
    }
}

/// Generates all legal moves for the given position.
pub fn generate_moves(pos: &Position) -> MoveList {
    match gen_mode(pos) {
        GenMode::Normal => {
            let mut moves = MoveList::new();
            let generator = Generator::legal(pos);
            for piece in Piece::ALL {
                generator.piece_moves(piece, &mut moves);
            }
            generator.castling_moves(&mut moves);
            moves
        }
        GenMode::Evasion | GenMode::DoubleCheck => generate_evasions(pos),
    }
}

/// Every move that obeys piece movement, ignoring whether it leaves the
/// mover's king attacked. Castling is still gated on rights, empty squares
/// and unattacked king squares.
pub fn generate_pseudo_legal(pos: &Position) -> MoveList {
    let mut moves = MoveList::new();
    let generator = Generator::pseudo_legal(pos);
    for piece in Piece::ALL {
        generator.piece_moves(piece, &mut moves);
    }
    generator.castling_moves(&mut moves);
    moves
}

/// Legal moves that capture, en passant included.
pub fn generate_captures(pos: &Position) -> MoveList {
    let mut moves = generate_moves(pos);
    moves.retain(|&m| pos.is_capture(m));
    moves
}

/// Legal moves that capture nothing; quiet promotions and castling included.
pub fn generate_quiets(pos: &Position) -> MoveList {
    let mut moves = generate_moves(pos);
    moves.retain(|&m| !pos.is_capture(m));
    moves
}

/// Legal moves of a `piece` of the side to move landing on `to`.
pub fn generate_piece_moves(pos: &Position, piece: Piece, to: Square) -> MoveList {
    let mut moves = generate_moves(pos);
    moves.retain(|&m| m.to() == to && pos.piece_at(m.from()) == Some(piece));
    moves
}

pub fn is_legal(pos: &Position, m: Move) -> bool {
    generate_moves(pos).contains(m)
}

/// Pushes a pawn move, expanded into the four promotions on the last rank.
pub(crate) fn push_pawn_move(moves: &mut MoveList, us: Color, from: Square, to: Square) {
    if to.rank() == us.promotion_rank() {
        for piece in Piece::PROMOTIONS.iter().rev() {
            if let Some(flag) = MoveFlag::promoting_to(*piece) {
                moves.push(Move::new(from, to, flag));
            }
        }
    } else {
        moves.push(Move::normal(from, to));
    }
}

/// Plays the en-passant capture on the occupancy alone and checks the
/// mover's king. Lifting two pawns off one rank can open a line no pin test
/// sees.
pub(crate) fn en_passant_is_safe(pos: &Position, m: Move) -> bool {
    let us = pos.side_to_move();
    let Some(victim) = m.to().backward(us) else {
        return false;
    };
    let after = pos
        .rotated()
        .toggled(m.from())
        .toggled(victim)
        .toggled(m.to());
    let king = pos.king_square(us);
    (attacks::attackers_through(pos, king, !us, &after) & !Bitboard::from_square(victim)).is_empty()
}

#[inline]
fn advance(pawns: Bitboard, color: Color) -> Bitboard {
    match color {
        Color::White => pawns.north(),
        Color::Black => pawns.south(),
    }
}

/// Per-position state shared by the piece generators.
struct Generator<'a> {
    pos: &'a Position,
    us: Color,
    king: Square,
    pinned: Bitboard,
    legal: bool,
}

impl<'a> Generator<'a> {
    fn legal(pos: &'a Position) -> Self {
        let us = pos.side_to_move();
        Generator {
            pos,
            us,
            king: pos.king_square(us),
            pinned: attacks::pinned_pieces(pos, us),
            legal: true,
        }
    }

    fn pseudo_legal(pos: &'a Position) -> Self {
        let us = pos.side_to_move();
        Generator {
            pos,
            us,
            king: pos.king_square(us),
            pinned: Bitboard::EMPTY,
            legal: false,
        }
    }

    /// Where the piece on `from` may land without leaving its pin line.
    #[inline]
    fn pin_mask(&self, from: Square) -> Bitboard {
        if !self.pinned.contains(from) {
            return Bitboard::FULL;
        }
        match tables::direction(self.king, from) {
            Some(dir) => tables::ray(self.king, dir),
            None => Bitboard::FULL,
        }
    }

    fn piece_moves(&self, piece: Piece, moves: &mut MoveList) {
        match piece {
            Piece::Pawn => self.pawn_moves(moves),
            Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen => {
                self.officer_moves(piece, moves)
            }
            Piece::King => self.king_moves(moves),
        }
    }

    fn pawn_moves(&self, moves: &mut MoveList) {
        let (pos, us) = (self.pos, self.us);
        let pawns = pos.pieces(us, Piece::Pawn);
        let empty = !pos.blocker();

        let single = advance(pawns, us) & empty;
        let double = advance(single & Bitboard::rank(us.en_passant_rank().index()), us) & empty;

        for to in single {
            if let Some(from) = to.backward(us) {
                if self.pin_mask(from).contains(to) {
                    push_pawn_move(moves, us, from, to);
                }
            }
        }
        for to in double {
            if let Some(from) = to.backward(us).and_then(|sq| sq.backward(us)) {
                if self.pin_mask(from).contains(to) {
                    moves.push(Move::new(from, to, MoveFlag::DoublePush));
                }
            }
        }

        let enemies = pos.occupancy(!us);
        for from in pawns {
            for to in tables::pawn_captures(us, from) & enemies & self.pin_mask(from) {
                push_pawn_move(moves, us, from, to);
            }
        }

        if let Some(ep) = pos.en_passant() {
            for from in tables::pawn_captures(!us, ep) & pawns {
                let m = Move::new(from, ep, MoveFlag::EnPassant);
                if !self.legal || en_passant_is_safe(pos, m) {
                    moves.push(m);
                }
            }
        }
    }

    /// Knights and sliders: attack set minus own pieces.
    fn officer_moves(&self, piece: Piece, moves: &mut MoveList) {
        let (pos, us) = (self.pos, self.us);
        let own = pos.occupancy(us);
        for from in pos.pieces(us, piece) {
            let targets = attacks::piece_attacks(piece, us, from, pos.rotated())
                & !own
                & self.pin_mask(from);
            for to in targets {
                moves.push(Move::normal(from, to));
            }
        }
    }

    fn king_moves(&self, moves: &mut MoveList) {
        let (pos, us, from) = (self.pos, self.us, self.king);
        let lifted = pos.rotated().toggled(from);
        for to in tables::king_mask(from) & !pos.occupancy(us) {
            if !self.legal || !attacks::is_attacked_through(pos, to, !us, &lifted) {
                moves.push(Move::normal(from, to));
            }
        }
    }

    /// Castling needs the right, empty squares between king and rook, and a
    /// king that neither starts, crosses nor lands on an attacked square.
    fn castling_moves(&self, moves: &mut MoveList) {
        let (pos, us) = (self.pos, self.us);
        let rights = pos.castling();
        if !rights.kingside(us) && !rights.queenside(us) {
            return;
        }
        let back = us.back_rank().index() * 8;
        let on_back = |file: u8| Square::from_index_unchecked(back + file);
        let king = on_back(4);
        let them = !us;
        if self.king != king || attacks::is_attacked(pos, king, them) {
            return;
        }
        let blocker = pos.blocker();
        let rooks = pos.pieces(us, Piece::Rook);
        let safe = |transit: u8, landing: u8| {
            !attacks::is_attacked(pos, on_back(transit), them)
                && !attacks::is_attacked(pos, on_back(landing), them)
        };

        if rights.kingside(us)
            && rooks.contains(on_back(7))
            && (tables::between(king, on_back(7)) & blocker).is_empty()
            && safe(5, 6)
        {
            moves.push(Move::new(king, on_back(6), MoveFlag::CastleKingside));
        }
        if rights.queenside(us)
            && rooks.contains(on_back(0))
            && (tables::between(king, on_back(0)) & blocker).is_empty()
            && safe(3, 2)
        {
            moves.push(Move::new(king, on_back(2), MoveFlag::CastleQueenside));
        }
    }
}
