//! Attack queries against a position.
//!
//! Leapers are answered from precomputed masks, sliders from the rotated
//! tables: a bishop on `sq` sees exactly the squares a bishop standing on any
//! of them would see back, so the reverse lookup from the target square finds
//! every unobstructed attacker in one probe per line family.

use rotchess_core::{Color, Piece, Square};

use crate::rotated::{self, RotatedOccupancy};
use crate::tables::{self, Direction};
use crate::{Bitboard, Position};

/// Squares a slider of kind `piece` on `sq` reaches through `occ`. Empty for
/// non-sliders.
#[inline]
pub fn slider_attacks(piece: Piece, sq: Square, occ: &RotatedOccupancy) -> Bitboard {
    match piece {
        Piece::Bishop => rotated::bishop_attacks(sq, occ),
        Piece::Rook => rotated::rook_attacks(sq, occ),
        Piece::Queen => rotated::queen_attacks(sq, occ),
        Piece::Pawn | Piece::Knight | Piece::King => Bitboard::EMPTY,
    }
}

/// Squares `piece` of `color` standing on `sq` attacks through `occ`.
/// For pawns these are the capture squares, not the pushes.
#[inline]
pub fn piece_attacks(piece: Piece, color: Color, sq: Square, occ: &RotatedOccupancy) -> Bitboard {
    match piece {
        Piece::Pawn => tables::pawn_captures(color, sq),
        Piece::Knight => tables::knight_mask(sq),
        Piece::King => tables::king_mask(sq),
        Piece::Bishop | Piece::Rook | Piece::Queen => slider_attacks(piece, sq, occ),
    }
}

#[inline]
pub fn bishop_attacks(pos: &Position, sq: Square) -> Bitboard {
    rotated::bishop_attacks(sq, pos.rotated())
}

#[inline]
pub fn rook_attacks(pos: &Position, sq: Square) -> Bitboard {
    rotated::rook_attacks(sq, pos.rotated())
}

#[inline]
pub fn queen_attacks(pos: &Position, sq: Square) -> Bitboard {
    rotated::queen_attacks(sq, pos.rotated())
}

/// True if any piece of `by` attacks `sq`.
pub fn is_attacked(pos: &Position, sq: Square, by: Color) -> bool {
    is_attacked_through(pos, sq, by, pos.rotated())
}

/// [`is_attacked`] with sliders probed through `occ` instead of the real
/// occupancy. The king's escape squares are tested with the king lifted off
/// the board, so it cannot hide behind itself on a checking line.
pub fn is_attacked_through(pos: &Position, sq: Square, by: Color, occ: &RotatedOccupancy) -> bool {
    if (tables::knight_mask(sq) & pos.pieces(by, Piece::Knight)).any() {
        return true;
    }

    let queens = pos.pieces(by, Piece::Queen);
    let diagonal = pos.pieces(by, Piece::Bishop) | queens;
    if (tables::diagonal_mask(sq) & diagonal).any()
        && (rotated::bishop_attacks(sq, occ) & diagonal).any()
    {
        return true;
    }
    let orthogonal = pos.pieces(by, Piece::Rook) | queens;
    if (tables::orthogonal_mask(sq) & orthogonal).any()
        && (rotated::rook_attacks(sq, occ) & orthogonal).any()
    {
        return true;
    }

    // A pawn of the other color on `sq` would capture exactly where the
    // attacking pawns stand.
    if (tables::pawn_captures(!by, sq) & pos.pieces(by, Piece::Pawn)).any() {
        return true;
    }

    (tables::king_mask(sq) & pos.pieces(by, Piece::King)).any()
}

/// Every piece of `by` attacking `sq`.
pub fn attackers(pos: &Position, sq: Square, by: Color) -> Bitboard {
    attackers_through(pos, sq, by, pos.rotated())
}

/// [`attackers`] with sliders probed through `occ`.
pub fn attackers_through(pos: &Position, sq: Square, by: Color, occ: &RotatedOccupancy) -> Bitboard {
    let queens = pos.pieces(by, Piece::Queen);
    (tables::knight_mask(sq) & pos.pieces(by, Piece::Knight))
        | (tables::king_mask(sq) & pos.pieces(by, Piece::King))
        | (tables::pawn_captures(!by, sq) & pos.pieces(by, Piece::Pawn))
        | (rotated::bishop_attacks(sq, occ) & (pos.pieces(by, Piece::Bishop) | queens))
        | (rotated::rook_attacks(sq, occ) & (pos.pieces(by, Piece::Rook) | queens))
}

/// Pieces giving check to `color`'s king.
#[inline]
pub fn checkers(pos: &Position, color: Color) -> Bitboard {
    attackers(pos, pos.king_square(color), !color)
}

/// True if the piece on `sq` is pinned against its own king: lifting it
/// would open the line between the king and an enemy slider of the
/// matching kind.
pub fn pinned_on_king(pos: &Position, sq: Square, color: Color) -> bool {
    let king = pos.king_square(color);
    let Some(dir) = tables::direction(king, sq) else {
        return false;
    };
    let blocker = pos.blocker();

    if (tables::between(king, sq) & blocker).any() {
        return false;
    }

    let beyond = (tables::ray(king, dir) ^ tables::from_to_ray(king, sq)) & blocker;
    let nearest = if dir.is_ascending() {
        beyond.first()
    } else {
        beyond.last()
    };
    let Some(nearest) = nearest else {
        return false;
    };

    let them = !color;
    let queens = pos.pieces(them, Piece::Queen);
    let sliders = if dir.is_diagonal() {
        pos.pieces(them, Piece::Bishop) | queens
    } else {
        pos.pieces(them, Piece::Rook) | queens
    };
    sliders.contains(nearest)
}

/// All of `color`'s pieces pinned against its king.
pub fn pinned_pieces(pos: &Position, color: Color) -> Bitboard {
    let king = pos.king_square(color);
    let them = !color;
    let queens = pos.pieces(them, Piece::Queen);
    let snipers = (tables::diagonal_mask(king) & (pos.pieces(them, Piece::Bishop) | queens))
        | (tables::orthogonal_mask(king) & (pos.pieces(them, Piece::Rook) | queens));
    let blocker = pos.blocker();
    let own = pos.occupancy(color);

    let mut pinned = Bitboard::EMPTY;
    for sniper in snipers {
        let screen = tables::between(king, sniper) & blocker;
        if screen.count() == 1 && (screen & own).any() {
            pinned |= screen;
        }
    }
    pinned
}

/// Would the piece on `from` attack `to` if the piece on `to` belonged to
/// the other side? Answers "does this piece defend that one". Check is not
/// considered.
pub fn defends(pos: &Position, from: Square, to: Square) -> bool {
    match pos.occupant(from) {
        Some((piece, color)) if from != to => {
            piece_attacks(piece, color, from, pos.rotated()).contains(to)
        }
        _ => false,
    }
}

/// The nearest piece behind `from` on the line running from `target`
/// through `from`, if any.
pub(crate) fn behind(pos: &Position, target: Square, from: Square) -> Option<(Square, Direction)> {
    let dir = tables::direction(target, from)?;
    let hidden = tables::ray(from, dir) & pos.blocker();
    let sq = if dir.is_ascending() {
        hidden.first()
    } else {
        hidden.last()
    }?;
    Some((sq, dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    #[test]
    fn startpos_attacks() {
        let position = Position::startpos();
        assert!(is_attacked(&position, sq("e3"), Color::White));
        assert!(is_attacked(&position, sq("f3"), Color::White));
        assert!(!is_attacked(&position, sq("e4"), Color::White));
        assert!(is_attacked(&position, sq("f6"), Color::Black));
        assert_eq!(
            attackers(&position, sq("f3"), Color::White),
            Bitboard::from_iter([sq("e2"), sq("g2"), sq("g1")])
        );
    }

    #[test]
    fn sliders_are_blocked() {
        let position = pos("4k3/8/8/8/8/8/4P3/R3K2r w - - 0 1");
        assert!(is_attacked(&position, sq("f1"), Color::Black));
        assert!(!is_attacked(&position, sq("d1"), Color::Black));
        assert!(!is_attacked(&position, sq("e3"), Color::Black));
        assert!(is_attacked(&position, sq("a8"), Color::White));
    }

    #[test]
    fn attackers_through_lifted_king() {
        let position = pos("4k3/8/8/8/8/8/8/r3K3 w - - 0 1");
        let king = position.king_square(Color::White);
        assert!(!is_attacked(&position, sq("f1"), Color::Black));
        let lifted = position.rotated().toggled(king);
        assert!(is_attacked_through(&position, sq("f1"), Color::Black, &lifted));
    }

    #[test]
    fn checkers_find_both_pieces_of_a_double_check() {
        let position = pos("4k3/8/8/8/1b6/8/3N4/r3K3 w - - 0 1");
        assert_eq!(checkers(&position, Color::White), Bitboard::from_square(sq("a1")));
        let double = pos("4k3/8/8/8/1b6/8/8/r3K3 w - - 0 1");
        assert_eq!(
            checkers(&double, Color::White),
            Bitboard::from_iter([sq("a1"), sq("b4")])
        );
    }

    #[test]
    fn pins_along_lines() {
        // Knight on d2 pinned by the bishop on b4, rook on e4 pinned by the rook on e8.
        let position = pos("4r1k1/8/8/8/1b2R3/8/3N4/4K3 w - - 0 1");
        assert!(pinned_on_king(&position, sq("d2"), Color::White));
        assert!(pinned_on_king(&position, sq("e4"), Color::White));
        assert_eq!(
            pinned_pieces(&position, Color::White),
            Bitboard::from_iter([sq("d2"), sq("e4")])
        );
    }

    #[test]
    fn no_pin_with_a_second_screen_or_wrong_slider() {
        let position = pos("4r1k1/8/8/4P3/4R3/8/8/4K3 w - - 0 1");
        assert!(!pinned_on_king(&position, sq("e4"), Color::White));
        let wrong_kind = pos("4b1k1/8/8/8/4R3/8/8/4K3 w - - 0 1");
        assert!(!pinned_on_king(&wrong_kind, sq("e4"), Color::White));
        assert!(pinned_pieces(&wrong_kind, Color::White).is_empty());
    }

    #[test]
    fn defends_ignores_the_target_color() {
        let position = pos("4k3/8/8/8/8/2N5/1P6/4K3 w - - 0 1");
        assert!(defends(&position, sq("b2"), sq("c3")));
        assert!(!defends(&position, sq("c3"), sq("b2")));
        let rooks = pos("4k3/8/8/8/8/8/8/R2RK3 w - - 0 1");
        assert!(defends(&rooks, sq("a1"), sq("d1")));
        assert!(!defends(&rooks, sq("a1"), sq("e1")));
    }

    #[test]
    fn behind_finds_the_xray_piece() {
        let position = pos("4k3/8/8/8/8/8/Q7/R3K3 w - - 0 1");
        assert_eq!(
            behind(&position, sq("a5"), sq("a2")).map(|(s, _)| s),
            Some(sq("a1"))
        );
        assert_eq!(behind(&position, sq("a5"), sq("a1")), None);
    }
}
