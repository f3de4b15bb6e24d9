//! Static exchange evaluation.
//!
//! Both sides' attackers of the target square are collected once. The side
//! to recapture always spends its least valuable attacker; whenever a pawn,
//! bishop, rook or queen leaves the square's line, the piece standing behind
//! it joins the exchange if it attacks along that line. The running material
//! balance of each capture goes on a swap list, which is then folded from
//! the back so either side may stop capturing when continuing would lose.
//!
//! The real position is only read. Pieces "removed" during the exchange stay
//! on the board; only the two attacker sets shrink.

use rotchess_core::{Color, Move, MoveFlag, Piece, Square};

use crate::attacks;
use crate::{Bitboard, Position};

/// Material outcome of `m` for the side making it, in centipawns.
pub fn see(pos: &Position, m: Move) -> i32 {
    let (from, to) = (m.from(), m.to());
    let Some((mover, color)) = pos.occupant(from) else {
        return 0;
    };

    let mut ours = attacks::attackers(pos, to, color).without(from);
    let mut theirs = attacks::attackers(pos, to, !color);
    if reveals_xray(mover) {
        add_xray(pos, to, from, &mut ours, &mut theirs, color);
    }

    let (gain, lastval) = match m.promotion() {
        Some(promoted) => (promoted.value() - Piece::Pawn.value(), -promoted.value()),
        None if m.flag() == MoveFlag::EnPassant => (Piece::Pawn.value(), -mover.value()),
        None => (pos.piece_at(to).map_or(0, Piece::value), -mover.value()),
    };
    exchange(pos, to, color, ours, theirs, gain, lastval)
}

/// Material outcome of an exchange on `sq` started by the side opposing
/// `color`, scored for `color` (normally the owner of the piece on `sq`).
pub fn see_square(pos: &Position, sq: Square, color: Color) -> i32 {
    let ours = attacks::attackers(pos, sq, color);
    let theirs = attacks::attackers(pos, sq, !color);
    let lastval = -pos.piece_at(sq).map_or(0, Piece::value);
    exchange(pos, sq, color, ours, theirs, 0, lastval)
}

#[inline]
fn reveals_xray(piece: Piece) -> bool {
    matches!(piece, Piece::Pawn | Piece::Bishop | Piece::Rook | Piece::Queen)
}

fn exchange(
    pos: &Position,
    target: Square,
    color: Color,
    mut ours: Bitboard,
    mut theirs: Bitboard,
    gain: i32,
    mut lastval: i32,
) -> i32 {
    let mut swaps = Vec::with_capacity(32);
    swaps.push(gain);

    while theirs.any() {
        let Some((piece, sq)) = least_valuable(pos, theirs, !color) else {
            break;
        };
        theirs.clear(sq);
        if reveals_xray(piece) {
            add_xray(pos, target, sq, &mut ours, &mut theirs, color);
        }
        swaps.push(swaps[swaps.len() - 1] + lastval);
        lastval = piece.value();

        if ours.is_empty() {
            break;
        }

        let Some((piece, sq)) = least_valuable(pos, ours, color) else {
            break;
        };
        ours.clear(sq);
        if reveals_xray(piece) {
            add_xray(pos, target, sq, &mut ours, &mut theirs, color);
        }
        swaps.push(swaps[swaps.len() - 1] + lastval);
        lastval = -piece.value();
    }

    // Odd entries follow the opponent's captures, who keeps the minimum.
    for n in (1..swaps.len()).rev() {
        let keep = if n & 1 == 1 {
            swaps[n] <= swaps[n - 1]
        } else {
            swaps[n] >= swaps[n - 1]
        };
        if keep {
            swaps[n - 1] = swaps[n];
        }
    }
    swaps[0]
}

fn least_valuable(pos: &Position, set: Bitboard, color: Color) -> Option<(Piece, Square)> {
    Piece::ALL
        .into_iter()
        .find_map(|piece| (set & pos.pieces(color, piece)).first().map(|sq| (piece, sq)))
}

/// Adds the slider hiding behind `from`, seen from `target`, to its side.
fn add_xray(
    pos: &Position,
    target: Square,
    from: Square,
    ours: &mut Bitboard,
    theirs: &mut Bitboard,
    color: Color,
) {
    let Some((sq, dir)) = attacks::behind(pos, target, from) else {
        return;
    };
    let joins = match pos.piece_at(sq) {
        Some(Piece::Queen) => true,
        Some(Piece::Rook) => !dir.is_diagonal(),
        Some(Piece::Bishop) => dir.is_diagonal(),
        _ => false,
    };
    if !joins {
        return;
    }
    if pos.occupancy(color).contains(sq) {
        ours.set(sq);
    } else {
        theirs.set(sq);
    }
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
    fn undefended_knight_wins_a_knight() {
        let position = pos("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1");
        assert_eq!(see(&position, Move::normal(sq("e4"), sq("d5"))), 300);
    }

    #[test]
    fn defended_knight_taken_by_a_pawn() {
        // exd5 cxd5: knight for pawn.
        let position = pos("4k3/8/2p5/3n4/4P3/8/8/4K3 w - - 0 1");
        let score = see(&position, Move::normal(sq("e4"), sq("d5")));
        assert_eq!(score, Piece::Knight.value() - Piece::Pawn.value());
    }

    #[test]
    fn stronger_recapture_loses() {
        let position = pos("4k3/2p5/3p4/8/8/8/8/3QK3 w - - 0 1");
        let score = see(&position, Move::normal(sq("d1"), sq("d6")));
        assert!(score <= 0);
        assert_eq!(score, 100 - 900);
    }

    #[test]
    fn xray_rook_behind_rook() {
        // Rxd5 Rxd5 Rxd5: the d1 rook backs up the d2 rook.
        let position = pos("3rk3/8/8/3p4/8/8/3R4/3RK3 w - - 0 1");
        assert_eq!(see(&position, Move::normal(sq("d2"), sq("d5"))), 100);
        let alone = pos("3rk3/8/8/3p4/8/8/3R4/4K3 w - - 0 1");
        assert_eq!(see(&alone, Move::normal(sq("d2"), sq("d5"))), 100 - 500);
    }

    #[test]
    fn xray_bishop_behind_pawn() {
        // The a2 bishop backs up the c4 pawn's capture on d5.
        let position = pos("4k3/8/1n6/3n4/2P5/8/B7/4K3 w - - 0 1");
        assert_eq!(see(&position, Move::normal(sq("c4"), sq("d5"))), 300);
    }

    #[test]
    fn en_passant_starts_from_a_pawn() {
        let position = pos("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        assert_eq!(see(&position, Move::new(sq("e5"), sq("d6"), MoveFlag::EnPassant)), 100);
    }

    #[test]
    fn promotion_counts_the_upgrade() {
        let position = pos("4k3/P7/8/8/8/8/8/4K3 w - - 0 1");
        let score = see(&position, Move::new(sq("a7"), sq("a8"), MoveFlag::PromoteQueen));
        assert_eq!(score, 900 - 100);
    }

    #[test]
    fn square_exchange_scores_for_the_owner() {
        // The d6 pawn takes the undefended e5 knight.
        let position = pos("4k3/8/3p4/4N3/8/8/8/4K3 w - - 0 1");
        assert_eq!(see_square(&position, sq("e5"), Color::White), -300);
        let defended = pos("4k3/8/3p4/4N3/3P4/8/8/4K3 w - - 0 1");
        assert_eq!(see_square(&defended, sq("e5"), Color::White), -200);
        let safe = pos("4k3/8/8/4N3/8/8/8/4K3 w - - 0 1");
        assert_eq!(see_square(&safe, sq("e5"), Color::White), 0);
    }

    #[test]
    fn see_never_mutates() {
        let position = pos("3rk3/8/8/3p4/8/8/3R4/3RK3 w - - 0 1");
        let before = position.clone();
        see(&position, Move::normal(sq("d2"), sq("d5")));
        see_square(&position, sq("d5"), Color::Black);
        assert_eq!(position, before);
    }
}
