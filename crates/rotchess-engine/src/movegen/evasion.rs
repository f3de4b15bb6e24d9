//! Check evasions.
//!
//! Under a single check the legal moves are the union of three sets:
//! captures of the checker by unpinned pieces, king steps to squares the
//! checkers do not reach with the king lifted off the board, and, against a
//! slider, interpositions on the squares between it and the king. Under a
//! double check only the king steps remain.

use rotchess_core::{Move, MoveFlag, Piece, Square};

use super::{en_passant_is_safe, push_pawn_move, MoveList};
use crate::attacks;
use crate::tables;
use crate::Position;

/// Legal replies to a check. Empty when the side to move is not in check.
pub fn generate_evasions(pos: &Position) -> MoveList {
    let mut moves = MoveList::new();
    let us = pos.side_to_move();
    let checkers = attacks::checkers(pos, us);

    if checkers.is_empty() {
        return moves;
    }
    if checkers.more_than_one() {
        king_escapes(pos, &mut moves);
        return moves;
    }

    let Some(checker) = checkers.first() else {
        return moves;
    };
    capture_checker(pos, checker, &mut moves);
    king_escapes(pos, &mut moves);
    if pos.piece_at(checker).is_some_and(Piece::is_slider) {
        interpose(pos, checker, &mut moves);
    }
    en_passant_evasions(pos, &mut moves);
    moves
}

fn king_escapes(pos: &Position, moves: &mut MoveList) {
    let us = pos.side_to_move();
    let king = pos.king_square(us);
    let lifted = pos.rotated().toggled(king);
    for to in tables::king_mask(king) & !pos.occupancy(us) {
        if !attacks::is_attacked_through(pos, to, !us, &lifted) {
            moves.push(Move::normal(king, to));
        }
    }
}

fn capture_checker(pos: &Position, checker: Square, moves: &mut MoveList) {
    let us = pos.side_to_move();
    let capturers = attacks::attackers(pos, checker, us) & !pos.pieces(us, Piece::King);
    for from in capturers {
        if attacks::pinned_on_king(pos, from, us) {
            continue;
        }
        if pos.piece_at(from) == Some(Piece::Pawn) {
            push_pawn_move(moves, us, from, checker);
        } else {
            moves.push(Move::normal(from, checker));
        }
    }
}

fn interpose(pos: &Position, checker: Square, moves: &mut MoveList) {
    let us = pos.side_to_move();
    let king = pos.king_square(us);
    let pawns = pos.pieces(us, Piece::Pawn);
    let officers = pos.occupancy(us) & !pawns & !pos.pieces(us, Piece::King);

    for block in tables::between(king, checker) {
        // The block square is empty, so anything attacking it can move there.
        for from in attacks::attackers(pos, block, us) & officers {
            if !attacks::pinned_on_king(pos, from, us) {
                moves.push(Move::normal(from, block));
            }
        }

        let Some(behind) = block.backward(us) else {
            continue;
        };
        if pawns.contains(behind) {
            if !attacks::pinned_on_king(pos, behind, us) {
                push_pawn_move(moves, us, behind, block);
            }
        } else if pos.piece_at(behind).is_none() && behind.rank() == us.en_passant_rank() {
            if let Some(start) = behind.backward(us) {
                if pawns.contains(start) && !attacks::pinned_on_king(pos, start, us) {
                    moves.push(Move::new(start, block, MoveFlag::DoublePush));
                }
            }
        }
    }
}

/// En passant can answer a check by taking the checking pawn or by landing
/// on the checking line. Either way the full round trip decides.
fn en_passant_evasions(pos: &Position, moves: &mut MoveList) {
    let us = pos.side_to_move();
    let Some(ep) = pos.en_passant() else {
        return;
    };
    for from in tables::pawn_captures(!us, ep) & pos.pieces(us, Piece::Pawn) {
        let m = Move::new(from, ep, MoveFlag::EnPassant);
        if en_passant_is_safe(pos, m) {
            moves.push(m);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movegen::{gen_mode, generate_moves, generate_pseudo_legal, GenMode};

    fn sq(s: &str) -> Square {
        Square::from_algebraic(s).unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    /// The evasions must be exactly the pseudo-legal moves that leave the king safe.
    fn brute_force(position: &Position) -> Vec<Move> {
        let us = position.side_to_move();
        let mut probe = position.clone();
        let mut legal: Vec<Move> = generate_pseudo_legal(position)
            .iter()
            .copied()
            .filter(|&m| {
                let after = probe.scoped(m);
                !attacks::is_attacked(&after, after.king_square(us), !us)
            })
            .collect();
        legal.sort();
        legal
    }

    fn sorted(moves: &MoveList) -> Vec<Move> {
        let mut v = moves.as_slice().to_vec();
        v.sort();
        v
    }

    #[test]
    fn not_in_check_yields_nothing() {
        assert!(generate_evasions(&Position::startpos()).is_empty());
    }

    #[test]
    fn single_check_by_a_rook() {
        // The d2 knight can block on e4.
        let position = pos("4r1k1/8/8/8/8/8/3N4/4K3 w - - 0 1");
        assert_eq!(gen_mode(&position), GenMode::Evasion);
        let moves = generate_evasions(&position);
        assert!(moves.contains(Move::normal(sq("d2"), sq("e4"))));
        assert!(!moves.contains(Move::normal(sq("d2"), sq("b3"))));
        assert!(!moves.contains(Move::normal(Square::E1, sq("e2"))));
        assert_eq!(sorted(&moves), brute_force(&position));
    }

    #[test]
    fn pinned_piece_cannot_block() {
        // The c3 knight reaches e2 and e4 but is pinned by the a5 bishop.
        let position = pos("4r1k1/8/8/b7/8/2N5/8/4K3 w - - 0 1");
        let moves = generate_evasions(&position);
        assert!(!moves.iter().any(|m| m.from() == sq("c3")));
        assert_eq!(sorted(&moves), brute_force(&position));
    }

    #[test]
    fn capture_the_checking_knight() {
        let position = pos("4k3/8/8/8/8/3n4/2P5/4K3 w - - 0 1");
        let moves = generate_evasions(&position);
        assert!(moves.contains(Move::normal(sq("c2"), sq("d3"))));
        assert_eq!(sorted(&moves), brute_force(&position));
    }

    #[test]
    fn pawns_interpose() {
        let diagonal = pos("4k3/8/8/b7/8/8/2P5/4K3 w - - 0 1");
        let moves = generate_evasions(&diagonal);
        assert!(moves.contains(Move::normal(sq("c2"), sq("c3"))));
        assert_eq!(sorted(&moves), brute_force(&diagonal));

        let rank = pos("4k3/8/8/8/r6K/8/1P6/8 w - - 0 1");
        let moves = generate_evasions(&rank);
        assert!(moves.contains(Move::new(sq("b2"), sq("b4"), MoveFlag::DoublePush)));
        assert!(!moves.contains(Move::normal(sq("b2"), sq("b3"))));
        assert_eq!(sorted(&moves), brute_force(&rank));
    }

    #[test]
    fn promotion_captures_the_checker() {
        let position = pos("1r2k3/P7/8/8/8/8/8/1K6 w - - 0 1");
        let moves = generate_evasions(&position);
        assert_eq!(moves.iter().filter(|m| m.promotion().is_some()).count(), 4);
        assert_eq!(sorted(&moves), brute_force(&position));
    }

    #[test]
    fn en_passant_takes_the_checking_pawn() {
        let position = pos("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1");
        let ep = Move::new(sq("e4"), sq("d3"), MoveFlag::EnPassant);
        assert!(generate_evasions(&position).contains(ep));
        assert_eq!(sorted(&generate_evasions(&position)), brute_force(&position));
    }

    #[test]
    fn double_check_allows_only_king_moves() {
        // Rook a1 and bishop b4 both check e1; the d3 rook could take either.
        let position = pos("4k3/8/8/8/1b6/3R4/8/r3K3 w - - 0 1");
        assert_eq!(gen_mode(&position), GenMode::DoubleCheck);
        let king = position.king_square(position.side_to_move());
        let moves = generate_moves(&position);
        assert!(!moves.is_empty());
        assert!(moves.iter().all(|m| m.from() == king));
        assert!(!moves.contains(Move::normal(sq("d3"), sq("d1"))));
        assert_eq!(sorted(&moves), brute_force(&position));
    }

    #[test]
    fn double_check_mate_has_no_moves() {
        let position = pos("4r1k1/8/8/8/8/3n4/3P1P2/3QKB2 w - - 0 1");
        assert_eq!(gen_mode(&position), GenMode::DoubleCheck);
        assert!(generate_moves(&position).is_empty());
    }
}
