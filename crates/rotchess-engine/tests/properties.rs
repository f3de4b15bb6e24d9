//! Random playouts from a handful of seed positions, checking the engine's
//! invariants at every ply.

use proptest::prelude::*;
use rotchess_core::{Move, MoveFlag, Piece};
use rotchess_engine::{attacks, tables};
use rotchess_engine::notation::{self, AnStyle, CastleStyle};
use rotchess_engine::{
    gen_mode, generate_evasions, generate_moves, generate_pseudo_legal, GenMode, Position,
};

const SEEDS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
];

/// A seed and the move choices of one playout.
fn playout() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (0..SEEDS.len(), prop::collection::vec(any::<usize>(), 40..=80))
}

/// Plays the walk, calling `check` on every position reached before each
/// move is chosen. Stops early when the side to move has no moves.
fn walk(seed: usize, choices: &[usize], mut check: impl FnMut(&mut Position)) -> Position {
    let mut position = Position::from_fen(SEEDS[seed]).unwrap();
    for &choice in choices {
        check(&mut position);
        let moves = generate_moves(&position);
        if moves.is_empty() {
            break;
        }
        position.apply_move(moves.as_slice()[choice % moves.len()]);
    }
    position
}

fn sorted(moves: &[Move]) -> Vec<Move> {
    let mut moves = moves.to_vec();
    moves.sort();
    moves
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// 256 playouts of at least 40 plies visit well over 10,000 positions.
    #[test]
    fn apply_then_pop_restores_everything((seed, choices) in playout()) {
        let mut snapshots = Vec::new();
        let mut position = walk(seed, &choices, |p| {
            assert_eq!(p.hash(), p.compute_hash(), "incremental key drifted at {}", p.to_fen());
            assert!(p.validate().is_ok(), "{}", p.to_fen());
            snapshots.push(p.clone());
        });
        // The final position was never snapshotted if the walk ran to the end.
        if snapshots.len() > position.ply() {
            snapshots.pop();
        }
        while let Some(expected) = snapshots.pop() {
            prop_assert!(position.pop_move().is_some());
            prop_assert_eq!(&position, &expected);
            prop_assert_eq!(position.hash(), expected.hash());
        }
        prop_assert_eq!(position.ply(), 0);
        prop_assert_eq!(position.pop_move(), None);
    }

    #[test]
    fn legal_moves_never_leave_the_king_attacked((seed, choices) in playout()) {
        walk(seed, &choices, |p| {
            let us = p.side_to_move();
            let legal = generate_moves(p);
            for &m in &legal {
                let after = p.scoped(m);
                assert!(
                    !attacks::is_attacked(&after, after.king_square(us), !us),
                    "{} leaves the king attacked in {}",
                    m,
                    after.to_fen()
                );
            }

            // Every pseudo-legal move that is safe must be in the legal list.
            let mut probe = p.clone();
            let safe: Vec<_> = generate_pseudo_legal(p)
                .iter()
                .copied()
                .filter(|&m| {
                    let after = probe.scoped(m);
                    !attacks::is_attacked(&after, after.king_square(us), !us)
                })
                .collect();
            assert_eq!(sorted(legal.as_slice()), sorted(&safe), "{}", p.to_fen());
        });
    }

    #[test]
    fn evasions_resolve_check((seed, choices) in playout()) {
        walk(seed, &choices, |p| {
            let us = p.side_to_move();
            let king = p.king_square(us);
            match gen_mode(p) {
                GenMode::Normal => {
                    assert!(!p.is_check());
                    assert!(generate_evasions(p).is_empty());
                }
                GenMode::Evasion => {
                    let checkers = attacks::checkers(p, us);
                    assert_eq!(checkers.count(), 1);
                    let checker = checkers.first().unwrap();
                    let line = tables::between(king, checker);
                    for &m in &generate_evasions(p) {
                        assert!(
                            m.from() == king
                                || m.to() == checker
                                || line.contains(m.to())
                                || m.flag() == MoveFlag::EnPassant,
                            "{} does not answer the check in {}",
                            m,
                            p.to_fen()
                        );
                    }
                }
                GenMode::DoubleCheck => {
                    assert_eq!(attacks::checkers(p, us).count(), 2);
                    assert!(generate_moves(p).iter().all(|m| m.from() == king));
                }
            }
        });
    }

    #[test]
    fn notation_round_trips((seed, choices) in playout()) {
        let long = AnStyle { short: false, castle: CastleStyle::San };
        walk(seed, &choices, |p| {
            for &m in &generate_moves(p) {
                let san = notation::to_san(p, m);
                assert_eq!(notation::parse_san(p, &san), Ok(m), "SAN {} in {}", san, p.to_fen());
                assert_eq!(notation::parse_any(p, &san), Ok(m), "SAN {} in {}", san, p.to_fen());

                let fan = notation::to_fan(p, m);
                assert_eq!(notation::parse_fan(p, &fan), Ok(m), "FAN {} in {}", fan, p.to_fen());

                let lan = notation::to_lan(p, m);
                assert_eq!(notation::parse_lan(p, &lan), Ok(m), "LAN {} in {}", lan, p.to_fen());

                for an in [notation::to_an(m), notation::to_an_with(m, long)] {
                    assert_eq!(notation::parse_an(p, &an), Ok(m), "AN {} in {}", an, p.to_fen());
                }
            }
        });
    }

    #[test]
    fn see_is_bounded_by_the_material_at_stake((seed, choices) in playout()) {
        walk(seed, &choices, |p| {
            for &m in &rotchess_engine::generate_captures(p) {
                let score = rotchess_engine::see(p, m);
                let taken = p.piece_at(m.to()).map_or(Piece::Pawn.value(), Piece::value);
                let promoted = m.promotion().map_or(0, |q| q.value() - Piece::Pawn.value());
                assert!(score <= taken + promoted, "{} scores {} in {}", m, score, p.to_fen());
            }
        });
    }
}
