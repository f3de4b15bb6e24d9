//! Perft (performance test) for move generator validation.
//!
//! Perft counts the number of leaf nodes at a given depth, which can be
//! compared against known-correct values to validate the move generator.
//! The walk plays every move with `apply_move` and takes it back with
//! `pop_move`, so it exercises the undo log as much as the generator.

use super::generate_moves;
use crate::Position;

/// Counts the number of leaf nodes at the given depth.
pub fn perft(pos: &mut Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_moves(pos);

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;
    for &m in &moves {
        pos.apply_move(m);
        nodes += perft(pos, depth - 1);
        pos.pop_move();
    }
    nodes
}

/// Leaf counts below each root move, keyed by coordinate notation and
/// sorted by it. Summing the counts gives `perft(pos, depth)`.
pub fn perft_divide(pos: &mut Position, depth: u32) -> Vec<(String, u64)> {
    let moves = generate_moves(pos);
    let mut results = Vec::with_capacity(moves.len());

    for &m in &moves {
        pos.apply_move(m);
        let nodes = if depth > 1 { perft(pos, depth - 1) } else { 1 };
        pos.pop_move();
        results.push((m.to_coordinate(), nodes));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    fn count(fen: &str, depth: u32) -> u64 {
        let mut position = Position::from_fen(fen).unwrap();
        let before = position.clone();
        let nodes = perft(&mut position, depth);
        assert_eq!(position, before, "perft must leave the position untouched");
        nodes
    }

    #[test]
    fn perft_startpos_shallow() {
        let mut position = Position::startpos();
        assert_eq!(perft(&mut position, 0), 1);
        assert_eq!(perft(&mut position, 1), 20);
        assert_eq!(perft(&mut position, 2), 400);
        assert_eq!(perft(&mut position, 3), 8902);
    }

    #[test]
    fn perft_startpos_depth_4() {
        let mut position = Position::startpos();
        assert_eq!(perft(&mut position, 4), 197281);
    }

    // Depth 5 is slower, only run in release mode
    #[test]
    #[ignore]
    fn perft_startpos_depth_5() {
        let mut position = Position::startpos();
        assert_eq!(perft(&mut position, 5), 4865609);
    }

    // Kiwipete - a position with lots of special moves
    #[test]
    fn perft_kiwipete() {
        assert_eq!(count(KIWIPETE, 1), 48);
        assert_eq!(count(KIWIPETE, 2), 2039);
        assert_eq!(count(KIWIPETE, 3), 97862);
    }

    #[test]
    #[ignore]
    fn perft_kiwipete_depth_4() {
        assert_eq!(count(KIWIPETE, 4), 4085603);
    }

    // Position 3: check evasion, en passant pins along the rank
    #[test]
    fn perft_position3() {
        assert_eq!(count(POSITION_3, 1), 14);
        assert_eq!(count(POSITION_3, 2), 191);
        assert_eq!(count(POSITION_3, 3), 2812);
        assert_eq!(count(POSITION_3, 4), 43238);
    }

    #[test]
    #[ignore]
    fn perft_position3_depth_5() {
        assert_eq!(count(POSITION_3, 5), 674624);
    }

    // Position 4: lots of promotions and captures
    #[test]
    fn perft_position4() {
        assert_eq!(count(POSITION_4, 1), 6);
        assert_eq!(count(POSITION_4, 2), 264);
        assert_eq!(count(POSITION_4, 3), 9467);
    }

    #[test]
    fn perft_position5() {
        assert_eq!(count(POSITION_5, 1), 44);
        assert_eq!(count(POSITION_5, 2), 1486);
        assert_eq!(count(POSITION_5, 3), 62379);
    }

    #[test]
    fn perft_divide_sums_to_perft() {
        let mut position = Position::startpos();
        let results = perft_divide(&mut position, 3);
        assert_eq!(results.len(), 20);
        assert_eq!(results[0].0, "a2a3");
        let total: u64 = results.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 8902);
    }
}
