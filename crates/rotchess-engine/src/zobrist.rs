//! Zobrist keys.
//!
//! A position's key is the XOR of one key per (color, piece, square) on the
//! board, one for the castling-rights nibble, one for the en-passant file
//! when a target is set, and one when Black is to move. `apply_move` updates
//! it incrementally; `pop_move` restores it from the undo record.

use rotchess_core::{Color, Piece, Square};

pub struct ZobristKeys {
    /// `[color][piece][square]`
    pieces: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    /// Indexed by the whole 4-bit castling value.
    castling: [u64; 16],
    en_passant: [u64; 8],
}

const fn xorshift(mut x: u64) -> u64 {
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    x
}

impl ZobristKeys {
    /// Fixed seed, so keys are identical across runs and builds.
    const fn generate() -> Self {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;
        let mut pieces = [[[0u64; 64]; 6]; 2];
        let mut castling = [0u64; 16];
        let mut en_passant = [0u64; 8];

        let mut c = 0;
        while c < 2 {
            let mut p = 0;
            while p < 6 {
                let mut sq = 0;
                while sq < 64 {
                    state = xorshift(state);
                    pieces[c][p][sq] = state;
                    sq += 1;
                }
                p += 1;
            }
            c += 1;
        }

        state = xorshift(state);
        let black_to_move = state;

        // No rights hashes to zero so the empty-rights key is a no-op.
        let mut i = 1;
        while i < 16 {
            state = xorshift(state);
            castling[i] = state;
            i += 1;
        }

        let mut f = 0;
        while f < 8 {
            state = xorshift(state);
            en_passant[f] = state;
            f += 1;
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant,
        }
    }

    #[inline]
    pub fn piece(&self, color: Color, piece: Piece, sq: Square) -> u64 {
        self.pieces[color.index()][piece.index()][sq.idx()]
    }

    #[inline]
    pub fn castling(&self, rights: u8) -> u64 {
        self.castling[(rights & 0xF) as usize]
    }

    #[inline]
    pub fn en_passant(&self, sq: Square) -> u64 {
        self.en_passant[sq.file().index() as usize]
    }

    #[inline]
    pub fn black_to_move(&self) -> u64 {
        self.black_to_move
    }
}

pub static ZOBRIST: ZobristKeys = ZobristKeys::generate();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_differ_by_color_piece_and_square() {
        let base = ZOBRIST.piece(Color::White, Piece::Pawn, Square::A1);
        assert_ne!(base, ZOBRIST.piece(Color::White, Piece::Pawn, Square::B1));
        assert_ne!(base, ZOBRIST.piece(Color::Black, Piece::Pawn, Square::A1));
        assert_ne!(base, ZOBRIST.piece(Color::White, Piece::Knight, Square::A1));
        assert_ne!(ZOBRIST.black_to_move(), 0);
    }

    #[test]
    fn empty_castling_rights_hash_to_zero() {
        assert_eq!(ZOBRIST.castling(0), 0);
        assert_ne!(ZOBRIST.castling(0b1111), 0);
        assert_ne!(ZOBRIST.castling(0b0001), ZOBRIST.castling(0b0010));
    }

    #[test]
    fn en_passant_keys_follow_file() {
        let e3 = Square::from_algebraic("e3").unwrap();
        let e6 = Square::from_algebraic("e6").unwrap();
        assert_eq!(ZOBRIST.en_passant(e3), ZOBRIST.en_passant(e6));
        assert_ne!(ZOBRIST.en_passant(e3), ZOBRIST.en_passant(Square::A1));
    }
}
