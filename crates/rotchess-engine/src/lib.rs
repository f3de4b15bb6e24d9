//! Rotated-bitboard chess rules engine.
//!
//! This crate provides:
//! - [`Bitboard`] - 64-bit square sets with the usual shifts and iteration
//! - [`Position`] - board state mutated in place by [`Position::apply_move`]
//!   and restored by [`Position::pop_move`], with an incremental Zobrist key
//! - [`attacks`] - attack and pin queries over rotated occupancy tables
//! - [`movegen`] - legal move generation with separate evasion and
//!   double-check paths, plus perft
//! - [`notation`] - SAN, LAN, coordinate and figurine notation
//! - [`see`] - static exchange evaluation
//! - [`rules`] - mate, stalemate and draw detection
//!
//! # Architecture
//!
//! Besides one bitboard per piece kind and color, a position keeps the
//! occupied set in four layouts: by rank, by file and along both diagonal
//! directions. In each layout the squares of one line sit in a single byte,
//! so a slider's reach along that line is a table lookup keyed by the byte.
//! The tables are built on first use and shared read-only afterwards.
//!
//! # Example
//!
//! ```
//! use rotchess_engine::{generate_moves, notation, Position};
//!
//! let mut position = Position::startpos();
//! assert_eq!(generate_moves(&position).len(), 20);
//!
//! let e4 = notation::parse_san(&position, "e4").unwrap();
//! position.apply_move(e4);
//! let reply = notation::parse_any(&position, "e7e5").unwrap();
//! assert_eq!(notation::to_san(&mut position, reply), "e5");
//! ```

pub mod attacks;
mod bitboard;
pub mod movegen;
pub mod notation;
mod position;
pub mod rotated;
pub mod rules;
pub mod see;
pub mod tables;
mod zobrist;

pub use bitboard::Bitboard;
pub use movegen::perft::{perft, perft_divide};
pub use movegen::{
    gen_mode, generate_captures, generate_evasions, generate_moves, generate_piece_moves,
    generate_pseudo_legal, generate_quiets, is_legal, GenMode, MoveList,
};
pub use notation::{NotationError, NotationKind};
pub use position::{CastlingRights, MoveGuard, Position, PositionError};
pub use rotated::RotatedOccupancy;
pub use rules::{game_result, DrawReason, GameResult};
pub use see::{see, see_square};
