//! Board vocabulary shared by the rotchess crates.
//!
//! - [`Color`] and [`Piece`] name the occupants of a square
//! - [`Square`], [`File`] and [`Rank`] address the board (a1 = 0, h8 = 63)
//! - [`Move`] is the packed 16-bit move word `flag << 12 | from << 6 | to`
//! - [`FenParser`] splits and checks a FEN record before the engine builds a
//!   position from it

mod color;
mod fen;
mod mov;
mod piece;
mod square;

pub use color::Color;
pub use fen::{FenError, FenParser};
pub use mov::{Move, MoveFlag};
pub use piece::Piece;
pub use square::{File, Rank, Square};
