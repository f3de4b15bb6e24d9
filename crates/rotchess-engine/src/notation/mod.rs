//! Move notation: SAN, LAN, coordinate (AN) and figurine (FAN).
//!
//! Every parser resolves its text against the legal moves of the position,
//! so a successful parse is always a legal move. Formatting SAN needs to try
//! the move to decide on a `+` or `#` suffix, which is why [`to_san`] and
//! [`to_fan`] borrow the position mutably; the position is restored before
//! they return.

mod an;
mod lan;
mod san;

use rotchess_core::{File, Move, Piece, Rank, Square};
use thiserror::Error;
use tracing::trace;

use crate::movegen::generate_moves;
use crate::Position;

pub use an::{parse_an, to_an, to_an_with, AnStyle, CastleStyle};
pub use lan::{parse_lan, to_lan};
pub use san::{parse_fan, parse_san, to_fan, to_san};

/// Why a piece of move text could not be turned into a legal move.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("empty move text")]
    Empty,

    #[error("malformed move text: {0}")]
    InvalidFormat(String),

    #[error("invalid square in move text: {0}")]
    InvalidSquare(String),

    #[error("invalid promotion piece in move text: {0}")]
    InvalidPromotion(String),

    #[error("no legal move matches {text} in {fen}")]
    NoMatchingMove { text: String, fen: String },

    #[error("{text} matches more than one legal move in {fen}")]
    AmbiguousMove { text: String, fen: String },

    #[error("{text} names a square no matching piece stands on in {fen}")]
    DisambiguatorMismatch { text: String, fen: String },
}

/// The notations [`determine_notation`] tells apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotationKind {
    /// Short algebraic, `Nf3`, `exd5`, `O-O`.
    San,
    /// Long algebraic, `Ng1-f3`, `e4xd5`.
    Lan,
    /// Coordinates, `g1f3`, `e7e8q`.
    An,
    /// Short algebraic with piece glyphs, `♘f3`.
    Fan,
}

/// Guesses the notation of `text` from its shape alone.
pub fn determine_notation(text: &str) -> NotationKind {
    let upper = text.to_ascii_uppercase();
    if matches!(
        upper.as_str(),
        "O-O" | "O-O-O" | "0-0" | "0-0-0" | "OO" | "OOO" | "00" | "000"
    ) {
        return NotationKind::San;
    }
    if text.contains('-') {
        return NotationKind::Lan;
    }
    if let Some((before, _)) = text.split_once('x') {
        if Square::from_algebraic(before).is_some() {
            return NotationKind::Lan;
        }
    }
    if text.get(..2).and_then(Square::from_algebraic).is_some()
        && text.get(2..4).and_then(Square::from_algebraic).is_some()
    {
        return NotationKind::An;
    }
    if text.chars().next().and_then(Piece::from_figurine).is_some() {
        return NotationKind::Fan;
    }
    NotationKind::San
}

/// Parses `text` in whichever notation it looks like.
pub fn parse_any(pos: &Position, text: &str) -> Result<Move, NotationError> {
    parse_kind(pos, text, determine_notation(text))
}

pub fn parse_kind(pos: &Position, text: &str, kind: NotationKind) -> Result<Move, NotationError> {
    match kind {
        NotationKind::San => parse_san(pos, text),
        NotationKind::Lan => parse_lan(pos, text),
        NotationKind::An => parse_an(pos, text),
        NotationKind::Fan => parse_fan(pos, text),
    }
}

/// SAN for a sequence of moves played from `pos`. Works on a copy.
pub fn list_to_san(pos: &Position, moves: &[Move]) -> Result<Vec<String>, NotationError> {
    let mut scratch = pos.clone();
    let mut texts = Vec::with_capacity(moves.len());
    for &m in moves {
        if !generate_moves(&scratch).contains(m) {
            return Err(reject(&scratch, &m.to_coordinate(), MatchFailure::None));
        }
        texts.push(to_san(&mut scratch, m));
        scratch.apply_move(m);
    }
    Ok(texts)
}

/// Parses a sequence of moves played from `pos`, each in `kind` or, when
/// `kind` is `None`, in whatever notation it looks like. Works on a copy.
pub fn list_to_moves<S: AsRef<str>>(
    pos: &Position,
    texts: &[S],
    kind: Option<NotationKind>,
) -> Result<Vec<Move>, NotationError> {
    let mut scratch = pos.clone();
    let mut moves = Vec::with_capacity(texts.len());
    for text in texts {
        let text = text.as_ref();
        let m = match kind {
            Some(kind) => parse_kind(&scratch, text, kind)?,
            None => parse_any(&scratch, text)?,
        };
        scratch.apply_move(m);
        moves.push(m);
    }
    Ok(moves)
}

/// What a parser pulled out of the text, before looking at the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MoveSpec {
    piece: Piece,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<Piece>,
}

enum MatchFailure {
    None,
    Many,
    Disambiguator,
}

impl MoveSpec {
    /// The single legal move this describes.
    fn resolve(&self, pos: &Position, text: &str) -> Result<Move, NotationError> {
        let legal = generate_moves(pos);
        let reaching: Vec<Move> = legal
            .iter()
            .copied()
            .filter(|m| {
                m.to() == self.to
                    && m.promotion() == self.promotion
                    && pos.piece_at(m.from()) == Some(self.piece)
            })
            .collect();
        let matching: Vec<Move> = reaching
            .iter()
            .copied()
            .filter(|m| {
                self.from_file.map_or(true, |f| m.from().file() == f)
                    && self.from_rank.map_or(true, |r| m.from().rank() == r)
            })
            .collect();

        match (matching.as_slice(), reaching.is_empty()) {
            ([m], _) => Ok(*m),
            ([], true) => Err(reject(pos, text, MatchFailure::None)),
            ([], false) => Err(reject(pos, text, MatchFailure::Disambiguator)),
            _ => Err(reject(pos, text, MatchFailure::Many)),
        }
    }
}

fn reject(pos: &Position, text: &str, failure: MatchFailure) -> NotationError {
    let (text, fen) = (text.to_string(), pos.to_fen());
    trace!(%text, %fen, "move text rejected");
    match failure {
        MatchFailure::None => NotationError::NoMatchingMove { text, fen },
        MatchFailure::Many => NotationError::AmbiguousMove { text, fen },
        MatchFailure::Disambiguator => NotationError::DisambiguatorMismatch { text, fen },
    }
}

/// Splits a trailing promotion piece (`=Q`, `Q`, `=q`) off `body`. Move
/// text otherwise ends in a rank digit, so any trailing letter counts.
fn split_promotion<'a>(
    body: &'a str,
    original: &str,
) -> Result<(&'a str, Option<Piece>), NotationError> {
    let Some(last) = body.chars().last() else {
        return Ok((body, None));
    };
    if !last.is_ascii_alphabetic() {
        return Ok((body, None));
    }
    let piece = match Piece::from_san_char(last) {
        Some(piece) if Piece::PROMOTIONS.contains(&piece) => piece,
        _ => return Err(NotationError::InvalidPromotion(original.to_string())),
    };
    let rest = &body[..body.len() - 1];
    Ok((rest.strip_suffix('=').unwrap_or(rest), Some(piece)))
}

/// Removes `+`, `#` and `++` from the end.
fn strip_check_suffix(text: &str) -> &str {
    text.trim_end_matches(['+', '#'])
}
