//! Standard Algebraic Notation and its figurine variant.
//!
//! Examples: "e4", "Nf3", "Bxc6", "O-O", "e8=Q", "Nbd2", "R1e1", "♘f3".
//! Parsing is lenient: `0-0`, a missing `=` before the promotion piece,
//! lowercase piece letters other than `b`, and `++` for mate are accepted.

use rotchess_core::{Color, File, Move, MoveFlag, Piece, Rank, Square};

use super::{reject, split_promotion, strip_check_suffix, MatchFailure, MoveSpec, NotationError};
use crate::movegen::generate_moves;
use crate::Position;

const CHECK_GLYPH: char = '†';
const MATE_GLYPH: char = '‡';

/// SAN for a legal move `m`, including a `+` or `#` suffix.
///
/// The move is played and taken back to find the suffix, so `pos` is
/// unchanged afterwards.
pub fn to_san(pos: &mut Position, m: Move) -> String {
    let mut san = san_body(pos, m);
    let after = pos.scoped(m);
    if after.is_check() {
        san.push(if generate_moves(&after).is_empty() { '#' } else { '+' });
    }
    san
}

/// SAN with the piece letters swapped for white glyphs, `†` for check and
/// `‡` for mate.
pub fn to_fan(pos: &mut Position, m: Move) -> String {
    to_san(pos, m)
        .chars()
        .map(|c| match c {
            '+' => CHECK_GLYPH,
            '#' => MATE_GLYPH,
            c if c.is_ascii_uppercase() => {
                Piece::from_san_char(c).map_or(c, |piece| piece.figurine(Color::White))
            }
            c => c,
        })
        .collect()
}

/// Parses figurine notation. Glyphs of either color are accepted.
pub fn parse_fan(pos: &Position, text: &str) -> Result<Move, NotationError> {
    let san: String = text
        .chars()
        .map(|c| match c {
            CHECK_GLYPH => '+',
            MATE_GLYPH => '#',
            c => Piece::from_figurine(c).map_or(c, Piece::san_char),
        })
        .collect();
    parse_san(pos, &san)
}

/// Parses SAN into the legal move it names.
pub fn parse_san(pos: &Position, text: &str) -> Result<Move, NotationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NotationError::Empty);
    }

    let body = strip_check_suffix(text);
    if let Some(flag) = castle_flag(body) {
        return find_castling_move(pos, flag, text);
    }

    let body: String = body.chars().filter(|&c| c != '-').collect();
    let (body, promotion) = split_promotion(&body, text)?;
    let mut chars = body.chars();
    let first = chars.next().ok_or_else(|| NotationError::InvalidFormat(text.to_string()))?;
    let rest = chars.as_str();

    match first {
        'b' if body.len() > 2 => {
            // `bxc3` or `bc3`: a b-pawn first, then a lowercase bishop.
            let as_pawn = spec_for(pos, Piece::Pawn, body, promotion, text)
                .and_then(|spec| spec.resolve(pos, text));
            match as_pawn {
                Ok(m) => Ok(m),
                Err(err) => spec_for(pos, Piece::Bishop, rest, promotion, text)
                    .and_then(|spec| spec.resolve(pos, text))
                    .map_err(|_| err),
            }
        }
        'K' | 'Q' | 'R' | 'B' | 'N' | 'P' | 'k' | 'q' | 'r' | 'n' => {
            let piece = Piece::from_san_char(first)
                .ok_or_else(|| NotationError::InvalidFormat(text.to_string()))?;
            spec_for(pos, piece, rest, promotion, text)?.resolve(pos, text)
        }
        _ => spec_for(pos, Piece::Pawn, body, promotion, text)?.resolve(pos, text),
    }
}

fn castle_flag(body: &str) -> Option<MoveFlag> {
    match body.to_ascii_uppercase().as_str() {
        "O-O" | "0-0" | "OO" | "00" => Some(MoveFlag::CastleKingside),
        "O-O-O" | "0-0-0" | "OOO" | "000" => Some(MoveFlag::CastleQueenside),
        _ => None,
    }
}

fn find_castling_move(
    pos: &Position,
    flag: MoveFlag,
    text: &str,
) -> Result<Move, NotationError> {
    generate_moves(pos)
        .iter()
        .copied()
        .find(|m| m.flag() == flag)
        .ok_or_else(|| reject(pos, text, MatchFailure::None))
}

/// Builds the move description from what follows the piece letter:
/// an optional disambiguator, an optional `x` and the target square.
fn spec_for(
    pos: &Position,
    piece: Piece,
    rest: &str,
    promotion: Option<Piece>,
    text: &str,
) -> Result<MoveSpec, NotationError> {
    let (disambiguator, target) = match rest.split_once('x') {
        Some((before, after)) => (before, after),
        None if rest.len() >= 2 && rest.is_char_boundary(rest.len() - 2) => {
            rest.split_at(rest.len() - 2)
        }
        None => return Err(NotationError::InvalidFormat(text.to_string())),
    };
    let to = Square::from_algebraic(target)
        .ok_or_else(|| NotationError::InvalidSquare(text.to_string()))?;
    let (from_file, from_rank) = parse_disambiguation(disambiguator, text)?;

    let promotion = match promotion {
        None if piece == Piece::Pawn && to.rank() == pos.side_to_move().promotion_rank() => {
            Some(Piece::Queen)
        }
        promotion => promotion,
    };

    Ok(MoveSpec {
        piece,
        from_file,
        from_rank,
        to,
        promotion,
    })
}

fn parse_disambiguation(
    s: &str,
    text: &str,
) -> Result<(Option<File>, Option<Rank>), NotationError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (None, _, _) => Ok((None, None)),
        (Some(c), None, _) => match (File::from_char(c), Rank::from_char(c)) {
            (Some(file), _) => Ok((Some(file), None)),
            (_, Some(rank)) => Ok((None, Some(rank))),
            _ => Err(NotationError::InvalidFormat(text.to_string())),
        },
        (Some(f), Some(r), None) => match (File::from_char(f), Rank::from_char(r)) {
            (Some(file), Some(rank)) => Ok((Some(file), Some(rank))),
            _ => Err(NotationError::InvalidSquare(text.to_string())),
        },
        _ => Err(NotationError::InvalidFormat(text.to_string())),
    }
}

/// Everything but the check suffix.
fn san_body(pos: &Position, m: Move) -> String {
    match m.flag() {
        MoveFlag::CastleKingside => return "O-O".to_string(),
        MoveFlag::CastleQueenside => return "O-O-O".to_string(),
        _ => {}
    }

    let (from, to) = (m.from(), m.to());
    let Some(piece) = pos.piece_at(from) else {
        return m.to_coordinate();
    };
    let mut san = String::with_capacity(8);

    if piece == Piece::Pawn {
        if pos.is_capture(m) {
            san.push(from.file().to_char());
            san.push('x');
        }
    } else {
        san.push(piece.san_char());
        san.push_str(&disambiguation(pos, m, piece));
        if pos.is_capture(m) {
            san.push('x');
        }
    }

    san.push_str(&to.to_algebraic());
    if let Some(promoted) = m.promotion() {
        san.push('=');
        san.push(promoted.san_char());
    }
    san
}

/// The smallest prefix of the origin square telling `m` apart from other
/// legal moves of the same piece kind to the same square.
fn disambiguation(pos: &Position, m: Move, piece: Piece) -> String {
    let from = m.from();
    let rivals: Vec<Square> = generate_moves(pos)
        .iter()
        .filter(|o| o.to() == m.to() && o.from() != from && pos.piece_at(o.from()) == Some(piece))
        .map(|o| o.from())
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    let shares_file = rivals.iter().any(|sq| sq.file() == from.file());
    let shares_rank = rivals.iter().any(|sq| sq.rank() == from.rank());
    match (shares_file, shares_rank) {
        (false, _) => from.file().to_char().to_string(),
        (true, false) => from.rank().to_char().to_string(),
        (true, true) => from.to_algebraic(),
    }
}
