//! FEN record splitting and syntax checks.
//!
//! [`FenParser`] only validates the text. Turning the fields into a board,
//! and the semantic checks that need one (king counts, en-passant
//! consistency), belong to the engine.

use crate::{Color, Piece, Square};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("invalid FEN: expected 4 to 6 fields, got {0}")]
    InvalidFieldCount(usize),

    #[error("invalid piece placement: {0}")]
    InvalidPiecePlacement(String),

    #[error("invalid active color: expected 'w' or 'b', got '{0}'")]
    InvalidActiveColor(String),

    #[error("invalid castling rights: {0}")]
    InvalidCastlingRights(String),

    #[error("invalid en passant square: {0}")]
    InvalidEnPassantSquare(String),

    #[error("invalid halfmove clock: {0}")]
    InvalidHalfmoveClock(String),

    #[error("invalid fullmove number: {0}")]
    InvalidFullmoveNumber(String),
}

/// The fields of a syntactically valid FEN record.
///
/// Records with only four fields (EPD style) get a halfmove clock of 0 and
/// a fullmove number of 1; a five-field record defaults only the latter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FenParser {
    /// Rank 8 first, e.g. "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR".
    pub piece_placement: String,
    pub active_color: Color,
    /// Subset of "KQkq", or "-".
    pub castling: String,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl FenParser {
    pub const STARTPOS: &'static str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    pub fn parse(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::InvalidFieldCount(fields.len()));
        }

        Self::check_piece_placement(fields[0])?;

        let mut color_chars = fields[1].chars();
        let active_color = match (color_chars.next().and_then(Color::from_fen_char), color_chars.next()) {
            (Some(color), None) => color,
            _ => return Err(FenError::InvalidActiveColor(fields[1].to_string())),
        };

        Self::check_castling(fields[2])?;
        let en_passant = Self::parse_en_passant(fields[3])?;

        let halfmove_clock = match fields.get(4) {
            Some(text) => text
                .parse::<u32>()
                .map_err(|_| FenError::InvalidHalfmoveClock(text.to_string()))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(text) => match text.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(FenError::InvalidFullmoveNumber(text.to_string())),
            },
            None => 1,
        };

        Ok(FenParser {
            piece_placement: fields[0].to_string(),
            active_color,
            castling: fields[2].to_string(),
            en_passant,
            halfmove_clock,
            fullmove_number,
        })
    }

    /// Iterates the placement field as `(square, piece, color)` triples.
    pub fn placements(&self) -> impl Iterator<Item = (Square, Piece, Color)> + '_ {
        self.piece_placement
            .split('/')
            .enumerate()
            .flat_map(|(row, rank_text)| {
                let rank = 7 - row as i8;
                let mut file = 0i8;
                rank_text.chars().filter_map(move |c| {
                    if let Some(skip) = c.to_digit(10) {
                        file += skip as i8;
                        return None;
                    }
                    let square = Square::from_coords(file, rank);
                    file += 1;
                    let (piece, color) = Piece::from_fen_char(c)?;
                    Some((square?, piece, color))
                })
            })
    }

    fn check_piece_placement(placement: &str) -> Result<(), FenError> {
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidPiecePlacement(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        for (row, rank) in ranks.iter().enumerate() {
            let mut width = 0u32;
            for c in rank.chars() {
                match c.to_digit(10) {
                    Some(skip @ 1..=8) => width += skip,
                    Some(_) => {
                        return Err(FenError::InvalidPiecePlacement(format!(
                            "bad skip count '{}' in rank {}",
                            c,
                            8 - row
                        )))
                    }
                    None if Piece::from_fen_char(c).is_some() => width += 1,
                    None => {
                        return Err(FenError::InvalidPiecePlacement(format!(
                            "invalid character '{}' in rank {}",
                            c,
                            8 - row
                        )))
                    }
                }
            }
            if width != 8 {
                return Err(FenError::InvalidPiecePlacement(format!(
                    "rank {} covers {} squares",
                    8 - row,
                    width
                )));
            }
        }
        Ok(())
    }

    fn check_castling(castling: &str) -> Result<(), FenError> {
        if castling == "-" {
            return Ok(());
        }
        let mut seen = String::new();
        for c in castling.chars() {
            if !"KQkq".contains(c) || seen.contains(c) {
                return Err(FenError::InvalidCastlingRights(castling.to_string()));
            }
            seen.push(c);
        }
        Ok(())
    }

    fn parse_en_passant(field: &str) -> Result<Option<Square>, FenError> {
        if field == "-" {
            return Ok(None);
        }
        match Square::from_algebraic(field) {
            Some(sq) if sq.rank() == Color::White.en_passant_rank() => Ok(Some(sq)),
            Some(sq) if sq.rank() == Color::Black.en_passant_rank() => Ok(Some(sq)),
            _ => Err(FenError::InvalidEnPassantSquare(field.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_startpos() {
        let fen = FenParser::parse(FenParser::STARTPOS).unwrap();
        assert_eq!(fen.active_color, Color::White);
        assert_eq!(fen.castling, "KQkq");
        assert_eq!(fen.en_passant, None);
        assert_eq!(fen.halfmove_clock, 0);
        assert_eq!(fen.fullmove_number, 1);
        assert_eq!(fen.placements().count(), 32);
    }

    #[test]
    fn short_records_get_default_clocks() {
        let four = FenParser::parse("4k3/8/8/8/8/8/8/4K3 b - -").unwrap();
        assert_eq!(four.active_color, Color::Black);
        assert_eq!((four.halfmove_clock, four.fullmove_number), (0, 1));

        let five = FenParser::parse("4k3/8/8/8/8/8/8/4K3 w - - 17").unwrap();
        assert_eq!((five.halfmove_clock, five.fullmove_number), (17, 1));
    }

    #[test]
    fn placements_walk_rank_eight_first() {
        let fen = FenParser::parse("k7/8/8/8/8/8/8/7K w - - 0 1").unwrap();
        let found: Vec<_> = fen.placements().collect();
        assert_eq!(
            found,
            vec![
                (Square::A8, Piece::King, Color::Black),
                (Square::H1, Piece::King, Color::White),
            ]
        );
    }

    #[test]
    fn en_passant_must_sit_on_third_or_sixth_rank() {
        let fen = FenParser::parse("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(fen.en_passant, Square::from_algebraic("e3"));
        assert!(matches!(
            FenParser::parse("4k3/8/8/8/8/8/8/4K3 w - e4 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
        assert!(matches!(
            FenParser::parse("4k3/8/8/8/8/8/8/4K3 w - x6 0 1"),
            Err(FenError::InvalidEnPassantSquare(_))
        ));
    }

    #[test]
    fn rejects_malformed_records() {
        assert!(matches!(
            FenParser::parse("8/8/8 w"),
            Err(FenError::InvalidFieldCount(2))
        ));
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            FenParser::parse("rnbqkbnr/pppppppp/8/8/8/8/PPPPXPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            FenParser::parse("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
            Err(FenError::InvalidPiecePlacement(_))
        ));
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8/8 white - - 0 1"),
            Err(FenError::InvalidActiveColor(_))
        ));
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8/8 w KK - 0 1"),
            Err(FenError::InvalidCastlingRights(_))
        ));
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8/8 w - - x 1"),
            Err(FenError::InvalidHalfmoveClock(_))
        ));
        assert!(matches!(
            FenParser::parse("8/8/8/8/8/8/8/8 w - - 0 0"),
            Err(FenError::InvalidFullmoveNumber(_))
        ));
    }

    #[test]
    fn error_messages_carry_the_offending_text() {
        let err = FenParser::parse("8/8/8/8/8/8/8/8 w XYZ - 0 1").unwrap_err();
        assert!(err.to_string().contains("XYZ"));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const OCCUPANTS: &str = "PNBRQKpnbrqk";

        /// Writes a placement field for `board`, indexed a1 = 0.
        fn placement(board: &[Option<char>]) -> String {
            let mut out = String::new();
            for rank in (0..8).rev() {
                let mut empty = 0;
                for file in 0..8 {
                    match board[rank * 8 + file] {
                        Some(c) => {
                            if empty > 0 {
                                out.push_str(&empty.to_string());
                                empty = 0;
                            }
                            out.push(c);
                        }
                        None => empty += 1,
                    }
                }
                if empty > 0 {
                    out.push_str(&empty.to_string());
                }
                if rank > 0 {
                    out.push('/');
                }
            }
            out
        }

        fn board() -> impl Strategy<Value = Vec<Option<char>>> {
            let occupant = prop::option::weighted(
                0.3,
                prop::sample::select(OCCUPANTS.chars().collect::<Vec<_>>()),
            );
            prop::collection::vec(occupant, 64)
        }

        proptest! {
            #[test]
            fn placements_list_every_occupied_square(board in board()) {
                let fen = FenParser::parse(&format!("{} w - - 0 1", placement(&board))).unwrap();
                let expected: Vec<_> = (0u8..64)
                    .filter_map(|i| {
                        let (piece, color) = Piece::from_fen_char(board[i as usize]?)?;
                        Some((Square::from_index(i)?, piece, color))
                    })
                    .collect();
                let mut found: Vec<_> = fen.placements().collect();
                found.sort_by_key(|(sq, _, _)| sq.index());
                prop_assert_eq!(found, expected);
            }

            #[test]
            fn arbitrary_text_never_panics(text in "\\PC{0,80}") {
                let _ = FenParser::parse(&text);
            }
        }
    }
}
