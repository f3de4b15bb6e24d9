//! Perft suite loading.
//!
//! A suite is a list of named positions, each with the expected leaf counts
//! for depth 1, 2, 3 and so on:
//!
//! ```toml
//! [[position]]
//! name = "startpos"
//! fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
//! depths = [20, 400, 8902]
//! ```

use rotchess_engine::{Position, PositionError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when loading or validating a perft suite.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the suite file from disk.
    #[error("Failed to read suite file: {0}")]
    ReadError(#[from] std::io::Error),
    /// The suite file is not valid TOML or has the wrong shape.
    #[error("Failed to parse suite: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A suite entry carries a FEN the engine rejects.
    #[error("Invalid position {name}: {source}")]
    InvalidPosition {
        name: String,
        #[source]
        source: PositionError,
    },
    /// Requested position was not found in the suite.
    #[error("Position not found: {0}")]
    PositionNotFound(String),
}

/// One suite entry.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SuitePosition {
    pub name: String,
    pub fen: String,
    /// Expected node counts; `depths[0]` is depth 1.
    #[serde(default)]
    pub depths: Vec<u64>,
}

impl SuitePosition {
    fn new(name: &str, fen: &str, depths: &[u64]) -> Self {
        SuitePosition {
            name: name.to_string(),
            fen: fen.to_string(),
            depths: depths.to_vec(),
        }
    }

    pub fn position(&self) -> Result<Position, ConfigError> {
        Position::from_fen(&self.fen).map_err(|source| ConfigError::InvalidPosition {
            name: self.name.clone(),
            source,
        })
    }

    /// `(depth, expected nodes)` pairs up to `max_depth`.
    pub fn expectations(&self, max_depth: u32) -> impl Iterator<Item = (u32, u64)> + '_ {
        (1..=max_depth).zip(self.depths.iter().copied())
    }
}

/// A perft suite. Uses `perft.toml` in the current directory by default.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PerftSuite {
    #[serde(default, rename = "position")]
    pub positions: Vec<SuitePosition>,
}

impl Default for PerftSuite {
    /// The initial position, Kiwipete and the standard positions 3 to 5.
    fn default() -> Self {
        PerftSuite {
            positions: vec![
                SuitePosition::new(
                    "startpos",
                    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                    &[20, 400, 8902, 197281, 4865609],
                ),
                SuitePosition::new(
                    "kiwipete",
                    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
                    &[48, 2039, 97862, 4085603],
                ),
                SuitePosition::new(
                    "position3",
                    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
                    &[14, 191, 2812, 43238, 674624],
                ),
                SuitePosition::new(
                    "position4",
                    "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
                    &[6, 264, 9467, 422333],
                ),
                SuitePosition::new(
                    "position5",
                    "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
                    &[44, 1486, 62379, 2103487],
                ),
            ],
        }
    }
}

impl PerftSuite {
    /// Loads the suite at `path`, falling back to the built-in suite when
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// [`ConfigError::ParseError`] if it is not a valid suite, or
    /// [`ConfigError::InvalidPosition`] if an entry's FEN is rejected.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            tracing::debug!(path = %path.display(), "no suite file, using the built-in suite");
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let suite: PerftSuite = toml::from_str(content)?;
        suite.validate()?;
        Ok(suite)
    }

    /// Checks that every FEN in the suite describes a legal position.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for entry in &self.positions {
            entry.position()?;
        }
        Ok(())
    }

    /// Returns the path of the default suite file.
    pub fn default_path() -> PathBuf {
        PathBuf::from("perft.toml")
    }

    /// Looks up an entry by name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PositionNotFound`] if no entry has that name.
    pub fn get(&self, name: &str) -> Result<&SuitePosition, ConfigError> {
        self.positions
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| ConfigError::PositionNotFound(name.to_string()))
    }
}
