//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`PositionId`] - Canonical position identity (first four FEN fields)
//! - [`MoveCode`] - Validated UCI coordinate move (`e2e4`, `a7a8q`)
//! - [`Centipawns`] - Engine score unit
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Examples
//!
//! ```
//! use openbook::core::types::{MoveCode, PositionId};
//!
//! let id = PositionId::from_fen(
//!     "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
//! )
//! .unwrap();
//! assert_eq!(id.as_str(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq -");
//!
//! let mv = MoveCode::new("e7e5").unwrap();
//! assert_eq!(mv.as_str(), "e7e5");
//!
//! assert!(MoveCode::new("e9e5").is_err());
//! assert!(PositionId::new("not a position").is_err());
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Engine evaluation in centipawns.
pub type Centipawns = i32;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid position id: {0}")]
    InvalidPositionId(String),

    #[error("invalid move code: {0}")]
    InvalidMoveCode(String),
}

/// Canonical identity of a chess position.
///
/// The identity is the first four FEN fields: piece placement, side to
/// move, castling rights and en-passant target. Move counters are not part
/// of the identity, so transpositions collapse onto one node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PositionId(String);

impl PositionId {
    /// Create a position id from its four-field form.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidPositionId` if the string does not have
    /// exactly four well-formed fields.
    pub fn new(id: impl Into<String>) -> Result<Self, TypeError> {
        let id = id.into();
        Self::validate(&id)?;
        Ok(Self(id))
    }

    /// Create a position id from a full FEN, dropping the move counters.
    pub fn from_fen(fen: &str) -> Result<Self, TypeError> {
        let fields: Vec<&str> = fen.split_whitespace().take(4).collect();
        Self::new(fields.join(" "))
    }

    /// Expand to a full FEN with neutral move counters.
    pub fn to_fen(&self) -> String {
        format!("{} 0 1", self.0)
    }

    /// Stable short digest used for storage file names.
    pub fn digest(&self) -> String {
        let hash = Sha256::digest(self.0.as_bytes());
        hex::encode(&hash[..8])
    }

    fn validate(id: &str) -> Result<(), TypeError> {
        let fields: Vec<&str> = id.split(' ').collect();
        if fields.len() != 4 {
            return Err(TypeError::InvalidPositionId(format!(
                "expected 4 fields, got {}",
                fields.len()
            )));
        }

        let board = fields[0];
        if board.split('/').count() != 8 {
            return Err(TypeError::InvalidPositionId(
                "board must have 8 ranks".into(),
            ));
        }
        if !board
            .chars()
            .all(|c| c == '/' || c.is_ascii_digit() || "pnbrqkPNBRQK".contains(c))
        {
            return Err(TypeError::InvalidPositionId(format!(
                "bad board field '{}'",
                board
            )));
        }

        if fields[1] != "w" && fields[1] != "b" {
            return Err(TypeError::InvalidPositionId(format!(
                "bad side to move '{}'",
                fields[1]
            )));
        }

        let castling = fields[2];
        if castling.is_empty()
            || (castling != "-" && !castling.chars().all(|c| c.is_ascii_alphabetic()))
        {
            return Err(TypeError::InvalidPositionId(format!(
                "bad castling field '{}'",
                castling
            )));
        }

        let ep = fields[3];
        if ep != "-" && !is_square(ep) {
            return Err(TypeError::InvalidPositionId(format!(
                "bad en-passant field '{}'",
                ep
            )));
        }

        Ok(())
    }

    /// Get the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PositionId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<PositionId> for String {
    fn from(id: PositionId) -> Self {
        id.0
    }
}

impl AsRef<str> for PositionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PositionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A UCI coordinate move.
///
/// Four characters (from and to square) plus an optional lowercase
/// promotion piece.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MoveCode(String);

impl MoveCode {
    /// Create a validated move code.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidMoveCode` for anything that is not
    /// `<square><square>[qrbn]`.
    pub fn new(code: impl Into<String>) -> Result<Self, TypeError> {
        let code = code.into();
        let valid = match code.as_bytes() {
            [squares @ .., b'q' | b'r' | b'b' | b'n'] if squares.len() == 4 => is_square_bytes(squares),
            squares => is_square_bytes(squares),
        };
        if !valid {
            return Err(TypeError::InvalidMoveCode(code));
        }
        Ok(Self(code))
    }

    /// Get the move code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MoveCode {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<MoveCode> for String {
    fn from(code: MoveCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for MoveCode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for MoveCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MoveCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a comma or whitespace separated move line.
///
/// Empty input yields an empty line.
pub fn parse_move_line(line: &str) -> Result<Vec<MoveCode>, TypeError> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(MoveCode::new)
        .collect()
}

fn is_square(s: &str) -> bool {
    matches!(s.as_bytes(), [file, rank] if is_square_byte_pair(*file, *rank))
}

/// Two squares back to back.
fn is_square_bytes(bytes: &[u8]) -> bool {
    matches!(bytes, [f1, r1, f2, r2] if is_square_byte_pair(*f1, *r1) && is_square_byte_pair(*f2, *r2))
}

fn is_square_byte_pair(file: u8, rank: u8) -> bool {
    (b'a'..=b'h').contains(&file) && (b'1'..=b'8').contains(&rank)
}
