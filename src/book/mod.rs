//! book
//!
//! Opening-book sources for the populate crawl.
//!
//! # Architecture
//!
//! A book answers one question: which moves does it know for this position,
//! and how popular is each. [`OpeningBook`] is the seam; [`PolyglotBook`]
//! reads the common binary `.bin` format and [`MemoryBook`] serves tests and
//! embedders that build a book in code.

mod polyglot;

pub use polyglot::{decode_move, PolyglotBook, ENTRY_SIZE};

use std::collections::HashMap;

use thiserror::Error;

use crate::core::types::{MoveCode, PositionId};
use crate::rules::{Board, RulesError};

/// Errors from reading opening books.
#[derive(Debug, Error)]
pub enum BookError {
    #[error("failed to read book '{path}': {source}")]
    ReadError {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("book '{path}' is truncated: {len} bytes is not a multiple of {entry}")]
    Truncated {
        path: std::path::PathBuf,
        len: usize,
        entry: usize,
    },

    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// A move suggested by a book, with its popularity weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookMove {
    pub uci: MoveCode,
    pub weight: u16,
}

/// A source of weighted book moves.
pub trait OpeningBook {
    /// Moves the book knows for the board's current position.
    ///
    /// Only legal moves are returned. Order is unspecified.
    fn candidates(&self, board: &Board) -> Result<Vec<BookMove>, BookError>;
}

/// An in-memory book keyed by position id.
#[derive(Debug, Clone, Default)]
pub struct MemoryBook {
    entries: HashMap<PositionId, Vec<BookMove>>,
}

impl MemoryBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a move for a position. Adding a known move adds to its weight.
    pub fn add(&mut self, position: PositionId, uci: MoveCode, weight: u16) {
        let moves = self.entries.entry(position).or_default();
        match moves.iter_mut().find(|m| m.uci == uci) {
            Some(existing) => existing.weight = existing.weight.saturating_add(weight),
            None => moves.push(BookMove { uci, weight }),
        }
    }

    /// Add a whole line, each move with the same weight.
    pub fn add_line(&mut self, line: &[MoveCode], weight: u16) -> Result<(), BookError> {
        let mut board = Board::initial();
        for uci in line {
            self.add(board.position_id()?, uci.clone(), weight);
            board.push(uci)?;
        }
        Ok(())
    }
}

impl OpeningBook for MemoryBook {
    fn candidates(&self, board: &Board) -> Result<Vec<BookMove>, BookError> {
        let id = board.position_id()?;
        Ok(self
            .entries
            .get(&id)
            .map(|moves| {
                moves
                    .iter()
                    .filter(|m| board.is_legal(&m.uci))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Popularity of each book move as a share of the total weight.
///
/// Returns an empty list when the total weight is zero.
pub fn popularity(moves: &[BookMove]) -> Vec<(MoveCode, f64)> {
    let total: u64 = moves.iter().map(|m| u64::from(m.weight)).sum();
    if total == 0 {
        return Vec::new();
    }
    moves
        .iter()
        .map(|m| (m.uci.clone(), f64::from(m.weight) / total as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> MoveCode {
        MoveCode::new(s).unwrap()
    }

    #[test]
    fn memory_book_returns_moves_for_position() {
        let mut book = MemoryBook::new();
        book.add_line(&[mv("e2e4"), mv("e7e5")], 10).unwrap();
        book.add_line(&[mv("d2d4")], 5).unwrap();

        let root = book.candidates(&Board::initial()).unwrap();
        let ucis: Vec<&str> = root.iter().map(|m| m.uci.as_str()).collect();
        assert_eq!(ucis, vec!["e2e4", "d2d4"]);

        assert_eq!(root[0].weight, 10);

        book.add_line(&[mv("e2e4"), mv("c7c6")], 3).unwrap();
        assert_eq!(book.candidates(&Board::initial()).unwrap()[0].weight, 13);

        let after_e4 = Board::from_line(&[mv("e2e4")]).unwrap();
        let replies = book.candidates(&after_e4).unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].uci, mv("e7e5"));
    }

    #[test]
    fn memory_book_unknown_position_is_empty() {
        let book = MemoryBook::new();
        assert!(book.candidates(&Board::initial()).unwrap().is_empty());
    }

    #[test]
    fn popularity_normalizes_weights() {
        let moves = vec![
            BookMove {
                uci: mv("e2e4"),
                weight: 3,
            },
            BookMove {
                uci: mv("d2d4"),
                weight: 1,
            },
        ];
        let shares = popularity(&moves);
        assert_eq!(shares[0], (mv("e2e4"), 0.75));
        assert_eq!(shares[1], (mv("d2d4"), 0.25));

        let zero = vec![BookMove {
            uci: mv("e2e4"),
            weight: 0,
        }];
        assert!(popularity(&zero).is_empty());
    }
}
