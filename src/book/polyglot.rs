//! book::polyglot
//!
//! Reader for Polyglot `.bin` opening books.
//!
//! # Format
//!
//! A book is a sequence of 16-byte big-endian entries sorted by key:
//!
//! ```text
//! key: u64 | move: u16 | weight: u16 | learn: u32
//! ```
//!
//! The move packs to-file (bits 0-2), to-row (3-5), from-file (6-8),
//! from-row (9-11) and promotion (12-14: none, n, b, r, q). Castling is
//! written as the king capturing its own rook.

use std::fs;
use std::path::Path;

use super::{BookError, BookMove, OpeningBook};
use crate::rules::Board;

/// Size of one book entry in bytes.
pub const ENTRY_SIZE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    key: u64,
    raw_move: u16,
    weight: u16,
}

/// A Polyglot book loaded into memory.
#[derive(Debug, Clone, Default)]
pub struct PolyglotBook {
    entries: Vec<Entry>,
}

impl PolyglotBook {
    /// Read a book file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or its length is not a whole number
    /// of entries.
    pub fn open(path: &Path) -> Result<Self, BookError> {
        let bytes = fs::read(path).map_err(|e| BookError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        if bytes.len() % ENTRY_SIZE != 0 {
            return Err(BookError::Truncated {
                path: path.to_path_buf(),
                len: bytes.len(),
                entry: ENTRY_SIZE,
            });
        }
        Ok(Self::from_bytes(&bytes))
    }

    /// Parse book entries from raw bytes, ignoring a trailing partial entry.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut entries: Vec<Entry> = bytes
            .chunks_exact(ENTRY_SIZE)
            .map(|chunk| {
                let mut key = [0u8; 8];
                key.copy_from_slice(&chunk[0..8]);
                Entry {
                    key: u64::from_be_bytes(key),
                    raw_move: u16::from_be_bytes([chunk[8], chunk[9]]),
                    weight: u16::from_be_bytes([chunk[10], chunk[11]]),
                }
            })
            .collect();
        // Books are written sorted; sorting again costs little and makes
        // hand-built books work too.
        entries.sort_by_key(|e| e.key);
        Self { entries }
    }

    /// Number of entries in the book.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the book has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entries_for(&self, key: u64) -> &[Entry] {
        let start = self.entries.partition_point(|e| e.key < key);
        let end = self.entries.partition_point(|e| e.key <= key);
        &self.entries[start..end]
    }
}

impl OpeningBook for PolyglotBook {
    fn candidates(&self, board: &Board) -> Result<Vec<BookMove>, BookError> {
        let mut moves: Vec<BookMove> = Vec::new();
        for entry in self.entries_for(board.book_key()) {
            let raw = decode_move(entry.raw_move);
            let Some(uci) = board.resolve_book_move(&raw) else {
                tracing::debug!(raw = %raw, "skipping book move that is not legal here");
                continue;
            };
            if moves.iter().any(|m| m.uci == uci) {
                continue;
            }
            moves.push(BookMove {
                uci,
                weight: entry.weight,
            });
        }
        Ok(moves)
    }
}

/// Decode a packed Polyglot move into coordinate text.
///
/// Castling stays in king-takes-rook form; see
/// [`Board::resolve_book_move`].
pub fn decode_move(raw: u16) -> String {
    let to_file = raw & 0x7;
    let to_row = (raw >> 3) & 0x7;
    let from_file = (raw >> 6) & 0x7;
    let from_row = (raw >> 9) & 0x7;
    let promotion = (raw >> 12) & 0x7;

    let square = |file: u16, row: u16| {
        format!(
            "{}{}",
            char::from(b'a' + file as u8),
            char::from(b'1' + row as u8)
        )
    };

    let mut text = square(from_file, from_row);
    text.push_str(&square(to_file, to_row));
    match promotion {
        1 => text.push('n'),
        2 => text.push('b'),
        3 => text.push('r'),
        4 => text.push('q'),
        _ => {}
    }
    text
}
