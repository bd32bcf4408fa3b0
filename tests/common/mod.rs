//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;

use openbook::core::types::MoveCode;
use openbook::rules::Board;

pub fn mv(s: &str) -> MoveCode {
    MoveCode::new(s).unwrap()
}

pub fn line(moves: &[&str]) -> Vec<MoveCode> {
    moves.iter().map(|m| mv(m)).collect()
}

/// Pack a plain (non-castling, non-promotion) UCI move the Polyglot way.
fn encode(uci: &str) -> u16 {
    let b = uci.as_bytes();
    let file = |c: u8| u16::from(c - b'a');
    let row = |c: u8| u16::from(c - b'1');
    file(b[2]) | (row(b[3]) << 3) | (file(b[0]) << 6) | (row(b[1]) << 9)
}

/// Write a Polyglot book holding every move of every line.
///
/// Entries are written sorted by key, as real books are.
pub fn write_book(path: &Path, lines: &[(&[&str], u16)]) {
    let mut entries: Vec<(u64, u16, u16)> = Vec::new();
    for (moves, weight) in lines {
        let mut board = Board::initial();
        for m in moves.iter() {
            let key = board.book_key();
            let raw = encode(m);
            if !entries.iter().any(|(k, r, _)| *k == key && *r == raw) {
                entries.push((key, raw, *weight));
            }
            board.push(&mv(m)).unwrap();
        }
    }
    entries.sort();

    let mut bytes = Vec::new();
    for (key, raw, weight) in entries {
        bytes.extend_from_slice(&key.to_be_bytes());
        bytes.extend_from_slice(&raw.to_be_bytes());
        bytes.extend_from_slice(&weight.to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
    }
    std::fs::write(path, bytes).unwrap();
}

pub const SAMPLE_BOOK: &[(&[&str], u16)] = &[
    (&["e2e4", "e7e5", "g1f3"], 10),
    (&["e2e4", "c7c6", "d2d4"], 5),
    (&["d2d4", "d7d5"], 8),
];

pub const SAMPLE_PGN: &str = r#"[Event "Club"]
[Date "2020.05.01"]
[White "Alpha"]
[WhiteElo "2650"]
[Black "Beta"]
[BlackElo "2100"]
[Result "1/2-1/2"]

1. e4 c5 2. Nf3 d6 3. d4 cxd4 4. Nxd4 Nf6 5. Nc3 a6 1/2-1/2

[Event "Club"]
[Date "2020.05.02"]
[White "Gamma"]
[Black "Delta"]
[Result "0-1"]

1. d4 {solid} d5 2. c4 (2. Bf4) e6 0-1
"#;
