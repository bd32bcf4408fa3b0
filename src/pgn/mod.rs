//! pgn
//!
//! Minimal PGN reader plus the game import operation.
//!
//! # Architecture
//!
//! [`parse_games`] splits a PGN document into [`PgnGame`] values holding the
//! tag pairs and the mainline SAN moves. Comments (`{...}` and `;`),
//! variations, NAGs, move numbers and result tokens are dropped. Moves are
//! not validated here; [`import_games`] replays them through the rules
//! adapter.
//!
//! # Example
//!
//! ```
//! use openbook::pgn::parse_games;
//!
//! let text = r#"[White "Tal"]
//! [Black "Botvinnik"]
//!
//! 1. e4 {best by test} e5 (1... c5) 2. Nf3 $1 Nc6 1-0
//! "#;
//! let games = parse_games(text).unwrap();
//! assert_eq!(games.len(), 1);
//! assert_eq!(games[0].header("White"), Some("Tal"));
//! assert_eq!(games[0].moves, vec!["e4", "e5", "Nf3", "Nc6"]);
//! ```

mod import;

pub use import::{import_file, import_games, ImportOptions, ImportStats};

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreError;

/// Errors from reading or importing PGN.
#[derive(Debug, Error)]
pub enum PgnError {
    #[error("failed to read PGN file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed tag pair on line {line}: {text}")]
    BadHeader { line: usize, text: String },

    #[error("unterminated comment in game {game}")]
    UnterminatedComment { game: usize },

    #[error("unbalanced variation on line {line}")]
    UnbalancedVariation { line: usize },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One game: tag pairs and mainline moves in SAN.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnGame {
    pub headers: BTreeMap<String, String>,
    pub moves: Vec<String>,
}

impl PgnGame {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.moves.is_empty()
    }
}

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Parse every game in a PGN document.
pub fn parse_games(text: &str) -> Result<Vec<PgnGame>, PgnError> {
    let mut parser = Parser::default();
    for (index, line) in text.lines().enumerate() {
        parser.line(index + 1, line)?;
    }
    parser.finish()
}

#[derive(Default)]
struct Parser {
    games: Vec<PgnGame>,
    current: PgnGame,
    in_comment: bool,
    variation_depth: usize,
    token: String,
    line: usize,
}

impl Parser {
    fn line(&mut self, number: usize, line: &str) -> Result<(), PgnError> {
        self.line = number;
        let trimmed = line.trim();
        if !self.in_comment && self.variation_depth == 0 {
            if trimmed.starts_with('[') {
                // A tag pair after movetext opens the next game.
                if !self.current.moves.is_empty() {
                    self.finish_game();
                }
                let (name, value) = parse_header(trimmed).ok_or_else(|| PgnError::BadHeader {
                    line: number,
                    text: trimmed.to_string(),
                })?;
                self.current.headers.insert(name, value);
                return Ok(());
            }
            if trimmed.starts_with('%') {
                return Ok(());
            }
        }

        for c in line.chars() {
            if self.in_comment {
                if c == '}' {
                    self.in_comment = false;
                }
                continue;
            }
            match c {
                '{' => {
                    self.flush_token();
                    self.in_comment = true;
                }
                ';' => {
                    self.flush_token();
                    break;
                }
                '(' => {
                    self.flush_token();
                    self.variation_depth += 1;
                }
                ')' => {
                    if self.variation_depth == 0 {
                        return Err(PgnError::UnbalancedVariation { line: number });
                    }
                    self.variation_depth -= 1;
                }
                _ if self.variation_depth > 0 => {}
                c if c.is_whitespace() => self.flush_token(),
                c => self.token.push(c),
            }
        }
        self.flush_token();
        Ok(())
    }

    fn flush_token(&mut self) {
        if self.token.is_empty() {
            return;
        }
        let token = std::mem::take(&mut self.token);

        if RESULTS.contains(&token.as_str()) {
            self.finish_game();
            return;
        }
        if token.starts_with('$') {
            return;
        }
        // "12." "12..." and "12.e4"
        let san = token.trim_start_matches(|c: char| c.is_ascii_digit());
        let san = if san.len() < token.len() && san.starts_with('.') {
            san.trim_start_matches('.')
        } else {
            token.as_str()
        };
        if !san.is_empty() {
            self.current.moves.push(san.to_string());
        }
    }

    fn finish_game(&mut self) {
        let game = std::mem::take(&mut self.current);
        if !game.is_empty() {
            self.games.push(game);
        }
    }

    fn finish(mut self) -> Result<Vec<PgnGame>, PgnError> {
        if self.in_comment {
            return Err(PgnError::UnterminatedComment {
                game: self.games.len() + 1,
            });
        }
        if self.variation_depth > 0 {
            return Err(PgnError::UnbalancedVariation { line: self.line });
        }
        self.flush_token();
        self.finish_game();
        Ok(self.games)
    }
}

/// `[Name "Value"]` to `(Name, Value)`.
fn parse_header(text: &str) -> Option<(String, String)> {
    let inner = text.strip_prefix('[')?.strip_suffix(']')?.trim();
    let (name, rest) = inner.split_once(char::is_whitespace)?;
    let value = rest.trim().strip_prefix('"')?.strip_suffix('"')?;
    Some((name.to_string(), value.replace("\\\"", "\"").replace("\\\\", "\\")))
}
