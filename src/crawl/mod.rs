//! crawl
//!
//! Depth-first walks over the position graph.
//!
//! # Architecture
//!
//! Every crawl starts at the initial position and owns a [`Cursor`]: the
//! current board plus an optional forced prefix of moves. While the cursor
//! is inside the prefix only the prefix move is followed; past it, every
//! edge is. Children are entered with [`Cursor::push`] and left with
//! [`Cursor::pop`].
//!
//! - [`populate`] - seed theory edges from an opening book
//! - [`evaluate`] - fill missing edge scores through the engine
//! - [`troubleshoot`] - find (and optionally repair) unscored destinations
//!
//! # Cycles
//!
//! Transpositions can revisit a position. Evaluate and troubleshoot process
//! each position at most once per run past the prefix; populate is bounded
//! by its depth limit.
//!
//! # Example
//!
//! ```
//! use openbook::analysis::mock::MockLauncher;
//! use openbook::analysis::{AnalysisGateway, Score};
//! use openbook::book::MemoryBook;
//! use openbook::core::types::MoveCode;
//! use openbook::crawl::{evaluate, populate, EvaluateOptions};
//! use openbook::rules::Board;
//! use openbook::store::MemoryStore;
//!
//! let e4 = MoveCode::new("e2e4").unwrap();
//! let mut book = MemoryBook::new();
//! book.add_line(&[e4.clone()], 1).unwrap();
//!
//! let mut store = MemoryStore::new();
//! populate(&mut store, &book, &[], 25).unwrap();
//!
//! let launcher = MockLauncher::new();
//! launcher.set_score(&Board::initial().position_id().unwrap(), e4, Score::Cp(30));
//! let mut gateway = AnalysisGateway::new(Box::new(launcher), 100_000);
//!
//! let stats = evaluate(&mut store, &mut gateway, &[], &EvaluateOptions::default()).unwrap();
//! assert_eq!(stats.scored, 1);
//! ```

mod evaluate;
mod populate;
mod troubleshoot;

pub use evaluate::{evaluate, EvaluateOptions, EvaluateStats};
pub use populate::{populate, PopulateStats};
pub use troubleshoot::{troubleshoot, TroubleshootReport};

use thiserror::Error;

use crate::analysis::EngineError;
use crate::book::BookError;
use crate::core::types::{MoveCode, PositionId};
use crate::rules::{Board, RulesError};
use crate::scoring::ScoreError;
use crate::store::StoreError;

/// Errors that abort a crawl.
///
/// Engine unavailability is not among them; affected edges are deferred.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error(transparent)]
    Book(#[from] BookError),

    /// The engine could not be started at all.
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Traversal context owned by one crawl.
#[derive(Debug, Clone)]
pub struct Cursor {
    board: Board,
    forced: Vec<MoveCode>,
}

impl Cursor {
    /// Start at the initial position with a forced prefix.
    ///
    /// # Errors
    ///
    /// Fails if the prefix is not a legal line from the initial position.
    pub fn new(forced: &[MoveCode]) -> Result<Self, RulesError> {
        Board::from_line(forced)?;
        Ok(Self {
            board: Board::initial(),
            forced: forced.to_vec(),
        })
    }

    /// The current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Plies from the initial position.
    pub fn depth(&self) -> usize {
        self.board.ply()
    }

    /// Whether the cursor is still inside the forced prefix.
    pub fn in_prefix(&self) -> bool {
        self.depth() < self.forced.len()
    }

    /// Check whether a move may be followed from here.
    pub fn admits(&self, uci: &MoveCode) -> bool {
        match self.forced.get(self.depth()) {
            Some(forced) => forced == uci,
            None => true,
        }
    }

    pub fn position_id(&self) -> Result<PositionId, RulesError> {
        self.board.position_id()
    }

    /// Enter a child position.
    pub fn push(&mut self, uci: &MoveCode) -> Result<(), RulesError> {
        self.board.push(uci)
    }

    /// Return to the parent position.
    pub fn pop(&mut self) {
        self.board.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(s: &str) -> MoveCode {
        MoveCode::new(s).unwrap()
    }

    #[test]
    fn prefix_restricts_moves_until_exhausted() {
        let mut cursor = Cursor::new(&[mv("e2e4"), mv("c7c6")]).unwrap();
        assert!(cursor.in_prefix());
        assert!(cursor.admits(&mv("e2e4")));
        assert!(!cursor.admits(&mv("d2d4")));

        cursor.push(&mv("e2e4")).unwrap();
        assert!(cursor.admits(&mv("c7c6")));
        assert!(!cursor.admits(&mv("e7e5")));

        cursor.push(&mv("c7c6")).unwrap();
        assert!(!cursor.in_prefix());
        assert!(cursor.admits(&mv("d2d4")));
        assert_eq!(cursor.depth(), 2);

        cursor.pop();
        cursor.pop();
        assert_eq!(cursor.depth(), 0);
    }

    #[test]
    fn illegal_prefix_is_rejected() {
        assert!(Cursor::new(&[mv("e2e4"), mv("e2e4")]).is_err());
    }

    #[test]
    fn empty_prefix_admits_everything() {
        let cursor = Cursor::new(&[]).unwrap();
        assert!(!cursor.in_prefix());
        assert!(cursor.admits(&mv("a2a3")));
    }
}
