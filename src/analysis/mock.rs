//! analysis::mock
//!
//! Scripted engine for deterministic testing.
//!
//! # Design
//!
//! A [`MockLauncher`] holds a table of scores per position shared with
//! every engine it launches. Analysis answers from the table: lines are
//! sorted best first, restricted to `searchmoves` when given, and cut to
//! `multipv`. Failures can be queued to exercise restart paths, and every
//! request is recorded.
//!
//! # Example
//!
//! ```
//! use openbook::analysis::mock::MockLauncher;
//! use openbook::analysis::{AnalysisGateway, AnalysisMode, Score};
//! use openbook::core::types::MoveCode;
//! use openbook::rules::Board;
//!
//! let board = Board::initial();
//! let launcher = MockLauncher::new();
//! launcher.set_score(&board.position_id().unwrap(), MoveCode::new("e2e4").unwrap(), Score::Cp(30));
//!
//! let mut gateway = AnalysisGateway::new(Box::new(launcher.clone()), 100_000);
//! let scores = gateway.evaluate(&board, &AnalysisMode::Standard).unwrap();
//! assert_eq!(scores.get(&MoveCode::new("e2e4").unwrap()), Some(30));
//! ```

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{AnalysisEngine, AnalysisLine, AnalysisRequest, EngineError, EngineLauncher, Score};
use crate::core::types::{MoveCode, PositionId};

/// Shared state behind a launcher and its engines.
#[derive(Debug, Default)]
struct MockState {
    scores: HashMap<PositionId, Vec<(MoveCode, Score)>>,
    /// Analysis calls still to fail with `Unavailable`.
    pending_failures: usize,
    /// Launches still to fail.
    pending_launch_failures: usize,
    /// Launches still to fail once one has succeeded.
    pending_relaunch_failures: usize,
    launches: usize,
    requests: Vec<AnalysisRequest>,
}

/// Launcher for [`MockEngine`]s.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockLauncher {
    state: Arc<Mutex<MockState>>,
}

impl MockLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Set the score of a move in a position.
    pub fn set_score(&self, position: &PositionId, uci: MoveCode, score: Score) {
        let mut state = self.state();
        let entries = state.scores.entry(position.clone()).or_default();
        match entries.iter_mut().find(|(m, _)| m == &uci) {
            Some(entry) => entry.1 = score,
            None => entries.push((uci, score)),
        }
    }

    /// Fail the next `count` analysis calls as if the engine died.
    pub fn fail_next(&self, count: usize) {
        self.state().pending_failures = count;
    }

    /// Fail the next `count` launches.
    pub fn fail_launches(&self, count: usize) {
        self.state().pending_launch_failures = count;
    }

    /// Fail the next `count` launches that follow a successful one.
    pub fn fail_relaunches(&self, count: usize) {
        self.state().pending_relaunch_failures = count;
    }

    /// Number of successful launches.
    pub fn launches(&self) -> usize {
        self.state().launches
    }

    /// Every analysis request received, in order.
    pub fn requests(&self) -> Vec<AnalysisRequest> {
        self.state().requests.clone()
    }
}

impl EngineLauncher for MockLauncher {
    fn launch(&self) -> Result<Box<dyn AnalysisEngine>, EngineError> {
        let mut state = self.state();
        if state.pending_launch_failures > 0 {
            state.pending_launch_failures -= 1;
            return Err(launch_failure());
        }
        if state.launches > 0 && state.pending_relaunch_failures > 0 {
            state.pending_relaunch_failures -= 1;
            return Err(launch_failure());
        }
        state.launches += 1;
        Ok(Box::new(MockEngine {
            launcher: self.clone(),
            dead: false,
        }))
    }
}

fn launch_failure() -> EngineError {
    EngineError::Launch {
        path: PathBuf::from("mock-engine"),
        source: io::Error::new(io::ErrorKind::NotFound, "mock launch failure"),
    }
}

/// An engine answering from its launcher's table.
#[derive(Debug)]
pub struct MockEngine {
    launcher: MockLauncher,
    dead: bool,
}

fn rank(score: Score) -> i64 {
    match score {
        Score::Cp(cp) => i64::from(cp),
        Score::Mate(n) if n > 0 => i64::MAX - i64::from(n),
        Score::Mate(n) => i64::MIN - i64::from(n),
    }
}

impl AnalysisEngine for MockEngine {
    fn analyse(&mut self, request: &AnalysisRequest) -> Result<Vec<AnalysisLine>, EngineError> {
        if self.dead {
            return Err(EngineError::Unavailable("mock engine is dead".to_string()));
        }
        let mut state = self.launcher.state();
        state.requests.push(request.clone());
        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            self.dead = true;
            return Err(EngineError::Unavailable("mock engine crashed".to_string()));
        }

        let position = PositionId::from_fen(&request.fen)
            .map_err(|e| EngineError::Protocol(e.to_string()))?;
        let mut lines: Vec<(MoveCode, Score)> = state
            .scores
            .get(&position)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|(m, _)| request.searchmoves.is_empty() || request.searchmoves.contains(m))
            .collect();
        lines.sort_by_key(|(_, score)| std::cmp::Reverse(rank(*score)));
        lines.truncate(request.multipv.max(1));

        Ok(lines
            .into_iter()
            .enumerate()
            .map(|(i, (first_move, score))| AnalysisLine {
                multipv: i + 1,
                score,
                first_move,
            })
            .collect())
    }

    fn ping(&mut self) -> Result<(), EngineError> {
        if self.dead {
            return Err(EngineError::Unavailable("mock engine is dead".to_string()));
        }
        Ok(())
    }

    fn quit(&mut self) {
        self.dead = true;
    }
}
