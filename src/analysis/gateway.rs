//! analysis::gateway
//!
//! Supervised access to the engine with mode-specific time budgets.
//!
//! # Budgets
//!
//! | Mode | Calls |
//! |------|-------|
//! | [`AnalysisMode::Candidates`] (n moves) | `clamp(n, 2, 5)` s, multi-PV n, restricted to the moves |
//! | [`AnalysisMode::Extend`] | 0.3 s scout with multi-PV `known + 3`, then 3 s over the new moves only |
//! | [`AnalysisMode::Standard`] | 2 s, multi-PV 3 |
//!
//! # Supervision
//!
//! The engine starts on first use. A call that finds it unavailable drops
//! the process; the next call launches a fresh one.
//! [`AnalysisGateway::evaluate_with_retry`] restarts immediately and retries
//! once.

use std::time::Duration;

use super::{
    AnalysisEngine, AnalysisLine, AnalysisRequest, EngineError, EngineLauncher, EngineSettings,
    UciLauncher,
};
use crate::core::config::Config;
use crate::core::types::{Centipawns, MoveCode};
use crate::rules::Board;
use crate::scoring::MoveScores;

const SCOUT_TIME: Duration = Duration::from_millis(300);
const EXTEND_TIME: Duration = Duration::from_secs(3);
const STANDARD_TIME: Duration = Duration::from_secs(2);
const STANDARD_MULTIPV: usize = 3;
const SCOUT_EXTRA_LINES: usize = 3;
const CANDIDATE_MIN_SECS: u64 = 2;
const CANDIDATE_MAX_SECS: u64 = 5;

/// What to analyse in a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisMode {
    /// Score exactly these moves.
    Candidates(Vec<MoveCode>),
    /// Look for good moves not in `known` and score only those.
    Extend { known: Vec<MoveCode> },
    /// Score the engine's top three moves.
    Standard,
}

impl AnalysisMode {
    /// Pick a mode from optional candidates and the extend flag.
    ///
    /// Non-empty candidates win over `extend`.
    pub fn select(candidates: Option<Vec<MoveCode>>, extend: bool, known: Vec<MoveCode>) -> Self {
        match candidates {
            Some(moves) if !moves.is_empty() => AnalysisMode::Candidates(moves),
            _ if extend => AnalysisMode::Extend { known },
            _ => AnalysisMode::Standard,
        }
    }
}

/// Gateway to the evaluation engine.
pub struct AnalysisGateway {
    launcher: Box<dyn EngineLauncher>,
    engine: Option<Box<dyn AnalysisEngine>>,
    mate_score: Centipawns,
    restarts: usize,
    /// Set by the first successful launch.
    launched: bool,
}

impl std::fmt::Debug for AnalysisGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisGateway")
            .field("running", &self.engine.is_some())
            .field("mate_score", &self.mate_score)
            .field("restarts", &self.restarts)
            .finish()
    }
}

impl AnalysisGateway {
    /// Create a gateway. No engine is started yet.
    pub fn new(launcher: Box<dyn EngineLauncher>, mate_score: Centipawns) -> Self {
        Self {
            launcher,
            engine: None,
            mate_score,
            restarts: 0,
            launched: false,
        }
    }

    /// Gateway over the configured UCI engine.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Box::new(UciLauncher::new(EngineSettings::from_config(config))),
            config.mate_score(),
        )
    }

    /// Whether an engine process is currently held.
    pub fn is_running(&self) -> bool {
        self.engine.is_some()
    }

    /// Number of explicit restarts so far.
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    /// Start the engine if needed and confirm it responds.
    ///
    /// An unresponsive engine is dropped, so the next call relaunches.
    pub fn health_check(&mut self) -> Result<(), EngineError> {
        let result = self.engine()?.ping();
        if result.is_err() {
            self.discard();
        }
        result
    }

    /// Replace the engine with a fresh process.
    pub fn restart(&mut self) -> Result<(), EngineError> {
        self.discard();
        self.engine = Some(self.launch()?);
        self.restarts += 1;
        tracing::info!(restarts = self.restarts, "engine restarted");
        Ok(())
    }

    /// Stop the engine, if running.
    pub fn shutdown(&mut self) {
        self.discard();
    }

    /// Analyse the board's position.
    ///
    /// Scores are from the side to move, mates clamped by the mate score,
    /// in the engine's order (best first).
    pub fn evaluate(&mut self, board: &Board, mode: &AnalysisMode) -> Result<MoveScores, EngineError> {
        let fen = board.fen();
        let lines: Vec<AnalysisLine> = match mode {
            AnalysisMode::Candidates(moves) => {
                let secs = (moves.len() as u64).clamp(CANDIDATE_MIN_SECS, CANDIDATE_MAX_SECS);
                self.run(AnalysisRequest {
                    fen,
                    movetime: Duration::from_secs(secs),
                    multipv: moves.len(),
                    searchmoves: moves.clone(),
                })?
                .into_iter()
                .filter(|line| moves.contains(&line.first_move))
                .collect()
            }
            AnalysisMode::Extend { known } => {
                let scout = self.run(AnalysisRequest {
                    fen: fen.clone(),
                    movetime: SCOUT_TIME,
                    multipv: known.len() + SCOUT_EXTRA_LINES,
                    searchmoves: Vec::new(),
                })?;
                let mut fresh: Vec<MoveCode> = Vec::new();
                for line in scout {
                    if !known.contains(&line.first_move) && !fresh.contains(&line.first_move) {
                        fresh.push(line.first_move);
                    }
                }
                if fresh.is_empty() {
                    tracing::debug!("scout found no new moves");
                    return Ok(MoveScores::new());
                }
                self.run(AnalysisRequest {
                    fen,
                    movetime: EXTEND_TIME,
                    multipv: fresh.len(),
                    searchmoves: fresh,
                })?
            }
            AnalysisMode::Standard => self.run(AnalysisRequest {
                fen,
                movetime: STANDARD_TIME,
                multipv: STANDARD_MULTIPV,
                searchmoves: Vec::new(),
            })?,
        };

        Ok(lines
            .into_iter()
            .map(|line| (line.first_move, line.score.to_centipawns(self.mate_score)))
            .collect())
    }

    /// [`evaluate`](Self::evaluate), restarting the engine and retrying
    /// once if it is unavailable.
    pub fn evaluate_with_retry(
        &mut self,
        board: &Board,
        mode: &AnalysisMode,
    ) -> Result<MoveScores, EngineError> {
        match self.evaluate(board, mode) {
            Err(e) if e.is_unavailable() => {
                tracing::warn!(error = %e, "engine unavailable, restarting");
                self.restart()?;
                self.evaluate(board, mode)
            }
            other => other,
        }
    }

    fn engine(&mut self) -> Result<&mut (dyn AnalysisEngine + 'static), EngineError> {
        if self.engine.is_none() {
            self.engine = Some(self.launch()?);
        }
        self.engine
            .as_deref_mut()
            .ok_or_else(|| EngineError::Unavailable("engine not running".to_string()))
    }

    /// Start a process.
    ///
    /// Only a failure before any engine ever ran is reported as
    /// [`EngineError::Launch`]; later failures are `Unavailable` so callers
    /// treat them like a crash.
    fn launch(&mut self) -> Result<Box<dyn AnalysisEngine>, EngineError> {
        match self.launcher.launch() {
            Ok(engine) => {
                self.launched = true;
                Ok(engine)
            }
            Err(e) if self.launched => {
                tracing::warn!(error = %e, "engine relaunch failed");
                Err(EngineError::Unavailable(format!("relaunch failed: {}", e)))
            }
            Err(e) => Err(e),
        }
    }

    fn run(&mut self, request: AnalysisRequest) -> Result<Vec<AnalysisLine>, EngineError> {
        tracing::debug!(
            multipv = request.multipv,
            movetime_ms = request.movetime.as_millis() as u64,
            searchmoves = request.searchmoves.len(),
            "analysing"
        );
        let result = self.engine()?.analyse(&request);
        if let Err(e) = &result {
            if e.is_unavailable() {
                self.discard();
            }
        }
        result
    }

    fn discard(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.quit();
        }
    }
}

impl Drop for AnalysisGateway {
    fn drop(&mut self) {
        self.discard();
    }
}
