//! analysis
//!
//! Access to the external evaluation engine.
//!
//! # Architecture
//!
//! - [`AnalysisEngine`] - one running engine; answers a single
//!   [`AnalysisRequest`] with principal-variation lines
//! - [`EngineLauncher`] - starts engines, so the gateway can replace a dead
//!   one
//! - [`UciEngine`] / [`UciLauncher`] - a UCI child process
//! - [`mock::MockLauncher`] - deterministic engine for tests
//! - [`AnalysisGateway`] - budgets, score normalization and supervision
//!
//! Callers outside this module only see [`AnalysisGateway`] and
//! [`crate::scoring::MoveScores`].

mod gateway;
pub mod mock;
mod uci;

pub use gateway::{AnalysisGateway, AnalysisMode};
pub use uci::{parse_info, UciEngine, UciLauncher};

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::config::Config;
use crate::core::types::{Centipawns, MoveCode};

/// Errors from the evaluation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started.
    #[error("failed to launch engine '{path}': {source}")]
    Launch {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The engine died, hung, or closed its pipes.
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// The engine answered with something unusable.
    #[error("engine protocol error: {0}")]
    Protocol(String),
}

impl EngineError {
    /// Whether a restart might fix this.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, EngineError::Unavailable(_))
    }
}

/// An engine score from the side to move's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawns.
    Cp(Centipawns),
    /// Forced mate in this many moves; negative when being mated.
    Mate(i32),
}

impl Score {
    /// Collapse to centipawns, mapping mates onto `±(mate_score - n)`.
    ///
    /// Faster mates score further from zero; being mated now is
    /// `-mate_score`.
    pub fn to_centipawns(self, mate_score: Centipawns) -> Centipawns {
        match self {
            Score::Cp(cp) => cp,
            Score::Mate(n) if n > 0 => mate_score - n,
            Score::Mate(n) => -mate_score - n,
        }
    }
}

/// One principal variation reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisLine {
    /// 1-based multi-PV rank.
    pub multipv: usize,
    pub score: Score,
    /// First move of the variation.
    pub first_move: MoveCode,
}

/// One engine search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Full FEN of the position.
    pub fen: String,
    pub movetime: Duration,
    pub multipv: usize,
    /// Restrict the search to these moves; empty searches everything.
    pub searchmoves: Vec<MoveCode>,
}

/// A running engine.
pub trait AnalysisEngine {
    /// Run one search and return the final line per multi-PV rank, best
    /// first.
    fn analyse(&mut self, request: &AnalysisRequest) -> Result<Vec<AnalysisLine>, EngineError>;

    /// Round-trip a readiness probe.
    fn ping(&mut self) -> Result<(), EngineError>;

    /// Stop the engine. Errors are ignored.
    fn quit(&mut self);
}

/// Starts engines.
pub trait EngineLauncher {
    fn launch(&self) -> Result<Box<dyn AnalysisEngine>, EngineError>;
}

/// How to start and talk to a UCI engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub path: PathBuf,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
    /// Time allowed past a search budget before the engine counts as hung.
    pub response_grace: Duration,
}

impl EngineSettings {
    /// Read engine settings from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            path: config.engine_path(),
            threads: config.engine_threads(),
            hash_mb: config.engine_hash_mb(),
            response_grace: Duration::from_millis(config.response_grace_ms()),
        }
    }
}
