//! analysis::uci
//!
//! UCI engine child process.
//!
//! # Protocol
//!
//! ```text
//! > uci                 < ... uciok
//! > setoption ...       (Threads, Hash, MultiPV)
//! > isready             < readyok
//! > position fen <fen>
//! > go movetime <ms> [searchmoves <m>...]
//! < info ... multipv <k> score cp <x>|mate <n> ... pv <m> ...
//! < bestmove <m>
//! ```
//!
//! Stdout is drained by a reader thread into a channel so every wait has a
//! deadline. A silent engine becomes [`EngineError::Unavailable`] instead of
//! blocking the crawl forever.

use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use super::{
    AnalysisEngine, AnalysisLine, AnalysisRequest, EngineError, EngineLauncher, EngineSettings,
    Score,
};
use crate::core::types::MoveCode;

/// A running UCI engine.
pub struct UciEngine {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    grace: Duration,
}

impl std::fmt::Debug for UciEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UciEngine")
            .field("pid", &self.child.id())
            .finish()
    }
}

impl UciEngine {
    /// Start the engine and complete the UCI handshake.
    pub fn launch(settings: &EngineSettings) -> Result<Self, EngineError> {
        let mut child = Command::new(&settings.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Launch {
                path: settings.path.clone(),
                source: e,
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(EngineError::Unavailable(
                "engine pipes were not captured".to_string(),
            ));
        };

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut engine = Self {
            child,
            stdin,
            lines: rx,
            grace: settings.response_grace,
        };

        engine.send("uci")?;
        engine.wait_for(Instant::now() + engine.grace, |line| line == "uciok")?;
        if let Some(threads) = settings.threads {
            engine.send(&format!("setoption name Threads value {}", threads))?;
        }
        if let Some(hash) = settings.hash_mb {
            engine.send(&format!("setoption name Hash value {}", hash))?;
        }
        engine.ping()?;

        tracing::info!(path = %settings.path.display(), pid = engine.child.id(), "engine started");
        Ok(engine)
    }

    fn send(&mut self, command: &str) -> Result<(), EngineError> {
        tracing::trace!(command, "engine <");
        writeln!(self.stdin, "{}", command)
            .and_then(|_| self.stdin.flush())
            .map_err(|e| EngineError::Unavailable(format!("write failed: {}", e)))
    }

    /// Read lines until `done` matches one, returning every line read
    /// before it.
    fn wait_for(
        &mut self,
        deadline: Instant,
        mut done: impl FnMut(&str) -> bool,
    ) -> Result<Vec<String>, EngineError> {
        let mut seen = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.lines.recv_timeout(remaining) {
                Ok(line) => {
                    tracing::trace!(line = %line, "engine >");
                    if done(&line) {
                        seen.push(line);
                        return Ok(seen);
                    }
                    seen.push(line);
                }
                Err(RecvTimeoutError::Timeout) => {
                    return Err(EngineError::Unavailable(
                        "engine did not answer in time".to_string(),
                    ))
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::Unavailable("engine exited".to_string()))
                }
            }
        }
    }
}

impl AnalysisEngine for UciEngine {
    fn analyse(&mut self, request: &AnalysisRequest) -> Result<Vec<AnalysisLine>, EngineError> {
        self.send(&format!("setoption name MultiPV value {}", request.multipv.max(1)))?;
        self.send(&format!("position fen {}", request.fen))?;

        let mut go = format!("go movetime {}", request.movetime.as_millis());
        if !request.searchmoves.is_empty() {
            go.push_str(" searchmoves");
            for uci in &request.searchmoves {
                go.push(' ');
                go.push_str(uci.as_str());
            }
        }
        self.send(&go)?;

        let deadline = Instant::now() + request.movetime + self.grace;
        let output = self.wait_for(deadline, |line| line.starts_with("bestmove"))?;

        // Later info lines refine earlier ones; keep the last per rank.
        let mut by_rank: BTreeMap<usize, AnalysisLine> = BTreeMap::new();
        for line in &output {
            if let Some(parsed) = parse_info(line) {
                by_rank.insert(parsed.multipv, parsed);
            }
        }
        Ok(by_rank.into_values().collect())
    }

    fn ping(&mut self) -> Result<(), EngineError> {
        self.send("isready")?;
        self.wait_for(Instant::now() + self.grace, |line| line == "readyok")?;
        Ok(())
    }

    fn quit(&mut self) {
        let _ = self.send("quit");
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        self.quit();
    }
}

/// Launches [`UciEngine`]s from fixed settings.
#[derive(Debug, Clone)]
pub struct UciLauncher {
    settings: EngineSettings,
}

impl UciLauncher {
    pub fn new(settings: EngineSettings) -> Self {
        Self { settings }
    }
}

impl EngineLauncher for UciLauncher {
    fn launch(&self) -> Result<Box<dyn AnalysisEngine>, EngineError> {
        Ok(Box::new(UciEngine::launch(&self.settings)?))
    }
}

/// Parse one `info` line carrying a score and a principal variation.
///
/// Lines without `pv`, bound scores and `info string` output yield `None`.
pub fn parse_info(line: &str) -> Option<AnalysisLine> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some("info") {
        return None;
    }

    let mut multipv = 1;
    let mut score = None;
    let mut first_move = None;

    while let Some(token) = tokens.next() {
        match token {
            "string" => return None,
            "lowerbound" | "upperbound" => return None,
            "multipv" => multipv = tokens.next()?.parse().ok()?,
            "score" => {
                score = match (tokens.next()?, tokens.next()?.parse::<i32>().ok()?) {
                    ("cp", cp) => Some(Score::Cp(cp)),
                    ("mate", n) => Some(Score::Mate(n)),
                    _ => return None,
                };
            }
            "pv" => {
                first_move = tokens.next().and_then(|m| MoveCode::new(m).ok());
                break;
            }
            _ => {}
        }
    }

    Some(AnalysisLine {
        multipv,
        score: score?,
        first_move: first_move?,
    })
}
