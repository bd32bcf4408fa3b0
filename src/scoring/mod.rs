//! scoring
//!
//! Applies engine results to a node and its destinations.
//!
//! # Architecture
//!
//! [`apply_scores`] turns a [`MoveScores`] value (scores from the side to
//! move at the node) into two kinds of write:
//!
//! 1. one [`NodePatch`] on the node: `score_diff = value - node.score` for
//!    every known move, plus new casual edges for moves the node lacks;
//! 2. one score write per destination: `-value`, creating the destination
//!    if needed.
//!
//! The patch is written first. If the process dies between the two steps a
//! diff can point at an unscored destination; the troubleshoot crawl finds
//! and repairs exactly that.
//!
//! # Invariants
//!
//! After a successful call, for every scored move,
//! `destination.score == -(node.score + edge.score_diff)`.

use thiserror::Error;

use crate::core::graph::{Edge, Node, NodePatch};
use crate::core::types::{Centipawns, MoveCode, PositionId};
use crate::rules::{Board, RulesError};
use crate::store::{NodeInsert, PositionStore, StoreError};

/// Errors from applying scores.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The node has no score, so no diff can be computed.
    #[error("cannot apply scores to unscored position {0}")]
    Precondition(PositionId),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Engine scores per move, in the order the engine reported them.
///
/// Re-inserting a move replaces its score in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveScores(Vec<(MoveCode, Centipawns)>);

impl MoveScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a score, keeping the original position of a repeated move.
    pub fn insert(&mut self, uci: MoveCode, score: Centipawns) {
        match self.0.iter_mut().find(|(m, _)| m == &uci) {
            Some(entry) => entry.1 = score,
            None => self.0.push((uci, score)),
        }
    }

    pub fn get(&self, uci: &MoveCode) -> Option<Centipawns> {
        self.0.iter().find(|(m, _)| m == uci).map(|(_, s)| *s)
    }

    pub fn contains(&self, uci: &MoveCode) -> bool {
        self.get(uci).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MoveCode, Centipawns)> {
        self.0.iter().map(|(m, s)| (m, *s))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge another result set; its scores win.
    pub fn extend(&mut self, other: MoveScores) {
        for (uci, score) in other.0 {
            self.insert(uci, score);
        }
    }
}

impl FromIterator<(MoveCode, Centipawns)> for MoveScores {
    fn from_iter<I: IntoIterator<Item = (MoveCode, Centipawns)>>(iter: I) -> Self {
        let mut scores = MoveScores::new();
        for (uci, score) in iter {
            scores.insert(uci, score);
        }
        scores
    }
}

/// What [`apply_scores`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreSummary {
    /// Existing edges that received a diff.
    pub updated: usize,
    /// New casual edges appended.
    pub appended: usize,
    /// Destinations that did not exist before.
    pub created: usize,
}

/// Apply engine scores to a node's edges and their destinations.
///
/// `node` must be the current stored state of the node and must carry a
/// score.
///
/// # Errors
///
/// - [`ScoreError::Precondition`] if `node.score` is undefined; nothing is
///   written
/// - [`ScoreError::Rules`] if a new move is illegal here; nothing is written
/// - [`ScoreError::Store`] if a write fails
pub fn apply_scores<S>(
    store: &mut S,
    node: &Node,
    values: &MoveScores,
) -> Result<ScoreSummary, ScoreError>
where
    S: PositionStore + ?Sized,
{
    let Some(base) = node.score else {
        tracing::error!(position = %node.id, "refusing to apply scores to an unscored node");
        return Err(ScoreError::Precondition(node.id.clone()));
    };

    let mut summary = ScoreSummary::default();
    let mut patch = NodePatch::new();
    let mut destinations: Vec<(PositionId, Centipawns)> = Vec::new();

    for edge in node.edges() {
        if let Some(value) = values.get(&edge.uci) {
            patch.score_diffs.insert(edge.uci.clone(), value - base);
            destinations.push((edge.destination.clone(), -value));
            summary.updated += 1;
        }
    }

    let unknown: Vec<(&MoveCode, Centipawns)> =
        values.iter().filter(|(uci, _)| !node.has_edge(uci)).collect();
    if !unknown.is_empty() {
        let board = Board::from_position_id(&node.id)?;
        for (uci, value) in unknown {
            let destination = board.destination(uci)?;
            let edge = Edge::new(uci.clone(), destination.clone(), board.label(uci)?)
                .with_score_diff(value - base);
            patch.append_moves.push(edge);
            destinations.push((destination, -value));
            summary.appended += 1;
        }
    }

    store.apply_patch(&node.id, &patch)?;

    for (destination, score) in destinations {
        if !store.set_score(&destination, Some(score))? {
            store.insert(&destination, NodeInsert::new().with_score(score))?;
            summary.created += 1;
        }
    }

    tracing::debug!(
        position = %node.id,
        updated = summary.updated,
        appended = summary.appended,
        created = summary.created,
        "applied scores"
    );
    Ok(summary)
}
