//! core::graph
//!
//! Position graph nodes and edges, plus the pure merge and patch rules the
//! stores apply.
//!
//! # Architecture
//!
//! The graph is a directed graph where:
//! - Nodes are positions, keyed by [`PositionId`]
//! - Edges are moves, stored on the source node with the destination id
//! - Each node splits its edges into `theory` (book) and `moves` (casual)
//!
//! Keeping the rules here (rather than in each store backend) means every
//! backend merges identically.
//!
//! # Invariants
//!
//! - Across `theory` and `moves` combined, `uci` values are unique
//! - A casual edge may be promoted to theory; theory is never demoted
//! - If an edge's `score_diff`, the node's score and the destination's score
//!   are all defined, `destination.score == -(node.score + score_diff)`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{Centipawns, MoveCode, PositionId};

/// A move from one position to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Coordinate move.
    pub uci: MoveCode,
    /// Position reached by playing the move.
    pub destination: PositionId,
    /// Human-readable move text (SAN), derived once when the edge is built.
    pub label: String,
    /// Score change for the moving side, once evaluated.
    #[serde(default)]
    pub score_diff: Option<Centipawns>,
}

impl Edge {
    /// Create an unscored edge.
    pub fn new(uci: MoveCode, destination: PositionId, label: impl Into<String>) -> Self {
        Self {
            uci,
            destination,
            label: label.into(),
            score_diff: None,
        }
    }

    /// Builder-style score assignment.
    pub fn with_score_diff(mut self, diff: Centipawns) -> Self {
        self.score_diff = Some(diff);
        self
    }

    /// Score the destination must carry for this edge to be consistent.
    ///
    /// Returns `None` unless both the source score and the diff are known.
    pub fn implied_destination_score(&self, source_score: Option<Centipawns>) -> Option<Centipawns> {
        match (source_score, self.score_diff) {
            (Some(score), Some(diff)) => Some(-(score + diff)),
            _ => None,
        }
    }
}

/// How an edge is classified on its source node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Book-sanctioned continuation.
    Theory,
    /// Any other explored continuation.
    Casual,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeKind::Theory => write!(f, "theory"),
            EdgeKind::Casual => write!(f, "casual"),
        }
    }
}

/// A position in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Position identity.
    pub id: PositionId,
    /// Centipawns from the perspective of the side to move.
    #[serde(default)]
    pub score: Option<Centipawns>,
    /// Book continuations.
    #[serde(default)]
    pub theory: Vec<Edge>,
    /// All other explored continuations.
    #[serde(default)]
    pub moves: Vec<Edge>,
    /// Provenance links to imported games.
    #[serde(default)]
    pub games: Vec<String>,
}

impl Node {
    /// Create an empty, unscored node.
    pub fn new(id: PositionId) -> Self {
        Self {
            id,
            score: None,
            theory: Vec::new(),
            moves: Vec::new(),
            games: Vec::new(),
        }
    }

    /// Iterate over all edges, theory first.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.theory.iter().chain(self.moves.iter())
    }

    /// Iterate over all edges with their classification.
    pub fn classified_edges(&self) -> impl Iterator<Item = (EdgeKind, &Edge)> {
        self.theory
            .iter()
            .map(|e| (EdgeKind::Theory, e))
            .chain(self.moves.iter().map(|e| (EdgeKind::Casual, e)))
    }

    /// Find an edge by move code in either list.
    pub fn edge(&self, uci: &MoveCode) -> Option<&Edge> {
        self.edges().find(|e| &e.uci == uci)
    }

    /// Check whether a move is already known on this node.
    pub fn has_edge(&self, uci: &MoveCode) -> bool {
        self.edge(uci).is_some()
    }

    /// Number of edges across both lists.
    pub fn edge_count(&self) -> usize {
        self.theory.len() + self.moves.len()
    }

    /// Merge candidate edges into this node.
    ///
    /// - theory candidate already in `theory`: dropped
    /// - theory candidate in `moves`: the existing entry moves to `theory`
    ///   unchanged (its `score_diff` survives, the candidate is discarded)
    /// - unseen theory candidate: appended to `theory`
    /// - casual candidate in either list: dropped, otherwise appended
    ///
    /// `game` is appended to `games` when given.
    pub fn merge(&mut self, theory: Vec<Edge>, casual: Vec<Edge>, game: Option<String>) {
        for candidate in theory {
            if self.theory.iter().any(|e| e.uci == candidate.uci) {
                continue;
            }
            if let Some(pos) = self.moves.iter().position(|e| e.uci == candidate.uci) {
                let existing = self.moves.remove(pos);
                self.theory.push(existing);
            } else {
                self.theory.push(candidate);
            }
        }

        for candidate in casual {
            if self.has_edge(&candidate.uci) {
                continue;
            }
            self.moves.push(candidate);
        }

        if let Some(game) = game {
            self.games.push(game);
        }
    }

    /// Remove at most one edge, checking `theory` before `moves`.
    ///
    /// Returns whether an edge was removed.
    pub fn unlink(&mut self, uci: &MoveCode) -> bool {
        if let Some(pos) = self.theory.iter().position(|e| &e.uci == uci) {
            self.theory.remove(pos);
            return true;
        }
        if let Some(pos) = self.moves.iter().position(|e| &e.uci == uci) {
            self.moves.remove(pos);
            return true;
        }
        false
    }

    /// Apply a patch in place.
    ///
    /// Diffs for moves not on the node are ignored; appended edges whose
    /// move is already known are skipped to keep `uci` values unique.
    pub fn apply_patch(&mut self, patch: &NodePatch) {
        for edge in self.theory.iter_mut().chain(self.moves.iter_mut()) {
            if let Some(diff) = patch.score_diffs.get(&edge.uci) {
                edge.score_diff = Some(*diff);
            }
        }
        for edge in &patch.append_moves {
            if !self.has_edge(&edge.uci) {
                self.moves.push(edge.clone());
            }
        }
    }

    /// Check the uniqueness invariant.
    pub fn has_unique_edges(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.edges().all(|e| seen.insert(&e.uci))
    }
}

/// An atomic update to one node.
///
/// Overwrites `score_diff` on existing edges and appends new casual edges.
/// Stores apply a patch as a single write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePatch {
    /// New `score_diff` per existing move.
    pub score_diffs: BTreeMap<MoveCode, Centipawns>,
    /// Edges to append to `moves`.
    pub append_moves: Vec<Edge>,
}

impl NodePatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.score_diffs.is_empty() && self.append_moves.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(board: &str) -> PositionId {
        PositionId::new(format!("{} w - -", board)).unwrap()
    }

    fn edge(uci: &str) -> Edge {
        Edge::new(
            MoveCode::new(uci).unwrap(),
            id("8/8/8/8/8/8/8/8"),
            uci.to_string(),
        )
    }

    fn node() -> Node {
        Node::new(id("8/8/8/8/8/8/8/K6k"))
    }

    #[test]
    fn merge_appends_unseen_edges() {
        let mut n = node();
        n.merge(vec![edge("e2e4")], vec![edge("d2d4")], None);
        assert_eq!(n.theory.len(), 1);
        assert_eq!(n.moves.len(), 1);
    }

    #[test]
    fn merge_promotes_casual_keeping_diff() {
        let mut n = node();
        n.moves.push(edge("e2e4").with_score_diff(-12));

        let mut candidate = edge("e2e4");
        candidate.label = "replacement".into();
        n.merge(vec![candidate], vec![], None);

        assert!(n.moves.is_empty());
        assert_eq!(n.theory.len(), 1);
        assert_eq!(n.theory[0].score_diff, Some(-12));
        assert_eq!(n.theory[0].label, "e2e4");
    }

    #[test]
    fn merge_never_demotes_theory() {
        let mut n = node();
        n.theory.push(edge("e2e4"));
        n.merge(vec![], vec![edge("e2e4")], None);
        assert_eq!(n.theory.len(), 1);
        assert!(n.moves.is_empty());
    }

    #[test]
    fn merge_deduplicates_candidates_in_one_call() {
        let mut n = node();
        n.merge(vec![edge("e2e4"), edge("e2e4")], vec![edge("e2e4")], None);
        assert_eq!(n.edge_count(), 1);
        assert!(n.has_unique_edges());
    }

    #[test]
    fn merge_appends_game_reference() {
        let mut n = node();
        n.merge(vec![], vec![], Some("g1".into()));
        n.merge(vec![], vec![], None);
        assert_eq!(n.games, vec!["g1".to_string()]);
    }

    #[test]
    fn unlink_prefers_theory_and_removes_one() {
        let mut n = node();
        n.theory.push(edge("e2e4"));
        n.moves.push(edge("d2d4"));

        assert!(n.unlink(&MoveCode::new("e2e4").unwrap()));
        assert!(n.theory.is_empty());
        assert_eq!(n.moves.len(), 1);

        assert!(!n.unlink(&MoveCode::new("c2c4").unwrap()));
        assert_eq!(n.moves.len(), 1);
    }

    #[test]
    fn patch_sets_diffs_and_appends() {
        let mut n = node();
        n.theory.push(edge("e2e4"));

        let mut patch = NodePatch::new();
        patch
            .score_diffs
            .insert(MoveCode::new("e2e4").unwrap(), 15);
        patch.append_moves.push(edge("g1f3").with_score_diff(-5));
        patch.append_moves.push(edge("e2e4"));
        n.apply_patch(&patch);

        assert_eq!(n.theory[0].score_diff, Some(15));
        assert_eq!(n.moves.len(), 1);
        assert_eq!(n.moves[0].uci.as_str(), "g1f3");
        assert!(n.has_unique_edges());
    }

    #[test]
    fn implied_destination_score_flips_sign() {
        let e = edge("e2e4").with_score_diff(30);
        assert_eq!(e.implied_destination_score(Some(0)), Some(-30));
        assert_eq!(e.implied_destination_score(Some(20)), Some(-50));
        assert_eq!(e.implied_destination_score(None), None);
        assert_eq!(edge("e2e4").implied_destination_score(Some(0)), None);
    }
}
