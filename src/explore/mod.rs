//! explore
//!
//! Single-position operations addressed by a move line from the initial
//! position: inspect, suggest, analyse, unlink, and name.
//!
//! The crawls in [`crate::crawl`] walk the whole graph; everything here
//! touches one node (plus, for analysis, its destinations).

use thiserror::Error;

use crate::analysis::{AnalysisGateway, AnalysisMode, EngineError};
use crate::book::{popularity, BookError, OpeningBook};
use crate::core::graph::{Edge, EdgeKind, Node};
use crate::core::types::{Centipawns, MoveCode, PositionId};
use crate::rules::{Board, RulesError};
use crate::scoring::{apply_scores, MoveScores, ScoreError, ScoreSummary};
use crate::store::{FavoriteStore, NodeInsert, PositionStore, StoreError};

/// Popularity above which a book move is called good.
pub const GOOD_POPULARITY: f64 = 0.3;

#[derive(Debug, Error)]
pub enum ExploreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Book(#[from] BookError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Score(#[from] ScoreError),

    #[error("a move line is required")]
    EmptyLine,
}

/// A position reached by a line, with whatever the store knows about it.
#[derive(Debug, Clone)]
pub struct PositionView {
    pub board: Board,
    pub id: PositionId,
    pub node: Option<Node>,
    /// Name of a favorite at this position.
    pub favorite: Option<String>,
}

/// Look up the position a line reaches.
pub fn show<S>(store: &S, line: &[MoveCode]) -> Result<PositionView, ExploreError>
where
    S: PositionStore + FavoriteStore + ?Sized,
{
    let board = Board::from_line(line)?;
    let id = board.position_id()?;
    let node = store.find(&id)?;
    let favorite = store.find_favorite_by_position(&id)?.map(|f| f.name);
    Ok(PositionView {
        board,
        id,
        node,
        favorite,
    })
}

/// Book verdict on a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Good,
    Bad,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Good => write!(f, "good"),
            Verdict::Bad => write!(f, "bad"),
        }
    }
}

/// An explored continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownMove {
    pub kind: EdgeKind,
    pub edge: Edge,
}

/// A book continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct BookSuggestion {
    pub uci: MoveCode,
    pub label: String,
    /// Share of the position's total book weight.
    pub popularity: f64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    /// Stored edges, theory first.
    pub known: Vec<KnownMove>,
    /// Book moves by descending popularity. Empty without a book.
    pub book: Vec<BookSuggestion>,
}

/// Continuations for the position a line reaches.
pub fn suggest<S>(
    store: &S,
    book: Option<&dyn OpeningBook>,
    line: &[MoveCode],
) -> Result<Suggestions, ExploreError>
where
    S: PositionStore + ?Sized,
{
    let board = Board::from_line(line)?;
    let mut suggestions = Suggestions::default();

    if let Some(node) = store.find(&board.position_id()?)? {
        suggestions.known = node
            .classified_edges()
            .map(|(kind, edge)| KnownMove {
                kind,
                edge: edge.clone(),
            })
            .collect();
    }

    if let Some(book) = book {
        let candidates = book.candidates(&board)?;
        for (uci, share) in popularity(&candidates) {
            let label = board.label(&uci)?;
            let verdict = if share > GOOD_POPULARITY {
                Verdict::Good
            } else {
                Verdict::Bad
            };
            suggestions.book.push(BookSuggestion {
                uci,
                label,
                popularity: share,
                verdict,
            });
        }
        suggestions
            .book
            .sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    }

    Ok(suggestions)
}

/// How to pick the analysis mode for a position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyseRequest {
    /// Score exactly these moves.
    pub candidates: Option<Vec<MoveCode>>,
    /// Look for moves beyond the stored ones.
    pub extend: bool,
}

/// Result of analysing one position.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyseOutcome {
    pub id: PositionId,
    pub scores: MoveScores,
    /// What was written; `None` when the node has no score to build on.
    pub applied: Option<ScoreSummary>,
}

/// Analyse the position a line reaches and store the result.
///
/// The initial position is created or given `root_score` when it has no
/// score. Any other missing or unscored position is left untouched and the
/// engine output is returned unapplied.
pub fn analyse<S>(
    store: &mut S,
    gateway: &mut AnalysisGateway,
    line: &[MoveCode],
    request: &AnalyseRequest,
    root_score: Centipawns,
) -> Result<AnalyseOutcome, ExploreError>
where
    S: PositionStore + ?Sized,
{
    let board = Board::from_line(line)?;
    let id = board.position_id()?;
    let stored = store.find(&id)?;
    let mut node = match &stored {
        Some(node) => node.clone(),
        None => Node::new(id.clone()),
    };
    if line.is_empty() && node.score.is_none() {
        if stored.is_some() {
            store.set_score(&id, Some(root_score))?;
        } else {
            store.insert(&id, NodeInsert::new().with_score(root_score))?;
        }
        node.score = Some(root_score);
    }

    let known: Vec<MoveCode> = node.edges().map(|e| e.uci.clone()).collect();
    let mode = AnalysisMode::select(request.candidates.clone(), request.extend, known);
    let scores = gateway.evaluate_with_retry(&board, &mode)?;

    let applied = if node.score.is_some() {
        Some(apply_scores(store, &node, &scores)?)
    } else {
        tracing::warn!(position = %id, "position has no score, analysis not stored");
        None
    };
    Ok(AnalyseOutcome {
        id,
        scores,
        applied,
    })
}

/// Remove the last move of a line from the position before it.
///
/// Returns whether an edge was removed.
pub fn unlink<S>(store: &mut S, line: &[MoveCode]) -> Result<bool, ExploreError>
where
    S: PositionStore + ?Sized,
{
    let Some((last, before)) = line.split_last() else {
        return Err(ExploreError::EmptyLine);
    };
    let board = Board::from_line(before)?;
    if !board.is_legal(last) {
        return Err(RulesError::IllegalMove {
            uci: last.to_string(),
            position: board.fen(),
        }
        .into());
    }
    Ok(store.unlink(&board.position_id()?, last)?)
}

/// Name the position a line reaches. Returns false for an empty or taken
/// name.
pub fn add_favorite<S>(store: &mut S, name: &str, line: &[MoveCode]) -> Result<bool, ExploreError>
where
    S: FavoriteStore + ?Sized,
{
    let board = Board::from_line(line)?;
    Ok(store.add_favorite(name, board.position_id()?, line.to_vec())?)
}

/// Counts over the whole graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub scored_nodes: usize,
    pub theory_edges: usize,
    pub casual_edges: usize,
    pub scored_edges: usize,
}

impl GraphStats {
    pub fn edges(&self) -> usize {
        self.theory_edges + self.casual_edges
    }
}

pub fn graph_stats<S>(store: &S) -> Result<GraphStats, ExploreError>
where
    S: PositionStore + ?Sized,
{
    let mut stats = GraphStats::default();
    for id in store.position_ids()? {
        let Some(node) = store.find(&id)? else {
            continue;
        };
        stats.nodes += 1;
        if node.score.is_some() {
            stats.scored_nodes += 1;
        }
        stats.theory_edges += node.theory.len();
        stats.casual_edges += node.moves.len();
        stats.scored_edges += node.edges().filter(|e| e.score_diff.is_some()).count();
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mock::MockLauncher;
    use crate::analysis::Score;
    use crate::book::MemoryBook;
    use crate::store::MemoryStore;

    fn mv(s: &str) -> MoveCode {
        MoveCode::new(s).unwrap()
    }

    fn line(moves: &[&str]) -> Vec<MoveCode> {
        moves.iter().map(|m| mv(m)).collect()
    }

    fn edge(board: &Board, uci: &str) -> Edge {
        let uci = mv(uci);
        Edge::new(
            uci.clone(),
            board.destination(&uci).unwrap(),
            board.label(&uci).unwrap(),
        )
    }

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new();
        let board = Board::initial();
        store
            .insert(
                &board.position_id().unwrap(),
                NodeInsert::new()
                    .with_theory(vec![edge(&board, "e2e4").with_score_diff(30)])
                    .with_casual(vec![edge(&board, "a2a3")])
                    .with_score(0),
            )
            .unwrap();
        store
    }

    #[test]
    fn suggest_lists_theory_first_and_book_verdicts() {
        let store = seeded();
        let mut book = MemoryBook::new();
        book.add_line(&line(&["e2e4"]), 8).unwrap();
        book.add_line(&line(&["d2d4"]), 1).unwrap();
        book.add_line(&line(&["c2c4"]), 1).unwrap();

        let s = suggest(&store, Some(&book), &[]).unwrap();
        assert_eq!(s.known[0].kind, EdgeKind::Theory);
        assert_eq!(s.known[0].edge.score_diff, Some(30));
        assert_eq!(s.known[1].kind, EdgeKind::Casual);

        assert_eq!(s.book[0].uci, mv("e2e4"));
        assert_eq!(s.book[0].verdict, Verdict::Good);
        assert!((s.book[0].popularity - 0.8).abs() < 1e-9);
        assert!(s.book[1..].iter().all(|b| b.verdict == Verdict::Bad));
    }

    #[test]
    fn suggest_without_book_or_node() {
        let store = MemoryStore::new();
        let s = suggest(&store, None, &line(&["e2e4"])).unwrap();
        assert_eq!(s, Suggestions::default());
    }

    #[test]
    fn unlink_removes_last_move_of_line() {
        let mut store = seeded();
        assert!(unlink(&mut store, &line(&["a2a3"])).unwrap());
        assert!(!unlink(&mut store, &line(&["a2a3"])).unwrap());
        assert!(matches!(unlink(&mut store, &[]), Err(ExploreError::EmptyLine)));
        assert!(matches!(
            unlink(&mut store, &line(&["e2e5"])),
            Err(ExploreError::Rules(_))
        ));

        let root = store
            .find(&Board::initial().position_id().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(root.edge_count(), 1);
    }

    #[test]
    fn analyse_candidates_applies_scores() {
        let mut store = seeded();
        let launcher = MockLauncher::new();
        let root = Board::initial().position_id().unwrap();
        launcher.set_score(&root, mv("a2a3"), Score::Cp(-5));
        let mut gateway = AnalysisGateway::new(Box::new(launcher), 100_000);

        let request = AnalyseRequest {
            candidates: Some(line(&["a2a3"])),
            extend: false,
        };
        let outcome = analyse(&mut store, &mut gateway, &[], &request, 0).unwrap();
        assert_eq!(outcome.scores.get(&mv("a2a3")), Some(-5));
        assert_eq!(outcome.applied.unwrap().updated, 1);

        let node = store.find(&root).unwrap().unwrap();
        assert_eq!(node.edge(&mv("a2a3")).unwrap().score_diff, Some(-5));
    }

    #[test]
    fn analyse_unscored_interior_node_is_not_stored() {
        let mut store = MemoryStore::new();
        let after_e4 = Board::from_line(&line(&["e2e4"])).unwrap();
        let launcher = MockLauncher::new();
        launcher.set_score(&after_e4.position_id().unwrap(), mv("e7e5"), Score::Cp(-20));
        let mut gateway = AnalysisGateway::new(Box::new(launcher), 100_000);

        let outcome = analyse(
            &mut store,
            &mut gateway,
            &line(&["e2e4"]),
            &AnalyseRequest::default(),
            0,
        )
        .unwrap();
        assert_eq!(outcome.scores.len(), 1);
        assert!(outcome.applied.is_none());
        assert!(store.find(&outcome.id).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn analyse_scores_new_root() {
        let mut store = MemoryStore::new();
        let launcher = MockLauncher::new();
        let root = Board::initial().position_id().unwrap();
        launcher.set_score(&root, mv("e2e4"), Score::Cp(35));
        let mut gateway = AnalysisGateway::new(Box::new(launcher), 100_000);

        let outcome = analyse(&mut store, &mut gateway, &[], &AnalyseRequest::default(), 10).unwrap();
        assert_eq!(outcome.applied.unwrap().appended, 1);
        let node = store.find(&root).unwrap().unwrap();
        assert_eq!(node.score, Some(10));
        assert_eq!(node.moves[0].score_diff, Some(25));
    }

    #[test]
    fn favorites_and_show() {
        let mut store = seeded();
        assert!(add_favorite(&mut store, "king pawn", &line(&["e2e4"])).unwrap());
        assert!(!add_favorite(&mut store, "king pawn", &[]).unwrap());

        let view = show(&store, &line(&["e2e4"])).unwrap();
        assert_eq!(view.favorite.as_deref(), Some("king pawn"));
        assert!(view.node.is_none());

        let root = show(&store, &[]).unwrap();
        assert!(root.favorite.is_none());
        assert_eq!(root.node.unwrap().score, Some(0));
    }

    #[test]
    fn stats_count_nodes_and_edges() {
        let store = seeded();
        let stats = graph_stats(&store).unwrap();
        assert_eq!(stats.nodes, 1);
        assert_eq!(stats.scored_nodes, 1);
        assert_eq!(stats.edges(), 2);
        assert_eq!(stats.scored_edges, 1);
    }
}
