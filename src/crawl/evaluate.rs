//! crawl::evaluate
//!
//! Fill in missing edge scores.
//!
//! At each node the edges without a `score_diff` (restricted by the forced
//! prefix) are sent to the engine as candidates and the result is applied
//! with [`apply_scores`]. The walk then follows every admitted edge of the
//! re-read node. Nodes without a score cannot be scored yet; their pending
//! edges are counted as deferred and picked up by a later run.

use std::collections::HashSet;

use super::{CrawlError, Cursor};
use crate::analysis::{AnalysisGateway, AnalysisMode, EngineError};
use crate::core::graph::Node;
use crate::core::types::{Centipawns, MoveCode, PositionId};
use crate::rules::Board;
use crate::scoring::apply_scores;
use crate::store::PositionStore;

/// Evaluate crawl settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluateOptions {
    /// Score given to an unscored root before the walk.
    pub root_score: Centipawns,
}

/// What an evaluate run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluateStats {
    /// Nodes processed.
    pub visited: usize,
    /// Engine analyses applied.
    pub analysed: usize,
    /// Edges that received a score.
    pub scored: usize,
    /// Edges left unscored for a later run.
    pub deferred: usize,
    /// Analyses abandoned after the restart-and-retry.
    pub engine_failures: usize,
}

/// Walk from the initial position and score every reachable unscored edge.
///
/// # Errors
///
/// Store and rules failures abort the walk, as does an engine that never
/// starts. An engine that fails twice on one node, or cannot be restarted
/// after failing, only defers that node's edges.
pub fn evaluate<S>(
    store: &mut S,
    gateway: &mut AnalysisGateway,
    forced: &[MoveCode],
    options: &EvaluateOptions,
) -> Result<EvaluateStats, CrawlError>
where
    S: PositionStore + ?Sized,
{
    let mut cursor = Cursor::new(forced)?;
    let root = cursor.position_id()?;
    if let Some(node) = store.find(&root)? {
        if node.score.is_none() {
            tracing::info!(score = options.root_score, "scoring unscored root");
            store.set_score(&root, Some(options.root_score))?;
        }
    }

    let mut walk = Walk {
        store,
        gateway,
        visited: HashSet::new(),
        stats: EvaluateStats::default(),
    };
    walk.visit(&mut cursor)?;

    let stats = walk.stats;
    tracing::info!(
        visited = stats.visited,
        scored = stats.scored,
        deferred = stats.deferred,
        "evaluate finished"
    );
    Ok(stats)
}

struct Walk<'a, S: ?Sized> {
    store: &'a mut S,
    gateway: &'a mut AnalysisGateway,
    visited: HashSet<PositionId>,
    stats: EvaluateStats,
}

impl<S: PositionStore + ?Sized> Walk<'_, S> {
    fn visit(&mut self, cursor: &mut Cursor) -> Result<(), CrawlError> {
        let id = cursor.position_id()?;
        let Some(node) = self.store.find(&id)? else {
            return Ok(());
        };
        if !cursor.in_prefix() && !self.visited.insert(id.clone()) {
            return Ok(());
        }
        self.stats.visited += 1;

        let pending: Vec<MoveCode> = node
            .edges()
            .filter(|e| cursor.admits(&e.uci) && e.score_diff.is_none())
            .map(|e| e.uci.clone())
            .collect();

        if !pending.is_empty() {
            if node.score.is_none() {
                tracing::debug!(position = %id, pending = pending.len(), "deferring unscored node");
                self.stats.deferred += pending.len();
            } else {
                self.analyse(cursor.board(), &node, pending)?;
            }
        }

        let node = self.store.find(&id)?.unwrap_or(node);
        let targets: Vec<MoveCode> = node
            .edges()
            .filter(|e| cursor.admits(&e.uci))
            .map(|e| e.uci.clone())
            .collect();
        for uci in targets {
            cursor.push(&uci)?;
            self.visit(cursor)?;
            cursor.pop();
        }
        Ok(())
    }

    fn analyse(
        &mut self,
        board: &Board,
        node: &Node,
        pending: Vec<MoveCode>,
    ) -> Result<(), CrawlError> {
        let count = pending.len();
        match self
            .gateway
            .evaluate_with_retry(board, &AnalysisMode::Candidates(pending))
        {
            Ok(scores) => {
                let summary = apply_scores(self.store, node, &scores)?;
                self.stats.analysed += 1;
                self.stats.scored += summary.updated;
                self.stats.deferred += count.saturating_sub(summary.updated);
                Ok(())
            }
            // The engine never started; nothing later can succeed.
            Err(e @ EngineError::Launch { .. }) => Err(e.into()),
            Err(e) => {
                tracing::warn!(position = %node.id, error = %e, "analysis failed, deferring");
                self.stats.engine_failures += 1;
                self.stats.deferred += count;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mock::MockLauncher;
    use crate::analysis::Score;
    use crate::core::graph::Edge;
    use crate::store::{MemoryStore, NodeInsert};

    fn mv(s: &str) -> MoveCode {
        MoveCode::new(s).unwrap()
    }

    fn edges(board: &Board, ucis: &[&str]) -> Vec<Edge> {
        ucis.iter()
            .map(|u| {
                let uci = mv(u);
                Edge::new(
                    uci.clone(),
                    board.destination(&uci).unwrap(),
                    board.label(&uci).unwrap(),
                )
            })
            .collect()
    }

    fn seeded() -> (MemoryStore, MockLauncher, AnalysisGateway) {
        let mut store = MemoryStore::new();
        let board = Board::initial();
        store
            .insert(
                &board.position_id().unwrap(),
                NodeInsert::new().with_theory(edges(&board, &["e2e4", "d2d4", "g1f3"])),
            )
            .unwrap();

        let launcher = MockLauncher::new();
        let root = board.position_id().unwrap();
        launcher.set_score(&root, mv("e2e4"), Score::Cp(30));
        launcher.set_score(&root, mv("d2d4"), Score::Cp(25));
        launcher.set_score(&root, mv("g1f3"), Score::Cp(10));
        let gateway = AnalysisGateway::new(Box::new(launcher.clone()), 100_000);
        (store, launcher, gateway)
    }

    #[test]
    fn fresh_root_is_scored_and_evaluated() {
        let (mut store, _launcher, mut gateway) = seeded();
        let stats = evaluate(&mut store, &mut gateway, &[], &EvaluateOptions::default()).unwrap();

        let root = store
            .find(&Board::initial().position_id().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(root.score, Some(0));
        let diffs: Vec<Option<i32>> = root.theory.iter().map(|e| e.score_diff).collect();
        assert_eq!(diffs, vec![Some(30), Some(25), Some(10)]);
        for edge in &root.theory {
            let dest = store.find(&edge.destination).unwrap().unwrap();
            assert_eq!(dest.score, edge.score_diff.map(|d| -d));
        }

        assert_eq!(stats.scored, 3);
        assert_eq!(stats.analysed, 1);
        // Root plus the three created destinations.
        assert_eq!(stats.visited, 4);
    }

    #[test]
    fn second_run_does_nothing() {
        let (mut store, launcher, mut gateway) = seeded();
        evaluate(&mut store, &mut gateway, &[], &EvaluateOptions::default()).unwrap();
        let calls = launcher.requests().len();

        let stats = evaluate(&mut store, &mut gateway, &[], &EvaluateOptions::default()).unwrap();
        assert_eq!(stats.scored, 0);
        assert_eq!(launcher.requests().len(), calls);
    }

    #[test]
    fn forced_prefix_restricts_analysis() {
        let (mut store, launcher, mut gateway) = seeded();
        evaluate(
            &mut store,
            &mut gateway,
            &[mv("d2d4")],
            &EvaluateOptions { root_score: 15 },
        )
        .unwrap();

        let root = store
            .find(&Board::initial().position_id().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(root.score, Some(15));
        assert_eq!(root.theory[0].score_diff, None);
        assert_eq!(root.theory[1].score_diff, Some(10));
        assert_eq!(launcher.requests()[0].searchmoves, vec![mv("d2d4")]);
    }

    #[test]
    fn unscored_interior_node_is_deferred() {
        let mut store = MemoryStore::new();
        let root_board = Board::initial();
        store
            .insert(
                &root_board.position_id().unwrap(),
                NodeInsert::new()
                    .with_theory(edges(&root_board, &["e2e4"]))
                    .with_score(0),
            )
            .unwrap();
        let after_e4 = Board::from_line(&[mv("e2e4")]).unwrap();
        store
            .insert(
                &after_e4.position_id().unwrap(),
                NodeInsert::new().with_theory(edges(&after_e4, &["e7e5", "c7c6"])),
            )
            .unwrap();
        // Root edge already scored, so the child never gets a score.
        let mut root = store.find(&root_board.position_id().unwrap()).unwrap().unwrap();
        root.theory[0].score_diff = Some(0);
        store.save(&root).unwrap();

        let launcher = MockLauncher::new();
        let mut gateway = AnalysisGateway::new(Box::new(launcher.clone()), 100_000);
        let stats = evaluate(&mut store, &mut gateway, &[], &EvaluateOptions::default()).unwrap();

        assert_eq!(stats.deferred, 2);
        assert_eq!(stats.scored, 0);
        assert!(launcher.requests().is_empty());
    }

    #[test]
    fn engine_failure_twice_defers_and_continues() {
        let (mut store, launcher, mut gateway) = seeded();
        launcher.fail_next(2);

        let stats = evaluate(&mut store, &mut gateway, &[], &EvaluateOptions::default()).unwrap();
        assert_eq!(stats.engine_failures, 1);
        assert_eq!(stats.deferred, 3);
        assert_eq!(gateway.restarts(), 1);

        let root = store
            .find(&Board::initial().position_id().unwrap())
            .unwrap()
            .unwrap();
        assert!(root.theory.iter().all(|e| e.score_diff.is_none()));

        // A later run picks the edges up.
        let stats = evaluate(&mut store, &mut gateway, &[], &EvaluateOptions::default()).unwrap();
        assert_eq!(stats.scored, 3);
    }

    #[test]
    fn engine_failure_once_is_retried() {
        let (mut store, launcher, mut gateway) = seeded();
        launcher.fail_next(1);

        let stats = evaluate(&mut store, &mut gateway, &[], &EvaluateOptions::default()).unwrap();
        assert_eq!(stats.scored, 3);
        assert_eq!(stats.engine_failures, 0);
        assert_eq!(gateway.restarts(), 1);
    }

    #[test]
    fn missing_root_is_a_no_op() {
        let mut store = MemoryStore::new();
        let mut gateway = AnalysisGateway::new(Box::new(MockLauncher::new()), 100_000);
        let stats = evaluate(&mut store, &mut gateway, &[], &EvaluateOptions::default()).unwrap();
        assert_eq!(stats, EvaluateStats::default());
        assert!(store.is_empty());
    }
}
