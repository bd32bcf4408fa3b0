//! crawl::troubleshoot
//!
//! Detect, and on request repair, broken edge scores.
//!
//! The walk never descends below a node whose own score is undefined. For
//! every edge with a diff it checks the destination against
//! `-(node.score + diff)`:
//!
//! - destination exists but is unscored: [`KnownIssue::UnscoredDestination`],
//!   repaired with `adjust` by setting the implied score
//! - destination score differs: [`KnownIssue::ScoreMismatch`], reported only
//!
//! Edges are never modified.

use std::collections::HashSet;

use super::{CrawlError, Cursor};
use crate::core::graph::Edge;
use crate::core::types::{MoveCode, PositionId};
use crate::doctor::{DiagnosisReport, KnownIssue};
use crate::store::PositionStore;

/// What a troubleshoot run found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TroubleshootReport {
    /// Nodes inspected.
    pub visited: usize,
    pub diagnosis: DiagnosisReport,
}

/// Walk from the initial position checking edge scores.
///
/// Read-only unless `adjust` is set.
pub fn troubleshoot<S>(
    store: &mut S,
    forced: &[MoveCode],
    adjust: bool,
) -> Result<TroubleshootReport, CrawlError>
where
    S: PositionStore + ?Sized,
{
    let mut cursor = Cursor::new(forced)?;
    let mut report = TroubleshootReport::default();
    let mut visited = HashSet::new();
    walk(store, &mut cursor, adjust, &mut visited, &mut report)?;

    let summary = report.diagnosis.summary();
    tracing::info!(
        visited = report.visited,
        issues = summary.issue_count,
        repaired = summary.repaired_count,
        "troubleshoot finished"
    );
    Ok(report)
}

fn walk<S>(
    store: &mut S,
    cursor: &mut Cursor,
    adjust: bool,
    visited: &mut HashSet<PositionId>,
    report: &mut TroubleshootReport,
) -> Result<(), CrawlError>
where
    S: PositionStore + ?Sized,
{
    let id = cursor.position_id()?;
    let Some(node) = store.find(&id)? else {
        return Ok(());
    };
    if !cursor.in_prefix() && !visited.insert(id.clone()) {
        return Ok(());
    }
    report.visited += 1;
    if node.score.is_none() {
        return Ok(());
    }

    let edges: Vec<Edge> = node
        .edges()
        .filter(|e| cursor.admits(&e.uci))
        .cloned()
        .collect();
    for edge in edges {
        if let Some(expected) = edge.implied_destination_score(node.score) {
            if let Some(destination) = store.find(&edge.destination)? {
                match destination.score {
                    None => {
                        let repaired =
                            adjust && store.set_score(&edge.destination, Some(expected))?;
                        report.diagnosis.record(
                            KnownIssue::UnscoredDestination {
                                source_id: id.clone(),
                                uci: edge.uci.clone(),
                                destination: edge.destination.clone(),
                                expected,
                            },
                            repaired,
                        );
                    }
                    Some(actual) if actual != expected => {
                        report.diagnosis.record(
                            KnownIssue::ScoreMismatch {
                                source_id: id.clone(),
                                uci: edge.uci.clone(),
                                destination: edge.destination.clone(),
                                expected,
                                actual,
                            },
                            false,
                        );
                    }
                    Some(_) => {}
                }
            }
        }

        cursor.push(&edge.uci)?;
        walk(store, cursor, adjust, visited, report)?;
        cursor.pop();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Board;
    use crate::store::{MemoryStore, NodeInsert};

    fn mv(s: &str) -> MoveCode {
        MoveCode::new(s).unwrap()
    }

    /// Root scored 0 with e2e4 (diff 30) and d2d4 (diff 25). The e4
    /// destination exists unscored, the d4 destination is scored wrongly.
    fn broken() -> (MemoryStore, PositionId, PositionId) {
        let mut store = MemoryStore::new();
        let board = Board::initial();
        let e4 = board.destination(&mv("e2e4")).unwrap();
        let d4 = board.destination(&mv("d2d4")).unwrap();
        store
            .insert(
                &board.position_id().unwrap(),
                NodeInsert::new()
                    .with_theory(vec![
                        Edge::new(mv("e2e4"), e4.clone(), "e4").with_score_diff(30),
                        Edge::new(mv("d2d4"), d4.clone(), "d4").with_score_diff(25),
                    ])
                    .with_score(0),
            )
            .unwrap();
        store.insert(&e4, NodeInsert::new()).unwrap();
        store.insert(&d4, NodeInsert::new().with_score(-20)).unwrap();
        (store, e4, d4)
    }

    #[test]
    fn reports_without_writing() {
        let (mut store, e4, d4) = broken();
        let before = store.clone();

        let report = troubleshoot(&mut store, &[], false).unwrap();
        let summary = report.diagnosis.summary();
        assert_eq!(summary.error_count, 1);
        assert_eq!(summary.warning_count, 1);
        assert_eq!(summary.repaired_count, 0);

        assert_eq!(store.find(&e4).unwrap(), before.find(&e4).unwrap());
        assert_eq!(store.find(&d4).unwrap().unwrap().score, Some(-20));
    }

    #[test]
    fn adjust_repairs_unscored_destination_only() {
        let (mut store, e4, d4) = broken();

        let report = troubleshoot(&mut store, &[], true).unwrap();
        assert_eq!(report.diagnosis.summary().repaired_count, 1);
        assert_eq!(store.find(&e4).unwrap().unwrap().score, Some(-30));
        assert_eq!(store.find(&d4).unwrap().unwrap().score, Some(-20));

        let again = troubleshoot(&mut store, &[], true).unwrap();
        assert_eq!(again.diagnosis.summary().error_count, 0);
        assert_eq!(again.diagnosis.summary().warning_count, 1);
    }

    #[test]
    fn unscored_root_is_not_descended() {
        let (mut store, _, _) = broken();
        let root = Board::initial().position_id().unwrap();
        store.set_score(&root, None).unwrap();

        let report = troubleshoot(&mut store, &[], true).unwrap();
        assert_eq!(report.visited, 1);
        assert!(report.diagnosis.is_healthy());
    }

    #[test]
    fn forced_prefix_checks_only_that_edge() {
        let (mut store, _, _) = broken();
        let report = troubleshoot(&mut store, &[mv("d2d4")], false).unwrap();
        let summary = report.diagnosis.summary();
        assert_eq!(summary.error_count, 0);
        assert_eq!(summary.warning_count, 1);
    }

    #[test]
    fn edges_are_never_modified() {
        let (mut store, _, _) = broken();
        let root = Board::initial().position_id().unwrap();
        let before = store.find(&root).unwrap();
        troubleshoot(&mut store, &[], true).unwrap();
        assert_eq!(store.find(&root).unwrap(), before);
    }
}
