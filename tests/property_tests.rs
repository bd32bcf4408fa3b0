//! Property-based tests for graph invariants.
//!
//! These tests use proptest to verify that merge, scoring, unlink and
//! populate keep their guarantees across randomly generated inputs.

mod common;

use proptest::prelude::*;

use openbook::book::MemoryBook;
use openbook::core::graph::{Edge, Node};
use openbook::core::types::{MoveCode, PositionId};
use openbook::crawl::populate;
use openbook::rules::Board;
use openbook::scoring::{apply_scores, MoveScores};
use openbook::store::{MemoryStore, NodeInsert, PositionStore};

/// Legal first moves, with their edges from the initial position.
fn first_move_edges() -> Vec<Edge> {
    let board = Board::initial();
    board
        .legal_moves()
        .into_iter()
        .map(|uci| {
            let dest = board.destination(&uci).unwrap();
            let label = board.label(&uci).unwrap();
            Edge::new(uci, dest, label)
        })
        .collect()
}

/// Strategy: a subset of first-move edges, possibly with repeats.
fn edge_batch() -> impl Strategy<Value = Vec<Edge>> {
    let all = first_move_edges();
    prop::collection::vec(prop::sample::select(all), 0..8)
}

/// Strategy: a short random walk of legal moves from the initial position.
fn random_line() -> impl Strategy<Value = Vec<MoveCode>> {
    prop::collection::vec(any::<prop::sample::Index>(), 0..6).prop_map(|picks| {
        let mut board = Board::initial();
        let mut line = Vec::new();
        for pick in picks {
            let moves = board.legal_moves();
            if moves.is_empty() {
                break;
            }
            let uci = moves[pick.index(moves.len())].clone();
            board.push(&uci).unwrap();
            line.push(uci);
        }
        line
    })
}

fn root_id() -> PositionId {
    Board::initial().position_id().unwrap()
}

proptest! {
    /// No sequence of merges ever stores a move twice in one node.
    #[test]
    fn merge_keeps_moves_unique(batches in prop::collection::vec((edge_batch(), edge_batch()), 1..5)) {
        let mut store = MemoryStore::new();
        for (theory, casual) in batches {
            store
                .insert(&root_id(), NodeInsert::new().with_theory(theory).with_casual(casual))
                .unwrap();
        }
        let node = store.find(&root_id()).unwrap().unwrap();
        prop_assert!(node.has_unique_edges());
    }

    /// Promoting a casual edge to theory keeps its score.
    #[test]
    fn promotion_keeps_score_diff(edges in edge_batch(), diff in -500i32..500) {
        prop_assume!(!edges.is_empty());
        let mut store = MemoryStore::new();
        let casual: Vec<Edge> = edges.iter().cloned().map(|e| e.with_score_diff(diff)).collect();
        store
            .insert(&root_id(), NodeInsert::new().with_casual(casual).with_score(0))
            .unwrap();
        store
            .insert(&root_id(), NodeInsert::new().with_theory(edges.clone()))
            .unwrap();

        let node = store.find(&root_id()).unwrap().unwrap();
        prop_assert!(node.moves.is_empty());
        for edge in &node.theory {
            prop_assert_eq!(edge.score_diff, Some(diff));
        }
        prop_assert_eq!(node.score, Some(0));
    }

    /// After scoring, every scored edge agrees with its destination.
    #[test]
    fn apply_scores_preserves_score_invariant(
        base in -300i32..300,
        values in prop::collection::vec((prop::sample::select(first_move_edges()), -400i32..400), 1..8),
    ) {
        let mut store = MemoryStore::new();
        store.insert(&root_id(), NodeInsert::new().with_score(base)).unwrap();
        let node: Node = store.find(&root_id()).unwrap().unwrap();
        let scores: MoveScores = values.into_iter().map(|(e, v)| (e.uci, v)).collect();

        apply_scores(&mut store, &node, &scores).unwrap();

        let node = store.find(&root_id()).unwrap().unwrap();
        prop_assert!(node.has_unique_edges());
        for edge in node.edges() {
            let expected = edge.implied_destination_score(node.score);
            let dest = store.find(&edge.destination).unwrap().unwrap();
            prop_assert_eq!(dest.score, expected);
        }
    }

    /// Unlink removes exactly the named move and nothing else.
    #[test]
    fn unlink_removes_only_that_move(theory in edge_batch(), casual in edge_batch(), pick in any::<prop::sample::Index>()) {
        let mut store = MemoryStore::new();
        store
            .insert(&root_id(), NodeInsert::new().with_theory(theory).with_casual(casual))
            .unwrap();
        let before = store.find(&root_id()).unwrap().unwrap();
        prop_assume!(before.edge_count() > 0);

        let all: Vec<&Edge> = before.edges().collect();
        let target = all[pick.index(all.len())].uci.clone();
        prop_assert!(store.unlink(&root_id(), &target).unwrap());

        let after = store.find(&root_id()).unwrap().unwrap();
        prop_assert!(!after.has_edge(&target));
        prop_assert_eq!(after.edge_count(), before.edge_count() - 1);
    }

    /// Populating twice from the same book changes nothing the second time.
    #[test]
    fn populate_is_idempotent(lines in prop::collection::vec(random_line(), 1..4)) {
        let mut book = MemoryBook::new();
        for l in &lines {
            book.add_line(l, 1).unwrap();
        }

        let mut store = MemoryStore::new();
        populate(&mut store, &book, &[], 25).unwrap();
        let snapshot = store.clone();

        let stats = populate(&mut store, &book, &[], 25).unwrap();
        prop_assert_eq!(stats.created, 0);
        for id in snapshot.position_ids().unwrap() {
            prop_assert_eq!(store.find(&id).unwrap(), snapshot.find(&id).unwrap());
        }
    }
}

#[test]
fn shared_fixture_lines_are_legal() {
    for (moves, _) in common::SAMPLE_BOOK {
        Board::from_line(&common::line(moves)).unwrap();
    }
}
