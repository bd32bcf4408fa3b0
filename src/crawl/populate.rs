//! crawl::populate
//!
//! Seed the graph with theory edges from an opening book.

use super::{CrawlError, Cursor};
use crate::book::OpeningBook;
use crate::core::graph::Edge;
use crate::core::types::MoveCode;
use crate::store::{NodeInsert, PositionStore};

/// What a populate run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulateStats {
    /// Nodes merge-inserted.
    pub visited: usize,
    /// Nodes that did not exist before.
    pub created: usize,
    /// Theory edges offered to the store.
    pub edges: usize,
    /// Book moves skipped because their destination was already known.
    pub skipped: usize,
    /// Deepest ply reached.
    pub max_ply: usize,
}

/// Walk the book from the initial position and merge its moves as theory.
///
/// Inside `forced` only the prefix move is followed. Past it, moves whose
/// destination already exists are skipped, so re-running adds nothing new.
/// Nothing deeper than `max_depth` plies is inserted.
pub fn populate<S, B>(
    store: &mut S,
    book: &B,
    forced: &[MoveCode],
    max_depth: usize,
) -> Result<PopulateStats, CrawlError>
where
    S: PositionStore + ?Sized,
    B: OpeningBook + ?Sized,
{
    let mut cursor = Cursor::new(forced)?;
    let mut stats = PopulateStats::default();
    walk(store, book, &mut cursor, max_depth, &mut stats)?;
    tracing::info!(
        visited = stats.visited,
        created = stats.created,
        edges = stats.edges,
        "populate finished"
    );
    Ok(stats)
}

fn walk<S, B>(
    store: &mut S,
    book: &B,
    cursor: &mut Cursor,
    max_depth: usize,
    stats: &mut PopulateStats,
) -> Result<(), CrawlError>
where
    S: PositionStore + ?Sized,
    B: OpeningBook + ?Sized,
{
    let depth = cursor.depth();
    if depth > max_depth {
        return Ok(());
    }
    stats.max_ply = stats.max_ply.max(depth);

    let mut staged: Vec<Edge> = Vec::new();
    for candidate in book.candidates(cursor.board())? {
        if !cursor.admits(&candidate.uci) {
            continue;
        }
        if staged.iter().any(|e| e.uci == candidate.uci) {
            continue;
        }
        let board = cursor.board();
        let destination = board.destination(&candidate.uci)?;
        if !cursor.in_prefix() && store.contains(&destination)? {
            stats.skipped += 1;
            continue;
        }
        let label = board.label(&candidate.uci)?;
        staged.push(Edge::new(candidate.uci.clone(), destination, label));

        cursor.push(&candidate.uci)?;
        walk(store, book, cursor, max_depth, stats)?;
        cursor.pop();
    }

    let id = cursor.position_id()?;
    stats.edges += staged.len();
    let outcome = store.insert(&id, NodeInsert::new().with_theory(staged))?;
    stats.visited += 1;
    if outcome.created {
        stats.created += 1;
    }
    Ok(())
}
