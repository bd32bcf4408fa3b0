//! OpenBook - a persistent chess opening graph with engine-scored moves
//!
//! OpenBook stores positions as nodes and moves as edges, seeds the graph
//! from opening books and PGN collections, and fills in move scores with a
//! UCI engine so that every edge carries its score relative to the side to
//! move.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, opens the store, dispatches)
//! - [`crawl`] - Depth-first populate, evaluate and troubleshoot walks
//! - [`scoring`] - Turns engine scores into edge diffs and destination scores
//! - [`analysis`] - Supervised UCI engine access with per-mode budgets
//! - [`store`] - Position graph, favorites and games (memory and file backends)
//! - [`book`] - Opening books (Polyglot and in-memory)
//! - [`pgn`] - PGN reading and game import
//! - [`explore`] - Single-position operations addressed by a move line
//! - [`rules`] - Adapter over the chess rules engine
//! - [`doctor`] - Diagnosis vocabulary for graph consistency checks
//! - [`core`] - Domain types, configuration, paths and locking
//! - [`ui`] - User-facing output
//!
//! # Score Invariant
//!
//! For a scored node `n` and an edge `e` with a diff, the destination's
//! score is `-(n.score + e.score_diff)`. Scoring writes both sides; the
//! troubleshoot crawl finds and repairs destinations that missed the write.

pub mod analysis;
pub mod book;
pub mod cli;
pub mod core;
pub mod crawl;
pub mod doctor;
pub mod explore;
pub mod pgn;
pub mod rules;
pub mod scoring;
pub mod store;
pub mod ui;
