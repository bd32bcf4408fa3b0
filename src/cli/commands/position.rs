//! suggest, show and unlink commands

use std::path::Path;

use anyhow::{bail, Context as _, Result};

use super::parse_line;
use crate::book::{OpeningBook, PolyglotBook};
use crate::cli::Context;
use crate::explore;
use crate::ui::output;

/// List known continuations, then book moves with their popularity.
pub fn suggest(ctx: &Context, moves: &[String], book: Option<&Path>) -> Result<()> {
    let line = parse_line(moves)?;
    let book = book
        .map(PolyglotBook::open)
        .transpose()
        .context("Failed to open book")?;
    let store = ctx.open_store()?;
    let suggestions = explore::suggest(&store, book.as_ref().map(|b| b as &dyn OpeningBook), &line)?;

    if suggestions.known.is_empty() && suggestions.book.is_empty() {
        output::print("No suggestions for this position", ctx.verbosity);
        return Ok(());
    }
    for known in &suggestions.known {
        output::result(format!(
            "{}\t{}\t{}\t{}",
            known.edge.uci,
            known.edge.label,
            known.kind,
            output::format_score(known.edge.score_diff)
        ));
    }
    for suggestion in &suggestions.book {
        output::result(format!(
            "{}\t{}\tbook\t{:.0}%\t{}",
            suggestion.uci,
            suggestion.label,
            suggestion.popularity * 100.0,
            suggestion.verdict
        ));
    }
    Ok(())
}

/// Print what the store knows about a position.
pub fn show(ctx: &Context, moves: &[String]) -> Result<()> {
    let line = parse_line(moves)?;
    let store = ctx.open_store()?;
    let view = explore::show(&store, &line)?;

    output::result(format!("FEN: {}", view.board.fen()));
    if let Some(name) = &view.favorite {
        output::result(format!("Favorite: {}", name));
    }
    let Some(node) = view.node else {
        output::print("Not in the graph", ctx.verbosity);
        return Ok(());
    };
    output::result(format!("Score: {}", output::format_score(node.score)));
    for (kind, edge) in node.classified_edges() {
        output::result(format!(
            "  {}\t{}\t{}\t{}",
            edge.uci,
            edge.label,
            kind,
            output::format_score(edge.score_diff)
        ));
    }
    if !node.games.is_empty() {
        output::print(format!("Seen in {} game(s)", node.games.len()), ctx.verbosity);
    }
    Ok(())
}

/// Remove the last move of a line from the graph.
pub fn unlink(ctx: &Context, moves: &[String]) -> Result<()> {
    let line = parse_line(moves)?;
    let (_lock, mut store) = ctx.open_store_locked()?;
    if !explore::unlink(&mut store, &line)? {
        bail!("No such move stored in that position");
    }
    output::print("Move removed", ctx.verbosity);
    Ok(())
}
