//! populate, evaluate and troubleshoot commands

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::analysis::AnalysisGateway;
use crate::book::PolyglotBook;
use crate::cli::Context;
use crate::core::types::parse_move_line;
use crate::crawl::{self, EvaluateOptions};
use crate::ui::output;

/// Seed theory edges from a Polyglot book.
pub fn populate(ctx: &Context, book: &Path, moves: &str, max_depth: Option<usize>) -> Result<()> {
    let forced = parse_move_line(moves).context("Invalid --moves")?;
    let book = PolyglotBook::open(book).context("Failed to open book")?;
    let max_depth = max_depth.unwrap_or_else(|| ctx.config.populate_max_depth());

    let (_lock, mut store) = ctx.open_store_locked()?;
    let stats = crawl::populate(&mut store, &book, &forced, max_depth)?;

    output::print(
        format!(
            "Populated {} position(s) ({} new), {} theory move(s), deepest ply {}",
            stats.visited, stats.created, stats.edges, stats.max_ply
        ),
        ctx.verbosity,
    );
    Ok(())
}

/// Score unscored edges through the engine.
pub fn evaluate(ctx: &Context, moves: &str) -> Result<()> {
    let forced = parse_move_line(moves).context("Invalid --moves")?;
    let options = EvaluateOptions {
        root_score: ctx.config.root_score(),
    };

    let (_lock, mut store) = ctx.open_store_locked()?;
    let mut gateway = AnalysisGateway::from_config(&ctx.config);
    let stats = crawl::evaluate(&mut store, &mut gateway, &forced, &options)?;
    gateway.shutdown();

    output::print(
        format!(
            "Visited {} position(s), scored {} move(s), deferred {}",
            stats.visited, stats.scored, stats.deferred
        ),
        ctx.verbosity,
    );
    if stats.engine_failures > 0 {
        output::warn(
            format!(
                "engine failed on {} position(s); run 'ob evaluate' again to retry",
                stats.engine_failures
            ),
            ctx.verbosity,
        );
    }
    Ok(())
}

/// Check, and with `adjust` repair, destination scores.
pub fn troubleshoot(ctx: &Context, adjust: bool, moves: &str) -> Result<()> {
    let forced = parse_move_line(moves).context("Invalid --moves")?;

    let report = if adjust {
        let (_lock, mut store) = ctx.open_store_locked()?;
        crawl::troubleshoot(&mut store, &forced, true)?
    } else {
        let mut store = ctx.open_store()?;
        crawl::troubleshoot(&mut store, &forced, false)?
    };

    output::result(report.diagnosis.format());
    output::print(format!("Checked {} position(s)", report.visited), ctx.verbosity);
    Ok(())
}
