//! analyse command - Analyse one position and store the scores

use anyhow::{Context as _, Result};

use super::parse_line;
use crate::analysis::AnalysisGateway;
use crate::cli::Context;
use crate::core::types::parse_move_line;
use crate::explore::{self, AnalyseRequest};
use crate::ui::output;

pub fn analyse(ctx: &Context, moves: &[String], candidates: Option<&str>, extend: bool) -> Result<()> {
    let line = parse_line(moves)?;
    let candidates = candidates
        .map(parse_move_line)
        .transpose()
        .context("Invalid --candidates")?;
    let request = AnalyseRequest { candidates, extend };

    let (_lock, mut store) = ctx.open_store_locked()?;
    let mut gateway = AnalysisGateway::from_config(&ctx.config);
    let outcome = explore::analyse(
        &mut store,
        &mut gateway,
        &line,
        &request,
        ctx.config.root_score(),
    )?;
    gateway.shutdown();

    if outcome.scores.is_empty() {
        output::print("Engine returned no moves", ctx.verbosity);
    }
    for (uci, score) in outcome.scores.iter() {
        output::result(format!("{}\t{}", uci, output::format_score(Some(score))));
    }
    match outcome.applied {
        Some(summary) => output::print(
            format!(
                "Stored: {} updated, {} new move(s), {} new position(s)",
                summary.updated, summary.appended, summary.created
            ),
            ctx.verbosity,
        ),
        None => output::warn(
            "position has no score yet; run 'ob evaluate' on the line leading here first",
            ctx.verbosity,
        ),
    }
    Ok(())
}
