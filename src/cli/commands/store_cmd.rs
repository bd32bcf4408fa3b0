//! stats and wipe commands

use anyhow::{bail, Result};

use crate::cli::Context;
use crate::explore;
use crate::store::PositionStore;
use crate::ui::output;

pub fn stats(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let stats = explore::graph_stats(&store)?;
    output::result(format!("nodes\t{}", stats.nodes));
    output::result(format!("scored_nodes\t{}", stats.scored_nodes));
    output::result(format!("edges\t{}", stats.edges()));
    output::result(format!("theory_edges\t{}", stats.theory_edges));
    output::result(format!("casual_edges\t{}", stats.casual_edges));
    output::result(format!("scored_edges\t{}", stats.scored_edges));
    Ok(())
}

/// Remove every position. Favorites and games are kept.
pub fn wipe(ctx: &Context, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to wipe {} without --yes", ctx.data_dir.display());
    }
    let (_lock, mut store) = ctx.open_store_locked()?;
    let removed = store.wipe()?;
    output::print(format!("Removed {} position(s)", removed), ctx.verbosity);
    Ok(())
}
