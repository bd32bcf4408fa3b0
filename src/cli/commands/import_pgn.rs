//! import-pgn command - Import games from a PGN file

use std::path::Path;

use anyhow::Result;

use crate::cli::Context;
use crate::pgn::{self, ImportOptions};
use crate::ui::output;

pub fn import_pgn(
    ctx: &Context,
    file: &Path,
    limit: usize,
    max_plies: Option<usize>,
    theory_elo: Option<u32>,
) -> Result<()> {
    let options = ImportOptions {
        theory_elo: theory_elo.unwrap_or_else(|| ctx.config.theory_elo()),
        max_plies: max_plies.unwrap_or_else(|| ctx.config.import_max_plies()),
        limit,
    };

    let (_lock, mut store) = ctx.open_store_locked()?;
    let stats = pgn::import_file(&mut store, file, &options)?;

    output::print(
        format!(
            "Imported {} of {} game(s) ({} already known), {} move(s)",
            stats.imported, stats.games, stats.duplicates, stats.edges
        ),
        ctx.verbosity,
    );
    if stats.truncated > 0 {
        output::warn(
            format!("{} game(s) stopped at an unplayable move", stats.truncated),
            ctx.verbosity,
        );
    }
    Ok(())
}
