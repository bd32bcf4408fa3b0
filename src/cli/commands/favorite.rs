//! favorite command - Manage named positions

use anyhow::{bail, Result};

use super::parse_line;
use crate::cli::Context;
use crate::explore;
use crate::store::FavoriteStore;
use crate::ui::output;

pub fn add(ctx: &Context, name: &str, moves: &[String]) -> Result<()> {
    let line = parse_line(moves)?;
    let (_lock, mut store) = ctx.open_store_locked()?;
    if !explore::add_favorite(&mut store, name, &line)? {
        bail!("Favorite name '{}' is empty or already taken", name);
    }
    output::print(format!("Saved '{}'", name), ctx.verbosity);
    Ok(())
}

pub fn remove(ctx: &Context, name: &str) -> Result<()> {
    let (_lock, mut store) = ctx.open_store_locked()?;
    if !store.remove_favorite(name)? {
        bail!("No favorite named '{}'", name);
    }
    output::print(format!("Removed '{}'", name), ctx.verbosity);
    Ok(())
}

pub fn list(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let names = store.list_favorites()?;
    if names.is_empty() {
        output::print("No favorites", ctx.verbosity);
    } else {
        output::result(output::format_list(&names, ""));
    }
    Ok(())
}

pub fn show(ctx: &Context, name: &str) -> Result<()> {
    let store = ctx.open_store()?;
    let Some(favorite) = store.find_favorite_by_name(name)? else {
        bail!("No favorite named '{}'", name);
    };
    let moves: Vec<String> = favorite.moves.iter().map(ToString::to_string).collect();
    output::result(moves.join(" "));
    output::print(format!("Position: {}", favorite.position), ctx.verbosity);
    Ok(())
}
