//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Opens the store (locked when the command writes)
//! 3. Calls into the library and formats the result
//!
//! Handlers do NOT touch store files directly.

mod analyse;
mod completion;
mod config_cmd;
mod crawl;
mod favorite;
mod import_pgn;
mod position;
mod store_cmd;

pub use analyse::analyse;
pub use completion::completion;
pub use config_cmd::{get as config_get, list as config_list, path as config_path, set as config_set};
pub use crawl::{evaluate, populate, troubleshoot};
pub use favorite::{add as favorite_add, list as favorite_list, remove as favorite_remove, show as favorite_show};
pub use import_pgn::import_pgn;
pub use position::{show, suggest, unlink};
pub use store_cmd::{stats, wipe};

use anyhow::{Context as _, Result};

use crate::cli::args::{Command, ConfigAction, FavoriteAction};
use crate::cli::Context;
use crate::core::types::{parse_move_line, MoveCode};

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        // Crawls
        Command::Populate {
            book,
            moves,
            max_depth,
        } => crawl::populate(ctx, &book, &moves, max_depth),
        Command::Evaluate { moves } => crawl::evaluate(ctx, &moves),
        Command::Troubleshoot { adjust, moves } => crawl::troubleshoot(ctx, adjust, &moves),

        // Single position
        Command::Analyse {
            moves,
            candidates,
            extend,
        } => analyse::analyse(ctx, &moves, candidates.as_deref(), extend),
        Command::ImportPgn {
            file,
            limit,
            max_plies,
            theory_elo,
        } => import_pgn::import_pgn(ctx, &file, limit, max_plies, theory_elo),
        Command::Suggest { moves, book } => position::suggest(ctx, &moves, book.as_deref()),
        Command::Show { moves } => position::show(ctx, &moves),
        Command::Unlink { moves } => position::unlink(ctx, &moves),
        Command::Favorite { action } => match action {
            FavoriteAction::Add { name, moves } => favorite::add(ctx, &name, &moves),
            FavoriteAction::Remove { name } => favorite::remove(ctx, &name),
            FavoriteAction::List => favorite::list(ctx),
            FavoriteAction::Show { name } => favorite::show(ctx, &name),
        },

        // Store
        Command::Stats => store_cmd::stats(ctx),
        Command::Wipe { yes } => store_cmd::wipe(ctx, yes),

        // Setup
        Command::Config { action } => match action {
            ConfigAction::Get { key } => config_cmd::get(ctx, &key),
            ConfigAction::Set { key, value } => config_cmd::set(ctx, &key, &value),
            ConfigAction::List => config_cmd::list(ctx),
            ConfigAction::Path => config_cmd::path(ctx),
        },
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Parse move-line arguments into UCI moves.
///
/// Each argument may itself hold several comma or space separated moves.
fn parse_line(args: &[String]) -> Result<Vec<MoveCode>> {
    parse_move_line(&args.join(" ")).context("Invalid move line")
}
