//! cli
//!
//! Command-line interface layer for OpenBook.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Load configuration and resolve the data directory
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds a
//! [`Context`], and dispatches to [`commands`]. Handlers open the store
//! through the context; mutating handlers hold the store lock for their
//! whole run.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::core::lock::StoreLock;
use crate::core::paths::DataPaths;
use crate::store::FileStore;
use crate::ui::output::Verbosity;

/// Execution context shared by command handlers.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    /// Resolved store directory.
    pub data_dir: PathBuf,
    pub verbosity: Verbosity,
}

impl Context {
    /// Build a context from parsed flags.
    ///
    /// `--data-dir` wins over the configured directory.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
        let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir());
        Ok(Self {
            config,
            data_dir,
            verbosity: Verbosity::from_flags(cli.quiet, cli.debug),
        })
    }

    pub fn paths(&self) -> DataPaths {
        DataPaths::new(self.data_dir.clone())
    }

    /// Open the store for reading.
    pub fn open_store(&self) -> Result<FileStore> {
        FileStore::open(self.data_dir.clone())
            .with_context(|| format!("Failed to open store at {}", self.data_dir.display()))
    }

    /// Lock and open the store for a mutating command.
    ///
    /// Keep the lock alive until the command finishes.
    pub fn open_store_locked(&self) -> Result<(StoreLock, FileStore)> {
        let lock = StoreLock::acquire(&self.paths()).context("Failed to lock store")?;
        tracing::debug!(lock = %lock.path().display(), "store locked");
        let store = self.open_store()?;
        Ok((lock, store))
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = Context::from_cli(&cli)?;
    commands::dispatch(cli.command, &ctx)
}
