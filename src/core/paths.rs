//! core::paths
//!
//! Centralized path routing for openbook storage locations.
//!
//! # Storage Layout
//!
//! All data lives under one data directory:
//! - `positions/` - One JSON document per position node
//! - `games/` - One JSON document per imported game
//! - `favorites.json` - Named favorite positions
//! - `lock` - Exclusive lock file held by mutating commands
//!
//! **Hard rule:** no code outside this module joins storage file names onto
//! the data directory.
//!
//! # Example
//!
//! ```
//! use openbook::core::paths::DataPaths;
//! use std::path::PathBuf;
//!
//! let paths = DataPaths::new(PathBuf::from("/data"));
//! assert_eq!(paths.lock_path(), PathBuf::from("/data/lock"));
//! ```

use std::path::{Path, PathBuf};

use crate::core::types::PositionId;

/// Centralized path routing for the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Create paths rooted at a data directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The data directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding position documents.
    pub fn positions_dir(&self) -> PathBuf {
        self.root.join("positions")
    }

    /// Document path for one position.
    ///
    /// File names are a digest of the id, since ids contain `/`.
    pub fn position_path(&self, id: &PositionId) -> PathBuf {
        self.positions_dir().join(format!("{}.json", id.digest()))
    }

    /// Directory holding imported game records.
    pub fn games_dir(&self) -> PathBuf {
        self.root.join("games")
    }

    /// Document path for one game.
    pub fn game_path(&self, game_id: &str) -> PathBuf {
        self.games_dir().join(format!("{}.json", game_id))
    }

    /// Favorites document.
    pub fn favorites_path(&self) -> PathBuf {
        self.root.join("favorites.json")
    }

    /// Lock file serializing mutating commands.
    pub fn lock_path(&self) -> PathBuf {
        self.root.join("lock")
    }
}
