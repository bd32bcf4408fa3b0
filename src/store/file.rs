//! store::file
//!
//! Directory-of-JSON store.
//!
//! # Layout
//!
//! ```text
//! <data_dir>/
//!   positions/<digest>.json   one node per file
//!   games/<uuid>.json         one game record per file
//!   favorites.json            name -> favorite
//!   lock                      see core::lock
//! ```
//!
//! Every write goes to a temp file that is synced and then renamed over the
//! target, so readers see either the old or the new document.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::{FavoriteStore, GameStore, PositionStore, StoreError};
use crate::core::graph::Node;
use crate::core::paths::DataPaths;
use crate::core::records::{Favorite, GameRecord};
use crate::core::types::PositionId;

/// Store rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    paths: DataPaths,
}

impl FileStore {
    /// Open a store, creating its directories if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let paths = DataPaths::new(root.into());
        for dir in [paths.positions_dir(), paths.games_dir()] {
            fs::create_dir_all(&dir).map_err(|e| StoreError::Io {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(Self { paths })
    }

    /// Paths used by this store.
    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| StoreError::Corrupt {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }

    fn write_json<T: Serialize>(path: &Path, value: &T, what: &str) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| StoreError::Serialize {
            what: what.to_string(),
            message: e.to_string(),
        })?;

        let io_err = |path: &Path, e: std::io::Error| StoreError::Io {
            path: path.to_path_buf(),
            source: e,
        };

        let temp_path = path.with_extension("json.tmp");
        let mut out = fs::File::create(&temp_path).map_err(|e| io_err(&temp_path, e))?;
        out.write_all(json.as_bytes())
            .map_err(|e| io_err(&temp_path, e))?;
        out.sync_all().map_err(|e| io_err(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| io_err(path, e))?;
        Ok(())
    }

    /// JSON documents directly inside a directory.
    fn json_files(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path: dir.to_path_buf(),
                    source: e,
                })
            }
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl PositionStore for FileStore {
    fn find(&self, id: &PositionId) -> Result<Option<Node>, StoreError> {
        let path = self.paths.position_path(id);
        let Some(node) = Self::read_json::<Node>(&path)? else {
            return Ok(None);
        };
        if &node.id != id {
            return Err(StoreError::Corrupt {
                path,
                message: format!("holds '{}', expected '{}'", node.id, id),
            });
        }
        Ok(Some(node))
    }

    fn save(&mut self, node: &Node) -> Result<(), StoreError> {
        Self::write_json(&self.paths.position_path(&node.id), node, "position")
    }

    fn wipe(&mut self) -> Result<usize, StoreError> {
        let files = Self::json_files(&self.paths.positions_dir())?;
        for path in &files {
            fs::remove_file(path).map_err(|e| StoreError::Io {
                path: path.clone(),
                source: e,
            })?;
        }
        tracing::info!(removed = files.len(), "wiped position graph");
        Ok(files.len())
    }

    fn position_ids(&self) -> Result<Vec<PositionId>, StoreError> {
        let mut ids = Vec::new();
        for path in Self::json_files(&self.paths.positions_dir())? {
            if let Some(node) = Self::read_json::<Node>(&path)? {
                ids.push(node.id);
            }
        }
        Ok(ids)
    }
}

impl FavoriteStore for FileStore {
    fn favorites(&self) -> Result<BTreeMap<String, Favorite>, StoreError> {
        Ok(Self::read_json(&self.paths.favorites_path())?.unwrap_or_default())
    }

    fn save_favorites(&mut self, favorites: &BTreeMap<String, Favorite>) -> Result<(), StoreError> {
        Self::write_json(&self.paths.favorites_path(), favorites, "favorites")
    }
}

impl GameStore for FileStore {
    fn find_game(&self, id: &Uuid) -> Result<Option<GameRecord>, StoreError> {
        Self::read_json(&self.paths.game_path(&id.to_string()))
    }

    fn games(&self) -> Result<Vec<GameRecord>, StoreError> {
        let mut games = Vec::new();
        for path in Self::json_files(&self.paths.games_dir())? {
            if let Some(game) = Self::read_json(&path)? {
                games.push(game);
            }
        }
        Ok(games)
    }

    fn save_game(&mut self, record: &GameRecord) -> Result<(), StoreError> {
        Self::write_json(
            &self.paths.game_path(&record.id.to_string()),
            record,
            "game",
        )
    }
}
