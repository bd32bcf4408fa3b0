//! store
//!
//! Durable position graph plus the favorites and games collections.
//!
//! # Architecture
//!
//! Backends implement a small set of primitives (read a node, write a node,
//! list, wipe). Everything with semantics (merge-insert, score overwrite,
//! unlink, patching) is a provided trait method built on those primitives,
//! so [`MemoryStore`] and [`FileStore`] behave identically.
//!
//! Each primitive write replaces exactly one node, which is what makes a
//! [`NodePatch`] atomic per node.
//!
//! # Example
//!
//! ```
//! use openbook::core::types::PositionId;
//! use openbook::store::{MemoryStore, NodeInsert, PositionStore};
//!
//! let mut store = MemoryStore::new();
//! let id = PositionId::new("8/8/8/8/8/8/8/K6k w - -").unwrap();
//!
//! let outcome = store.insert(&id, NodeInsert::new().with_score(12)).unwrap();
//! assert!(outcome.created);
//! assert_eq!(store.find(&id).unwrap().unwrap().score, Some(12));
//! ```

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::core::graph::{Edge, Node, NodePatch};
use crate::core::records::{Favorite, GameRecord};
use crate::core::types::{Centipawns, MoveCode, PositionId};

/// Errors from store operations.
///
/// A missing node is not an error; lookups return `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem operation failed.
    #[error("store I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A stored document could not be parsed.
    #[error("corrupt store document '{path}': {message}")]
    Corrupt { path: PathBuf, message: String },

    /// A document could not be serialized.
    #[error("failed to serialize {what}: {message}")]
    Serialize { what: String, message: String },
}

/// Result of a merge-insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    /// True when the node did not exist before the call.
    pub created: bool,
}

/// Arguments to [`PositionStore::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeInsert {
    /// Book continuations.
    pub theory: Vec<Edge>,
    /// Other continuations.
    pub casual: Vec<Edge>,
    /// Game reference appended to the node.
    pub game: Option<String>,
    /// Score used only when the node is created.
    pub score: Option<Centipawns>,
}

impl NodeInsert {
    /// An insert that only ensures the node exists.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theory(mut self, edges: Vec<Edge>) -> Self {
        self.theory = edges;
        self
    }

    pub fn with_casual(mut self, edges: Vec<Edge>) -> Self {
        self.casual = edges;
        self
    }

    pub fn with_game(mut self, game: impl Into<String>) -> Self {
        self.game = Some(game.into());
        self
    }

    pub fn with_score(mut self, score: Centipawns) -> Self {
        self.score = Some(score);
        self
    }
}

/// The position graph.
pub trait PositionStore {
    /// Look up a node.
    fn find(&self, id: &PositionId) -> Result<Option<Node>, StoreError>;

    /// Replace a whole node in one write.
    fn save(&mut self, node: &Node) -> Result<(), StoreError>;

    /// Remove every node. Returns how many were removed.
    fn wipe(&mut self) -> Result<usize, StoreError>;

    /// All stored identities, in no particular order.
    fn position_ids(&self) -> Result<Vec<PositionId>, StoreError>;

    /// Check whether a node exists.
    fn contains(&self, id: &PositionId) -> Result<bool, StoreError> {
        Ok(self.find(id)?.is_some())
    }

    /// Create a node or merge edges into an existing one.
    ///
    /// On creation the candidate lists are deduplicated by move, theory
    /// winning over casual, and `score` is used. On merge the rules of
    /// [`Node::merge`] apply and `score` is ignored.
    fn insert(&mut self, id: &PositionId, args: NodeInsert) -> Result<InsertOutcome, StoreError> {
        let NodeInsert {
            theory,
            casual,
            game,
            score,
        } = args;

        let (mut node, created) = match self.find(id)? {
            Some(node) => (node, false),
            None => {
                let mut node = Node::new(id.clone());
                node.score = score;
                (node, true)
            }
        };
        node.merge(theory, casual, game);
        self.save(&node)?;

        tracing::trace!(position = %id, created, "merge-insert");
        Ok(InsertOutcome { created })
    }

    /// Overwrite a node's score. Returns whether the node existed.
    fn set_score(&mut self, id: &PositionId, score: Option<Centipawns>) -> Result<bool, StoreError> {
        let Some(mut node) = self.find(id)? else {
            return Ok(false);
        };
        node.score = score;
        self.save(&node)?;
        Ok(true)
    }

    /// Remove one edge, theory first. Returns whether an edge was removed.
    fn unlink(&mut self, id: &PositionId, uci: &MoveCode) -> Result<bool, StoreError> {
        let Some(mut node) = self.find(id)? else {
            return Ok(false);
        };
        if !node.unlink(uci) {
            return Ok(false);
        }
        self.save(&node)?;
        Ok(true)
    }

    /// Apply a patch to one node in a single write.
    ///
    /// Returns whether the node existed.
    fn apply_patch(&mut self, id: &PositionId, patch: &NodePatch) -> Result<bool, StoreError> {
        let Some(mut node) = self.find(id)? else {
            return Ok(false);
        };
        if patch.is_empty() {
            return Ok(true);
        }
        node.apply_patch(patch);
        self.save(&node)?;
        Ok(true)
    }
}

/// Named positions.
pub trait FavoriteStore {
    /// All favorites keyed by name.
    fn favorites(&self) -> Result<BTreeMap<String, Favorite>, StoreError>;

    /// Replace the whole favorites collection.
    fn save_favorites(&mut self, favorites: &BTreeMap<String, Favorite>) -> Result<(), StoreError>;

    /// Add a favorite. Returns false for an empty or taken name.
    fn add_favorite(
        &mut self,
        name: &str,
        position: PositionId,
        moves: Vec<MoveCode>,
    ) -> Result<bool, StoreError> {
        if name.trim().is_empty() {
            return Ok(false);
        }
        let mut all = self.favorites()?;
        if all.contains_key(name) {
            return Ok(false);
        }
        all.insert(
            name.to_string(),
            Favorite {
                name: name.to_string(),
                position,
                moves,
            },
        );
        self.save_favorites(&all)?;
        Ok(true)
    }

    fn find_favorite_by_name(&self, name: &str) -> Result<Option<Favorite>, StoreError> {
        Ok(self.favorites()?.remove(name))
    }

    /// First favorite (by name order) at a position.
    fn find_favorite_by_position(&self, position: &PositionId) -> Result<Option<Favorite>, StoreError> {
        Ok(self
            .favorites()?
            .into_values()
            .find(|f| &f.position == position))
    }

    /// Remove a favorite. Returns whether it existed.
    fn remove_favorite(&mut self, name: &str) -> Result<bool, StoreError> {
        let mut all = self.favorites()?;
        if all.remove(name).is_none() {
            return Ok(false);
        }
        self.save_favorites(&all)?;
        Ok(true)
    }

    /// Favorite names in sorted order.
    fn list_favorites(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.favorites()?.into_keys().collect())
    }
}

/// Imported game metadata.
pub trait GameStore {
    fn find_game(&self, id: &Uuid) -> Result<Option<GameRecord>, StoreError>;

    /// All stored game records.
    fn games(&self) -> Result<Vec<GameRecord>, StoreError>;

    /// Write one record.
    fn save_game(&mut self, record: &GameRecord) -> Result<(), StoreError>;

    /// Store a record unless the same game is already present.
    ///
    /// Returns whether the record was stored.
    fn insert_game(&mut self, record: &GameRecord) -> Result<bool, StoreError> {
        if self.games()?.iter().any(|g| g.same_game(record)) {
            return Ok(false);
        }
        self.save_game(record)?;
        Ok(true)
    }
}

/// Everything the crawls and commands need from a backend.
pub trait Store: PositionStore + FavoriteStore + GameStore {}

impl<T: PositionStore + FavoriteStore + GameStore> Store for T {}
