//! store::memory
//!
//! In-process store for tests and embedders.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use super::{FavoriteStore, GameStore, PositionStore, StoreError};
use crate::core::graph::Node;
use crate::core::records::{Favorite, GameRecord};
use crate::core::types::PositionId;

/// A store that lives only as long as the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: HashMap<PositionId, Node>,
    favorites: BTreeMap<String, Favorite>,
    games: Vec<GameRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl PositionStore for MemoryStore {
    fn find(&self, id: &PositionId) -> Result<Option<Node>, StoreError> {
        Ok(self.nodes.get(id).cloned())
    }

    fn save(&mut self, node: &Node) -> Result<(), StoreError> {
        self.nodes.insert(node.id.clone(), node.clone());
        Ok(())
    }

    fn wipe(&mut self) -> Result<usize, StoreError> {
        let count = self.nodes.len();
        self.nodes.clear();
        Ok(count)
    }

    fn position_ids(&self) -> Result<Vec<PositionId>, StoreError> {
        Ok(self.nodes.keys().cloned().collect())
    }
}

impl FavoriteStore for MemoryStore {
    fn favorites(&self) -> Result<BTreeMap<String, Favorite>, StoreError> {
        Ok(self.favorites.clone())
    }

    fn save_favorites(&mut self, favorites: &BTreeMap<String, Favorite>) -> Result<(), StoreError> {
        self.favorites = favorites.clone();
        Ok(())
    }
}

impl GameStore for MemoryStore {
    fn find_game(&self, id: &Uuid) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.games.iter().find(|g| &g.id == id).cloned())
    }

    fn games(&self) -> Result<Vec<GameRecord>, StoreError> {
        Ok(self.games.clone())
    }

    fn save_game(&mut self, record: &GameRecord) -> Result<(), StoreError> {
        self.games.retain(|g| g.id != record.id);
        self.games.push(record.clone());
        Ok(())
    }
}
