//! core::records
//!
//! Favorites and imported-game records stored next to the position graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{MoveCode, PositionId};

/// Placeholder used for missing PGN header values.
pub const UNKNOWN: &str = "???";

/// A named position, remembered with the line that reaches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    /// Unique name.
    pub name: String,
    /// Position the line reaches.
    pub position: PositionId,
    /// Moves from the initial position.
    pub moves: Vec<MoveCode>,
}

/// Provenance metadata for an imported game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Generated identifier.
    pub id: Uuid,
    pub date: String,
    pub white: String,
    pub white_elo: u32,
    pub black: String,
    pub black_elo: u32,
    pub result: String,
    /// When the game entered the store.
    pub imported_at: DateTime<Utc>,
}

impl GameRecord {
    /// Create a record with a fresh id and the current time.
    pub fn new(
        date: impl Into<String>,
        white: impl Into<String>,
        white_elo: u32,
        black: impl Into<String>,
        black_elo: u32,
        result: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: date.into(),
            white: white.into(),
            white_elo,
            black: black.into(),
            black_elo,
            result: result.into(),
            imported_at: Utc::now(),
        }
    }

    /// Check whether two records describe the same game.
    ///
    /// Ignores the generated id and the import time.
    pub fn same_game(&self, other: &GameRecord) -> bool {
        self.date == other.date
            && self.white == other.white
            && self.white_elo == other.white_elo
            && self.black == other.black
            && self.black_elo == other.black_elo
            && self.result == other.result
    }

    /// Reference string stored on graph nodes.
    pub fn reference(&self) -> String {
        self.id.to_string()
    }
}
