//! core
//!
//! Core domain types, schemas, and storage plumbing for OpenBook.
//!
//! # Modules
//!
//! - [`types`] - Strong types: PositionId, MoveCode, Centipawns
//! - [`graph`] - Nodes, edges and node patches
//! - [`records`] - Favorites and imported-game records
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for the data directory
//! - [`lock`] - Exclusive store lock
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing

pub mod config;
pub mod graph;
pub mod lock;
pub mod paths;
pub mod records;
pub mod types;
