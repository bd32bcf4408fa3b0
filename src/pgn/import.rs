//! pgn::import
//!
//! Merge PGN games into the position graph.
//!
//! Each move becomes an edge on the position it was played from: theory
//! when the mover is rated at least `theory_elo`, casual otherwise. Nodes
//! reached after the opening few plies also remember the game.

use std::path::Path;

use super::{parse_games, PgnError, PgnGame};
use crate::core::config::{DEFAULT_IMPORT_MAX_PLIES, DEFAULT_THEORY_ELO};
use crate::core::graph::Edge;
use crate::core::records::{GameRecord, UNKNOWN};
use crate::rules::{Board, RulesError};
use crate::store::{GameStore, NodeInsert, PositionStore, StoreError};

/// Plies before which game references are not attached.
const FIRST_REFERENCED_PLY: usize = 6;

/// Import settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Minimum rating for a mover's edges to count as theory.
    pub theory_elo: u32,
    /// Mainline plies imported per game.
    ///
    /// Defaults to 27: a game is followed two plies past the 25-ply book
    /// depth, so positions just beyond a populated book still get edges.
    pub max_plies: usize,
    /// Games read from the input; 0 reads all.
    pub limit: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            theory_elo: DEFAULT_THEORY_ELO,
            max_plies: DEFAULT_IMPORT_MAX_PLIES,
            limit: 0,
        }
    }
}

/// What an import did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    /// Games considered.
    pub games: usize,
    /// Games recorded and replayed.
    pub imported: usize,
    /// Games skipped because they were already recorded.
    pub duplicates: usize,
    /// Edges offered to the store.
    pub edges: usize,
    /// Games whose movetext stopped at an unplayable move.
    pub truncated: usize,
}

/// Read a PGN file and import its games.
pub fn import_file<S>(store: &mut S, path: &Path, options: &ImportOptions) -> Result<ImportStats, PgnError>
where
    S: PositionStore + GameStore + ?Sized,
{
    let text = std::fs::read_to_string(path).map_err(|source| PgnError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let games = parse_games(&text)?;
    tracing::debug!(path = %path.display(), games = games.len(), "parsed PGN");
    import_games(store, &games, options)
}

/// Import already parsed games.
pub fn import_games<S>(store: &mut S, games: &[PgnGame], options: &ImportOptions) -> Result<ImportStats, PgnError>
where
    S: PositionStore + GameStore + ?Sized,
{
    let limit = if options.limit == 0 {
        games.len()
    } else {
        options.limit
    };

    let mut stats = ImportStats::default();
    for game in games.iter().take(limit) {
        stats.games += 1;
        let record = record_for(game);
        if !store.insert_game(&record)? {
            tracing::debug!(white = %record.white, black = %record.black, "game already imported");
            stats.duplicates += 1;
            continue;
        }
        stats.imported += 1;

        match replay(store, game, &record, options, &mut stats) {
            Ok(()) => {}
            Err(ReplayError::Rules(e)) => {
                tracing::warn!(game = %record.id, error = %e, "stopping at unplayable move");
                stats.truncated += 1;
            }
            Err(ReplayError::Store(e)) => return Err(e.into()),
        }
    }

    tracing::info!(
        games = stats.games,
        imported = stats.imported,
        duplicates = stats.duplicates,
        "import finished"
    );
    Ok(stats)
}

enum ReplayError {
    Rules(RulesError),
    Store(StoreError),
}

impl From<RulesError> for ReplayError {
    fn from(e: RulesError) -> Self {
        ReplayError::Rules(e)
    }
}

impl From<StoreError> for ReplayError {
    fn from(e: StoreError) -> Self {
        ReplayError::Store(e)
    }
}

fn replay<S>(
    store: &mut S,
    game: &PgnGame,
    record: &GameRecord,
    options: &ImportOptions,
    stats: &mut ImportStats,
) -> Result<(), ReplayError>
where
    S: PositionStore + GameStore + ?Sized,
{
    let mut board = Board::initial();
    for (ply, san) in game.moves.iter().take(options.max_plies).enumerate() {
        let uci = board.resolve_san(san)?;
        let edge = Edge::new(uci.clone(), board.destination(&uci)?, board.label(&uci)?);

        let mover_elo = if board.white_to_move() {
            record.white_elo
        } else {
            record.black_elo
        };
        let mut args = if mover_elo >= options.theory_elo {
            NodeInsert::new().with_theory(vec![edge])
        } else {
            NodeInsert::new().with_casual(vec![edge])
        };
        if ply >= FIRST_REFERENCED_PLY {
            args = args.with_game(record.reference());
        }

        store.insert(&board.position_id()?, args)?;
        stats.edges += 1;
        board.push(&uci)?;
    }
    Ok(())
}

fn record_for(game: &PgnGame) -> GameRecord {
    let text = |name: &str| game.header(name).unwrap_or(UNKNOWN).to_string();
    let elo = |name: &str| {
        game.header(name)
            .and_then(|v| v.trim().parse::<u32>().ok())
            .unwrap_or(0)
    };
    GameRecord::new(
        text("Date"),
        text("White"),
        elo("WhiteElo"),
        text("Black"),
        elo("BlackElo"),
        text("Result"),
    )
}
