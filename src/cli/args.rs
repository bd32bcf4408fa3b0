//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--data-dir <path>`: Use this store instead of the configured one
//! - `--config <path>`: Load this config file
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//!
//! # Move Lines
//!
//! Commands that address a position take the moves leading to it from the
//! initial position in UCI notation, either as separate arguments
//! (`e2e4 c7c6`) or as one comma/space separated string.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OpenBook - a persistent chess opening graph with engine-scored moves
#[derive(Parser, Debug)]
#[command(name = "ob")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Store directory (overrides `data_dir` from the config)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Config file to load instead of the standard locations
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    // ========== Crawls ==========
    /// Seed the graph with theory moves from a Polyglot book
    #[command(
        name = "populate",
        long_about = "Seed the graph with theory moves from a Polyglot opening book.\n\n\
            Walks the book depth-first from the initial position and merges every \
            book move into the graph as a theory edge. Casual edges the book knows \
            are promoted to theory, keeping their scores. Re-running adds nothing new.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Import a whole book
    ob populate --book Titans.bin

    # Only the Caro-Kann
    ob populate --book Titans.bin --moves e2e4,c7c6

    # Shallow import
    ob populate --book Titans.bin --max-depth 8"
    )]
    Populate {
        /// Polyglot `.bin` book
        #[arg(long, value_name = "FILE")]
        book: PathBuf,

        /// Forced prefix: only follow these moves from the initial position
        #[arg(long, value_name = "LINE", default_value = "")]
        moves: String,

        /// Deepest ply to insert (defaults to `populate.max_depth`)
        #[arg(long)]
        max_depth: Option<usize>,
    },

    /// Score every reachable unscored move with the engine
    #[command(
        name = "evaluate",
        long_about = "Score every reachable unscored move with the engine.\n\n\
            Walks the graph from the initial position. At every scored node the \
            moves without a score are analysed and their destinations receive the \
            implied score. Moves below unscored nodes are deferred to a later run. \
            An unscored initial position first gets `evaluate.root_score`.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Evaluate everything
    ob evaluate

    # Only below 1. d4
    ob evaluate --moves d2d4

    # Check for anything the run could not reach
    ob troubleshoot"
    )]
    Evaluate {
        /// Forced prefix: only follow these moves from the initial position
        #[arg(long, value_name = "LINE", default_value = "")]
        moves: String,
    },

    /// Check that destination scores agree with move scores
    #[command(
        name = "troubleshoot",
        long_about = "Check that destination scores agree with move scores.\n\n\
            Every scored move implies a score for the position it leads to. \
            Destinations with no score are errors and can be repaired with \
            --adjust; destinations with a different score are reported only. \
            Moves themselves are never modified."
    )]
    Troubleshoot {
        /// Write the implied score into unscored destinations
        #[arg(long)]
        adjust: bool,

        /// Forced prefix: only follow these moves from the initial position
        #[arg(long, value_name = "LINE", default_value = "")]
        moves: String,
    },

    // ========== Single position ==========
    /// Analyse one position and store the scores
    #[command(
        name = "analyse",
        visible_alias = "analyze",
        long_about = "Analyse the position reached by a move line and store the scores.\n\n\
            With --candidates only those moves are scored. With --extend the engine \
            looks for good moves the graph does not know yet. Otherwise the engine's \
            top three moves are scored.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Top three moves after 1. e4
    ob analyse e2e4

    # Compare two replies
    ob analyse e2e4 --candidates e7e5,c7c6

    # Find new ideas in the starting position
    ob analyse --extend"
    )]
    Analyse {
        /// Moves from the initial position
        moves: Vec<String>,

        /// Score exactly these moves
        #[arg(long, value_name = "LINE", conflicts_with = "extend")]
        candidates: Option<String>,

        /// Look for moves beyond the known ones
        #[arg(long)]
        extend: bool,
    },

    /// Import games from a PGN file
    #[command(
        name = "import-pgn",
        long_about = "Import games from a PGN file.\n\n\
            Each new game is recorded and its mainline merged into the graph. Moves \
            by players rated at least `import.theory_elo` become theory; others \
            become casual moves. Games already recorded are skipped."
    )]
    ImportPgn {
        /// PGN file
        file: PathBuf,

        /// Games to read (0 reads all)
        #[arg(long, default_value_t = 0)]
        limit: usize,

        /// Plies per game (defaults to `import.max_plies`)
        #[arg(long)]
        max_plies: Option<usize>,

        /// Rating for theory moves (defaults to `import.theory_elo`)
        #[arg(long)]
        theory_elo: Option<u32>,
    },

    /// List known and book continuations for a position
    Suggest {
        /// Moves from the initial position
        moves: Vec<String>,

        /// Polyglot book for popularity suggestions
        #[arg(long, value_name = "FILE")]
        book: Option<PathBuf>,
    },

    /// Show a stored position
    Show {
        /// Moves from the initial position
        moves: Vec<String>,
    },

    /// Remove the last move of a line from the graph
    Unlink {
        /// Moves from the initial position; the last one is removed
        #[arg(required = true)]
        moves: Vec<String>,
    },

    /// Manage named positions
    Favorite {
        #[command(subcommand)]
        action: FavoriteAction,
    },

    // ========== Store ==========
    /// Count nodes and edges
    Stats,

    /// Remove every position from the store
    #[command(
        long_about = "Remove every position from the store.\n\n\
            Favorites and recorded games are kept. This cannot be undone."
    )]
    Wipe {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },

    // ========== Setup ==========
    /// Get, set, or list configuration values
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash (add to ~/.bashrc)
    source <(ob completion bash)

    # Zsh (add to ~/.zshrc)
    source <(ob completion zsh)

    # Fish
    ob completion fish > ~/.config/fish/completions/ob.fish"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Favorite subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum FavoriteAction {
    /// Name the position a move line reaches
    Add {
        name: String,
        /// Moves from the initial position
        moves: Vec<String>,
    },
    /// Forget a name
    Remove { name: String },
    /// List names
    List,
    /// Show the line behind a name
    Show { name: String },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
    /// List all configuration values
    List,
    /// Print the config file location
    Path,
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
