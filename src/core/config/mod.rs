//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first hit wins:
//! 1. An explicit `--config <path>` (must exist)
//! 2. `$OPENBOOK_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/openbook/config.toml`
//! 4. `~/.openbook/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use openbook::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Data dir: {}", config.data_dir().display());
//! println!("Engine: {}", config.engine_path().display());
//! ```

pub mod schema;

pub use schema::{ConfigFile, EngineConfig, EvaluateConfig, ImportConfig, PopulateConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default engine executable.
pub const DEFAULT_ENGINE_PATH: &str = "/usr/bin/stockfish";
/// Default forced-mate clamp.
pub const DEFAULT_MATE_SCORE: i32 = 100_000;
/// Default opening-book recursion limit in plies.
pub const DEFAULT_MAX_DEPTH: usize = 25;
/// Default Elo from which a player's moves count as theory.
pub const DEFAULT_THEORY_ELO: u32 = 2500;
/// Default mainline plies read per imported game: the book depth limit
/// plus the two plies a game keeps going past it.
pub const DEFAULT_IMPORT_MAX_PLIES: usize = DEFAULT_MAX_DEPTH + 2;
/// Default grace period past the search budget.
pub const DEFAULT_RESPONSE_GRACE_MS: u64 = 5_000;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with accessor defaults applied.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Raw file contents
    pub file: ConfigFile,
    /// Path the file was loaded from, if any
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise the standard locations are
    /// searched and defaults are used when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed or
    /// fails validation.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::from_file(path);
        }

        match Self::discover() {
            Some(path) => Self::from_file(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load and validate one config file.
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        Ok(Config {
            file,
            loaded_from: Some(path.to_path_buf()),
        })
    }

    /// Find the first existing config file in the standard locations.
    fn discover() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("OPENBOOK_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("openbook/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".openbook/config.toml"))
            .filter(|path| path.exists())
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `~/.openbook/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".openbook/config.toml"))
    }

    /// Serialize `file` to `path` through a sibling temp file and a rename.
    ///
    /// Missing parent directories are created.
    pub fn write_atomic(path: &Path, file: &ConfigFile) -> Result<(), ConfigError> {
        let write_err = |at: &Path| {
            let path = at.to_path_buf();
            move |source| ConfigError::WriteError { path, source }
        };

        let contents =
            toml::to_string_pretty(file).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err(parent))?;
        }

        let temp_path = path.with_extension("toml.tmp");
        let mut out = fs::File::create(&temp_path).map_err(write_err(&temp_path))?;
        out.write_all(contents.as_bytes())
            .and_then(|()| out.sync_all())
            .map_err(write_err(&temp_path))?;
        fs::rename(&temp_path, path).map_err(write_err(path))
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Directory holding the store.
    ///
    /// Defaults to `~/.openbook/data`, or `.openbook/data` when there is no
    /// home directory.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.file.data_dir {
            return dir.clone();
        }
        dirs::home_dir()
            .map(|home| home.join(".openbook/data"))
            .unwrap_or_else(|| PathBuf::from(".openbook/data"))
    }

    /// Engine executable. Defaults to `/usr/bin/stockfish`.
    pub fn engine_path(&self) -> PathBuf {
        self.file
            .engine
            .as_ref()
            .and_then(|e| e.path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENGINE_PATH))
    }

    /// `Threads` option, left to the engine when unset.
    pub fn engine_threads(&self) -> Option<u32> {
        self.file.engine.as_ref().and_then(|e| e.threads)
    }

    /// `Hash` option, left to the engine when unset.
    pub fn engine_hash_mb(&self) -> Option<u32> {
        self.file.engine.as_ref().and_then(|e| e.hash_mb)
    }

    /// Grace period past the search budget. Defaults to 5 seconds.
    pub fn response_grace_ms(&self) -> u64 {
        self.file
            .engine
            .as_ref()
            .and_then(|e| e.response_grace_ms)
            .unwrap_or(DEFAULT_RESPONSE_GRACE_MS)
    }

    /// Forced-mate clamp. Defaults to 100000.
    pub fn mate_score(&self) -> i32 {
        self.file
            .engine
            .as_ref()
            .and_then(|e| e.mate_score)
            .unwrap_or(DEFAULT_MATE_SCORE)
    }

    /// Opening-book recursion limit. Defaults to 25 plies.
    pub fn populate_max_depth(&self) -> usize {
        self.file
            .populate
            .as_ref()
            .and_then(|p| p.max_depth)
            .unwrap_or(DEFAULT_MAX_DEPTH)
    }

    /// Theory Elo threshold for PGN import. Defaults to 2500.
    pub fn theory_elo(&self) -> u32 {
        self.file
            .import
            .as_ref()
            .and_then(|i| i.theory_elo)
            .unwrap_or(DEFAULT_THEORY_ELO)
    }

    /// Plies read per imported game. Defaults to [`DEFAULT_IMPORT_MAX_PLIES`].
    pub fn import_max_plies(&self) -> usize {
        self.file
            .import
            .as_ref()
            .and_then(|i| i.max_plies)
            .unwrap_or(DEFAULT_IMPORT_MAX_PLIES)
    }

    /// Score for an unscored root. Defaults to 0.
    pub fn root_score(&self) -> i32 {
        self.file
            .evaluate
            .as_ref()
            .and_then(|e| e.root_score)
            .unwrap_or(0)
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }

    // =========================================================================
    // Dotted-key access for `ob config`
    // =========================================================================

    /// Effective value of a dotted key, defaults included.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "data_dir" => self.data_dir().display().to_string(),
            "engine.path" => self.engine_path().display().to_string(),
            "engine.threads" => optional(self.engine_threads()),
            "engine.hash_mb" => optional(self.engine_hash_mb()),
            "engine.response_grace_ms" => self.response_grace_ms().to_string(),
            "engine.mate_score" => self.mate_score().to_string(),
            "populate.max_depth" => self.populate_max_depth().to_string(),
            "import.theory_elo" => self.theory_elo().to_string(),
            "import.max_plies" => self.import_max_plies().to_string(),
            "evaluate.root_score" => self.root_score().to_string(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    /// Every key with its effective value.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).ok().map(|value| (*key, value)))
            .collect()
    }

    /// Set a dotted key in the file contents and re-validate.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let file = &mut self.file;
        match key {
            "data_dir" => file.data_dir = Some(PathBuf::from(value)),
            "engine.path" => engine(file).path = Some(PathBuf::from(value)),
            "engine.threads" => engine(file).threads = Some(parse(key, value)?),
            "engine.hash_mb" => engine(file).hash_mb = Some(parse(key, value)?),
            "engine.response_grace_ms" => {
                engine(file).response_grace_ms = Some(parse(key, value)?)
            }
            "engine.mate_score" => engine(file).mate_score = Some(parse(key, value)?),
            "populate.max_depth" => {
                file.populate.get_or_insert_with(Default::default).max_depth =
                    Some(parse(key, value)?)
            }
            "import.theory_elo" => {
                file.import.get_or_insert_with(Default::default).theory_elo =
                    Some(parse(key, value)?)
            }
            "import.max_plies" => {
                file.import.get_or_insert_with(Default::default).max_plies =
                    Some(parse(key, value)?)
            }
            "evaluate.root_score" => {
                file.evaluate.get_or_insert_with(Default::default).root_score =
                    Some(parse(key, value)?)
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        self.file.validate()
    }
}

/// Keys understood by [`Config::get`] and [`Config::set`].
pub const KEYS: &[&str] = &[
    "data_dir",
    "engine.path",
    "engine.threads",
    "engine.hash_mb",
    "engine.response_grace_ms",
    "engine.mate_score",
    "populate.max_depth",
    "import.theory_elo",
    "import.max_plies",
    "evaluate.root_score",
];

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn engine(file: &mut ConfigFile) -> &mut EngineConfig {
    file.engine.get_or_insert_with(Default::default)
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("{key}: '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_without_file() {
        let config = Config::default();
        assert_eq!(config.engine_path(), PathBuf::from(DEFAULT_ENGINE_PATH));
        assert_eq!(config.mate_score(), 100_000);
        assert_eq!(config.populate_max_depth(), 25);
        assert_eq!(config.theory_elo(), 2500);
        assert_eq!(config.import_max_plies(), 27);
        assert_eq!(config.root_score(), 0);
        assert!(config.engine_threads().is_none());
        assert!(config.loaded_from().is_none());
    }

    #[test]
    fn explicit_path_is_loaded() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            data_dir = "/srv/openbook"

            [engine]
            path = "/opt/sf"
            "#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("/srv/openbook"));
        assert_eq!(config.engine_path(), PathBuf::from("/opt/sf"));
        assert_eq!(config.loaded_from(), Some(path.as_path()));
    }

    #[test]
    fn explicit_missing_path_is_error() {
        let temp = TempDir::new().unwrap();
        let result = Config::load(Some(&temp.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn unknown_fields_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "unknown_field = true").unwrap();

        let result = Config::from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn invalid_values_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[engine]\nthreads = 0").unwrap();

        let result = Config::from_file(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn dotted_keys_get_and_set() {
        let mut config = Config::default();
        assert_eq!(config.get("engine.mate_score").unwrap(), "100000");
        assert_eq!(config.get("engine.threads").unwrap(), "");

        config.set("engine.threads", "4").unwrap();
        config.set("import.theory_elo", "2400").unwrap();
        assert_eq!(config.engine_threads(), Some(4));
        assert_eq!(config.get("import.theory_elo").unwrap(), "2400");

        assert!(matches!(
            config.set("engine.threads", "many"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            config.set("engine.threads", "0"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(config.get("nope"), Err(ConfigError::UnknownKey(_))));
        assert_eq!(config.entries().len(), KEYS.len());
    }

    #[test]
    fn write_atomic_roundtrips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.toml");

        let file = ConfigFile {
            populate: Some(PopulateConfig {
                max_depth: Some(8),
            }),
            ..Default::default()
        };
        Config::write_atomic(&path, &file).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.populate_max_depth(), 8);
        assert!(!path.with_extension("toml.tmp").exists());
    }
}
