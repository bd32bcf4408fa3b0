//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing so that a bad file fails at
//! load time rather than halfway through a crawl.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Configuration file contents.
///
/// # Example
///
/// ```toml
/// data_dir = "/var/lib/openbook"
///
/// [engine]
/// path = "/usr/bin/stockfish"
/// threads = 2
/// hash_mb = 256
///
/// [populate]
/// max_depth = 25
///
/// [import]
/// theory_elo = 2500
/// max_plies = 25
///
/// [evaluate]
/// root_score = 0
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory holding the position store
    pub data_dir: Option<PathBuf>,

    /// Analysis engine settings
    pub engine: Option<EngineConfig>,

    /// Opening-book import settings
    pub populate: Option<PopulateConfig>,

    /// PGN import settings
    pub import: Option<ImportConfig>,

    /// Evaluation crawl settings
    pub evaluate: Option<EvaluateConfig>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "data_dir cannot be empty".to_string(),
                ));
            }
        }
        if let Some(engine) = &self.engine {
            engine.validate()?;
        }
        if let Some(populate) = &self.populate {
            populate.validate()?;
        }
        Ok(())
    }
}

/// UCI engine settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Engine executable
    pub path: Option<PathBuf>,

    /// `Threads` UCI option
    pub threads: Option<u32>,

    /// `Hash` UCI option in megabytes
    pub hash_mb: Option<u32>,

    /// Extra time allowed past the search budget before the engine is
    /// considered unresponsive
    pub response_grace_ms: Option<u64>,

    /// Magnitude that forced mates are clamped to
    pub mate_score: Option<i32>,
}

impl EngineConfig {
    /// Validate the engine section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "engine.path cannot be empty".to_string(),
                ));
            }
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidValue(
                "engine.threads must be at least 1".to_string(),
            ));
        }
        if let Some(mate) = self.mate_score {
            if mate < 1000 {
                return Err(ConfigError::InvalidValue(format!(
                    "engine.mate_score {} is too small to separate mates from evaluations",
                    mate
                )));
            }
        }
        Ok(())
    }
}

/// Opening-book import settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PopulateConfig {
    /// Maximum recursion depth in plies
    pub max_depth: Option<usize>,
}

impl PopulateConfig {
    /// Validate the populate section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == Some(0) {
            return Err(ConfigError::InvalidValue(
                "populate.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// PGN import settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Minimum Elo for a player's moves to count as theory
    pub theory_elo: Option<u32>,

    /// Plies read from each game
    pub max_plies: Option<usize>,
}

/// Evaluation crawl settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EvaluateConfig {
    /// Score given to an unscored root before evaluation starts
    pub root_score: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_parses_to_default() {
        let parsed: ConfigFile = toml::from_str("").unwrap();
        assert_eq!(parsed, ConfigFile::default());
        parsed.validate().unwrap();
    }

    #[test]
    fn full_file_parses() {
        let parsed: ConfigFile = toml::from_str(
            r#"
            data_dir = "/tmp/ob"

            [engine]
            path = "/usr/local/bin/stockfish"
            threads = 4
            mate_score = 30000

            [populate]
            max_depth = 12

            [import]
            theory_elo = 2400

            [evaluate]
            root_score = 15
            "#,
        )
        .unwrap();

        parsed.validate().unwrap();
        assert_eq!(parsed.engine.as_ref().unwrap().threads, Some(4));
        assert_eq!(parsed.populate.as_ref().unwrap().max_depth, Some(12));
        assert_eq!(parsed.evaluate.as_ref().unwrap().root_score, Some(15));
    }

    #[test]
    fn zero_threads_rejected() {
        let parsed: ConfigFile = toml::from_str("[engine]\nthreads = 0").unwrap();
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn small_mate_score_rejected() {
        let parsed: ConfigFile = toml::from_str("[engine]\nmate_score = 10").unwrap();
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn zero_depth_rejected() {
        let parsed: ConfigFile = toml::from_str("[populate]\nmax_depth = 0").unwrap();
        assert!(parsed.validate().is_err());
    }

    #[test]
    fn unknown_field_rejected() {
        let parsed: Result<ConfigFile, _> = toml::from_str("[engine]\nflavour = \"x\"");
        assert!(parsed.is_err());
    }
}
