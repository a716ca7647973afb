//! Configuration file loading for the summary tool.
//!
//! Settings come from an optional TOML file; command-line arguments
//! override them.

use crate::aggregator::STANDARD_KOMI;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Virtual draws per player against a prior-rated opponent.
///
/// Keeps every rating finite when a player won or lost all their games.
pub const DEFAULT_VIRTUAL_DRAWS: f64 = 1.0;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// The komi bounds are reversed or not finite.
    #[error("Invalid komi range: {0} to {1}")]
    InvalidKomiRange(f64, f64),
}

/// Settings for one summary run.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SummaryConfig {
    /// Directories (or single record files) to ingest.
    #[serde(default)]
    pub input_dirs: Vec<PathBuf>,
    /// Scan subdirectories as well.
    #[serde(default)]
    pub recursive: bool,
    /// Mean Elo of all rated players.
    #[serde(default)]
    pub prior_elo: f64,
    /// Smallest komi of a standard game.
    #[serde(default = "default_komi_min")]
    pub komi_min: f64,
    /// Largest komi of a standard game.
    #[serde(default = "default_komi_max")]
    pub komi_max: f64,
    /// Virtual draws per player against a `prior_elo` opponent.
    /// Zero disables the regularization.
    #[serde(default = "default_virtual_draws")]
    pub virtual_draws: f64,
}

fn default_komi_min() -> f64 {
    *STANDARD_KOMI.start()
}

fn default_komi_max() -> f64 {
    *STANDARD_KOMI.end()
}

fn default_virtual_draws() -> f64 {
    DEFAULT_VIRTUAL_DRAWS
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            input_dirs: Vec::new(),
            recursive: false,
            prior_elo: 0.0,
            komi_min: default_komi_min(),
            komi_max: default_komi_max(),
            virtual_draws: DEFAULT_VIRTUAL_DRAWS,
        }
    }
}

impl SummaryConfig {
    /// Loads the configuration from [`Self::config_path()`].
    ///
    /// Returns the default configuration if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads the configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.komi_range()?;
        Ok(config)
    }

    /// Returns the path to the default configuration file.
    ///
    /// Currently returns `sgf-summary.toml` in the current working directory.
    pub fn config_path() -> PathBuf {
        PathBuf::from("sgf-summary.toml")
    }

    /// The komi range of a standard game.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidKomiRange`] if the bounds are reversed
    /// or not finite.
    pub fn komi_range(&self) -> Result<RangeInclusive<f64>, ConfigError> {
        if !self.komi_min.is_finite() || !self.komi_max.is_finite() || self.komi_min > self.komi_max
        {
            return Err(ConfigError::InvalidKomiRange(self.komi_min, self.komi_max));
        }
        Ok(self.komi_min..=self.komi_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_toml_config() {
        let toml_content = r#"
input_dirs = ["matches/2024", "matches/2025"]
recursive = true
prior_elo = 3400.0
komi_min = 6.5
komi_max = 7.5
virtual_draws = 1.0
"#;

        let config: SummaryConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(
            config.input_dirs,
            vec![PathBuf::from("matches/2024"), PathBuf::from("matches/2025")]
        );
        assert!(config.recursive);
        assert_eq!(config.prior_elo, 3400.0);
        assert_eq!(config.komi_range().unwrap(), 6.5..=7.5);
        assert_eq!(config.virtual_draws, 1.0);
    }

    #[test]
    fn test_empty_config_defaults() {
        let config: SummaryConfig = toml::from_str("").unwrap();

        assert_eq!(config, SummaryConfig::default());
        assert!(config.input_dirs.is_empty());
        assert!(!config.recursive);
        assert_eq!(config.prior_elo, 0.0);
        assert_eq!(config.komi_range().unwrap(), 5.5..=7.5);
        assert_eq!(config.virtual_draws, DEFAULT_VIRTUAL_DRAWS);
        assert!(config.virtual_draws > 0.0);
    }

    #[test]
    fn test_virtual_draws_can_be_disabled() {
        let config: SummaryConfig = toml::from_str("virtual_draws = 0.0").unwrap();
        assert_eq!(config.virtual_draws, 0.0);
    }

    #[test]
    fn test_default_config_rates_one_sided_result() {
        use crate::report::estimate_ratings;
        use crate::table::{OutcomeRecord, PairwiseTable};
        use bayes_elo::BayesElo;

        let config = SummaryConfig::default();
        let mut table = PairwiseTable::new();
        *table.record_mut("Alice", "Bob") += OutcomeRecord {
            wins: 1,
            losses: 0,
            draws: 0,
        };

        let report = estimate_ratings(
            &BayesElo::default(),
            &table,
            config.prior_elo,
            config.virtual_draws,
        )
        .expect("default settings should rate a one-sided result");
        let alice = report.get("Alice").unwrap();
        let bob = report.get("Bob").unwrap();
        assert!(alice.elo.is_finite() && bob.elo.is_finite());
        assert!(alice.elo > bob.elo);
        assert!((report.mean_elo() - config.prior_elo).abs() < 1e-3);
    }

    #[test]
    fn test_reversed_komi_range_is_rejected() {
        let config: SummaryConfig = toml::from_str("komi_min = 8.0\nkomi_max = 6.0").unwrap();
        assert!(matches!(
            config.komi_range(),
            Err(ConfigError::InvalidKomiRange(_, _))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.toml");
        std::fs::write(&path, "prior_elo = 1200.0\n").unwrap();

        let config = SummaryConfig::load_from(&path).unwrap();
        assert_eq!(config.prior_elo, 1200.0);
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.toml");
        std::fs::write(&path, "prior_elo = [").unwrap();

        assert!(matches!(
            SummaryConfig::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            SummaryConfig::load_from(&dir.path().join("absent.toml")),
            Err(ConfigError::ReadError(_))
        ));
    }

    #[test]
    fn test_config_path_returns_expected_path() {
        assert_eq!(SummaryConfig::config_path(), PathBuf::from("sgf-summary.toml"));
    }

    #[test]
    fn test_load_returns_default_when_file_does_not_exist() {
        // Either loads an existing file or falls back to defaults; must not panic.
        let result = SummaryConfig::load();
        assert!(result.is_ok());
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = SummaryConfig {
            input_dirs: vec![PathBuf::from("games")],
            recursive: true,
            prior_elo: 100.0,
            ..SummaryConfig::default()
        };

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: SummaryConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized, config);
    }
}
