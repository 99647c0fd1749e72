//! TOML configuration
//!
//! ```toml
//! [board]
//! model = "pi4"              # optional, detected when absent
//!
//! [gpio]
//! duplicate_check = "strict" # warn (default), strict or off
//! poll_interval_ms = 50
//! edge = "re"
//! pull = "up"
//! indexing = "pin"
//! initial_level = false
//! ```

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use gpiomux_core::{BoardModel, GpioOptions};
use gpiomux_drivers::BoardConfig;

/// `[board]` section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BoardSection {
    /// Board model override
    pub model: Option<BoardModel>,
}

/// Library configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub board: BoardSection,
    /// Defaults for pins opened without explicit options
    pub gpio: GpioOptions,
}

impl Config {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("Failed to parse gpiomux configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Check values serde cannot
    pub fn validate(&self) -> Result<()> {
        if self.gpio.poll_interval_ms == Some(0) {
            bail!("gpio.poll_interval_ms must be greater than 0");
        }
        Ok(())
    }

    /// Board configuration, with `detected` unless the model is overridden
    pub fn board_config(&self, detected: BoardModel) -> BoardConfig {
        BoardConfig {
            model: self.board.model.unwrap_or(detected),
            gpio: self.gpio,
        }
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).context("Failed to serialize gpiomux configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpiomux_core::{DuplicateCheck, Edge, Indexing};
    use gpiomux_hal::Pull;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_full_document() {
        let config = Config::from_toml_str(
            r#"
            [board]
            model = "pi_zero2"

            [gpio]
            duplicate_check = "strict"
            poll_interval_ms = 50
            edge = "re"
            pull = "up"
            indexing = "pin"
            initial_level = true
            "#,
        )
        .unwrap();
        assert_eq!(config.board.model, Some(BoardModel::PiZero2));
        assert_eq!(config.gpio.duplicate_check, Some(DuplicateCheck::Strict));
        assert_eq!(config.gpio.poll_interval_ms, Some(50));
        assert_eq!(config.gpio.edge, Edge::Rising);
        assert_eq!(config.gpio.pull, Pull::Up);
        assert_eq!(config.gpio.indexing, Indexing::Pin);
        assert!(config.gpio.initial_level);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = Config::from_toml_str("[gpio]\npoll_interval_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!(Config::from_toml_str("[gpio]\nedge = \"sideways\"\n").is_err());
        assert!(Config::from_toml_str("[gpio]\nduplicate_check = \"maybe\"\n").is_err());
        assert!(Config::from_toml_str("[board]\nmodel = \"pi9\"\n").is_err());
        assert!(Config::from_toml_str("[extra]\n").is_err());
    }

    #[test]
    fn test_model_override() {
        let config = Config::from_toml_str("[board]\nmodel = \"pi400\"\n").unwrap();
        assert_eq!(config.board_config(BoardModel::Pi3).model, BoardModel::Pi400);
        let config = Config::default();
        assert_eq!(config.board_config(BoardModel::Pi3).model, BoardModel::Pi3);
    }

    #[test]
    fn test_round_trip_through_text() {
        let config = Config::from_toml_str("[gpio]\npull = \"down\"\n").unwrap();
        let text = config.to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file_has_path_context() {
        let err = Config::from_path(Path::new("/nonexistent/gpiomux.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/gpiomux.toml"));
    }
}
