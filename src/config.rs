//! CLI configuration
//!
//! Read from `~/.idx-calc/config.toml` unless a path is given. A missing
//! file means defaults; a broken file is reported and then ignored.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};
use crate::exchange::constants::DEFAULT_LADDER_STEPS;
use crate::finance::fees::{FeeSchedule, CUSTOM_BROKER};
use crate::types::BoardType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_broker")]
    pub default_broker: String,
    #[serde(default)]
    pub default_board: BoardType,
    #[serde(default = "default_steps")]
    pub default_steps: usize,
    /// Buy rate used when the broker is `Custom`
    #[serde(default)]
    pub custom_buy_fee: f64,
    /// Sell rate used when the broker is `Custom`
    #[serde(default)]
    pub custom_sell_fee: f64,
}

fn default_broker() -> String {
    "Stockbit".to_string()
}

fn default_steps() -> usize {
    DEFAULT_LADDER_STEPS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_broker: default_broker(),
            default_board: BoardType::default(),
            default_steps: default_steps(),
            custom_buy_fee: 0.0,
            custom_sell_fee: 0.0,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".idx-calc").join("config.toml"))
    }

    pub fn load_from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).map_err(|e| EngineError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Self {
        let candidate = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path(),
        };

        match candidate {
            Some(p) if p.exists() => match Self::load_from_file(&p) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Failed to load config {}: {}", p.display(), e);
                    Config::default()
                }
            },
            Some(p) if path.is_some() => {
                log::warn!("Config file {} not found, using defaults", p.display());
                Config::default()
            }
            _ => Config::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        FeeSchedule::preset(&self.default_broker)?;
        FeeSchedule::new(self.custom_buy_fee, self.custom_sell_fee)?;
        Ok(())
    }

    /// Resolve a broker name (or the configured default) to a fee schedule
    pub fn fees_for(&self, broker: Option<&str>) -> Result<FeeSchedule> {
        let name = broker.unwrap_or(&self.default_broker);
        if name.trim().eq_ignore_ascii_case(CUSTOM_BROKER) {
            FeeSchedule::new(self.custom_buy_fee, self.custom_sell_fee)
        } else {
            FeeSchedule::preset(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::load_from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_steps, 6);
        assert_eq!(config.default_board, BoardType::Regular);
    }

    #[test]
    fn test_parse() {
        let config = Config::load_from_str(
            r#"
            default_broker = "IPOT"
            default_board = "accelerated"
            default_steps = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.default_broker, "IPOT");
        assert_eq!(config.default_board, BoardType::Accelerated);
        assert_eq!(config.default_steps, 10);
        assert_eq!(config.fees_for(None).unwrap().buy_rate, 0.0019);
    }

    #[test]
    fn test_custom_fees() {
        let config = Config::load_from_str(
            r#"
            default_broker = "Custom"
            custom_buy_fee = 0.001
            custom_sell_fee = 0.002
            "#,
        )
        .unwrap();
        let fees = config.fees_for(None).unwrap();
        assert_eq!(fees.buy_rate, 0.001);
        assert_eq!(fees.sell_rate, 0.002);
        assert_eq!(config.fees_for(Some("stockbit")).unwrap().sell_rate, 0.0025);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::load_from_str("default_broker = \"Nope\"").is_err());
        assert!(Config::load_from_str("custom_buy_fee = 2.0").is_err());
        assert!(Config::load_from_str("default_steps = \"many\"").is_err());
    }

    #[test]
    fn test_load_falls_back_to_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "default_broker = [").unwrap();
        assert_eq!(Config::load(Some(file.path())), Config::default());

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "default_steps = 3").unwrap();
        assert_eq!(Config::load(Some(file.path())).default_steps, 3);
    }
}
