use std::path::Path;

use serde::Deserialize;

use crate::error::Error;
use crate::stats::LONGEST_RUN_BLOCK_LEN;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/bitseq.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fixed seed; when unset the generator is seeded from wall-clock seconds.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub significance: f64,
    pub bits: i64,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            significance: 0.01,
            bits: 128,
        }
    }
}

impl CheckConfig {
    /// Clamp fields to valid ranges.
    pub fn validate(&mut self) {
        if !self.significance.is_finite() {
            self.significance = CheckConfig::default().significance;
        }
        self.significance = self.significance.clamp(0.0001, 0.5);
        self.bits = self.bits.clamp(LONGEST_RUN_BLOCK_LEN as i64, 1_000_000);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub check: CheckConfig,
}

/// Load configuration from a TOML file.
///
/// - If `explicit_path` is `Some` and the file is missing, returns an error.
/// - If `explicit_path` is `None`, tries `/etc/bitseq.toml`; if missing, returns defaults.
pub fn load_config(explicit_path: Option<&Path>) -> Result<Config, Error> {
    let path = match explicit_path {
        Some(p) => {
            if !p.exists() {
                return Err(Error::InvalidArgs(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p.to_path_buf()
        }
        None => {
            let default = Path::new(DEFAULT_CONFIG_PATH);
            if !default.exists() {
                return Ok(Config::default());
            }
            default.to_path_buf()
        }
    };

    let contents = std::fs::read_to_string(&path).map_err(|e| {
        Error::InvalidArgs(format!("failed to read config {}: {}", path.display(), e))
    })?;

    let config: Config = toml::from_str(&contents).map_err(|e| {
        Error::InvalidArgs(format!("failed to parse config {}: {}", path.display(), e))
    })?;

    log::debug!("loaded config from {}", path.display());
    Ok(config)
}
