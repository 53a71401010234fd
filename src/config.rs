//! Runtime configuration for the terminal binary.
//!
//! Values come from an optional JSON file named by `BLOCKFALL_CONFIG`, then
//! from individual environment variables, which win over the file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::{GameConfig, Randomizer};
use crate::types::CLEAR_DELAY_MS;

pub const CONFIG_VAR: &str = "BLOCKFALL_CONFIG";
pub const SEED_VAR: &str = "BLOCKFALL_SEED";
pub const RANDOMIZER_VAR: &str = "BLOCKFALL_RANDOMIZER";
pub const CLEAR_DELAY_VAR: &str = "BLOCKFALL_CLEAR_DELAY_MS";
pub const LOG_PATH_VAR: &str = "BLOCKFALL_LOG_PATH";

/// Contents of a JSON config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub seed: Option<u32>,
    pub randomizer: Option<String>,
    pub clear_delay_ms: Option<u32>,
    pub log_path: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("malformed config JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("in config file {}", path.display()))
    }
}

/// Binary configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `None` seeds from the clock at startup
    pub seed: Option<u32>,
    pub randomizer: Randomizer,
    pub clear_delay_ms: u32,
    /// Log to this file instead of stderr
    pub log_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            randomizer: Randomizer::Uniform,
            clear_delay_ms: CLEAR_DELAY_MS,
            log_path: None,
        }
    }
}

impl Config {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let lookup = |name: &str| {
            var(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let mut config = Self::default();

        if let Some(path) = lookup(CONFIG_VAR) {
            config.merge(FileConfig::load(Path::new(&path))?)?;
        }

        if let Some(seed) = lookup(SEED_VAR) {
            config.seed = Some(
                seed.parse()
                    .with_context(|| format!("invalid {SEED_VAR} value {seed:?}"))?,
            );
        }
        if let Some(name) = lookup(RANDOMIZER_VAR) {
            config.randomizer = parse_randomizer(&name)
                .with_context(|| format!("invalid {RANDOMIZER_VAR} value"))?;
        }
        if let Some(delay) = lookup(CLEAR_DELAY_VAR) {
            config.clear_delay_ms = delay
                .parse()
                .with_context(|| format!("invalid {CLEAR_DELAY_VAR} value {delay:?}"))?;
        }
        if let Some(path) = lookup(LOG_PATH_VAR) {
            config.log_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Apply the fields present in `file`.
    pub fn merge(&mut self, file: FileConfig) -> Result<()> {
        if let Some(seed) = file.seed {
            self.seed = Some(seed);
        }
        if let Some(name) = file.randomizer {
            self.randomizer = parse_randomizer(&name).context("invalid randomizer in config file")?;
        }
        if let Some(delay) = file.clear_delay_ms {
            self.clear_delay_ms = delay;
        }
        if file.log_path.is_some() {
            self.log_path = file.log_path;
        }
        Ok(())
    }

    /// Engine settings, resolving a missing seed from the clock.
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            seed: self.seed.unwrap_or_else(clock_seed),
            randomizer: self.randomizer,
            clear_delay_ms: self.clear_delay_ms,
        }
    }
}

fn parse_randomizer(name: &str) -> Result<Randomizer> {
    Randomizer::from_str(name)
        .ok_or_else(|| anyhow!("unknown randomizer {name:?} (expected `uniform` or `bag`)"))
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
        .unwrap_or(1)
}
