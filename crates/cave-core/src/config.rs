//! Configuration System
//!
//! Loads game parameters from a TOML file. Every field has a default, so an
//! empty file describes the standard 5x5 cave.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigurationError;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "cave.toml";

/// Complete game configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Grid and hazard placement
    #[serde(default)]
    pub world: WorldConfig,
    /// Explorer starting status
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

impl GameConfig {
    /// Standard configuration with a custom grid.
    pub fn with_grid(grid_size: usize, pit_count: usize) -> Self {
        Self {
            world: WorldConfig {
                grid_size,
                pit_count,
            },
            ..Self::default()
        }
    }

    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks that a session can be created from this configuration.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.world.validate()?;
        if self.explorer.starting_lives == 0 {
            return Err(ConfigurationError::NoLives);
        }
        Ok(())
    }
}

/// Grid and hazard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Number of pits placed at random
    pub pit_count: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid_size: 5,
            pit_count: 3,
        }
    }
}

impl WorldConfig {
    /// Largest accepted grid side.
    pub const MAX_GRID_SIZE: usize = 256;

    /// Cells needed for entrance, beast, treasure and pits, or `None` if
    /// the count does not fit in a `usize`.
    pub fn required_cells(&self) -> Option<usize> {
        self.pit_count.checked_add(3)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.grid_size == 0 {
            return Err(ConfigurationError::EmptyGrid);
        }
        if self.grid_size > Self::MAX_GRID_SIZE {
            return Err(ConfigurationError::GridTooLarge {
                grid_size: self.grid_size,
                max: Self::MAX_GRID_SIZE,
            });
        }
        let available = self.grid_size * self.grid_size;
        let required = self.required_cells().unwrap_or(usize::MAX);
        if available < required {
            return Err(ConfigurationError::GridTooSmall {
                grid_size: self.grid_size,
                pit_count: self.pit_count,
                available,
                required,
            });
        }
        Ok(())
    }
}

/// Explorer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub starting_lives: u32,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self { starting_lives: 2 }
    }
}

/// Returns the default configuration as a TOML string.
pub fn default_config_toml() -> String {
    r#"# Cave hunt configuration

[world]
# Side length of the square grid; the entrance is always the top-left cell
grid_size = 5
# Pits placed at random alongside one beast and one treasure
pit_count = 3

[explorer]
starting_lives = 2
"#
    .to_string()
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigurationError),
}
