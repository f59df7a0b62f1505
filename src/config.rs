//! Project Configuration
//!
//! Handles parsing and management of nlu-datagen.toml configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ddd::Language;
use crate::rasa::generator::DEFAULT_OUTPUT_DIR;
use crate::rasa::GeneratorConfig;

/// File searched for by [`DatagenConfig::find_and_load`].
pub const CONFIG_FILE: &str = "nlu-datagen.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root configuration structure matching nlu-datagen.toml.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DatagenConfig {
    /// Project metadata
    #[serde(default)]
    pub project: ProjectConfig,

    /// Training data generation
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl DatagenConfig {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: DatagenConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the current directory or parents.
    pub fn load_from_cwd() -> ConfigResult<Self> {
        let cwd = std::env::current_dir().map_err(ConfigError::Io)?;
        Self::find_and_load(&cwd)
    }

    /// Find and load configuration by searching up from the given directory.
    /// Falls back to defaults when no nlu-datagen.toml is found.
    pub fn find_and_load(start_dir: &Path) -> ConfigResult<Self> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let config_path = dir.join(CONFIG_FILE);
            if config_path.exists() {
                return Self::load(&config_path);
            }
            if !dir.pop() {
                return Ok(Self::default());
            }
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Generator settings described by this file.
    pub fn generator_config(&self) -> GeneratorConfig {
        let generation = &self.generation;
        GeneratorConfig {
            max_examples_per_template: generation.max_examples_per_template,
            seed: generation.seed,
            output_dir: generation.output_dir.clone(),
            skip_answer_negation_for_strings: generation.skip_answer_negation_for_strings,
        }
    }
}

/// Project metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default)]
    pub name: String,

    /// Languages to generate; empty means every grammar the DDD ships
    #[serde(default)]
    pub languages: Vec<Language>,
}

/// Training data generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Examples kept per template (0 keeps all)
    #[serde(default = "default_max_examples")]
    pub max_examples_per_template: usize,

    /// Sampling seed
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Output root directory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_true")]
    pub skip_answer_negation_for_strings: bool,
}

fn default_max_examples() -> usize {
    500
}

fn default_seed() -> u64 {
    42
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

fn default_true() -> bool {
    true
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_examples_per_template: default_max_examples(),
            seed: default_seed(),
            output_dir: default_output_dir(),
            skip_answer_negation_for_strings: true,
        }
    }
}
