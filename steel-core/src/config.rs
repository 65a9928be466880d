//! World generation config, read from a json5 file next to the binary.

use std::{fs, io, path::Path};

use log::info;
use serde::Deserialize;
use steel_utils::{ResourceLocation, random::java_string_hash};
use thiserror::Error;

use crate::biome::{self, BiomeRef, BiomeSource};

const DEFAULT_CONFIG: &str = include_str!("../../package-content/worldgen_config.json5");

/// Most worker threads a config may ask for.
pub const MAX_THREADS: usize = 256;

/// Why a config could not be used.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json5::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings for a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorldgenConfig {
    /// Numeric seeds are used as is, anything else is hashed.
    pub seed: String,
    /// Chunks generated in every direction around the origin.
    pub radius: i32,
    /// Worker threads, `0` for one per core.
    pub threads: usize,
    /// Fills caves and oceans from the aquifer noises.
    pub aquifers_enabled: bool,
    /// Places copper and iron veins.
    pub ore_veins_enabled: bool,
    /// Seeds with the legacy LCG instead of xoroshiro.
    pub legacy_random_source: bool,
    /// Generates a single biome everywhere instead of the multi-noise layout.
    pub biome: Option<ResourceLocation>,
}

impl WorldgenConfig {
    /// Reads the config at `path`, writing the default file first when none
    /// exists.
    pub fn load_or_create(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let config = Self::parse(&fs::read_to_string(path)?)?;
            info!("Loaded world generation config from {}", path.display());
            config
        } else {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, DEFAULT_CONFIG)?;
            info!("Created default world generation config at {}", path.display());
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses JSON5 config text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json5::from_str(text)?)
    }

    /// Rejects out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radius < 0 {
            return Err(ConfigError::Invalid("radius must not be negative".to_owned()));
        }
        if self.threads > MAX_THREADS {
            return Err(ConfigError::Invalid(format!(
                "threads must be at most {MAX_THREADS}"
            )));
        }
        self.fixed_biome()?;
        Ok(())
    }

    /// The world seed. Strings that are not an `i64` use their Java string
    /// hash, like the vanilla world creation screen.
    #[must_use]
    pub fn seed(&self) -> u64 {
        let seed = self.seed.trim();
        seed.parse::<i64>()
            .unwrap_or_else(|_| i64::from(java_string_hash(seed))) as u64
    }

    fn fixed_biome(&self) -> Result<Option<BiomeRef>, ConfigError> {
        self.biome
            .as_ref()
            .map(|key| {
                biome::by_key(key)
                    .map_err(|_| ConfigError::Invalid(format!("unknown biome {key}")))
            })
            .transpose()
    }

    /// The biome source this config asks for.
    pub fn biome_source(&self) -> Result<BiomeSource, ConfigError> {
        Ok(self
            .fixed_biome()?
            .map_or_else(BiomeSource::overworld, BiomeSource::Fixed))
    }

    /// Number of chunks the configured square covers.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        let side = (2 * i64::from(self.radius.max(0)) + 1) as usize;
        side * side
    }
}

impl Default for WorldgenConfig {
    fn default() -> Self {
        Self {
            seed: String::new(),
            radius: 8,
            threads: 0,
            aquifers_enabled: true,
            ore_veins_enabled: true,
            legacy_random_source: false,
            biome: None,
        }
    }
}
