//! Configuration for the projection engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use regfusion_common::FSAVERAGE_VERTICES;

use crate::error::{RegFusionError, Result};

/// Where mapping tables live and how they are checked and cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegFusionConfig {
    /// Directory holding the `{hemi}.avgMapping_allSub_*_to_fsaverage.txt` tables.
    pub mapping_dir: PathBuf,

    /// Vertices every mapping table must have.
    pub vertex_count: usize,

    /// Number of mapping tables kept in memory (0 disables the cache).
    pub mapping_cache_entries: usize,
}

impl Default for RegFusionConfig {
    fn default() -> Self {
        Self {
            mapping_dir: PathBuf::from("./mappings"),
            vertex_count: FSAVERAGE_VERTICES,
            mapping_cache_entries: 4,
        }
    }
}

impl RegFusionConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("REGFUSION_MAPPING_DIR") {
            config.mapping_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("REGFUSION_VERTEX_COUNT") {
            if let Ok(count) = val.parse() {
                config.vertex_count = count;
            }
        }

        if let Ok(val) = std::env::var("REGFUSION_MAPPING_CACHE") {
            if let Ok(entries) = val.parse() {
                config.mapping_cache_entries = entries;
            }
        }

        config
    }

    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| RegFusionError::Settings(format!("invalid YAML: {}", e)))
    }

    /// Load a YAML configuration file.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RegFusionError::Settings(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn with_mapping_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mapping_dir = dir.into();
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.vertex_count == 0 {
            return Err(RegFusionError::Settings(
                "vertex_count must be > 0".to_string(),
            ));
        }

        if self.mapping_dir.as_os_str().is_empty() {
            return Err(RegFusionError::Settings(
                "mapping_dir must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
