//! Configuration file handling.
//!
//! Settings come from an optional TOML file; every section and key falls back
//! to a default so an empty or missing file is valid.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AtlasConfig {
    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub normalize: NormalizeConfig,

    #[serde(default)]
    pub categorize: CategorizeConfig,
}

/// Dataset loading settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// How long to wait for the dataset before giving up.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl IngestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Row normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Salary figures below this are read as thousands (`85` → `85000`).
    #[serde(default = "default_thousands_threshold")]
    pub thousands_threshold: f64,

    /// Fallback `salary_min = salary_avg * min_ratio`.
    #[serde(default = "default_min_ratio")]
    pub min_ratio: f64,

    /// Fallback `salary_max = salary_avg * max_ratio`.
    #[serde(default = "default_max_ratio")]
    pub max_ratio: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            thousands_threshold: default_thousands_threshold(),
            min_ratio: default_min_ratio(),
            max_ratio: default_max_ratio(),
        }
    }
}

fn default_thousands_threshold() -> f64 {
    1000.0
}

fn default_min_ratio() -> f64 {
    0.8
}

fn default_max_ratio() -> f64 {
    1.2
}

/// Title categorization settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorizeConfig {
    /// Report the richer title breakdown (software, management, research).
    #[serde(default)]
    pub detailed_tracks: bool,
}

impl AtlasConfig {
    /// Load configuration from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AtlasConfig = toml::from_str(content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AtlasConfig::default();
        assert_eq!(config.ingest.timeout(), Duration::from_secs(10));
        assert_eq!(config.normalize.thousands_threshold, 1000.0);
        assert_eq!(config.normalize.min_ratio, 0.8);
        assert_eq!(config.normalize.max_ratio, 1.2);
        assert!(!config.categorize.detailed_tracks);
    }

    #[test]
    fn test_partial_toml() {
        let config = AtlasConfig::from_toml_str(
            r#"
            [ingest]
            timeout_secs = 3

            [categorize]
            detailed_tracks = true
            "#,
        )
        .unwrap();
        assert_eq!(config.ingest.timeout_secs, 3);
        assert!(config.categorize.detailed_tracks);
        assert_eq!(config.normalize, NormalizeConfig::default());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(AtlasConfig::from_toml_str("").unwrap(), AtlasConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[normalize]\nmin_ratio = 0.5").unwrap();
        let config = AtlasConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.normalize.min_ratio, 0.5);
        assert_eq!(config.normalize.max_ratio, 1.2);
    }

    #[test]
    fn test_malformed_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ingest]\ntimeout_secs = \"soon\"").unwrap();
        assert!(AtlasConfig::load(Some(file.path())).is_err());
        assert!(AtlasConfig::load(None).is_ok());
    }
}
