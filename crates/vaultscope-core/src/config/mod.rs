//! Configuration management

use crate::agent::RetrievalOptions;
use crate::error::{Result, VaultscopeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "VAULTSCOPE_CONFIG";

/// Environment variable overriding the database location
pub const DB_ENV: &str = "VAULTSCOPE_DB";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Database file; falls back to the platform data directory
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Retrieval limits used by research runs
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Retrieval limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum vault chunks considered per run
    #[serde(default = "default_vault_limit")]
    pub vault_limit: usize,

    /// Maximum public-source chunks considered per run
    #[serde(default = "default_public_limit")]
    pub public_limit: usize,

    /// Cap on the merged chunk list
    #[serde(default = "default_max_total")]
    pub max_total: usize,
}

fn default_vault_limit() -> usize {
    RetrievalOptions::DEFAULT_VAULT_LIMIT
}

fn default_public_limit() -> usize {
    RetrievalOptions::DEFAULT_PUBLIC_LIMIT
}

fn default_max_total() -> usize {
    RetrievalOptions::DEFAULT_MAX_TOTAL
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            vault_limit: default_vault_limit(),
            public_limit: default_public_limit(),
            max_total: default_max_total(),
        }
    }
}

impl RetrievalConfig {
    /// Validate limits and convert into combiner options
    pub fn to_options(&self) -> Result<RetrievalOptions> {
        for (name, value) in [
            ("vault_limit", self.vault_limit),
            ("public_limit", self.public_limit),
            ("max_total", self.max_total),
        ] {
            if value == 0 {
                return Err(VaultscopeError::Config(format!(
                    "retrieval.{} must be at least 1",
                    name
                )));
            }
        }
        Ok(RetrievalOptions {
            vault_limit: self.vault_limit,
            public_limit: self.public_limit,
            max_total: self.max_total,
        })
    }
}

impl Config {
    /// Load config from the default path (or `VAULTSCOPE_CONFIG`)
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load config from an explicit path; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            tracing::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Resolve the database path: `VAULTSCOPE_DB`, then config, then the data dir
    pub fn database_path(&self) -> PathBuf {
        if let Ok(path) = std::env::var(DB_ENV) {
            return PathBuf::from(path);
        }
        self.database_path
            .clone()
            .unwrap_or_else(crate::db::Database::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_combiner() {
        let opts = RetrievalConfig::default().to_options().unwrap();
        assert_eq!(opts, RetrievalOptions::default());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("retrieval:\n  max_total: 5\n").unwrap();
        assert_eq!(config.retrieval.max_total, 5);
        assert_eq!(config.retrieval.vault_limit, 20);
        assert_eq!(config.retrieval.public_limit, 10);
        assert!(config.database_path.is_none());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let cfg = RetrievalConfig {
            vault_limit: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.to_options(), Err(VaultscopeError::Config(_))));
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(dir.path().join("absent.yml")).unwrap();
        assert_eq!(config.retrieval, RetrievalConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(
            &path,
            "database_path: /tmp/research.sqlite\nretrieval:\n  vault_limit: 3\n  public_limit: 1\n  max_total: 4\n",
        )
        .unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(
            loaded.retrieval,
            RetrievalConfig {
                vault_limit: 3,
                public_limit: 1,
                max_total: 4,
            }
        );
        assert_eq!(loaded.database_path, Some(PathBuf::from("/tmp/research.sqlite")));
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "retrieval: [not, a, map").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(VaultscopeError::Yaml(_))
        ));
    }
}
