// File: src/config.rs
// Purpose: Router configuration parsing from the [router] table of a TOML file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Router configuration
///
/// ```toml
/// [router]
/// cache_schemas = true
/// normalize_paths = false
/// clear_on_default = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Memoize resolved schemas per path (default: true)
    #[serde(default = "default_true")]
    pub cache_schemas: bool,

    /// Normalize `//`, `\` and trailing slashes before resolving (default: false)
    #[serde(default = "default_false")]
    pub normalize_paths: bool,

    /// Omit query values equal to their parser default when building URLs (default: true)
    #[serde(default = "default_true")]
    pub clear_on_default: bool,
}

/// Layout of a configuration file; other tables are ignored
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    router: RouterConfig,
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cache_schemas: true,
            normalize_paths: false,
            clear_on_default: true,
        }
    }
}

impl RouterConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let file: ConfigFile = toml::from_str(content).context("Invalid router configuration")?;
        Ok(file.router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = RouterConfig::default();
        assert!(config.cache_schemas);
        assert!(!config.normalize_paths);
        assert!(config.clear_on_default);
    }

    #[test]
    fn test_partial_table_uses_defaults() {
        let config = RouterConfig::from_toml_str("[router]\nnormalize_paths = true\n").unwrap();
        assert!(config.cache_schemas);
        assert!(config.normalize_paths);
        assert!(config.clear_on_default);
    }

    #[test]
    fn test_other_tables_ignored() {
        let config = RouterConfig::from_toml_str("[server]\nport = 3000\n").unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn test_invalid_value_is_error() {
        assert!(RouterConfig::from_toml_str("[router]\ncache_schemas = \"yes\"\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = RouterConfig::load(dir.path().join("silcrow.toml")).unwrap();
        assert_eq!(config, RouterConfig::default());
    }

    #[test]
    fn test_load_empty_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();
        assert_eq!(RouterConfig::load(file.path()).unwrap(), RouterConfig::default());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[router]\ncache_schemas = false\nclear_on_default = false").unwrap();

        let config = RouterConfig::load(file.path()).unwrap();
        assert!(!config.cache_schemas);
        assert!(!config.clear_on_default);
        assert!(!config.normalize_paths);
    }
}
