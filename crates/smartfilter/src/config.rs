//! # Configuration
//!
//! Engine limits and defaults are loaded with [`confique`] from TOML files
//! and environment variables.
//!
//! ## Resolution order
//!
//! 1. **Environment variables**: `SMARTFILTER_MAX_DEPTH`, `SMARTFILTER_MAX_STATEMENTS`, ...
//! 2. **Explicit file**: the path given by the caller (e.g. `--config`).
//! 3. **Working directory**: `./smartfilter.toml`.
//! 4. **Global file**: `smartfilter.toml` in the OS config directory (via `directories`).
//! 5. **Compiled defaults**.
//!
//! ## Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `max_depth` | `16` | Deepest group nesting a filter may use |
//! | `max_statements` | `256` | Statements per filter, across all groups |
//! | `max_groups` | `128` | Groups per filter |
//! | `max_encoded_len` | `65536` | Longest encoded string accepted by the decoder |
//! | `default_sort_field` | `1` | Sort field id used when a filter has none |
//! | `default_sort_ascending` | `true` | Direction of the default sort |

use crate::error::Result;
use crate::model::{SortField, SortOptions};
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "smartfilter.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Deepest group nesting a filter may use.
    #[config(default = 16, env = "SMARTFILTER_MAX_DEPTH")]
    pub max_depth: usize,

    /// Statements per filter, counted across all groups.
    #[config(default = 256, env = "SMARTFILTER_MAX_STATEMENTS")]
    pub max_statements: usize,

    /// Groups per filter.
    #[config(default = 128, env = "SMARTFILTER_MAX_GROUPS")]
    pub max_groups: usize,

    /// Longest encoded filter string the decoder accepts, in bytes.
    #[config(default = 65536, env = "SMARTFILTER_MAX_ENCODED_LEN")]
    pub max_encoded_len: usize,

    /// Sort field id applied when a filter carries no sort (1 = sort name).
    #[config(default = 1, env = "SMARTFILTER_DEFAULT_SORT_FIELD")]
    pub default_sort_field: u8,

    #[config(default = true, env = "SMARTFILTER_DEFAULT_SORT_ASCENDING")]
    pub default_sort_ascending: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 16,
            max_statements: 256,
            max_groups: 128,
            max_encoded_len: 64 * 1024,
            default_sort_field: SortField::SortName.id(),
            default_sort_ascending: true,
        }
    }
}

impl EngineConfig {
    /// Load from the environment and the config files, `explicit` first.
    /// Missing files are skipped.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(path) = explicit {
            builder = builder.file(path);
        }
        builder = builder.file(CONFIG_FILE_NAME);
        if let Some(global) = global_config_path() {
            builder = builder.file(global);
        }
        Ok(builder.load()?)
    }

    /// The default ordering. An unknown configured id falls back to sort name.
    pub fn default_sort(&self) -> SortOptions {
        SortOptions {
            sort_field: SortField::try_from(self.default_sort_field).unwrap_or_default(),
            is_ascending: self.default_sort_ascending,
        }
    }

    /// A commented TOML file listing every setting with its default.
    pub fn template() -> String {
        confique::toml::template::<Self>(confique::toml::FormatOptions::default())
    }
}

/// `smartfilter.toml` inside the platform config directory.
pub fn global_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "smartfilter").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.max_encoded_len, 65536);
        assert_eq!(config.default_sort(), SortOptions::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "max_depth = 4\ndefault_sort_field = 6\ndefault_sort_ascending = false\n").unwrap();

        let config = EngineConfig::builder().file(&path).load().unwrap();
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_statements, 256);
        assert_eq!(
            config.default_sort(),
            SortOptions {
                sort_field: SortField::ReleaseYear,
                is_ascending: false
            }
        );
    }

    #[test]
    fn test_template_lists_every_setting() {
        let template = EngineConfig::template();
        for key in ["max_depth", "max_statements", "max_groups", "max_encoded_len", "default_sort_field"] {
            assert!(template.contains(key), "template is missing {}", key);
        }
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::builder()
            .file(dir.path().join("absent.toml"))
            .load()
            .unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_unknown_default_sort_falls_back() {
        let config = EngineConfig {
            default_sort_field: 42,
            ..Default::default()
        };
        assert_eq!(config.default_sort().sort_field, SortField::SortName);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = EngineConfig {
            max_groups: 12,
            ..Default::default()
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
