//! Configuration loading.
//!
//! Reads `~/.taskboard/config.toml` (or the file given with `--config`).
//! Every key is optional; a missing file means defaults throughout.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::fields::Category;
use crate::ordering::DEFAULT_STEP;

pub const CONFIG_FILE: &str = "config.toml";
pub const DATA_FILE: &str = "tasks.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Recorded as the owner of new tasks, comments and activity.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Category used when `add` is not given one.
    #[serde(default = "default_category")]
    pub default_category: Category,

    #[serde(default)]
    pub ordering: OrderingConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            default_category: default_category(),
            ordering: OrderingConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn default_owner() -> String {
    std::env::var("USER")
        .ok()
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "me".to_string())
}

fn default_category() -> Category {
    Category::LifeAdmin
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderingConfig {
    /// Gap between neighbours when appending to or prepending a category.
    #[serde(default = "default_step")]
    pub step: i64,
}

fn default_step() -> i64 {
    DEFAULT_STEP
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self { step: default_step() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Snapshot file. Defaults to `tasks.json` next to the config file.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration, falling back to defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(Error::InvalidConfig("owner cannot be empty".into()));
        }
        if self.ordering.step < 2 {
            return Err(Error::InvalidConfig(format!(
                "ordering.step must be at least 2, got {}",
                self.ordering.step
            )));
        }
        Ok(())
    }

    /// Where the snapshot lives: explicit override, then config, then `data_dir`.
    pub fn data_path(&self, data_dir: &Path, db_override: Option<&Path>) -> PathBuf {
        db_override
            .map(Path::to_path_buf)
            .or_else(|| self.storage.path.clone())
            .unwrap_or_else(|| data_dir.join(DATA_FILE))
    }
}

/// `~/.taskboard`, or `./.taskboard` when `HOME` is unset.
pub fn default_data_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".taskboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.default_category, Category::LifeAdmin);
        assert_eq!(config.ordering.step, DEFAULT_STEP);
        assert_eq!(config.storage.path, None);
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::parse(
            r#"
owner = "sam"
default_category = "work"

[ordering]
step = 16

[storage]
path = "/tmp/board.json"
"#,
        )
        .unwrap();
        assert_eq!(config.owner, "sam");
        assert_eq!(config.default_category, Category::Work);
        assert_eq!(config.ordering.step, 16);
        assert_eq!(config.storage.path, Some(PathBuf::from("/tmp/board.json")));
    }

    #[test]
    fn rejects_tiny_step_and_unknown_category() {
        let err = Config::parse("[ordering]\nstep = 1\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        let err = Config::parse("default_category = \"errands\"\n").unwrap_err();
        assert!(matches!(err, Error::TomlParse(_)));
    }

    #[test]
    fn data_path_precedence() {
        let dir = Path::new("/home/sam/.taskboard");
        let mut config = Config::default();
        assert_eq!(config.data_path(dir, None), dir.join(DATA_FILE));
        config.storage.path = Some(PathBuf::from("/srv/board.json"));
        assert_eq!(config.data_path(dir, None), PathBuf::from("/srv/board.json"));
        assert_eq!(
            config.data_path(dir, Some(Path::new("x.json"))),
            PathBuf::from("x.json")
        );
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config.ordering.step, DEFAULT_STEP);
    }
}
