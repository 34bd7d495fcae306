use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

pub const CONFIG_FILE_NAME: &str = "labelrepo.toml";
pub const DEFAULT_DATA_DIR: &str = "analysis/data";
pub const DEFAULT_DATABASE: &str = "database.sqlite3";
pub const DEFAULT_CSV: &str = "detailed_annotation.csv";

/// Optional overrides read from `labelrepo.toml` at the repository root
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LabelrepoConfig {
    /// Data directory, relative to the repository root
    pub data_dir: Option<String>,
    /// Database file name inside the data directory
    pub database: Option<String>,
    /// CSV export file name inside the data directory
    pub csv: Option<String>,
}

impl LabelrepoConfig {
    /// Config populated with the built-in defaults, as written by `init-config`
    pub fn with_defaults() -> Self {
        Self {
            data_dir: Some(DEFAULT_DATA_DIR.to_string()),
            database: Some(DEFAULT_DATABASE.to_string()),
            csv: Some(DEFAULT_CSV.to_string()),
        }
    }

    pub fn data_dir_or_default(&self) -> &str {
        self.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR)
    }

    pub fn database_or_default(&self) -> &str {
        self.database.as_deref().unwrap_or(DEFAULT_DATABASE)
    }

    pub fn csv_or_default(&self) -> &str {
        self.csv.as_deref().unwrap_or(DEFAULT_CSV)
    }
}

pub fn config_path_in(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

pub fn load_config(root: &Path) -> Result<Option<LabelrepoConfig>> {
    let path = config_path_in(root);
    if !path.exists() {
        return Ok(None);
    }

    tracing::debug!("Loading config from {}", path.display());
    let contents = std::fs::read_to_string(&path)?;
    let config: LabelrepoConfig =
        toml::from_str(&contents).map_err(|source| Error::Config { path, source })?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &LabelrepoConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
