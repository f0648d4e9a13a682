use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::import::{CardExpenseClassifier, DEFAULT_CARD_KEYWORDS};

const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "ledgercast.db";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Overrides `<data dir>/ledgercast.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    pub log_level: String,
    pub default_user_id: i64,
    /// Months shown by `trend` when no count is given.
    pub summary_months: u32,
    pub legacy_card_keywords: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: "info".into(),
            default_user_id: 1,
            summary_months: 6,
            legacy_card_keywords: DEFAULT_CARD_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Config {
    /// Load `config.json` from the platform config directory, or defaults
    /// when there is none.
    pub fn load() -> Result<Self> {
        match project_dirs() {
            Some(dirs) => Self::load_from(&dirs.config_dir().join(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Where the database lives, creating its parent directory if needed.
    pub fn database_path(&self) -> Result<PathBuf> {
        let path = match &self.database_path {
            Some(path) => path.clone(),
            None => project_dirs()
                .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
                .data_dir()
                .join(DB_FILE),
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        }
        Ok(path)
    }

    /// An empty keyword list leaves only the "n/m" marker rule.
    pub fn card_classifier(&self) -> CardExpenseClassifier {
        CardExpenseClassifier::new(&self.legacy_card_keywords)
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "ledgercast", "ledgercast")
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
