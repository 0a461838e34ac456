/// Configuration for the planner server
use crate::schedule::GridConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Top-level engine configuration, read from a JSON file.
///
/// Every field has a default, so a partial file (or no file) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub grid: GridConfig,
    /// SQLite database file; `":memory:"` keeps everything in process
    pub database_path: String,
    /// Catalog JSON file, or a directory of them
    pub catalog_path: PathBuf,
    pub listen_address: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            grid: GridConfig::default(),
            database_path: "degreeplan.sqlite3".to_string(),
            catalog_path: PathBuf::from("data/catalog.json"),
            listen_address: "127.0.0.1:3000".to_string(),
        }
    }
}

impl EngineConfig {
    /// Loads the configuration file at `path`.
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` - Parsed configuration, or defaults if the file does not exist
    /// * `Err` - If the file can't be read or parsed, or the grid is invalid
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            warn!(
                "Config file {} not found, using defaults",
                path.display()
            );
            EngineConfig::default()
        };

        config.grid.validate()?;
        Ok(config)
    }
}
