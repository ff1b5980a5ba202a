// ⚙️ Configuration - settings as data
// Every field has a default; a JSON file and env vars can override them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::entities::{Company, Roster};
use crate::error::{InventoryError, Result};

/// Path to a JSON config file
pub const CONFIG_ENV: &str = "VIVIENDAS_CONFIG";

/// Overrides `output_dir`
pub const OUTPUT_DIR_ENV: &str = "VIVIENDAS_OUTPUT_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Used in the header and in export/template file names
    pub project_name: String,

    /// Where exports and templates are written
    pub output_dir: PathBuf,

    /// Where the session log is written
    pub log_dir: PathBuf,

    pub save_delay_ms: u64,
    pub import_delay_ms: u64,

    /// Companies and their agents, in display order. None keeps the built-in roster.
    pub companies: Option<Vec<Company>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            project_name: "lubens_farnesio".to_string(),
            output_dir: PathBuf::from("."),
            log_dir: std::env::temp_dir(),
            save_delay_ms: 500,
            import_delay_ms: 1000,
            companies: None,
        }
    }
}

impl Config {
    /// Load config from a JSON file; missing fields keep their defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config_error = |reason: String| InventoryError::Config {
            path: path.display().to_string(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| config_error(e.to_string()))
    }

    /// Defaults, then the file named by VIVIENDAS_CONFIG, then VIVIENDAS_OUTPUT_DIR
    pub fn from_env() -> Result<Self> {
        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::load_from_file(Path::new(&path))?,
            _ => Self::default(),
        };

        Ok(config.with_env_overrides())
    }

    /// Apply VIVIENDAS_OUTPUT_DIR over a loaded config
    pub fn with_env_overrides(self) -> Self {
        self.with_output_dir(std::env::var(OUTPUT_DIR_ENV).ok())
    }

    fn with_output_dir(mut self, dir: Option<String>) -> Self {
        if let Some(dir) = dir.filter(|d| !d.is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn roster(&self) -> Roster {
        match &self.companies {
            Some(companies) if !companies.is_empty() => Roster::from_companies(companies.clone()),
            _ => Roster::new(),
        }
    }

    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }

    pub fn import_delay(&self) -> Duration {
        Duration::from_millis(self.import_delay_ms)
    }

    /// Title shown in the header ("lubens_farnesio" → "LUBENS FARNESIO")
    pub fn display_title(&self) -> String {
        self.project_name.replace('_', " ").to_uppercase()
    }
}
