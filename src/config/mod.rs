use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::search::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// `[data]` block: where the CSV source and the SQLite store live.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct DataConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

/// `[server]` block for `dramadb serve`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub default_page_size: u32,
    pub max_page_size: u32,
    /// Idle connections kept open between requests.
    pub pool_size: usize,
    /// Convert the CSV at startup when the store is empty.
    pub convert_on_start: bool,
}

impl ServerConfig {
    /// A page size of zero would return empty pages forever; floor both at 1.
    pub fn normalize(&mut self) {
        self.max_page_size = self.max_page_size.max(1);
        self.default_page_size = self.default_page_size.max(1);
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            static_dir: PathBuf::from("static"),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            pool_size: 8,
            convert_on_start: false,
        }
    }
}

/// Top-level dramadb config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct DramaConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl DramaConfig {
    /// Load config from `path`. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(DramaConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let mut config: DramaConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.server.normalize();
        Ok(config)
    }

    /// CSV source, falling back to `kdramas.csv` in the working directory.
    pub fn csv_path(&self) -> PathBuf {
        self.data
            .csv_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("kdramas.csv"))
    }

    /// Render the effective config as TOML.
    pub fn display(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render config")
    }
}

/// Path to the config file: ~/.dramadb/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".dramadb").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.dramadb/config.toml
# Resolution order: CLI flag > env var > this file > built-in default

[data]
# csv_path = "kdramas.csv"
# db_path = "~/.dramadb/dramadb.db"

[server]
# host = "127.0.0.1"
# port = 8000
# static_dir = "static"
# default_page_size = 20
# max_page_size = 100
# pool_size = 8
# convert_on_start = false
"#
}

/// Create the default config file at `path` if it doesn't already exist.
pub fn init_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, default_config_template())?;
    Ok(true)
}
