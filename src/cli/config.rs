//! Configuration file support.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::infra::CapabilityStore;

/// Environment variable overriding where the connected folder is remembered.
pub const STATE_FILE_ENV: &str = "CHRONICLE_STATE_FILE";

/// Application configuration loaded from config file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Journal folder used when none has been connected
    pub dir: Option<PathBuf>,

    /// File remembering the connected journal folder
    pub state_file: Option<PathBuf>,

    /// Editor command for editing notes
    pub editor: Option<String>,
}

impl Config {
    /// Load configuration from the default config file location.
    ///
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))
    }

    /// Returns the path to the config file.
    ///
    /// Default: `~/.config/chronicle/config.toml`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chronicle")
            .join("config.toml")
    }

    /// Resolve the capability state file.
    ///
    /// Precedence order:
    /// 1. `$CHRONICLE_STATE_FILE`
    /// 2. Config file `state_file` setting
    /// 3. `<data dir>/chronicle/root.json`
    pub fn state_file(&self) -> PathBuf {
        std::env::var_os(STATE_FILE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.state_file.clone())
            .unwrap_or_else(CapabilityStore::default_state_path)
    }

    /// Resolve the editor command.
    ///
    /// Precedence order:
    /// 1. Config file `editor` setting
    /// 2. $EDITOR environment variable
    /// 3. $VISUAL environment variable
    /// 4. "vi" as fallback
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }
}
