use crate::config::JitConfig;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the project root.
pub const CONFIG_FILE: &str = "jitvue.json";

/// A project directory and its configuration.
#[derive(Debug, Clone)]
pub struct JitProject {
    pub root: PathBuf,
    pub config: JitConfig,
}

impl JitProject {
    /// Load the project rooted at `dir`. A missing `jitvue.json` yields the
    /// default configuration.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        let config = if config_path.exists() {
            read_config(&config_path)?
        } else {
            JitConfig::default()
        };
        Ok(Self {
            root: dir.to_path_buf(),
            config,
        })
    }

    /// Load the project from the current working directory.
    pub fn load_cwd() -> Result<Self> {
        let cwd = std::env::current_dir()?;
        Self::load(&cwd)
    }

    /// Load an explicitly named configuration file, which must exist.
    pub fn load_config_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!("Config file not found: {}", path.display());
        }
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self {
            root,
            config: read_config(path)?,
        })
    }
}

fn read_config(path: &Path) -> Result<JitConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}
