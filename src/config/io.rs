//! Reading and writing the TOML config file

use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::types::Config;

const APP_DIR: &str = "logstitch";
const FILE_NAME: &str = "config.toml";

/// `~/.config/logstitch/config.toml`
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(FILE_NAME))
}

/// `~/.config/logstitch`
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join(APP_DIR))
}

pub fn load() -> Result<Config> {
    load_from(&config_path()?)
}

/// Parse and validate `path`. A missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<Config> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config file: {:?}", path))
        }
    };

    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Write `config` as pretty TOML, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, contents).with_context(|| format!("Failed to write config file: {:?}", path))
}
