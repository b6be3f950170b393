// Configuration management

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::AppConfig;

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("blogforge");

    fs::create_dir_all(&config_dir).context("Failed to create config directory")?;

    Ok(config_dir)
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

pub fn get_log_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("blogforge.log"))
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&get_config_path()?)
}

/// Load the config at `path`, writing the defaults there first if it is missing.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        let default_config = AppConfig::default();
        save_config_to(path, &default_config)?;
        return Ok(default_config);
    }

    let contents = fs::read_to_string(path).context("Failed to read config file")?;

    let config: AppConfig = toml::from_str(&contents).context("Failed to parse config file")?;

    Ok(config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;

    fs::write(path, contents).context("Failed to write config file")?;

    Ok(())
}
