use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_city() -> String {
    "Nouakchott".to_string()
}
fn default_country() -> String {
    "Mauritania".to_string()
}
fn default_method() -> u8 {
    3
}
fn default_base_url() -> String {
    "https://api.aladhan.com/v1".to_string()
}
fn default_tick_secs() -> u64 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(default = "default_country")]
    pub country: String,
    /// Aladhan calculation method id (3 = Muslim World League).
    #[serde(default = "default_method")]
    pub method: u8,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            city: default_city(),
            country: default_country(),
            method: default_method(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Dashboard tick. The clock, countdown and due reminders advance on it.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "miqat").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("miqat.db"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Parsing config.toml")
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_fixed_location() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.location.city, "Nouakchott");
        assert_eq!(config.location.country, "Mauritania");
        assert_eq!(config.location.method, 3);
        assert_eq!(config.api.base_url, "https://api.aladhan.com/v1");
        assert_eq!(config.display.tick_secs, 1);
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = AppConfig::from_toml("[location]\ncity = \"Medina\"\n").unwrap();
        assert_eq!(config.location.city, "Medina");
        assert_eq!(config.location.country, "Mauritania");
    }

    #[test]
    fn rejects_invalid_toml() {
        assert!(AppConfig::from_toml("[location\n").is_err());
    }
}
