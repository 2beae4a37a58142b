use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::coordinator::SequencingPolicy;

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "CLIMA_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_CITY: &str = "Lima";
pub const DEFAULT_LANGUAGE: &str = "es";
pub const DEFAULT_WIDGET_REFRESH_MINUTES: u32 = 60;

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Cusco"
/// sequencing = "latest-issued"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeather credential, used for both weather and geocoding calls.
    pub api_key: Option<String>,

    /// City resolved once at startup.
    pub default_city: String,

    /// Value of the `lang` request parameter.
    pub language: String,

    /// API root, without trailing slash.
    pub base_url: String,

    pub sequencing: SequencingPolicy,

    pub widget_refresh_minutes: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            default_city: DEFAULT_CITY.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            sequencing: SequencingPolicy::default(),
            widget_refresh_minutes: DEFAULT_WIDGET_REFRESH_MINUTES,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    /// `CLIMA_API_KEY` overrides the stored key either way.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };

        cfg.apply_key_override(std::env::var(API_KEY_ENV).ok());
        Ok(cfg)
    }

    /// Replaces the stored key with `value` unless it is absent or blank.
    pub fn apply_key_override(&mut self, value: Option<String>) {
        if let Some(key) = value
            && !key.trim().is_empty()
        {
            self.api_key = Some(key);
        }
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "clima", "clima-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// The configured API key, or an error telling the user how to set one.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured.\n\
                     Hint: run `clima configure` or set {API_KEY_ENV}."
                )
            })
    }
}
