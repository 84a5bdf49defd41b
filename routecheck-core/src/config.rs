use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "ACCUWEATHER_API_KEY";

/// AccuWeather credentials and endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuWeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Locale passed as `language` on every request, e.g. "ru-ru" or "en-us".
    pub language: String,
}

impl Default for AccuWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "http://dataservice.accuweather.com".to_string(),
            language: "ru-ru".to_string(),
        }
    }
}

/// Nominatim search settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub user_agent: String,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("routecheck/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub max_calls: usize,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls: 50,
            window_secs: 3600,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// timeout_secs = 10
///
/// [accuweather]
/// api_key = "..."
/// language = "en-us"
///
/// [rate_limit]
/// max_calls = 50
/// window_secs = 3600
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Per-request timeout for both providers.
    pub timeout_secs: u64,
    pub accuweather: AccuWeatherConfig,
    pub geocoder: GeocoderConfig,
    pub rate_limit: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            accuweather: AccuWeatherConfig::default(),
            geocoder: GeocoderConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
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
        let dirs = ProjectDirs::from("dev", "routecheck", "routecheck")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.accuweather.api_key = Some(api_key);
    }

    /// API key from the config file, ignoring the environment.
    pub fn stored_api_key(&self) -> Option<&str> {
        self.accuweather
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }

    /// API key to use, preferring `ACCUWEATHER_API_KEY` over the config file.
    pub fn api_key(&self) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        if let Some(key) = from_env.filter(|k| !k.trim().is_empty()) {
            return Ok(key);
        }

        self.stored_api_key()
            .map(str::to_owned)
            .ok_or_else(|| {
                anyhow!(
                    "No AccuWeather API key configured.\n\
                     Hint: run `routecheck configure` or set {API_KEY_ENV}."
                )
            })
    }
}
